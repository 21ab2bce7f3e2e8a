use std::time::Duration;

use adblock_client::{RetryConfig, SourceFetcher};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn fetcher() -> SourceFetcher {
    SourceFetcher::builder()
        .retry(
            RetryConfig::new()
                .max_attempts(3)
                .initial_backoff(Duration::from_millis(10)),
        )
        .build()
        .unwrap()
}

#[tokio::test]
async fn fetch_splits_lines() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/hosts"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            "# comment\r\n0.0.0.0 ads.example.com\r\n||tracker.example.net^\n",
        ))
        .mount(&server)
        .await;

    let lines = fetcher().fetch(&format!("{}/hosts", server.uri())).await;
    assert_eq!(
        lines,
        vec![
            "# comment",
            "0.0.0.0 ads.example.com",
            "||tracker.example.net^"
        ]
    );
}

#[tokio::test]
async fn server_errors_are_retried() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/flaky"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(2)
        .expect(2)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/flaky"))
        .respond_with(ResponseTemplate::new(200).set_body_string("ads.example.com\n"))
        .expect(1)
        .mount(&server)
        .await;

    let lines = fetcher().fetch(&format!("{}/flaky", server.uri())).await;
    assert_eq!(lines, vec!["ads.example.com"]);
}

#[tokio::test]
async fn client_errors_are_not_retried() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/gone"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;

    let fetcher = fetcher();
    let url = format!("{}/gone", server.uri());
    assert!(fetcher.try_fetch(&url).await.is_err());
    assert!(fetcher.fetch(&url).await.is_empty());
}

#[tokio::test]
async fn persistent_failure_gives_up_after_max_attempts() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/down"))
        .respond_with(ResponseTemplate::new(500))
        .expect(3)
        .mount(&server)
        .await;

    let lines = fetcher().fetch(&format!("{}/down", server.uri())).await;
    assert!(lines.is_empty());
}

#[tokio::test]
async fn one_bad_source_does_not_abort_the_rest() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/a"))
        .respond_with(ResponseTemplate::new(200).set_body_string("a.example.com\n"))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/b"))
        .respond_with(ResponseTemplate::new(403))
        .mount(&server)
        .await;

    let urls = vec![
        format!("{}/a", server.uri()),
        format!("{}/b", server.uri()),
        "not a url".to_string(),
    ];
    assert_eq!(fetcher().fetch_all(&urls).await, vec!["a.example.com"]);
}
