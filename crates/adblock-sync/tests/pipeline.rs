mod common;

use std::sync::Arc;

use adblock_client::SourceFetcher;
use adblock_sync::{
    Attempt, Outcome, Pipeline, ReconcileConfig, Reconciler, SetBuilder, Sources, SyncNames,
};
use common::FakeGateway;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const BLOCK_HOSTS: &str = "\
# Title: test hosts
127.0.0.1 localhost
0.0.0.0 ads.example.com
0.0.0.0 www.tracker.net
0.0.0.0 pixel.tracker.net
0.0.0.0 cdn.shop.org
0.0.0.0 192.168.1.1
";

const BLOCK_ADBLOCK: &str = "\
! adblock style
||metrics.shop.org^
||allowed.example.com^
||Bücher.example^$third-party
/ad-banner[0-9]/
";

async fn sources() -> (MockServer, Sources) {
    let server = MockServer::start().await;
    for (route, body) in [
        ("/hosts", BLOCK_HOSTS),
        ("/adblock", BLOCK_ADBLOCK),
        ("/allow", "pixel.tracker.net\n"),
    ] {
        Mock::given(method("GET"))
            .and(path(route))
            .respond_with(ResponseTemplate::new(200).set_body_string(body))
            .mount(&server)
            .await;
    }
    Mock::given(method("GET"))
        .and(path("/missing"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let sources = Sources {
        block_urls: vec![
            format!("{}/hosts", server.uri()),
            format!("{}/adblock", server.uri()),
            format!("{}/missing", server.uri()),
        ],
        allow_urls: vec![format!("{}/allow", server.uri())],
        static_allow: vec!["# static".into(), "allowed.example.com".into()],
    };
    (server, sources)
}

fn builder() -> SetBuilder {
    SetBuilder::new(SourceFetcher::new().unwrap()).workers(3)
}

#[tokio::test]
async fn build_produces_sorted_reduced_set_without_allowed_entries() {
    let (_server, sources) = sources().await;

    let desired = builder()
        .build(&sources.block_urls, &sources.static_allow, &sources.allow_urls)
        .await
        .unwrap();

    let domains: Vec<_> = desired.domains.iter().map(|d| d.as_str()).collect();
    assert_eq!(
        domains,
        [
            "ads.example.com",
            "cdn.shop.org",
            "metrics.shop.org",
            "tracker.net",
            "xn--bcher-kva.example",
        ]
    );
    assert!(!domains.contains(&"allowed.example.com"));
    assert_eq!(desired.report.allowed, 2);
    assert_eq!(desired.report.allow_domains, 2);
    assert_eq!(desired.report.rejected.reserved, 1);
    assert_eq!(desired.report.rejected.ip_literal, 1);
}

#[tokio::test]
async fn pipeline_syncs_then_skips() {
    let (_server, sources) = sources().await;
    let gateway = Arc::new(FakeGateway::new());
    let pipeline = Pipeline::new(
        builder(),
        Reconciler::new(
            Arc::clone(&gateway),
            SyncNames::new("AdBlock-DNS Block List"),
            ReconcileConfig {
                chunk_size: 2,
                ..ReconcileConfig::default()
            },
        ),
        sources,
    );

    let first = pipeline.run_once().await.unwrap();
    assert!(matches!(first, Outcome::Synced { ref lists_created, .. } if lists_created.len() == 3));

    let second = pipeline.run_once().await.unwrap();
    assert_eq!(second, Outcome::Skipped { remote_count: 5 });
}
