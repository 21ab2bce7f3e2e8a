//! Building the desired blocklist from remote sources.

use crate::canonical::{canonicalize, RejectionStats};
use crate::reduce::reduce;
use adblock_client::SourceFetcher;
use adblock_core::{AdblockError, CanonicalDomain, DomainSet, Result};
use std::sync::Arc;
use tracing::{debug, info};

/// Counters gathered while building one desired set
#[derive(Debug, Clone, Copy, Default)]
pub struct BuildReport {
    /// Raw lines downloaded from block sources
    pub block_lines: usize,
    /// Raw lines from the static allow list and allow sources
    pub allow_lines: usize,
    /// Distinct allow-list domains
    pub allow_domains: usize,
    /// Block-list domains dropped because they are allow-listed
    pub allowed: usize,
    /// Distinct block-list domains before reduction
    pub before_reduction: usize,
    /// Domains after reduction
    pub after_reduction: usize,
    /// Rejected lines across both lists
    pub rejected: RejectionStats,
}

/// The sorted, duplicate-free set of domains to block
#[derive(Debug, Clone, Default)]
pub struct DesiredSet {
    /// Domains in lexicographic order
    pub domains: Vec<CanonicalDomain>,
    /// How the set was obtained
    pub report: BuildReport,
}

impl DesiredSet {
    /// Number of domains
    #[must_use]
    pub fn len(&self) -> usize {
        self.domains.len()
    }

    /// Returns true if nothing is to be blocked
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.domains.is_empty()
    }
}

/// Fetches, canonicalizes, filters and reduces blocklist sources
#[derive(Debug, Clone)]
pub struct SetBuilder {
    fetcher: SourceFetcher,
    workers: usize,
}

impl SetBuilder {
    /// Create a builder using one canonicalization worker per available core
    #[must_use]
    pub fn new(fetcher: SourceFetcher) -> Self {
        let workers = std::thread::available_parallelism().map_or(1, std::num::NonZeroUsize::get);
        Self { fetcher, workers }
    }

    /// Set the number of canonicalization workers
    #[must_use]
    pub fn workers(mut self, workers: usize) -> Self {
        self.workers = workers.max(1);
        self
    }

    /// Build the desired set.
    ///
    /// The allow list (static lines plus `allow_urls`) is canonicalized but
    /// not reduced, so it subtracts exact entries only.
    pub async fn build(
        &self,
        block_urls: &[String],
        static_allow: &[String],
        allow_urls: &[String],
    ) -> Result<DesiredSet> {
        let mut report = BuildReport::default();

        let mut allow_lines = static_allow.to_vec();
        allow_lines.extend(self.fetcher.fetch_all(allow_urls).await);
        report.allow_lines = allow_lines.len();
        let allow = canonicalize_lines(allow_lines, None, self.workers).await?;
        report.rejected.merge(&allow.rejected);
        report.allow_domains = allow.domains.len();
        let allow = Arc::new(allow.domains);

        let block_lines = self.fetcher.fetch_all(block_urls).await;
        report.block_lines = block_lines.len();
        let block = canonicalize_lines(block_lines, Some(allow), self.workers).await?;
        report.rejected.merge(&block.rejected);
        report.allowed = block.allowed;
        report.before_reduction = block.domains.len();

        let domains = reduce(&block.domains).into_sorted_vec();
        report.after_reduction = domains.len();

        info!(
            block_lines = report.block_lines,
            allow_domains = report.allow_domains,
            allowed = report.allowed,
            rejected = report.rejected.invalid(),
            before = report.before_reduction,
            after = report.after_reduction,
            "Built desired blocklist"
        );
        debug!(stats = ?report.rejected, "Rejected lines by reason");

        Ok(DesiredSet { domains, report })
    }
}

/// Result of canonicalizing a batch of lines
#[derive(Debug, Default)]
pub struct Canonicalized {
    /// Accepted domains
    pub domains: DomainSet,
    /// Rejected lines by reason
    pub rejected: RejectionStats,
    /// Accepted domains dropped because they were in the allow set
    pub allowed: usize,
}

impl Canonicalized {
    fn merge(&mut self, other: Self) {
        self.domains.merge(other.domains);
        self.rejected.merge(&other.rejected);
        self.allowed += other.allowed;
    }
}

/// Canonicalize `lines` on `workers` blocking threads.
///
/// Each worker owns its accumulator; partial results are merged once all
/// workers have joined. Domains present in `allow` are dropped.
pub async fn canonicalize_lines(
    lines: Vec<String>,
    allow: Option<Arc<DomainSet>>,
    workers: usize,
) -> Result<Canonicalized> {
    let workers = workers.max(1);
    let chunk_size = lines.len().div_ceil(workers).max(1);

    let mut remaining = lines.into_iter();
    let mut handles = Vec::with_capacity(workers);
    loop {
        let chunk: Vec<String> = remaining.by_ref().take(chunk_size).collect();
        if chunk.is_empty() {
            break;
        }
        let allow = allow.clone();
        handles.push(tokio::task::spawn_blocking(move || {
            canonicalize_chunk(&chunk, allow.as_deref())
        }));
    }

    let mut merged = Canonicalized::default();
    for joined in futures_util::future::join_all(handles).await {
        let partial = joined
            .map_err(|e| AdblockError::Internal(format!("canonicalization worker failed: {e}")))?;
        merged.merge(partial);
    }
    Ok(merged)
}

fn canonicalize_chunk(lines: &[String], allow: Option<&DomainSet>) -> Canonicalized {
    let mut out = Canonicalized::default();
    for line in lines {
        match canonicalize(line) {
            Ok(domain) if allow.is_some_and(|a| a.contains(domain.as_str())) => out.allowed += 1,
            Ok(domain) => {
                out.domains.insert(domain);
            }
            Err(reason) => out.rejected.record(reason),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|s| (*s).to_string()).collect()
    }

    #[tokio::test]
    async fn test_workers_merge_partial_sets() {
        let input = lines(&[
            "a.example.com",
            "||b.example.com^",
            "0.0.0.0 a.example.com",
            "# comment",
            "10.0.0.1",
            "c.example.com",
            "www.d.example.com",
        ]);
        let out = canonicalize_lines(input, None, 3).await.unwrap();
        assert_eq!(out.domains.len(), 4);
        assert!(out.domains.contains("d.example.com"));
        assert_eq!(out.rejected.comment, 1);
        assert_eq!(out.rejected.ip_literal, 1);
    }

    #[tokio::test]
    async fn test_allow_set_is_exact_match() {
        let allow: DomainSet = [CanonicalDomain::new_unchecked("good.example.com")]
            .into_iter()
            .collect();
        let input = lines(&["good.example.com", "sub.good.example.com", "bad.example.com"]);
        let out = canonicalize_lines(input, Some(Arc::new(allow)), 2)
            .await
            .unwrap();
        assert_eq!(out.allowed, 1);
        assert!(!out.domains.contains("good.example.com"));
        assert!(out.domains.contains("sub.good.example.com"));
        assert!(out.domains.contains("bad.example.com"));
    }

    #[tokio::test]
    async fn test_empty_input() {
        let out = canonicalize_lines(Vec::new(), None, 8).await.unwrap();
        assert!(out.domains.is_empty());
        assert_eq!(out.rejected.total(), 0);
    }
}
