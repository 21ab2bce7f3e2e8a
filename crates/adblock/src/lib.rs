//! Keep a Cloudflare Zero Trust Gateway DNS blocklist in sync with adblock and hosts sources.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use adblock::{GatewayClient, Reconciler, ReconcileConfig, SetBuilder, SourceFetcher, SyncNames};
//!
//! #[tokio::main]
//! async fn main() -> adblock::Result<()> {
//!     let gateway = GatewayClient::builder("api-token", "account-id").build()?;
//!     let builder = SetBuilder::new(SourceFetcher::new()?);
//!
//!     let desired = builder
//!         .build(&["https://example.org/hosts".into()], &[], &[])
//!         .await?;
//!
//!     let reconciler = Reconciler::new(
//!         gateway,
//!         SyncNames::new("AdBlock-DNS Block List"),
//!         ReconcileConfig::default(),
//!     );
//!     println!("{:?}", reconciler.reconcile(&desired.domains).await?);
//!     Ok(())
//! }
//! ```
//!
//! # Features
//!
//! - `default` - Uses rustls for TLS
//! - `rustls` - Use rustls for TLS (recommended)
//! - `native-tls` - Use system native TLS

// Re-export core types
pub use adblock_core::*;

// Re-export clients
pub use adblock_client::{
    parse_source_urls, GatewayClient, GatewayClientBuilder, RateLimitConfig, RetryConfig,
    SourceFetcher, SourceFetcherBuilder,
};

// Re-export the sync engine
pub use adblock_sync::*;

// Re-export runtime for convenience
pub use tokio;
