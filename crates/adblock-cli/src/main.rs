//! cf-adblock - Cloudflare Gateway DNS blocklist synchronizer
//!
//! Builds a domain set from adblock and hosts sources and mirrors it into
//! Zero Trust Gateway lists guarded by a single block policy.

use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    adblock_cli::run().await
}
