//! HTTP clients for the ad-block synchronizer.
//!
//! This crate provides:
//!
//! - [`GatewayClient`], a binding of [`adblock_core::GatewayApi`] to the
//!   Cloudflare Zero Trust Gateway REST API
//! - [`SourceFetcher`], a retrying downloader for plain-text blocklist sources

mod client;
mod config;
mod fetch;
mod gateway;
pub mod api;

pub use client::{GatewayClient, GatewayClientBuilder};
pub use config::*;
pub use fetch::{parse_source_urls, SourceFetcher, SourceFetcherBuilder};
pub use adblock_core::{AdblockError, Result};
