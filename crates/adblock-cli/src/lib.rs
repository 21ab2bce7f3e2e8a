//! cf-adblock - Cloudflare Gateway DNS blocklist synchronizer
//!
//! This crate provides the command-line front end over the `adblock` library.

pub mod cli;
pub mod config;
pub mod output;

pub use cli::run;
