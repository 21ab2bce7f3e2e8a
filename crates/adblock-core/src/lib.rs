//! Core types and traits for the Cloudflare Gateway ad-block synchronizer.
//!
//! This crate provides the foundational types shared across the workspace:
//!
//! - **Types**: [`CanonicalDomain`] and [`DomainSet`] for the local blocklist,
//!   [`GatewayList`] and [`GatewayRule`] for the remote state
//! - **Errors**: the [`AdblockError`] taxonomy
//! - **Traits**: [`GatewayApi`], the seam between reconciliation and the remote service
//!
//! # Example
//!
//! ```rust,ignore
//! use adblock_core::{CanonicalDomain, DomainSet};
//!
//! let mut set = DomainSet::new();
//! set.insert(CanonicalDomain::new_unchecked("ads.example.com"));
//! assert!(set.contains("ads.example.com"));
//! ```

mod error;
mod gateway;
pub mod types;

pub use error::{AdblockError, Result};
pub use gateway::GatewayApi;
pub use types::*;
