//! Blocklist canonicalization, reduction and Cloudflare Gateway reconciliation.
//!
//! The pieces, leaf first:
//!
//! - [`canonicalize`]: one raw list line to a [`CanonicalDomain`](adblock_core::CanonicalDomain)
//! - [`reduce`]: a domain set to a minimal covering subset
//! - [`SetBuilder`]: sources to the sorted desired sequence
//! - [`Reconciler`]: desired sequence to remote lists and policy
//! - [`Controller`]: retries attempts until the remote state converges

mod builder;
mod canonical;
mod controller;
mod reconcile;
mod reduce;

pub use builder::{canonicalize_lines, BuildReport, Canonicalized, DesiredSet, SetBuilder};
pub use canonical::{canonicalize, Rejection, RejectionStats};
pub use controller::{Attempt, Controller, ControllerConfig, Finish, Pipeline, Sources};
pub use reconcile::{
    Outcome, PolicyAction, ReconcileConfig, Reconciler, RemoteState, SyncNames, SyncPlan,
    Teardown, DEFAULT_CHUNK_SIZE, DEFAULT_MAX_DOMAINS,
};
pub use reduce::reduce;
