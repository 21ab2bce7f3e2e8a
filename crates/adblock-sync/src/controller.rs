//! The outer convergence loop.

use crate::builder::SetBuilder;
use crate::reconcile::{Outcome, Reconciler};
use adblock_core::{AdblockError, GatewayApi, Result};
use async_trait::async_trait;
use std::future::Future;
use std::time::Duration;
use tracing::{error, info, warn};

/// One reconciliation attempt, from sources to remote state
#[async_trait]
pub trait Attempt: Send + Sync {
    /// Run the attempt to completion, including any rollback
    async fn run_once(&self) -> Result<Outcome>;
}

/// Source locations for one build
#[derive(Debug, Clone, Default)]
pub struct Sources {
    /// Block-list URLs
    pub block_urls: Vec<String>,
    /// Allow-list URLs
    pub allow_urls: Vec<String>,
    /// Allow-list lines read from a local file
    pub static_allow: Vec<String>,
}

/// Rebuilds the desired set and reconciles it on every attempt
#[derive(Debug)]
pub struct Pipeline<G> {
    builder: SetBuilder,
    reconciler: Reconciler<G>,
    sources: Sources,
}

impl<G: GatewayApi> Pipeline<G> {
    /// Create a pipeline
    pub const fn new(builder: SetBuilder, reconciler: Reconciler<G>, sources: Sources) -> Self {
        Self {
            builder,
            reconciler,
            sources,
        }
    }
}

#[async_trait]
impl<G: GatewayApi> Attempt for Pipeline<G> {
    async fn run_once(&self) -> Result<Outcome> {
        let desired = self
            .builder
            .build(
                &self.sources.block_urls,
                &self.sources.static_allow,
                &self.sources.allow_urls,
            )
            .await?;
        info!(total = desired.len(), "Total domains");
        self.reconciler.reconcile(&desired.domains).await
    }
}

/// Retry policy of the convergence loop
#[derive(Debug, Clone, Copy)]
pub struct ControllerConfig {
    /// Sleep after the first failed attempt; grows linearly per attempt
    pub interval: Duration,
    /// Upper bound on the sleep
    pub max_interval: Duration,
    /// Give up after this many attempts (`None` retries until success)
    pub max_attempts: Option<u32>,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(60),
            max_interval: Duration::from_secs(15 * 60),
            max_attempts: None,
        }
    }
}

impl ControllerConfig {
    /// Sleep after failed attempt number `attempt` (1-based)
    #[must_use]
    pub fn backoff_for(&self, attempt: u32) -> Duration {
        self.interval
            .saturating_mul(attempt.max(1))
            .min(self.max_interval)
    }
}

/// How the loop ended without an error
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Finish {
    /// An attempt succeeded
    Converged {
        /// The successful attempt's outcome
        outcome: Outcome,
        /// Attempts made, including the successful one
        attempts: u32,
    },
    /// The shutdown signal fired while waiting to retry
    Interrupted {
        /// Attempts made
        attempts: u32,
    },
}

/// Runs attempts until one succeeds, a fatal error occurs, or attempts run out
#[derive(Debug)]
pub struct Controller<A> {
    attempt: A,
    config: ControllerConfig,
}

impl<A: Attempt> Controller<A> {
    /// Create a controller
    pub const fn new(attempt: A, config: ControllerConfig) -> Self {
        Self { attempt, config }
    }

    /// The attempt driven by this controller
    pub const fn attempt(&self) -> &A {
        &self.attempt
    }

    /// Run until convergence with no external cancellation
    pub async fn run(&self) -> Result<Finish> {
        self.run_until(std::future::pending::<()>()).await
    }

    /// Run until convergence or until `shutdown` resolves between attempts.
    ///
    /// An attempt in progress always runs to completion.
    pub async fn run_until<F>(&self, shutdown: F) -> Result<Finish>
    where
        F: Future<Output = ()> + Send,
    {
        tokio::pin!(shutdown);
        let mut attempts = 0;

        loop {
            attempts += 1;
            let err = match self.attempt.run_once().await {
                Ok(outcome) => {
                    info!(attempts, ?outcome, "Converged");
                    return Ok(Finish::Converged { outcome, attempts });
                }
                Err(e) if e.is_fatal() => {
                    error!(attempts, error = %e, "Fatal error, not retrying");
                    return Err(e);
                }
                Err(e) => e,
            };

            if matches!(err, AdblockError::ConsistencyViolation { .. }) {
                error!(attempts, error = %err, "Remote state drifted");
            }
            if self.config.max_attempts.is_some_and(|max| attempts >= max) {
                error!(attempts, error = %err, "Giving up");
                return Err(err);
            }

            let backoff = self.config.backoff_for(attempts);
            warn!(attempts, error = %err, ?backoff, "Attempt failed, retrying");
            tokio::select! {
                () = tokio::time::sleep(backoff) => {}
                () = &mut shutdown => {
                    info!(attempts, "Shutdown requested");
                    return Ok(Finish::Interrupted { attempts });
                }
            }
        }
    }
}
