//! Command implementations.

pub mod build;
pub mod plan;
pub mod status;
pub mod sync;
pub mod teardown;

use std::path::{Path, PathBuf};
use std::time::Duration;

use adblock::{
    ControllerConfig, GatewayClient, ReconcileConfig, Reconciler, SetBuilder, SourceFetcher,
    Sources, SyncNames, DEFAULT_CHUNK_SIZE, DEFAULT_MAX_DOMAINS,
};
use anyhow::Result;
use tracing::debug;

use super::CliError;
use crate::config::{self, Config, DEFAULT_LIST_NAME};
use crate::output::OutputFormat;

/// Shared context for all commands.
#[derive(Debug, Clone)]
pub struct Context {
    /// Cloudflare API token
    pub api_token: Option<String>,

    /// Cloudflare account id
    pub account_id: Option<String>,

    /// Name the managed objects are derived from
    pub list_name: String,

    /// Output format
    pub output_format: OutputFormat,

    /// Settings from the config file
    pub config: Config,
}

impl Context {
    /// Merge command-line values over the config file.
    pub fn new(
        config: Config,
        api_token: Option<String>,
        account_id: Option<String>,
        list_name: Option<String>,
        output_format: OutputFormat,
    ) -> Self {
        let api_token = api_token.or_else(|| config.api_token.clone());
        let account_id = account_id.or_else(|| config.account_id.clone());
        let list_name = list_name
            .or_else(|| config.list_name.clone())
            .unwrap_or_else(|| DEFAULT_LIST_NAME.to_string());

        Self {
            api_token,
            account_id,
            list_name,
            output_format,
            config,
        }
    }

    /// Get the token and account id, returning an error if either is unset.
    pub fn require_credentials(&self) -> Result<(&str, &str), CliError> {
        let token = self.api_token.as_deref().filter(|t| !t.is_empty());
        let account = self.account_id.as_deref().filter(|a| !a.is_empty());
        token.zip(account).ok_or(CliError::MissingCredentials)
    }

    /// Create a Gateway client with the configured credentials.
    pub fn client(&self) -> Result<GatewayClient> {
        let (token, account) = self.require_credentials()?;
        Ok(GatewayClient::builder(token, account).build()?)
    }

    /// Managed list and policy names
    pub fn names(&self) -> SyncNames {
        SyncNames::new(&self.list_name)
    }

    /// Chunking and ceiling settings
    pub fn reconcile_config(&self) -> ReconcileConfig {
        ReconcileConfig {
            chunk_size: self.config.chunk_size.unwrap_or(DEFAULT_CHUNK_SIZE),
            max_domains: self.config.max_domains.unwrap_or(DEFAULT_MAX_DOMAINS),
        }
    }

    /// Create a reconciler over the live gateway.
    pub fn reconciler(&self) -> Result<Reconciler<GatewayClient>> {
        Ok(Reconciler::new(
            self.client()?,
            self.names(),
            self.reconcile_config(),
        ))
    }

    /// Create a set builder with the configured worker count.
    pub fn set_builder(&self) -> Result<SetBuilder> {
        let builder = SetBuilder::new(SourceFetcher::new()?);
        Ok(match self.config.workers {
            Some(n) => builder.workers(n),
            None => builder,
        })
    }

    /// Retry settings of the sync loop
    pub fn controller_config(&self) -> ControllerConfig {
        let defaults = ControllerConfig::default();
        ControllerConfig {
            interval: self
                .config
                .retry_interval_secs
                .map_or(defaults.interval, Duration::from_secs),
            max_interval: self
                .config
                .max_retry_interval_secs
                .map_or(defaults.max_interval, Duration::from_secs),
            max_attempts: self.config.max_attempts.or(defaults.max_attempts),
        }
    }

    /// Read the source URL files and the static allow-list.
    pub fn sources(&self) -> Result<Sources> {
        let block = path_or(self.config.block_sources.as_deref(), "lists.txt");
        let allow = path_or(self.config.allow_sources.as_deref(), "whitelists.txt");
        let static_allow = path_or(self.config.static_allow.as_deref(), "whitelists_static.txt");

        let sources = Sources {
            block_urls: config::read_source_urls(&block)?,
            allow_urls: config::read_source_urls(&allow)?,
            static_allow: config::read_lines(&static_allow)?,
        };
        debug!(
            block = sources.block_urls.len(),
            allow = sources.allow_urls.len(),
            static_allow = sources.static_allow.len(),
            "Loaded sources"
        );
        Ok(sources)
    }
}

fn path_or(path: Option<&Path>, default: &str) -> PathBuf {
    path.map_or_else(|| PathBuf::from(default), Path::to_path_buf)
}
