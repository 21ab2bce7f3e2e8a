//! Configuration management.

use anyhow::{Context as _, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::warn;

/// Default list name; lists are prefixed `[<name>]`
pub const DEFAULT_LIST_NAME: &str = "AdBlock-DNS Block List";

/// Settings read from the TOML config file.
///
/// Every field is optional; missing values fall back to the defaults below.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Cloudflare API token
    pub api_token: Option<String>,

    /// Cloudflare account identifier
    pub account_id: Option<String>,

    /// Name used to derive the managed list and policy names
    pub list_name: Option<String>,

    /// File listing block-list source URLs
    pub block_sources: Option<PathBuf>,

    /// File listing allow-list source URLs
    pub allow_sources: Option<PathBuf>,

    /// Local allow-list file, one domain per line
    pub static_allow: Option<PathBuf>,

    /// Domains per remote list
    pub chunk_size: Option<usize>,

    /// Safety ceiling on the desired set
    pub max_domains: Option<usize>,

    /// Base sleep between failed attempts, in seconds
    pub retry_interval_secs: Option<u64>,

    /// Upper bound on the sleep between attempts, in seconds
    pub max_retry_interval_secs: Option<u64>,

    /// Stop after this many failed attempts
    pub max_attempts: Option<u32>,

    /// Canonicalization worker threads
    pub workers: Option<usize>,
}

impl Config {
    /// Get the default config file path.
    pub fn path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("dev", "cf-adblock", "cf-adblock")
            .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }

    /// Load configuration from `path`, or from the default location.
    ///
    /// A missing default file yields an empty config; a missing explicit
    /// file is an error.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let (path, explicit) = match path {
            Some(p) => (p.to_path_buf(), true),
            None => (Self::path()?, false),
        };

        if !path.exists() {
            if explicit {
                anyhow::bail!("Config file not found: {}", path.display());
            }
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let config: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse {}", path.display()))?;

        Ok(config)
    }
}

/// Read a text file into lines, treating a missing file as empty
pub fn read_lines(path: &Path) -> Result<Vec<String>> {
    match std::fs::read_to_string(path) {
        Ok(content) => Ok(content.lines().map(str::to_string).collect()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            warn!(path = %path.display(), "File not found, treating as empty");
            Ok(Vec::new())
        }
        Err(e) => Err(e).with_context(|| format!("Failed to read {}", path.display())),
    }
}

/// Read a source-list file into URLs
pub fn read_source_urls(path: &Path) -> Result<Vec<String>> {
    let lines = read_lines(path)?;
    Ok(adblock::parse_source_urls(&lines.join("\n")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_load_explicit_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "account_id = \"acc\"\nlist_name = \"Home\"\nchunk_size = 500\nblock_sources = \"conf/lists.txt\""
        )
        .unwrap();

        let config = Config::load(Some(file.path())).unwrap();
        assert_eq!(config.account_id.as_deref(), Some("acc"));
        assert_eq!(config.list_name.as_deref(), Some("Home"));
        assert_eq!(config.chunk_size, Some(500));
        assert_eq!(config.block_sources, Some(PathBuf::from("conf/lists.txt")));
        assert!(config.api_token.is_none());
    }

    #[test]
    fn test_missing_explicit_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(Config::load(Some(&dir.path().join("nope.toml"))).is_err());
    }

    #[test]
    fn test_read_source_urls() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("lists.txt");
        std::fs::write(&path, "# comment\nhttps://a.example/hosts\n\nhttps://b.example/list\n")
            .unwrap();

        assert_eq!(
            read_source_urls(&path).unwrap(),
            vec!["https://a.example/hosts", "https://b.example/list"]
        );
        assert!(read_lines(&dir.path().join("missing.txt")).unwrap().is_empty());
    }
}
