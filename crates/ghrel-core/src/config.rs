use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Default GitHub REST API base URL.
pub const DEFAULT_API_BASE_URL: &str = "https://api.github.com";

/// Retry policy parameters (optional `[retry]` section in config.toml).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Maximum number of attempts per transfer (including the first).
    pub max_attempts: u32,
    /// Base delay in seconds for exponential backoff (e.g. 0.25 = 250ms).
    pub base_delay_secs: f64,
    /// Maximum backoff delay in seconds.
    pub max_delay_secs: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay_secs: 0.25,
            max_delay_secs: 10,
        }
    }
}

/// Global configuration loaded from `~/.config/ghrel/config.toml`.
///
/// The API base URL is carried here and passed explicitly to the metadata
/// lookup, so tests point it at a local server without touching globals.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GhrelConfig {
    /// Base URL of the GitHub REST API.
    pub api_base_url: String,
    /// User-Agent sent with every request (GitHub rejects requests without one).
    pub user_agent: String,
    /// Connect timeout per transfer, in seconds.
    pub connect_timeout_secs: u64,
    /// Overall timeout per transfer, in seconds.
    pub transfer_timeout_secs: u64,
    /// Optional retry policy; if missing, built-in defaults are used.
    #[serde(default)]
    pub retry: Option<RetryConfig>,
}

impl Default for GhrelConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            user_agent: concat!("ghrel/", env!("CARGO_PKG_VERSION")).to_string(),
            connect_timeout_secs: 30,
            transfer_timeout_secs: 3600,
            retry: None,
        }
    }
}

impl GhrelConfig {
    /// Same configuration with a different API base URL.
    pub fn with_api_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = url.into();
        self
    }

    /// The effective retry section (configured or default).
    pub fn retry_config(&self) -> RetryConfig {
        self.retry.clone().unwrap_or_default()
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("ghrel")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<GhrelConfig> {
    load_or_init_at(&config_path()?)
}

/// Like `load_or_init` but with an explicit path.
pub fn load_or_init_at(path: &Path) -> Result<GhrelConfig> {
    if !path.exists() {
        let default_cfg = GhrelConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, toml).with_context(|| format!("write {}", path.display()))?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }

    let data = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    let cfg: GhrelConfig =
        toml::from_str(&data).with_context(|| format!("parse {}", path.display()))?;
    Ok(cfg)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_values() {
        let cfg = GhrelConfig::default();
        assert_eq!(cfg.api_base_url, "https://api.github.com");
        assert!(cfg.user_agent.starts_with("ghrel/"));
        assert_eq!(cfg.connect_timeout_secs, 30);
        assert!(cfg.retry.is_none());
        assert_eq!(cfg.retry_config().max_attempts, 3);
    }

    #[test]
    fn config_toml_custom_values() {
        let toml = r#"
            api_base_url = "http://127.0.0.1:8080"
            user_agent = "test-agent"
            connect_timeout_secs = 5
            transfer_timeout_secs = 60

            [retry]
            max_attempts = 5
            base_delay_secs = 0.5
            max_delay_secs = 15
        "#;
        let cfg: GhrelConfig = toml::from_str(toml).unwrap();
        assert_eq!(cfg.api_base_url, "http://127.0.0.1:8080");
        assert_eq!(cfg.user_agent, "test-agent");
        assert_eq!(cfg.transfer_timeout_secs, 60);
        let retry = cfg.retry.as_ref().unwrap();
        assert_eq!(retry.max_attempts, 5);
        assert!((retry.base_delay_secs - 0.5).abs() < 1e-9);
        assert_eq!(retry.max_delay_secs, 15);
    }

    #[test]
    fn load_or_init_writes_default_then_reads_it_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        let first = load_or_init_at(&path).unwrap();
        assert!(path.exists());
        let second = load_or_init_at(&path).unwrap();
        assert_eq!(first.api_base_url, second.api_base_url);
        assert_eq!(first.transfer_timeout_secs, second.transfer_timeout_secs);
    }

    #[test]
    fn with_api_base_url_overrides_only_the_url() {
        let cfg = GhrelConfig::default().with_api_base_url("http://localhost:1");
        assert_eq!(cfg.api_base_url, "http://localhost:1");
        assert_eq!(cfg.connect_timeout_secs, 30);
    }
}
