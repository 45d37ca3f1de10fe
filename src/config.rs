//! Client configuration for `config.toml`
//!
//! Lives in the state directory next to the persisted session. A missing or
//! partial file is equivalent to the defaults:
//!
//! ```toml
//! api_url = "http://localhost:3001"
//! page_size = 10
//! timeout_secs = 30
//! ```
//!
//! `CAMPUS_ADMIN_API_URL` overrides `api_url`; CLI flags override both.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{AdminError, Result};

pub const CONFIG_FILENAME: &str = "config.toml";
pub const API_URL_ENV: &str = "CAMPUS_ADMIN_API_URL";

const DEFAULT_API_URL: &str = "http://localhost:3001";
const STATE_DIR_NAME: &str = ".campus-admin";

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AdminConfig {
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// Where `config.toml` and the session file live.
    #[serde(skip)]
    pub state_dir: PathBuf,

    /// Rows per page for list commands.
    #[serde(default = "default_page_size")]
    pub page_size: u32,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_api_url() -> String {
    DEFAULT_API_URL.to_string()
}

fn default_page_size() -> u32 {
    10
}

fn default_timeout_secs() -> u64 {
    30
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            state_dir: default_state_dir(),
            page_size: default_page_size(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// `~/.campus-admin`, or `./.campus-admin` when no home directory is known.
pub fn default_state_dir() -> PathBuf {
    dirs::home_dir()
        .map(|home| home.join(STATE_DIR_NAME))
        .unwrap_or_else(|| PathBuf::from(STATE_DIR_NAME))
}

impl AdminConfig {
    /// Loads `config.toml` from `state_dir`, then applies the environment override.
    pub fn load(state_dir: &Path) -> Result<Self> {
        let mut config = Self::from_file(state_dir)?;
        if let Ok(url) = std::env::var(API_URL_ENV) {
            if !url.trim().is_empty() {
                config.api_url = url;
            }
        }
        Ok(config)
    }

    /// Reads only the file layer; a missing file yields defaults.
    pub fn from_file(state_dir: &Path) -> Result<Self> {
        let path = state_dir.join(CONFIG_FILENAME);
        let mut config = match fs::read_to_string(&path) {
            Ok(content) => Self::from_toml(&content)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Self::default(),
            Err(e) => return Err(e.into()),
        };
        config.state_dir = state_dir.to_path_buf();
        Ok(config)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let mut config: Self = toml::from_str(content)
            .map_err(|e| AdminError::Config(format!("invalid {}: {}", CONFIG_FILENAME, e)))?;
        config.state_dir = default_state_dir();
        config.validate()?;
        Ok(config)
    }

    pub fn with_api_url(mut self, api_url: impl Into<String>) -> Self {
        self.api_url = api_url.into();
        self
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Base URL without a trailing slash so paths can be appended directly.
    pub fn base_url(&self) -> &str {
        self.api_url.trim_end_matches('/')
    }

    fn validate(&self) -> Result<()> {
        if self.page_size == 0 {
            return Err(AdminError::Config("page_size must be at least 1".to_string()));
        }
        if !(self.api_url.starts_with("http://") || self.api_url.starts_with("https://")) {
            return Err(AdminError::Config(format!(
                "api_url must be an http(s) URL, got '{}'",
                self.api_url
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_yields_defaults() {
        let dir = TempDir::new().unwrap();
        let config = AdminConfig::from_file(dir.path()).unwrap();
        assert_eq!(config.api_url, "http://localhost:3001");
        assert_eq!(config.page_size, 10);
        assert_eq!(config.timeout_secs, 30);
        assert_eq!(config.state_dir, dir.path());
    }

    #[test]
    fn test_partial_file_keeps_other_defaults() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join(CONFIG_FILENAME),
            "api_url = \"https://admin.example.org/api/\"\n",
        )
        .unwrap();

        let config = AdminConfig::from_file(dir.path()).unwrap();
        assert_eq!(config.base_url(), "https://admin.example.org/api");
        assert_eq!(config.page_size, 10);
    }

    #[test]
    fn test_rejects_zero_page_size() {
        let err = AdminConfig::from_toml("page_size = 0").unwrap_err();
        assert!(matches!(err, AdminError::Config(_)));
    }

    #[test]
    fn test_rejects_non_http_url() {
        assert!(AdminConfig::from_toml("api_url = \"localhost:3001\"").is_err());
    }
}
