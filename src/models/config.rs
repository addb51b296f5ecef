//! Application configuration structures.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

/// Root application configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Translation API location and endpoints
    #[serde(default)]
    pub api: ApiConfig,

    /// HTTP client behavior settings
    #[serde(default)]
    pub http: HttpConfig,

    /// Logging settings
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Load configuration or return default if loading fails.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        Self::load(&path).unwrap_or_else(|e| {
            log::warn!(
                "Config load failed from {:?}: {}. Using defaults.",
                path.as_ref(),
                e
            );
            Self::default()
        })
    }

    /// Validate configuration values for basic sanity.
    pub fn validate(&self) -> Result<()> {
        if url::Url::parse(&self.api.base_url).is_err() {
            return Err(AppError::validation(format!(
                "api.base_url is not a valid URL: {}",
                self.api.base_url
            )));
        }
        for (name, path) in self.api.endpoints() {
            if path.trim().is_empty() {
                return Err(AppError::validation(format!("api.{name} is empty")));
            }
        }
        if self.http.user_agent.trim().is_empty() {
            return Err(AppError::validation("http.user_agent is empty"));
        }
        if self.http.timeout_secs == 0 {
            return Err(AppError::validation("http.timeout_secs must be > 0"));
        }
        if self.http.max_concurrent == 0 {
            return Err(AppError::validation("http.max_concurrent must be > 0"));
        }
        Ok(())
    }
}

/// Translation API base URL and endpoint paths, relative to the base.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "defaults::base_url")]
    pub base_url: String,

    /// `GET <outline>/<rerun_id>`
    #[serde(default = "defaults::outline_path")]
    pub outline_path: String,

    /// `GET <components>/<unit usage key>`
    #[serde(default = "defaults::components_path")]
    pub components_path: String,

    /// `GET <versions>/<version id>/`
    #[serde(default = "defaults::version_path")]
    pub version_path: String,

    /// `PUT <approve>/`
    #[serde(default = "defaults::approve_path")]
    pub approve_path: String,

    /// `PUT <apply>/<usage key>/`
    #[serde(default = "defaults::apply_path")]
    pub apply_path: String,

    /// `GET <pairings>` listing base courses and their reruns
    #[serde(default = "defaults::pairings_path")]
    pub pairings_path: String,
}

impl ApiConfig {
    fn endpoints(&self) -> [(&'static str, &str); 6] {
        [
            ("outline_path", &self.outline_path),
            ("components_path", &self.components_path),
            ("version_path", &self.version_path),
            ("approve_path", &self.approve_path),
            ("apply_path", &self.apply_path),
            ("pairings_path", &self.pairings_path),
        ]
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: defaults::base_url(),
            outline_path: defaults::outline_path(),
            components_path: defaults::components_path(),
            version_path: defaults::version_path(),
            approve_path: defaults::approve_path(),
            apply_path: defaults::apply_path(),
            pairings_path: defaults::pairings_path(),
        }
    }
}

/// HTTP client settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    /// User-Agent header for HTTP requests
    #[serde(default = "defaults::user_agent")]
    pub user_agent: String,

    /// Request timeout in seconds
    #[serde(default = "defaults::timeout")]
    pub timeout_secs: u64,

    /// Maximum concurrent unit fetches when loading a whole sub-tree
    #[serde(default = "defaults::max_concurrent")]
    pub max_concurrent: usize,

    /// Session cookie or token forwarded as `Authorization`
    #[serde(default)]
    pub authorization: Option<String>,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            user_agent: defaults::user_agent(),
            timeout_secs: defaults::timeout(),
            max_concurrent: defaults::max_concurrent(),
            authorization: None,
        }
    }
}

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// One of debug, info, warn, error
    #[serde(default = "defaults::log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: defaults::log_level(),
        }
    }
}

mod defaults {
    // API defaults
    pub fn base_url() -> String {
        "http://localhost:18010/".into()
    }
    pub fn outline_path() -> String {
        "meta_translations/api/v0/outline".into()
    }
    pub fn components_path() -> String {
        "meta_translations/api/v0/components".into()
    }
    pub fn version_path() -> String {
        "meta_translations/api/v0/translated_versions".into()
    }
    pub fn approve_path() -> String {
        "meta_translations/api/v0/approve_translations".into()
    }
    pub fn apply_path() -> String {
        "meta_translations/api/v0/apply_translated_version".into()
    }
    pub fn pairings_path() -> String {
        "meta_translations/api/v0/versions".into()
    }

    // HTTP defaults
    pub fn user_agent() -> String {
        "outline-sync/0.1".into()
    }
    pub fn timeout() -> u64 {
        30
    }
    pub fn max_concurrent() -> usize {
        4
    }

    pub fn log_level() -> String {
        "info".into()
    }
}
