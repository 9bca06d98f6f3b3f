use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;

use crate::utils::constants::{
    API_BASE_URL, API_VERSION, DEFAULT_EXPIRATION_MARGIN_SECS, DEFAULT_ROTATION_WINDOW_SECS,
    DEFAULT_TIMEOUT_SECS, DEFAULT_TOKEN_CONFIGURE_ENV_VAR, DEFAULT_TOKEN_FILE_PATH,
};

/// ================================
/// Full SDK configuration
/// ================================
#[derive(Debug, Deserialize, Clone, Default)]
pub struct SdkConfig {
    #[serde(default)]
    pub client: ClientConfig,
    #[serde(default)]
    pub tokens: TokenSettings,
    pub logging: Option<LoggingConfig>,
}

/// ================================
/// HTTP client settings
/// ================================
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Versioned API root, e.g. `https://api.panel.rtbhouse.com/v5`
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            timeout_seconds: DEFAULT_TIMEOUT_SECS,
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }

    /// Base url without a trailing slash so paths can be appended directly
    pub fn normalized_base_url(&self) -> String {
        self.base_url.trim_end_matches('/').to_owned()
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new(default_base_url())
    }
}

/// ================================
/// API token lifecycle settings
/// ================================
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct TokenSettings {
    #[serde(default = "default_storage_path")]
    pub storage_path: PathBuf,
    #[serde(default = "default_env_var")]
    pub env_var: String,
    /// token is treated as expired this long before its literal expiry
    #[serde(default = "default_expiration_margin_seconds")]
    pub expiration_margin_seconds: u64,
    /// rotation is attempted once the token enters this window before expiry
    /// invariant: > expiration_margin_seconds
    #[serde(default = "default_rotation_window_seconds")]
    pub rotation_window_seconds: u64,
}

impl Default for TokenSettings {
    fn default() -> Self {
        Self {
            storage_path: default_storage_path(),
            env_var: default_env_var(),
            expiration_margin_seconds: default_expiration_margin_seconds(),
            rotation_window_seconds: default_rotation_window_seconds(),
        }
    }
}

/// ================================
/// Logging
/// ================================
#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    pub level: String, // allowed: trace, debug, info, warn, error
    pub format: LogFormat,
}

impl LoggingConfig {
    pub fn new(level: String, format: LogFormat) -> Self {
        Self { level, format }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self::new("info".to_owned(), LogFormat::Compact)
    }
}

#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Json,
    Compact,
}

impl LogFormat {
    pub fn from_env() -> Self {
        match std::env::var("LOG_FORMAT")
            .unwrap_or_else(|_| "compact".to_string())
            .to_lowercase()
            .as_str()
        {
            "json" => LogFormat::Json,
            _ => LogFormat::Compact,
        }
    }
}

fn default_base_url() -> String {
    format!("{}/{}", API_BASE_URL, API_VERSION)
}

fn default_timeout_seconds() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

fn default_storage_path() -> PathBuf {
    PathBuf::from(DEFAULT_TOKEN_FILE_PATH)
}

fn default_env_var() -> String {
    DEFAULT_TOKEN_CONFIGURE_ENV_VAR.to_owned()
}

fn default_expiration_margin_seconds() -> u64 {
    DEFAULT_EXPIRATION_MARGIN_SECS
}

fn default_rotation_window_seconds() -> u64 {
    DEFAULT_ROTATION_WINDOW_SECS
}
