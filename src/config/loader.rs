use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use regex::Regex;
use tracing::{debug, error};

use crate::config::settings::{LogFormat, LoggingConfig, SdkConfig};

/// Load SDK config from a YAML file, or fall back to defaults when no path is given.
pub fn load_config(path: Option<&Path>) -> Result<SdkConfig> {
    let Some(path) = path else {
        debug!("no config file given, using defaults");
        return Ok(with_defaults(SdkConfig::default()));
    };

    let content = fs::read_to_string(path)
        .with_context(|| format!("failed to read config file '{}'", path.display()))?;
    parse_config(&expand_env_vars(&content)?)
}

pub fn parse_config(content: &str) -> Result<SdkConfig> {
    let config: SdkConfig = serde_yaml::from_str(content)
        .inspect_err(|e| error!("parse config error: {}", e))
        .context("invalid config format")?;

    let config = with_defaults(config);
    validate(&config)?;
    Ok(config)
}

fn with_defaults(mut config: SdkConfig) -> SdkConfig {
    if config.logging.is_none() {
        config.logging = Some(LoggingConfig::new("info".to_owned(), LogFormat::from_env()));
    }
    config.tokens.storage_path = expand_home(&config.tokens.storage_path);
    config
}

fn validate(config: &SdkConfig) -> Result<()> {
    let tokens = &config.tokens;
    if tokens.rotation_window_seconds <= tokens.expiration_margin_seconds {
        bail!(
            "tokens.rotation_window_seconds ({}) must be greater than tokens.expiration_margin_seconds ({})",
            tokens.rotation_window_seconds,
            tokens.expiration_margin_seconds
        );
    }
    if tokens.env_var.trim().is_empty() {
        bail!("tokens.env_var must not be empty");
    }
    if config.client.base_url.trim().is_empty() {
        bail!("client.base_url must not be empty");
    }
    Ok(())
}

/// Replace `${VAR}` and `${VAR:default}` with values from the process environment.
pub fn expand_env_vars(input: &str) -> Result<String> {
    let re = Regex::new(r"\$\{(\w+)(?::([^\}]+))?\}")?;
    let expanded = re.replace_all(input, |caps: &regex::Captures| {
        let var = &caps[1];
        let default = caps.get(2).map(|m| m.as_str()).unwrap_or("");
        std::env::var(var).unwrap_or_else(|_| default.to_string())
    });
    Ok(expanded.into_owned())
}

/// Expand a leading `~` to the user's home directory.
///
/// The home directory comes from `HOME`, or from the account database when it is unset or empty.
pub fn expand_home(path: &Path) -> PathBuf {
    let Ok(rest) = path.strip_prefix("~") else {
        return path.to_path_buf();
    };
    match dirs::home_dir() {
        Some(home) => home.join(rest),
        None => path.to_path_buf(),
    }
}
