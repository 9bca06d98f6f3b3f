use anyhow::{anyhow, Result};
use clap::ValueEnum;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::fmt::time::UtcTime;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

use crate::config::settings::{LogFormat, LoggingConfig};
use crate::config::SdkConfig;

/// Level accepted on the command line (`--log-level debug`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Trace => LevelFilter::TRACE,
            LogLevel::Debug => LevelFilter::DEBUG,
            LogLevel::Info => LevelFilter::INFO,
            LogLevel::Warn => LevelFilter::WARN,
            LogLevel::Error => LevelFilter::ERROR,
        }
    }
}

/// Effective logging settings: the CLI level wins over the file, the file over defaults.
pub fn resolve(sdk_config: &SdkConfig, cli_level: Option<LogLevel>) -> LoggingConfig {
    let mut config = sdk_config.logging.clone().unwrap_or_default();
    if let Some(level) = cli_level {
        config.level = LevelFilter::from(level).to_string().to_lowercase();
    }
    config
}

/// Install the global subscriber. Logs go to stderr so stdout stays free for command output.
///
/// `RUST_LOG`, when set, takes precedence over the configured level.
pub fn init_logging(cfg: &LoggingConfig) -> Result<()> {
    let filter = match std::env::var(EnvFilter::DEFAULT_ENV) {
        Ok(directives) if !directives.is_empty() => EnvFilter::try_new(directives)?,
        _ => EnvFilter::try_new(&cfg.level).unwrap_or_else(|_| EnvFilter::new("info")),
    };

    let layer = match cfg.format {
        LogFormat::Json => fmt::layer()
            .json()
            .flatten_event(true)
            .with_timer(UtcTime::rfc_3339())
            .with_ansi(false)
            .with_writer(std::io::stderr)
            .boxed(),
        LogFormat::Compact => fmt::layer()
            .compact()
            .with_timer(UtcTime::rfc_3339())
            .with_target(false)
            .with_writer(std::io::stderr)
            .boxed(),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(layer)
        .try_init()
        .map_err(|e| anyhow!("failed to install log subscriber: {e}"))
}
