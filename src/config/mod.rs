//! SDK configuration: client endpoint, token lifecycle tuning and logging.

pub mod loader;
pub mod settings;

pub use loader::load_config;
pub use settings::{ClientConfig, LogFormat, LoggingConfig, SdkConfig, TokenSettings};
