//! API token lifecycle: storage, issuer client and the managers tying them together.

use async_trait::async_trait;

use crate::errors::TokenError;

pub mod api;
pub mod async_manager;
pub mod lifecycle;
pub mod manager;
pub mod models;
pub mod storage;

pub use api::{ApiTokensClient, AsyncApiTokensClient, AsyncTokenStatusApi, TokenStatusApi};
pub use async_manager::AsyncApiTokenManager;
pub use lifecycle::{EnvConfigure, LifecyclePolicy, TokenSnapshot, TokenState};
pub use manager::ApiTokenManager;
pub use models::{ApiToken, ApiTokenStatus, RotatedApiToken};

/// Source of a currently valid bearer token for the reporting clients.
pub trait TokenProvider: Send + Sync {
    fn get_token(&self) -> Result<String, TokenError>;
}

#[async_trait]
pub trait AsyncTokenProvider: Send + Sync {
    async fn get_token(&self) -> Result<String, TokenError>;
}
