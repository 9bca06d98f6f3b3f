//! Persistence of the single API token record.
//!
//! Every backend exposes the same three operations in a blocking ([`TokenStorage`])
//! and an async ([`AsyncTokenStorage`]) flavor. `load` reports a missing record as
//! [`StorageError::NotFound`], `delete` is idempotent.

use std::sync::Arc;

use async_trait::async_trait;

use crate::api_tokens::models::ApiToken;
use crate::errors::StorageError;

pub mod file;
pub mod memory;

pub use file::{AsyncJsonFileTokenStorage, JsonFileTokenStorage};
pub use memory::{AsyncInMemoryTokenStorage, InMemoryTokenStorage};

pub trait TokenStorage: Send + Sync {
    fn load(&self) -> Result<ApiToken, StorageError>;

    /// Once this returns, the record is visible to every subsequent `load`.
    fn save(&self, api_token: &ApiToken) -> Result<(), StorageError>;

    fn delete(&self) -> Result<(), StorageError>;
}

#[async_trait]
pub trait AsyncTokenStorage: Send + Sync {
    async fn load(&self) -> Result<ApiToken, StorageError>;

    /// Once this resolves, the record is visible to every subsequent `load`.
    async fn save(&self, api_token: &ApiToken) -> Result<(), StorageError>;

    async fn delete(&self) -> Result<(), StorageError>;
}

impl<T: TokenStorage + ?Sized> TokenStorage for Arc<T> {
    fn load(&self) -> Result<ApiToken, StorageError> {
        (**self).load()
    }

    fn save(&self, api_token: &ApiToken) -> Result<(), StorageError> {
        (**self).save(api_token)
    }

    fn delete(&self) -> Result<(), StorageError> {
        (**self).delete()
    }
}

#[async_trait]
impl<T: AsyncTokenStorage + ?Sized> AsyncTokenStorage for Arc<T> {
    async fn load(&self) -> Result<ApiToken, StorageError> {
        (**self).load().await
    }

    async fn save(&self, api_token: &ApiToken) -> Result<(), StorageError> {
        (**self).save(api_token).await
    }

    async fn delete(&self) -> Result<(), StorageError> {
        (**self).delete().await
    }
}
