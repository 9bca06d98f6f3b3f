use std::sync::{PoisonError, RwLock};

use async_trait::async_trait;

use super::{AsyncTokenStorage, TokenStorage};
use crate::api_tokens::models::ApiToken;
use crate::errors::StorageError;

/// Process-local token storage; the record is lost with the process.
#[derive(Debug, Default)]
pub struct InMemoryTokenStorage {
    inner: RwLock<Option<ApiToken>>,
}

impl InMemoryTokenStorage {
    pub fn new(api_token: Option<ApiToken>) -> Self {
        Self {
            inner: RwLock::new(api_token),
        }
    }
}

impl TokenStorage for InMemoryTokenStorage {
    fn load(&self) -> Result<ApiToken, StorageError> {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
            .ok_or(StorageError::NotFound)
    }

    fn save(&self, api_token: &ApiToken) -> Result<(), StorageError> {
        *self.inner.write().unwrap_or_else(PoisonError::into_inner) = Some(api_token.clone());
        Ok(())
    }

    fn delete(&self) -> Result<(), StorageError> {
        *self.inner.write().unwrap_or_else(PoisonError::into_inner) = None;
        Ok(())
    }
}

/// Async flavor of [`InMemoryTokenStorage`].
#[derive(Debug, Default)]
pub struct AsyncInMemoryTokenStorage {
    inner: tokio::sync::RwLock<Option<ApiToken>>,
}

impl AsyncInMemoryTokenStorage {
    pub fn new(api_token: Option<ApiToken>) -> Self {
        Self {
            inner: tokio::sync::RwLock::new(api_token),
        }
    }
}

#[async_trait]
impl AsyncTokenStorage for AsyncInMemoryTokenStorage {
    async fn load(&self) -> Result<ApiToken, StorageError> {
        self.inner.read().await.clone().ok_or(StorageError::NotFound)
    }

    async fn save(&self, api_token: &ApiToken) -> Result<(), StorageError> {
        *self.inner.write().await = Some(api_token.clone());
        Ok(())
    }

    async fn delete(&self) -> Result<(), StorageError> {
        *self.inner.write().await = None;
        Ok(())
    }
}
