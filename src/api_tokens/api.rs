//! Token issuer boundary: heartbeat and rotate, in blocking and async flavors.

use std::sync::Arc;

use async_trait::async_trait;
use http::header::AUTHORIZATION;
use tracing::debug;

use crate::api_tokens::models::{ApiTokenStatus, RotatedApiToken};
use crate::client::request::{default_headers, handle_response, join_url};
use crate::config::ClientConfig;
use crate::errors::ApiError;

const HEARTBEAT_PATH: &str = "/tokens/current/heartbeat";
const ROTATE_PATH: &str = "/tokens/current/rotate";

pub trait TokenStatusApi: Send + Sync {
    fn heartbeat(&self, token: &str) -> Result<ApiTokenStatus, ApiError>;

    /// Only call after a heartbeat reported `can_rotate`.
    fn rotate(&self, token: &str) -> Result<RotatedApiToken, ApiError>;
}

#[async_trait]
pub trait AsyncTokenStatusApi: Send + Sync {
    async fn heartbeat(&self, token: &str) -> Result<ApiTokenStatus, ApiError>;

    /// Only call after a heartbeat reported `can_rotate`.
    async fn rotate(&self, token: &str) -> Result<RotatedApiToken, ApiError>;
}

impl<T: TokenStatusApi + ?Sized> TokenStatusApi for Arc<T> {
    fn heartbeat(&self, token: &str) -> Result<ApiTokenStatus, ApiError> {
        (**self).heartbeat(token)
    }

    fn rotate(&self, token: &str) -> Result<RotatedApiToken, ApiError> {
        (**self).rotate(token)
    }
}

#[async_trait]
impl<T: AsyncTokenStatusApi + ?Sized> AsyncTokenStatusApi for Arc<T> {
    async fn heartbeat(&self, token: &str) -> Result<ApiTokenStatus, ApiError> {
        (**self).heartbeat(token).await
    }

    async fn rotate(&self, token: &str) -> Result<RotatedApiToken, ApiError> {
        (**self).rotate(token).await
    }
}

fn bearer(token: &str) -> String {
    format!("Bearer {}", token)
}

/// Blocking token issuer client.
///
/// Must not be created or dropped inside an async runtime; use
/// [`AsyncApiTokensClient`] there.
#[derive(Debug, Clone)]
pub struct ApiTokensClient {
    http: reqwest::blocking::Client,
    base_url: String,
}

impl ApiTokensClient {
    pub fn new(config: &ClientConfig) -> Result<Self, ApiError> {
        let http = reqwest::blocking::Client::builder()
            .default_headers(default_headers())
            .timeout(config.timeout())
            .build()?;
        Ok(Self {
            http,
            base_url: config.normalized_base_url(),
        })
    }

    fn decode<T: serde::de::DeserializeOwned>(response: reqwest::blocking::Response) -> Result<T, ApiError> {
        let status = response.status();
        let headers = response.headers().clone();
        let body = response.bytes()?;
        handle_response(status, &headers, &body)
    }
}

impl TokenStatusApi for ApiTokensClient {
    fn heartbeat(&self, token: &str) -> Result<ApiTokenStatus, ApiError> {
        debug!("sending API token heartbeat");
        let request = self
            .http
            .get(join_url(&self.base_url, HEARTBEAT_PATH))
            .header(AUTHORIZATION, bearer(token));
        Self::decode(request.send()?)
    }

    fn rotate(&self, token: &str) -> Result<RotatedApiToken, ApiError> {
        debug!("requesting API token rotation");
        let request = self
            .http
            .post(join_url(&self.base_url, ROTATE_PATH))
            .header(AUTHORIZATION, bearer(token));
        Self::decode(request.send()?)
    }
}

/// Async token issuer client.
#[derive(Debug, Clone)]
pub struct AsyncApiTokensClient {
    http: reqwest::Client,
    base_url: String,
}

impl AsyncApiTokensClient {
    pub fn new(config: &ClientConfig) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .default_headers(default_headers())
            .timeout(config.timeout())
            .build()?;
        Ok(Self {
            http,
            base_url: config.normalized_base_url(),
        })
    }

    async fn decode<T: serde::de::DeserializeOwned>(response: reqwest::Response) -> Result<T, ApiError> {
        let status = response.status();
        let headers = response.headers().clone();
        let body = response.bytes().await?;
        handle_response(status, &headers, &body)
    }
}

#[async_trait]
impl AsyncTokenStatusApi for AsyncApiTokensClient {
    async fn heartbeat(&self, token: &str) -> Result<ApiTokenStatus, ApiError> {
        debug!("sending API token heartbeat");
        let response = self
            .http
            .get(join_url(&self.base_url, HEARTBEAT_PATH))
            .header(AUTHORIZATION, bearer(token))
            .send()
            .await?;
        Self::decode(response).await
    }

    async fn rotate(&self, token: &str) -> Result<RotatedApiToken, ApiError> {
        debug!("requesting API token rotation");
        let response = self
            .http
            .post(join_url(&self.base_url, ROTATE_PATH))
            .header(AUTHORIZATION, bearer(token))
            .send()
            .await?;
        Self::decode(response).await
    }
}
