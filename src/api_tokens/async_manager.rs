use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::api_tokens::api::{AsyncApiTokensClient, AsyncTokenStatusApi};
use crate::api_tokens::lifecycle::{
    env_token, judge_heartbeat, EnvConfigure, HeartbeatDecision, LifecyclePolicy, TokenSnapshot,
    TokenState,
};
use crate::api_tokens::models::ApiToken;
use crate::api_tokens::storage::AsyncTokenStorage;
use crate::api_tokens::AsyncTokenProvider;
use crate::config::SdkConfig;
use crate::errors::{ApiError, TokenError};
use crate::helpers::time::{Clock, SystemClock};

/// Async counterpart of [`ApiTokenManager`](crate::api_tokens::ApiTokenManager).
///
/// Tasks waiting for a rotation yield on a `tokio` mutex; the fresh path never touches it.
#[derive(Debug)]
pub struct AsyncApiTokenManager<S, A = AsyncApiTokensClient> {
    storage: S,
    api: A,
    lock: Mutex<()>,
    policy: LifecyclePolicy,
    clock: Arc<dyn Clock>,
}

impl<S: AsyncTokenStorage> AsyncApiTokenManager<S, AsyncApiTokensClient> {
    pub fn from_config(storage: S, config: &SdkConfig) -> Result<Self, ApiError> {
        let api = AsyncApiTokensClient::new(&config.client)?;
        Ok(Self::new(storage, api).with_policy(LifecyclePolicy::from(&config.tokens)))
    }
}

impl<S: AsyncTokenStorage, A: AsyncTokenStatusApi> AsyncApiTokenManager<S, A> {
    pub fn new(storage: S, api: A) -> Self {
        Self {
            storage,
            api,
            lock: Mutex::new(()),
            policy: LifecyclePolicy::default(),
            clock: Arc::new(SystemClock),
        }
    }

    pub fn with_policy(mut self, policy: LifecyclePolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn policy(&self) -> &LifecyclePolicy {
        &self.policy
    }

    pub async fn configure(&self, token: &str) -> Result<(), TokenError> {
        let status = self.api.heartbeat(token).await?;
        if status.is_expired {
            return Err(TokenError::Expired);
        }

        let api_token = ApiToken::new(token, status.expires_at);
        self.storage.save(&api_token).await?;
        info!(expires_at = %api_token.expires_at, "API token configured");
        Ok(())
    }

    pub async fn configure_from_env(
        &self,
        env_var: &str,
        overwrite: bool,
    ) -> Result<EnvConfigure, TokenError> {
        let Some(token) = env_token(env_var) else {
            debug!(env_var, "environment variable is not set, skipping token configuration");
            return Ok(EnvConfigure::NotSet);
        };
        if !overwrite && self.is_configured().await {
            return Ok(EnvConfigure::AlreadyConfigured);
        }

        self.configure(&token).await?;
        Ok(EnvConfigure::Configured)
    }

    pub async fn is_configured(&self) -> bool {
        self.storage.load().await.is_ok()
    }

    pub async fn get_token(&self) -> Result<String, TokenError> {
        let api_token = self.storage.load().await?;
        if self.policy.usable_state(&api_token, self.clock.now())? == TokenState::Fresh {
            return Ok(api_token.token);
        }

        let _guard = self.lock.lock().await;

        let api_token = self.storage.load().await?;
        let state = self.policy.usable_state(&api_token, self.clock.now())?;
        if state == TokenState::Fresh {
            debug!("API token was rotated while waiting for the lock");
            return Ok(api_token.token);
        }
        self.refresh(api_token, state).await
    }

    pub async fn keep_alive(&self) -> Result<(), TokenError> {
        let _guard = self.lock.lock().await;

        let api_token = self.storage.load().await?;
        let state = self.policy.usable_state(&api_token, self.clock.now())?;
        self.refresh(api_token, state).await.map(|_| ())
    }

    pub async fn snapshot(&self) -> Result<TokenSnapshot, TokenError> {
        let api_token = self.storage.load().await?;
        Ok(self.policy.snapshot(&api_token, self.clock.now()))
    }

    pub async fn delete_token(&self) -> Result<(), TokenError> {
        self.storage.delete().await?;
        info!("API token deleted");
        Ok(())
    }

    async fn refresh(&self, api_token: ApiToken, state: TokenState) -> Result<String, TokenError> {
        let status = self.api.heartbeat(&api_token.token).await?;
        match judge_heartbeat(&status, state)? {
            HeartbeatDecision::KeepCurrent => Ok(api_token.token),
            HeartbeatDecision::Rotate => {
                let rotated = ApiToken::from(self.api.rotate(&api_token.token).await?);
                self.storage.save(&rotated).await?;
                info!(expires_at = %rotated.expires_at, "API token rotated");
                Ok(rotated.token)
            }
        }
    }
}

#[async_trait]
impl<S: AsyncTokenStorage, A: AsyncTokenStatusApi> AsyncTokenProvider for AsyncApiTokenManager<S, A> {
    async fn get_token(&self) -> Result<String, TokenError> {
        AsyncApiTokenManager::get_token(self).await
    }
}
