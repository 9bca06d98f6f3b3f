use std::sync::{Arc, Mutex, PoisonError};

use tracing::{debug, info};

use crate::api_tokens::api::{ApiTokensClient, TokenStatusApi};
use crate::api_tokens::lifecycle::{
    env_token, judge_heartbeat, EnvConfigure, HeartbeatDecision, LifecyclePolicy, TokenSnapshot,
    TokenState,
};
use crate::api_tokens::models::ApiToken;
use crate::api_tokens::storage::TokenStorage;
use crate::api_tokens::TokenProvider;
use crate::config::SdkConfig;
use crate::errors::{ApiError, TokenError};
use crate::helpers::time::{Clock, SystemClock};

/// Keeps a long-lived API token usable for thread-parallel callers.
///
/// `get_token` reads storage without locking while the token is fresh. Inside the
/// rotation window callers serialize on a single mutex and re-read storage, so
/// only the first one talks to the issuer and rotates.
///
/// ```no_run
/// use rtbhouse_sdk::api_tokens::{ApiTokenManager, storage::JsonFileTokenStorage};
/// use rtbhouse_sdk::config::SdkConfig;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let manager = ApiTokenManager::from_config(JsonFileTokenStorage::default(), &SdkConfig::default())?;
/// manager.configure("initial-token")?;
/// let token = manager.get_token()?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct ApiTokenManager<S, A = ApiTokensClient> {
    storage: S,
    api: A,
    lock: Mutex<()>,
    policy: LifecyclePolicy,
    clock: Arc<dyn Clock>,
}

impl<S: TokenStorage> ApiTokenManager<S, ApiTokensClient> {
    /// Manager talking to the issuer configured in `config.client`, with the
    /// lifecycle windows from `config.tokens`.
    pub fn from_config(storage: S, config: &SdkConfig) -> Result<Self, ApiError> {
        let api = ApiTokensClient::new(&config.client)?;
        Ok(Self::new(storage, api).with_policy(LifecyclePolicy::from(&config.tokens)))
    }
}

impl<S: TokenStorage, A: TokenStatusApi> ApiTokenManager<S, A> {
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

    /// Validate `token` with the issuer and store it with the issuer's expiry.
    pub fn configure(&self, token: &str) -> Result<(), TokenError> {
        let status = self.api.heartbeat(token)?;
        if status.is_expired {
            return Err(TokenError::Expired);
        }

        let api_token = ApiToken::new(token, status.expires_at);
        self.storage.save(&api_token)?;
        info!(expires_at = %api_token.expires_at, "API token configured");
        Ok(())
    }

    pub fn configure_from_env(
        &self,
        env_var: &str,
        overwrite: bool,
    ) -> Result<EnvConfigure, TokenError> {
        let Some(token) = env_token(env_var) else {
            debug!(env_var, "environment variable is not set, skipping token configuration");
            return Ok(EnvConfigure::NotSet);
        };
        if !overwrite && self.is_configured() {
            return Ok(EnvConfigure::AlreadyConfigured);
        }

        self.configure(&token)?;
        Ok(EnvConfigure::Configured)
    }

    pub fn is_configured(&self) -> bool {
        self.storage.load().is_ok()
    }

    pub fn get_token(&self) -> Result<String, TokenError> {
        let api_token = self.storage.load()?;
        if self.policy.usable_state(&api_token, self.clock.now())? == TokenState::Fresh {
            return Ok(api_token.token);
        }

        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);

        let api_token = self.storage.load()?;
        let state = self.policy.usable_state(&api_token, self.clock.now())?;
        if state == TokenState::Fresh {
            debug!("API token was rotated while waiting for the lock");
            return Ok(api_token.token);
        }
        self.refresh(api_token, state)
    }

    /// Heartbeat and rotate when the issuer allows it, whatever the current state.
    pub fn keep_alive(&self) -> Result<(), TokenError> {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);

        let api_token = self.storage.load()?;
        let state = self.policy.usable_state(&api_token, self.clock.now())?;
        self.refresh(api_token, state).map(|_| ())
    }

    pub fn snapshot(&self) -> Result<TokenSnapshot, TokenError> {
        let api_token = self.storage.load()?;
        Ok(self.policy.snapshot(&api_token, self.clock.now()))
    }

    pub fn delete_token(&self) -> Result<(), TokenError> {
        self.storage.delete()?;
        info!("API token deleted");
        Ok(())
    }

    // caller holds the lock
    fn refresh(&self, api_token: ApiToken, state: TokenState) -> Result<String, TokenError> {
        let status = self.api.heartbeat(&api_token.token)?;
        match judge_heartbeat(&status, state)? {
            HeartbeatDecision::KeepCurrent => Ok(api_token.token),
            HeartbeatDecision::Rotate => {
                let rotated = ApiToken::from(self.api.rotate(&api_token.token)?);
                self.storage.save(&rotated)?;
                info!(expires_at = %rotated.expires_at, "API token rotated");
                Ok(rotated.token)
            }
        }
    }
}

impl<S: TokenStorage, A: TokenStatusApi> TokenProvider for ApiTokenManager<S, A> {
    fn get_token(&self) -> Result<String, TokenError> {
        ApiTokenManager::get_token(self)
    }
}
