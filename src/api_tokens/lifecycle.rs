//! Decision logic of the token lifecycle, shared by the blocking and async managers.
//!
//! A token's state is never stored; it is derived from `(now, expires_at)`:
//!
//! ```text
//!   Fresh        now <  expires_at - rotation_window
//!   RotationDue  expires_at - rotation_window <= now < expires_at - expiration_margin
//!   Expired      now >= expires_at - expiration_margin
//! ```

use chrono::{DateTime, Duration, Utc};
use tracing::{debug, warn};

use crate::api_tokens::models::{ApiToken, ApiTokenStatus};
use crate::config::TokenSettings;
use crate::errors::TokenError;
use crate::utils::constants::{
    DEFAULT_EXPIRATION_MARGIN_SECS, DEFAULT_ROTATION_WINDOW_SECS, ROTATION_REFUSED_MSG,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenState {
    Fresh,
    RotationDue,
    Expired,
}

impl TokenState {
    pub fn as_str(&self) -> &'static str {
        match self {
            TokenState::Fresh => "fresh",
            TokenState::RotationDue => "rotation-due",
            TokenState::Expired => "expired",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LifecyclePolicy {
    pub expiration_margin: Duration,
    pub rotation_window: Duration,
}

impl Default for LifecyclePolicy {
    fn default() -> Self {
        Self {
            expiration_margin: Duration::seconds(DEFAULT_EXPIRATION_MARGIN_SECS as i64),
            rotation_window: Duration::seconds(DEFAULT_ROTATION_WINDOW_SECS as i64),
        }
    }
}

impl From<&TokenSettings> for LifecyclePolicy {
    fn from(settings: &TokenSettings) -> Self {
        Self {
            expiration_margin: Duration::seconds(settings.expiration_margin_seconds as i64),
            rotation_window: Duration::seconds(settings.rotation_window_seconds as i64),
        }
    }
}

impl LifecyclePolicy {
    pub fn state_of(&self, api_token: &ApiToken, now: DateTime<Utc>) -> TokenState {
        if now >= api_token.expires_at - self.expiration_margin {
            TokenState::Expired
        } else if now >= api_token.expires_at - self.rotation_window {
            TokenState::RotationDue
        } else {
            TokenState::Fresh
        }
    }

    pub fn snapshot(&self, api_token: &ApiToken, now: DateTime<Utc>) -> TokenSnapshot {
        TokenSnapshot {
            expires_at: api_token.expires_at,
            state: self.state_of(api_token, now),
        }
    }

    /// State of a token that may still be handed out; `Expired` becomes an error.
    pub(crate) fn usable_state(
        &self,
        api_token: &ApiToken,
        now: DateTime<Utc>,
    ) -> Result<TokenState, TokenError> {
        match self.state_of(api_token, now) {
            TokenState::Expired => {
                debug!(expires_at = %api_token.expires_at, "stored API token is expired");
                Err(TokenError::Expired)
            }
            state => Ok(state),
        }
    }
}

/// Outcome of bootstrapping the token from an environment variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnvConfigure {
    Configured,
    AlreadyConfigured,
    /// The variable is unset or empty; nothing was done.
    NotSet,
}

/// What the manager knows about the stored token, without the secret itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenSnapshot {
    pub expires_at: DateTime<Utc>,
    pub state: TokenState,
}

pub(crate) fn env_token(env_var: &str) -> Option<String> {
    std::env::var(env_var).ok().filter(|token| !token.is_empty())
}

/// What to do after the issuer answered a heartbeat.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum HeartbeatDecision {
    Rotate,
    KeepCurrent,
}

/// A refused rotation is not an error: the current token stays in use, with a
/// warning when it is already inside the rotation window.
pub(crate) fn judge_heartbeat(
    status: &ApiTokenStatus,
    state: TokenState,
) -> Result<HeartbeatDecision, TokenError> {
    if status.is_expired {
        return Err(TokenError::Expired);
    }
    if !status.can_rotate {
        if state == TokenState::RotationDue {
            warn!(expires_at = %status.expires_at, "{}", ROTATION_REFUSED_MSG);
        } else {
            debug!(expires_at = %status.expires_at, "issuer refused rotation of a fresh token");
        }
        return Ok(HeartbeatDecision::KeepCurrent);
    }
    Ok(HeartbeatDecision::Rotate)
}
