use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The persisted credential: an opaque token and its absolute expiry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiToken {
    pub token: String,
    #[serde(alias = "expires_at")]
    pub expires_at: DateTime<Utc>,
}

impl ApiToken {
    pub fn new(token: impl Into<String>, expires_at: DateTime<Utc>) -> Self {
        Self {
            token: token.into(),
            expires_at,
        }
    }
}

/// Heartbeat answer of the token issuer.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiTokenStatus {
    pub expires_at: DateTime<Utc>,
    pub is_expired: bool,
    pub can_rotate: bool,
}

/// Rotation answer of the token issuer.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RotatedApiToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

impl From<RotatedApiToken> for ApiToken {
    fn from(rotated: RotatedApiToken) -> Self {
        ApiToken::new(rotated.token, rotated.expires_at)
    }
}
