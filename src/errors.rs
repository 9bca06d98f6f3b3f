//! Error types shared by the token lifecycle and the reporting clients.

use std::collections::HashMap;
use std::io;

use http::StatusCode;
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

use crate::utils::constants::EXPIRED_MSG;

/// metric -> time window (seconds) -> limit -> used
pub type ResourceUsage = HashMap<String, HashMap<String, HashMap<String, f64>>>;

/// Error payload returned by the API next to a non-2xx status.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorDetails {
    pub app_code: Option<String>,
    pub message: Option<String>,
    pub errors: Option<Value>,
}

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("no API token stored, please configure a token first")]
    NotFound,
    #[error("failed to access API token storage: {0}")]
    Io(#[from] io::Error),
    #[error("invalid API token storage format: {0}")]
    Format(#[from] serde_json::Error),
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Unsupported api version ({used}), use newest version ({}) by updating the SDK.", .newest.as_deref().unwrap_or("unknown"))]
    VersionMismatch { used: String, newest: Option<String> },

    #[error("Resource usage limits reached")]
    RateLimitExceeded {
        details: Option<ErrorDetails>,
        limits: ResourceUsage,
    },

    #[error("{message}")]
    Request {
        status: StatusCode,
        message: String,
        details: Option<ErrorDetails>,
    },

    #[error("Invalid response format: {0}")]
    InvalidResponse(String),

    #[error(transparent)]
    Transport(#[from] reqwest::Error),

    #[error("unable to obtain API token: {0}")]
    Token(#[source] Box<TokenError>),
}

impl ApiError {
    /// True for errors caused by the request itself (rate limits included).
    pub fn is_request_error(&self) -> bool {
        matches!(self, ApiError::Request { .. } | ApiError::RateLimitExceeded { .. })
    }

    pub fn details(&self) -> Option<&ErrorDetails> {
        match self {
            ApiError::Request { details, .. } | ApiError::RateLimitExceeded { details, .. } => {
                details.as_ref()
            }
            _ => None,
        }
    }
}

impl From<TokenError> for ApiError {
    fn from(err: TokenError) -> Self {
        ApiError::Token(Box::new(err))
    }
}

#[derive(Debug, Error)]
pub enum TokenError {
    /// Fatal: the token can only be replaced by a manual `configure` call.
    #[error("{}", EXPIRED_MSG)]
    Expired,
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error(transparent)]
    Api(#[from] ApiError),
}

impl TokenError {
    pub fn is_expired(&self) -> bool {
        matches!(self, TokenError::Expired)
    }

    pub fn is_not_configured(&self) -> bool {
        matches!(self, TokenError::Storage(StorageError::NotFound))
    }
}

/// Parse `METRIC-window=used/limit;...` into [`ResourceUsage`].
///
/// Any malformed segment discards the whole header.
pub fn parse_resource_usage_header(header: Option<&str>) -> ResourceUsage {
    let Some(header) = header.filter(|h| !h.is_empty()) else {
        return ResourceUsage::new();
    };

    let mut result = ResourceUsage::new();
    for segment in header.split(';') {
        match parse_usage_segment(segment) {
            Some((metric, window, limit, used)) => {
                result
                    .entry(metric.to_owned())
                    .or_default()
                    .entry(window.to_owned())
                    .or_default()
                    .insert(limit.to_owned(), used);
            }
            None => return ResourceUsage::new(),
        }
    }
    result
}

fn parse_usage_segment(segment: &str) -> Option<(&str, &str, &str, f64)> {
    let (key, value) = split_exactly_once(segment, '=')?;
    let (metric, window) = split_exactly_once(key, '-')?;
    let (used, limit) = split_exactly_once(value, '/')?;
    let used = used.trim().parse::<f64>().ok()?;
    Some((metric, window, limit, used))
}

fn split_exactly_once(value: &str, sep: char) -> Option<(&str, &str)> {
    let mut parts = value.split(sep);
    match (parts.next(), parts.next(), parts.next()) {
        (Some(left), Some(right), None) => Some((left, right)),
        _ => None,
    }
}
