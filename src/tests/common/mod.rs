// src/tests/common/mod.rs
pub use serde_json::json;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, TimeDelta, Utc};
use http::StatusCode;

use crate::api_tokens::api::{AsyncTokenStatusApi, TokenStatusApi};
use crate::api_tokens::models::{ApiToken, ApiTokenStatus, RotatedApiToken};
use crate::errors::ApiError;
use crate::helpers::time::Clock;

/// Clock frozen at a given instant, movable by hand.
#[derive(Debug)]
pub struct FixedClock(Mutex<DateTime<Utc>>);

impl FixedClock {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self(Mutex::new(now))
    }

    pub fn advance(&self, by: TimeDelta) {
        *self.0.lock().unwrap() += by;
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        *self.0.lock().unwrap()
    }
}

/// Token issuer double counting heartbeats and rotations.
#[derive(Debug)]
pub struct FakeIssuer {
    status: ApiTokenStatus,
    rotated: RotatedApiToken,
    delay: Duration,
    failure: Option<StatusCode>,
    heartbeats: AtomicUsize,
    rotations: AtomicUsize,
}

impl FakeIssuer {
    pub fn new(expires_at: DateTime<Utc>, is_expired: bool, can_rotate: bool) -> Self {
        Self {
            status: ApiTokenStatus {
                expires_at,
                is_expired,
                can_rotate,
            },
            rotated: RotatedApiToken {
                token: "xyz".to_owned(),
                expires_at: expires_at + TimeDelta::days(14),
            },
            delay: Duration::ZERO,
            failure: None,
            heartbeats: AtomicUsize::new(0),
            rotations: AtomicUsize::new(0),
        }
    }

    pub fn rotating_to(mut self, token: &str, expires_at: DateTime<Utc>) -> Self {
        self.rotated = RotatedApiToken {
            token: token.to_owned(),
            expires_at,
        };
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn failing_with(mut self, status: StatusCode) -> Self {
        self.failure = Some(status);
        self
    }

    pub fn heartbeats(&self) -> usize {
        self.heartbeats.load(Ordering::SeqCst)
    }

    pub fn rotations(&self) -> usize {
        self.rotations.load(Ordering::SeqCst)
    }

    fn answer_heartbeat(&self) -> Result<ApiTokenStatus, ApiError> {
        self.heartbeats.fetch_add(1, Ordering::SeqCst);
        match self.failure {
            Some(status) => Err(ApiError::Request {
                status,
                message: "issuer unavailable".to_owned(),
                details: None,
            }),
            None => Ok(self.status.clone()),
        }
    }

    fn answer_rotate(&self) -> Result<RotatedApiToken, ApiError> {
        self.rotations.fetch_add(1, Ordering::SeqCst);
        Ok(self.rotated.clone())
    }
}

impl TokenStatusApi for FakeIssuer {
    fn heartbeat(&self, _token: &str) -> Result<ApiTokenStatus, ApiError> {
        std::thread::sleep(self.delay);
        self.answer_heartbeat()
    }

    fn rotate(&self, _token: &str) -> Result<RotatedApiToken, ApiError> {
        std::thread::sleep(self.delay);
        self.answer_rotate()
    }
}

#[async_trait]
impl AsyncTokenStatusApi for FakeIssuer {
    async fn heartbeat(&self, _token: &str) -> Result<ApiTokenStatus, ApiError> {
        tokio::time::sleep(self.delay).await;
        self.answer_heartbeat()
    }

    async fn rotate(&self, _token: &str) -> Result<RotatedApiToken, ApiError> {
        tokio::time::sleep(self.delay).await;
        self.answer_rotate()
    }
}

pub fn token_expiring_in(now: DateTime<Utc>, ttl: TimeDelta) -> ApiToken {
    ApiToken::new("abc", now + ttl)
}

/// Number of captured log lines containing `needle`.
pub fn count_lines(lines: &[&str], needle: &str) -> usize {
    lines.iter().filter(|line| line.contains(needle)).count()
}
