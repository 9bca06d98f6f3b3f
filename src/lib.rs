//! # RTB House SDK
//!
//! Client library for the RTB House reporting API, with managed API tokens
//! that rotate themselves before they expire.
//!
//! Modules:
//! - `api_tokens`: token storage, issuer client and lifecycle managers
//! - `client`: blocking and async reporting clients
//! - `schema`: report models and query enums
//! - `config`: SDK configuration loaded from YAML
//! - `errors`: error types shared across the crate

pub mod api_tokens;
pub mod client;
pub mod config;
pub mod errors;
pub mod helpers;
pub mod schema;
pub mod tests;
pub mod utils;

pub use crate::api_tokens::{
    ApiToken, ApiTokenManager, AsyncApiTokenManager, AsyncTokenProvider, EnvConfigure,
    TokenProvider,
};
pub use crate::client::{AsyncClient, Auth, Client, StatsQuery};
pub use crate::errors::{ApiError, StorageError, TokenError};
