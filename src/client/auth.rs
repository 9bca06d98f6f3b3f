use std::fmt;
use std::sync::Arc;

use http::header::AUTHORIZATION;

use crate::api_tokens::{AsyncTokenProvider, TokenProvider};
use crate::errors::ApiError;

/// Credentials attached to every reporting request.
///
/// `P` is the token provider flavor: [`TokenProvider`] for the blocking client,
/// [`AsyncTokenProvider`] for the async one.
pub enum Auth<P: ?Sized> {
    /// HTTP basic auth
    Basic { username: String, password: String },
    /// Static token, sent as `Authorization: Token <token>`
    Token(String),
    /// Managed token, fetched for every request and sent as a bearer token
    Provider(Arc<P>),
}

impl<P: ?Sized> Auth<P> {
    pub fn basic(username: impl Into<String>, password: impl Into<String>) -> Self {
        Auth::Basic {
            username: username.into(),
            password: password.into(),
        }
    }

    pub fn token(token: impl Into<String>) -> Self {
        Auth::Token(token.into())
    }
}

impl Auth<dyn TokenProvider> {
    pub fn managed<T: TokenProvider + 'static>(provider: Arc<T>) -> Self {
        Auth::Provider(provider)
    }

    pub(crate) fn apply(
        &self,
        request: reqwest::blocking::RequestBuilder,
    ) -> Result<reqwest::blocking::RequestBuilder, ApiError> {
        Ok(match self {
            Auth::Basic { username, password } => request.basic_auth(username, Some(password)),
            Auth::Token(token) => request.header(AUTHORIZATION, format!("Token {}", token)),
            Auth::Provider(provider) => {
                request.header(AUTHORIZATION, format!("Bearer {}", provider.get_token()?))
            }
        })
    }
}

impl Auth<dyn AsyncTokenProvider> {
    pub fn managed<T: AsyncTokenProvider + 'static>(provider: Arc<T>) -> Self {
        Auth::Provider(provider)
    }

    pub(crate) async fn apply(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<reqwest::RequestBuilder, ApiError> {
        Ok(match self {
            Auth::Basic { username, password } => request.basic_auth(username, Some(password)),
            Auth::Token(token) => request.header(AUTHORIZATION, format!("Token {}", token)),
            Auth::Provider(provider) => {
                request.header(AUTHORIZATION, format!("Bearer {}", provider.get_token().await?))
            }
        })
    }
}

impl<P: ?Sized> Clone for Auth<P> {
    fn clone(&self) -> Self {
        match self {
            Auth::Basic { username, password } => Auth::Basic {
                username: username.clone(),
                password: password.clone(),
            },
            Auth::Token(token) => Auth::Token(token.clone()),
            Auth::Provider(provider) => Auth::Provider(Arc::clone(provider)),
        }
    }
}

// secrets stay out of logs
impl<P: ?Sized> fmt::Debug for Auth<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Auth::Basic { username, .. } => f
                .debug_struct("Basic")
                .field("username", username)
                .finish_non_exhaustive(),
            Auth::Token(_) => f.write_str("Token(..)"),
            Auth::Provider(_) => f.write_str("Provider(..)"),
        }
    }
}
