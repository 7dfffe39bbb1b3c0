//! OAuth2 authorization-code flow and per-session credentials.

mod client;
mod store;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use serde::Deserialize;

pub use client::GoogleOAuth;
pub use store::{CredentialStore, Session};

use crate::Result;

/// Access tokens are treated as expired this long before their real expiry.
const EXPIRY_MARGIN_SECS: i64 = 60;

fn default_expires_in() -> i64 {
    3600
}

/// Token endpoint response for both the code and refresh grants.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default = "default_expires_in")]
    pub expires_in: i64,
    #[serde(default)]
    pub refresh_token: Option<String>,
}

/// Access token with its refresh token and expiry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub expires_at: DateTime<Utc>,
}

impl Credentials {
    /// Build credentials from a token response.
    ///
    /// Refresh responses usually omit the refresh token, in which case
    /// `previous_refresh` is kept.
    pub fn from_response(response: TokenResponse, previous_refresh: Option<String>) -> Self {
        Self {
            access_token: response.access_token,
            refresh_token: response.refresh_token.or(previous_refresh),
            expires_at: Utc::now() + Duration::seconds(response.expires_in),
        }
    }

    pub fn is_expired(&self) -> bool {
        Utc::now() + Duration::seconds(EXPIRY_MARGIN_SECS) >= self.expires_at
    }
}

/// The identity provider side of the flow.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// URL the browser is sent to for consent. `state` is echoed back on return.
    fn authorization_url(&self, state: Option<&str>) -> String;

    /// Exchange an authorization code for credentials.
    async fn exchange_code(&self, code: &str) -> Result<Credentials>;

    /// Obtain a fresh access token.
    ///
    /// Fails with [`crate::HandoverError::Auth`] when there is no refresh
    /// token or the provider rejects it.
    async fn refresh(&self, credentials: &Credentials) -> Result<Credentials>;

    /// Profile of the token's owner, as returned by the provider.
    async fn user_info(&self, access_token: &str) -> Result<serde_json::Value>;
}
