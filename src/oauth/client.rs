//! Google OAuth2 endpoints over reqwest.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use url::Url;

use super::{Credentials, IdentityProvider, TokenResponse};
use crate::config::OAuthConfig;
use crate::drive::send_json;
use crate::{HandoverError, Result};

const REQUEST_TIMEOUT_SECS: u64 = 30;

/// [`IdentityProvider`] for Google accounts.
#[derive(Debug, Clone)]
pub struct GoogleOAuth {
    client: Client,
    config: OAuthConfig,
    auth_uri: Url,
}

impl GoogleOAuth {
    pub fn new(config: &OAuthConfig) -> Result<Self> {
        let auth_uri = Url::parse(&config.auth_uri)
            .map_err(|e| HandoverError::Config(format!("invalid oauth.auth_uri: {e}")))?;

        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| HandoverError::Http(format!("failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            config: config.clone(),
            auth_uri,
        })
    }

    /// POST a grant to the token endpoint.
    ///
    /// A rejected grant is an authentication failure, not a remote error.
    async fn request_token(&self, form: &[(&str, &str)]) -> Result<TokenResponse> {
        let request = self.client.post(&self.config.token_uri).form(form);
        send_json(request).await.map_err(|e| match e {
            HandoverError::Api { status, message } => {
                HandoverError::Auth(format!("token endpoint rejected grant ({status}): {message}"))
            }
            other => other,
        })
    }
}

#[async_trait]
impl IdentityProvider for GoogleOAuth {
    fn authorization_url(&self, state: Option<&str>) -> String {
        let mut url = self.auth_uri.clone();
        {
            let mut query = url.query_pairs_mut();
            query
                .append_pair("response_type", "code")
                .append_pair("client_id", self.config.client_id.as_str())
                .append_pair("redirect_uri", self.config.redirect_uri.as_str())
                .append_pair("scope", &self.config.scopes.join(" "))
                .append_pair("access_type", "offline");
            if let Some(state) = state.filter(|s| !s.is_empty()) {
                query.append_pair("state", state);
            }
        }
        url.into()
    }

    async fn exchange_code(&self, code: &str) -> Result<Credentials> {
        let response = self
            .request_token(&[
                ("grant_type", "authorization_code"),
                ("code", code),
                ("client_id", self.config.client_id.as_str()),
                ("client_secret", self.config.client_secret.as_str()),
                ("redirect_uri", self.config.redirect_uri.as_str()),
            ])
            .await?;
        Ok(Credentials::from_response(response, None))
    }

    async fn refresh(&self, credentials: &Credentials) -> Result<Credentials> {
        let refresh_token = credentials
            .refresh_token
            .as_deref()
            .ok_or_else(|| HandoverError::Auth("no refresh token available".to_string()))?;

        let response = self
            .request_token(&[
                ("grant_type", "refresh_token"),
                ("refresh_token", refresh_token),
                ("client_id", self.config.client_id.as_str()),
                ("client_secret", self.config.client_secret.as_str()),
            ])
            .await?;
        Ok(Credentials::from_response(
            response,
            Some(refresh_token.to_string()),
        ))
    }

    async fn user_info(&self, access_token: &str) -> Result<serde_json::Value> {
        let request = self
            .client
            .get(&self.config.userinfo_uri)
            .bearer_auth(access_token);
        send_json(request).await
    }
}
