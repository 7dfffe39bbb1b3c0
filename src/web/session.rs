//! Credential retrieval, authorization redirects and JSON responses shared
//! by every Drive-backed handler.

use async_trait::async_trait;
use axum::{
    response::{IntoResponse, Redirect, Response},
    Json,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde::Serialize;
use tracing::{debug, info, warn};

use super::handlers::AppState;
use crate::oauth::{Credentials, Session};

/// Cookie holding the credential store session id.
///
/// Sent with `SameSite=Strict`: cross-site navigations arrive without it and
/// go through authorization again.
pub const SESSION_COOKIE: &str = "handover_session";

/// Capabilities a handler needs to act on the user's behalf.
#[async_trait]
pub trait DriveSession {
    /// Credentials for this request.
    ///
    /// A non-empty `code` is exchanged and starts a new session; otherwise the
    /// session cookie is used, refreshing expired credentials. `None` means the
    /// caller must send the user through authorization. The returned jar
    /// carries any cookie change.
    async fn credentials(
        &self,
        jar: CookieJar,
        code: Option<&str>,
    ) -> Option<(CookieJar, Credentials)>;

    /// Redirect to the authorization endpoint, carrying `state` through.
    fn redirect_auth(&self, state: Option<&str>) -> Response;

    /// Serialize `value` as a JSON response body.
    fn respond_json<T: Serialize>(&self, value: &T) -> Response {
        Json(value).into_response()
    }
}

impl AppState {
    async fn start_session(
        &self,
        jar: CookieJar,
        code: &str,
    ) -> Option<(CookieJar, Credentials)> {
        let credentials = match self.identity.exchange_code(code).await {
            Ok(credentials) => credentials,
            Err(e) => {
                warn!(error = %e, "Authorization code exchange failed");
                return None;
            }
        };

        let user_id = match self.identity.user_info(&credentials.access_token).await {
            Ok(profile) => profile
                .get("id")
                .and_then(|id| id.as_str())
                .map(str::to_string),
            Err(e) => {
                warn!(error = %e, "Failed to look up user id");
                None
            }
        };

        if let Some(previous) = jar.get(SESSION_COOKIE) {
            self.sessions.remove(previous.value()).await;
        }

        let session = Session::new(user_id, credentials.clone());
        info!(user_id = session.user(), "Session established");
        let session_id = self.sessions.insert(session).await;

        let cookie = Cookie::build((SESSION_COOKIE, session_id))
            .path("/")
            .http_only(true)
            .secure(self.secure_cookies)
            .same_site(SameSite::Strict)
            .build();

        Some((jar.add(cookie), credentials))
    }
}

#[async_trait]
impl DriveSession for AppState {
    async fn credentials(
        &self,
        jar: CookieJar,
        code: Option<&str>,
    ) -> Option<(CookieJar, Credentials)> {
        if let Some(code) = code.filter(|c| !c.is_empty()) {
            return self.start_session(jar, code).await;
        }

        let session_id = jar.get(SESSION_COOKIE)?.value().to_string();
        let session = self.sessions.get(&session_id).await?;

        if !session.credentials.is_expired() {
            return Some((jar, session.credentials));
        }

        match self.identity.refresh(&session.credentials).await {
            Ok(fresh) => {
                debug!(user_id = session.user(), "Refreshed access token");
                self.sessions.update(&session_id, fresh.clone()).await;
                Some((jar, fresh))
            }
            Err(e) => {
                warn!(error = %e, user_id = session.user(), "Failed to refresh credentials");
                self.sessions.remove(&session_id).await;
                None
            }
        }
    }

    fn redirect_auth(&self, state: Option<&str>) -> Response {
        Redirect::to(&self.identity.authorization_url(state)).into_response()
    }
}
