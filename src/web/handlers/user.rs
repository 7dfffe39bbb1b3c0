//! Profile of the signed-in user.

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    response::{IntoResponse, Response},
};
use axum_extra::extract::cookie::CookieJar;
use serde::Deserialize;

use super::AppState;
use crate::web::error::ApiError;
use crate::web::session::DriveSession;

#[derive(Debug, Default, Deserialize)]
pub struct UserQuery {
    /// OAuth authorization code.
    pub code: Option<String>,
}

/// GET /user - Raw profile payload from the identity provider.
///
/// Auth failures send the user back through authorization; other remote
/// failures answer 502.
pub async fn user_info(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Query(query): Query<UserQuery>,
) -> Response {
    let Some((jar, credentials)) = state.credentials(jar, query.code.as_deref()).await else {
        return state.redirect_auth(None);
    };

    match state.identity.user_info(&credentials.access_token).await {
        Ok(profile) => (jar, state.respond_json(&profile)).into_response(),
        Err(e) if e.is_auth() => {
            tracing::warn!(error = %e, "Profile lookup rejected credentials");
            state.redirect_auth(None)
        }
        Err(e) => (jar, ApiError::from(e)).into_response(),
    }
}
