//! Ownership transfer page, the app's entry point from the Drive UI.

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::header,
    response::{IntoResponse, Response},
};
use axum_extra::extract::cookie::CookieJar;
use serde::Deserialize;
use tracing::{info, warn};

use super::{AppState, AUTH_TEMPLATE, ERROR_TEMPLATE, INDEX_TEMPLATE};
use crate::drive::{Drive, DriveState, TransferredFile};
use crate::template::{TemplateContext, Value};
use crate::web::error::ApiError;
use crate::web::session::DriveSession;

/// Plain-text body returned when the first target is not a folder.
pub const NOT_A_FOLDER: &str = "Not a folder\n";

/// Query parameters of `GET /`.
#[derive(Debug, Default, Deserialize)]
pub struct TransferQuery {
    /// Drive UI state JSON.
    pub state: Option<String>,
    /// OAuth authorization code.
    pub code: Option<String>,
    pub new_owner: Option<String>,
    /// Set by the provider when the user declined authorization.
    pub error: Option<String>,
}

/// Why a new owner address was refused.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OwnerRejection {
    Missing,
    IllegalSuffix { suffix: String, given: String },
}

impl OwnerRejection {
    pub fn message(&self) -> String {
        match self {
            OwnerRejection::Missing => "New owner not defined".to_string(),
            OwnerRejection::IllegalSuffix { suffix, given } => {
                format!("Illegal new owner.  Must end in {suffix}\n\nGiven: {given}")
            }
        }
    }
}

/// Check a new owner address against the institutional suffix.
pub fn check_new_owner<'a>(
    new_owner: Option<&'a str>,
    suffix: &str,
) -> Result<&'a str, OwnerRejection> {
    match new_owner.filter(|o| !o.is_empty()) {
        None => Err(OwnerRejection::Missing),
        Some(owner) if !owner.ends_with(suffix) => Err(OwnerRejection::IllegalSuffix {
            suffix: suffix.to_string(),
            given: owner.to_string(),
        }),
        Some(owner) => Ok(owner),
    }
}

/// GET / - Transfer ownership of the folder the Drive UI opened the app with.
pub async fn transfer_ownership(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Query(query): Query<TransferQuery>,
) -> Result<Response, ApiError> {
    if let Some(error) = query.error.as_deref() {
        warn!(error, "Authorization was not granted");
        let page = error_page(
            &state,
            &format!("Authorization failed: {error}"),
            query.state.as_deref(),
        )?;
        return Ok(page);
    }

    let drive_state = DriveState::from_param(query.state.as_deref());

    let Some((jar, credentials)) = state.credentials(jar, query.code.as_deref()).await else {
        return Ok(state.redirect_auth(query.state.as_deref()));
    };

    let Some(folder_id) = drive_state.first_id() else {
        let context = TemplateContext::new()
            .with("action", drive_state.action.as_str())
            .with("folder_id", drive_state.parent_id.as_deref().unwrap_or_default());
        return Ok((jar, state.render(AUTH_TEMPLATE, &context)?).into_response());
    };

    let new_owner = match check_new_owner(query.new_owner.as_deref(), &state.owner_suffix) {
        Ok(owner) => owner,
        Err(rejection) => {
            info!(reason = ?rejection, "Rejected new owner");
            let page = error_page(&state, &rejection.message(), query.state.as_deref())?;
            return Ok((jar, page).into_response());
        }
    };

    let drive = Drive::new(state.drive.as_ref(), &credentials.access_token);

    let Some(files) = drive.traverse(folder_id, state.max_depth).await else {
        info!(folder_id, "Target is not a folder");
        let body = ([(header::CONTENT_TYPE, "text/plain; charset=utf-8")], NOT_A_FOLDER);
        return Ok((jar, body).into_response());
    };

    info!(
        folder_id,
        new_owner,
        entries = files.len(),
        "Transferring ownership"
    );
    let results = drive.transfer_ownership(files, new_owner).await;

    let page = state.render(INDEX_TEMPLATE, &listing_context(new_owner, &results))?;
    Ok((jar, page).into_response())
}

fn error_page(
    state: &AppState,
    message: &str,
    raw_state: Option<&str>,
) -> Result<Response, ApiError> {
    let context = TemplateContext::new()
        .with("error", message)
        .with("state", raw_state.unwrap_or_default());
    Ok(state.render(ERROR_TEMPLATE, &context)?.into_response())
}

fn listing_context(new_owner: &str, results: &[TransferredFile]) -> TemplateContext {
    let files: Vec<Value> = results
        .iter()
        .map(|r| {
            Value::object([
                ("id", Value::from(r.file.id.as_str())),
                ("title", Value::from(r.file.title.as_str())),
                ("mime_type", Value::from(r.file.mime_type.as_str())),
                ("owners", Value::from(r.file.owner_name_string())),
                ("is_folder", Value::from(r.file.is_folder())),
                ("granted", Value::from(r.granted())),
            ])
        })
        .collect();
    let granted = results.iter().filter(|r| r.granted()).count();

    TemplateContext::new()
        .with("new_owner", new_owner)
        .with("count", results.len())
        .with("granted_count", granted)
        .with("failed_count", results.len() - granted)
        .with("files", files)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_new_owner() {
        assert_eq!(check_new_owner(Some("a@rit.edu"), "rit.edu"), Ok("a@rit.edu"));
        assert_eq!(check_new_owner(None, "rit.edu"), Err(OwnerRejection::Missing));
        assert_eq!(check_new_owner(Some(""), "rit.edu"), Err(OwnerRejection::Missing));
        assert!(matches!(
            check_new_owner(Some("a@gmail.com"), "rit.edu"),
            Err(OwnerRejection::IllegalSuffix { .. })
        ));
        // Suffix match only, no domain parsing.
        assert_eq!(check_new_owner(Some("a@notrit.edu"), "rit.edu"), Ok("a@notrit.edu"));
    }

    #[test]
    fn test_rejection_messages() {
        assert_eq!(OwnerRejection::Missing.message(), "New owner not defined");

        let rejection = check_new_owner(Some("x@gmail.com"), "rit.edu").unwrap_err();
        assert_eq!(
            rejection.message(),
            "Illegal new owner.  Must end in rit.edu\n\nGiven: x@gmail.com"
        );
    }
}
