//! Page and JSON handlers.

pub mod about;
pub mod transfer;
pub mod user;

pub use about::*;
pub use transfer::*;
pub use user::*;

use std::sync::Arc;

use axum::response::Html;

use crate::config::{Config, DriveConfig};
use crate::drive::{DriveApi, HttpDriveApi, DEFAULT_MAX_DEPTH};
use crate::oauth::{CredentialStore, GoogleOAuth, IdentityProvider};
use crate::template::{TemplateContext, TemplateEngine, TemplateLoader};
use crate::web::error::ApiError;
use crate::Result;

/// Error page.
pub const ERROR_TEMPLATE: &str = "error";
/// Shown when the app is opened without target files.
pub const AUTH_TEMPLATE: &str = "auth";
/// Listing of transferred entries.
pub const INDEX_TEMPLATE: &str = "index";
pub const ABOUT_TEMPLATE: &str = "about";

/// Templates that must exist for the server to start.
pub const REQUIRED_TEMPLATES: &[&str] =
    &[ERROR_TEMPLATE, AUTH_TEMPLATE, INDEX_TEMPLATE, ABOUT_TEMPLATE];

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub drive: Arc<dyn DriveApi>,
    pub identity: Arc<dyn IdentityProvider>,
    pub sessions: CredentialStore,
    pub templates: Arc<TemplateEngine>,
    /// Suffix every new owner address must end with.
    pub owner_suffix: String,
    /// Folder levels descended below the target folder.
    pub max_depth: u32,
    /// Mark the session cookie `Secure`.
    pub secure_cookies: bool,
}

impl AppState {
    pub fn new(
        drive: Arc<dyn DriveApi>,
        identity: Arc<dyn IdentityProvider>,
        templates: TemplateEngine,
    ) -> Self {
        Self {
            drive,
            identity,
            sessions: CredentialStore::new(),
            templates: Arc::new(templates),
            owner_suffix: DriveConfig::default().owner_suffix,
            max_depth: DEFAULT_MAX_DEPTH,
            secure_cookies: false,
        }
    }

    /// Build the production state: HTTP clients and templates from disk.
    pub fn from_config(config: &Config) -> Result<Self> {
        let drive = HttpDriveApi::new(&config.drive)?;
        let identity = GoogleOAuth::new(&config.oauth)?;

        let templates = TemplateLoader::new(&config.templates.path).load_all()?;
        TemplateLoader::require(&templates, REQUIRED_TEMPLATES)?;

        Ok(Self::new(Arc::new(drive), Arc::new(identity), templates)
            .with_owner_suffix(&config.drive.owner_suffix)
            .with_max_depth(config.drive.max_depth)
            .with_secure_cookies(config.oauth.redirect_uri.starts_with("https://")))
    }

    pub fn with_owner_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.owner_suffix = suffix.into();
        self
    }

    pub fn with_max_depth(mut self, max_depth: u32) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn with_secure_cookies(mut self, secure: bool) -> Self {
        self.secure_cookies = secure;
        self
    }

    /// Render a page template.
    pub fn render(
        &self,
        name: &str,
        context: &TemplateContext,
    ) -> std::result::Result<Html<String>, ApiError> {
        self.templates.render(name, context).map(Html).map_err(|e| {
            tracing::error!(template = name, error = %e, "Failed to render template");
            ApiError::internal("Failed to render page")
        })
    }
}
