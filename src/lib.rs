//! handover - Drive folder ownership transfer
//!
//! A small web app opened from the Google Drive UI. It authorizes the user,
//! walks the selected folder and grants the owner role on every entry to a
//! new owner inside the institution.

pub mod config;
pub mod drive;
pub mod error;
pub mod logging;
pub mod oauth;
pub mod template;
pub mod web;

pub use config::Config;
pub use drive::{Drive, DriveApi, DriveFile, DriveState, HttpDriveApi, Permission};
pub use error::{HandoverError, Result};
pub use oauth::{CredentialStore, Credentials, GoogleOAuth, IdentityProvider};
pub use web::{AppState, WebServer};
