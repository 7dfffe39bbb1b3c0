//! Test helpers for the web integration tests.
//!
//! Provides an in-memory Drive, a scripted identity provider and a
//! `TestServer` wired with the real templates.

#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::http::header::SET_COOKIE;
use axum_test::{TestResponse, TestServer};
use chrono::{Duration, Utc};
use serde_json::{json, Value};

use handover::drive::{ChildList, ChildReference, DriveApi, DriveFile, Permission, FOLDER_MIME_TYPE};
use handover::oauth::{Credentials, IdentityProvider};
use handover::template::{TemplateEngine, TemplateLoader};
use handover::web::{create_health_router, create_router, AppState, SESSION_COOKIE};
use handover::{HandoverError, Result};

/// Authorization code the mock provider accepts.
pub const GOOD_CODE: &str = "good-code";
/// Access token issued for [`GOOD_CODE`].
pub const ACCESS_TOKEN: &str = "ya29.test-access";
/// Access token issued by a refresh.
pub const REFRESHED_TOKEN: &str = "ya29.refreshed";
pub const AUTH_ENDPOINT: &str = "https://auth.example/authorize";

/// Drive UI state opening `id`.
pub fn open_state(id: &str) -> String {
    json!({"action": "open", "ids": [id], "userId": "1234"}).to_string()
}

/// In-memory Drive recording every call.
#[derive(Default)]
pub struct MockDrive {
    files: HashMap<String, DriveFile>,
    children: HashMap<String, Vec<String>>,
    pub page_size: usize,
    pub failing_permissions: HashSet<String>,
    get_calls: Mutex<Vec<String>>,
    list_calls: Mutex<Vec<String>>,
    permission_calls: Mutex<Vec<(String, Permission)>>,
    tokens: Mutex<Vec<String>>,
}

impl MockDrive {
    pub fn new() -> Self {
        Self {
            page_size: 100,
            ..Self::default()
        }
    }

    pub fn folder(mut self, id: &str, parent: Option<&str>) -> Self {
        self.add(id, id, FOLDER_MIME_TYPE, parent);
        self
    }

    pub fn file(mut self, id: &str, parent: &str) -> Self {
        self.add(id, id, "application/pdf", Some(parent));
        self
    }

    pub fn titled_file(mut self, id: &str, title: &str, parent: &str) -> Self {
        self.add(id, title, "text/plain", Some(parent));
        self
    }

    fn add(&mut self, id: &str, title: &str, mime: &str, parent: Option<&str>) {
        self.files.insert(
            id.to_string(),
            DriveFile {
                id: id.to_string(),
                title: title.to_string(),
                mime_type: mime.to_string(),
                owner_names: vec!["Previous Owner".to_string()],
            },
        );
        if let Some(parent) = parent {
            self.children
                .entry(parent.to_string())
                .or_default()
                .push(id.to_string());
        }
    }

    /// Remote calls of any kind.
    pub fn total_calls(&self) -> usize {
        self.get_calls.lock().unwrap().len()
            + self.list_calls.lock().unwrap().len()
            + self.permission_calls.lock().unwrap().len()
    }

    pub fn list_calls(&self) -> usize {
        self.list_calls.lock().unwrap().len()
    }

    pub fn permission_calls(&self) -> Vec<(String, Permission)> {
        self.permission_calls.lock().unwrap().clone()
    }

    /// Access tokens seen, in call order.
    pub fn tokens(&self) -> Vec<String> {
        self.tokens.lock().unwrap().clone()
    }
}

/// root
/// ├── report.pdf
/// ├── sub1/
/// │   ├── notes.pdf
/// │   └── sub2/
/// │       └── deep.pdf
/// └── slides.pdf
pub fn sample_tree() -> MockDrive {
    MockDrive::new()
        .folder("root", None)
        .file("report.pdf", "root")
        .folder("sub1", Some("root"))
        .file("notes.pdf", "sub1")
        .folder("sub2", Some("sub1"))
        .file("deep.pdf", "sub2")
        .file("slides.pdf", "root")
}

#[async_trait]
impl DriveApi for MockDrive {
    async fn get_file(&self, token: &str, file_id: &str) -> Result<DriveFile> {
        self.tokens.lock().unwrap().push(token.to_string());
        self.get_calls.lock().unwrap().push(file_id.to_string());
        self.files.get(file_id).cloned().ok_or(HandoverError::Api {
            status: 404,
            message: format!("File not found: {file_id}"),
        })
    }

    async fn list_children(
        &self,
        token: &str,
        folder_id: &str,
        page_token: Option<&str>,
    ) -> Result<ChildList> {
        self.tokens.lock().unwrap().push(token.to_string());
        self.list_calls.lock().unwrap().push(folder_id.to_string());
        let all = self.children.get(folder_id).cloned().unwrap_or_default();
        let start: usize = page_token.map(|t| t.parse().unwrap()).unwrap_or(0);
        let end = (start + self.page_size).min(all.len());
        Ok(ChildList {
            items: all[start..end]
                .iter()
                .map(|id| ChildReference { id: id.clone() })
                .collect(),
            next_page_token: (end < all.len()).then(|| end.to_string()),
        })
    }

    async fn insert_permission(
        &self,
        token: &str,
        file_id: &str,
        permission: &Permission,
    ) -> Result<Permission> {
        self.tokens.lock().unwrap().push(token.to_string());
        self.permission_calls
            .lock()
            .unwrap()
            .push((file_id.to_string(), permission.clone()));
        if self.failing_permissions.contains(file_id) {
            return Err(HandoverError::Api {
                status: 403,
                message: "insufficientFilePermissions".to_string(),
            });
        }
        let mut inserted = permission.clone();
        inserted.id = Some(format!("perm-{file_id}"));
        Ok(inserted)
    }

    async fn get_permission(
        &self,
        _token: &str,
        _file_id: &str,
        permission_id: &str,
    ) -> Result<Permission> {
        Err(HandoverError::Api {
            status: 404,
            message: format!("Permission not found: {permission_id}"),
        })
    }

    async fn update_permission(
        &self,
        _token: &str,
        _file_id: &str,
        _permission_id: &str,
        permission: &Permission,
    ) -> Result<Permission> {
        Ok(permission.clone())
    }
}

/// Identity provider with scripted outcomes.
pub struct MockIdentity {
    /// Lifetime of issued access tokens in seconds.
    pub expires_in: i64,
    pub refresh_fails: bool,
    /// Status returned by the profile endpoint instead of the profile.
    pub user_info_status: Option<u16>,
    pub exchange_calls: Mutex<usize>,
    pub refresh_calls: Mutex<usize>,
}

impl Default for MockIdentity {
    fn default() -> Self {
        Self {
            expires_in: 3600,
            refresh_fails: false,
            user_info_status: None,
            exchange_calls: Mutex::new(0),
            refresh_calls: Mutex::new(0),
        }
    }
}

impl MockIdentity {
    pub fn exchange_calls(&self) -> usize {
        *self.exchange_calls.lock().unwrap()
    }

    pub fn refresh_calls(&self) -> usize {
        *self.refresh_calls.lock().unwrap()
    }
}

pub fn profile() -> Value {
    json!({
        "id": "1234567890",
        "email": "someone@rit.edu",
        "name": "Some One",
        "verified_email": true
    })
}

#[async_trait]
impl IdentityProvider for MockIdentity {
    fn authorization_url(&self, state: Option<&str>) -> String {
        match state {
            Some(state) => url::Url::parse_with_params(AUTH_ENDPOINT, &[("state", state)])
                .unwrap()
                .to_string(),
            None => AUTH_ENDPOINT.to_string(),
        }
    }

    async fn exchange_code(&self, code: &str) -> Result<Credentials> {
        *self.exchange_calls.lock().unwrap() += 1;
        if code != GOOD_CODE {
            return Err(HandoverError::Auth("invalid_grant".to_string()));
        }
        Ok(Credentials {
            access_token: ACCESS_TOKEN.to_string(),
            refresh_token: Some("1//refresh".to_string()),
            expires_at: Utc::now() + Duration::seconds(self.expires_in),
        })
    }

    async fn refresh(&self, credentials: &Credentials) -> Result<Credentials> {
        *self.refresh_calls.lock().unwrap() += 1;
        if self.refresh_fails {
            return Err(HandoverError::Auth("token revoked".to_string()));
        }
        Ok(Credentials {
            access_token: REFRESHED_TOKEN.to_string(),
            refresh_token: credentials.refresh_token.clone(),
            expires_at: Utc::now() + Duration::hours(1),
        })
    }

    async fn user_info(&self, _access_token: &str) -> Result<Value> {
        match self.user_info_status {
            Some(status) => Err(HandoverError::Api {
                status,
                message: "profile lookup failed".to_string(),
            }),
            None => Ok(profile()),
        }
    }
}

/// Templates shipped with the crate.
pub fn templates() -> TemplateEngine {
    TemplateLoader::new(concat!(env!("CARGO_MANIFEST_DIR"), "/templates"))
        .load_all()
        .expect("Failed to load templates")
}

/// App state over the given mocks, with the shipped templates.
pub fn app_state(drive: Arc<MockDrive>, identity: Arc<MockIdentity>) -> AppState {
    AppState::new(drive, identity, templates())
}

/// Create a test server over the given state.
pub fn create_test_server(state: AppState) -> TestServer {
    let router = create_router(Arc::new(state)).merge(create_health_router());
    TestServer::new(router).expect("Failed to create test server")
}

/// `name=value` of the session cookie set by a response, if any.
pub fn session_cookie(response: &TestResponse) -> Option<String> {
    response
        .headers()
        .get_all(SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .find(|v| v.starts_with(&format!("{SESSION_COOKIE}=")))
        .and_then(|v| v.split(';').next())
        .map(str::to_string)
}

/// Exchange [`GOOD_CODE`] and return the session cookie.
pub async fn login(server: &TestServer) -> String {
    let response = server
        .get("/")
        .add_query_param("code", GOOD_CODE)
        .await;
    response.assert_status_ok();
    session_cookie(&response).expect("Session cookie not set")
}
