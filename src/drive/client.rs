//! Drive v2 REST client.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use url::Url;

use super::types::{ChildList, DriveFile, Permission, CHILDREN_FIELDS, FILE_FIELDS};
use crate::config::DriveConfig;
use crate::{HandoverError, Result};

/// User agent sent with every Drive request.
const USER_AGENT: &str = concat!("handover/", env!("CARGO_PKG_VERSION"));

/// Remote Drive operations, one method per API call.
///
/// Every call is authorized with the caller's OAuth access token.
#[async_trait]
pub trait DriveApi: Send + Sync {
    /// `files.get`
    async fn get_file(&self, token: &str, file_id: &str) -> Result<DriveFile>;

    /// `children.list`, one page.
    async fn list_children(
        &self,
        token: &str,
        folder_id: &str,
        page_token: Option<&str>,
    ) -> Result<ChildList>;

    /// `permissions.insert`
    async fn insert_permission(
        &self,
        token: &str,
        file_id: &str,
        permission: &Permission,
    ) -> Result<Permission>;

    /// `permissions.get`
    async fn get_permission(
        &self,
        token: &str,
        file_id: &str,
        permission_id: &str,
    ) -> Result<Permission>;

    /// `permissions.update`
    async fn update_permission(
        &self,
        token: &str,
        file_id: &str,
        permission_id: &str,
        permission: &Permission,
    ) -> Result<Permission>;
}

/// [`DriveApi`] backed by reqwest.
#[derive(Debug, Clone)]
pub struct HttpDriveApi {
    client: Client,
    base: Url,
}

impl HttpDriveApi {
    pub fn new(config: &DriveConfig) -> Result<Self> {
        let base = Url::parse(&config.api_base)
            .map_err(|e| HandoverError::Config(format!("invalid drive.api_base: {e}")))?;
        if base.cannot_be_a_base() {
            return Err(HandoverError::Config(format!(
                "drive.api_base is not a base URL: {base}"
            )));
        }

        let client = Client::builder()
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| HandoverError::Http(format!("failed to create HTTP client: {e}")))?;

        Ok(Self { client, base })
    }

    /// Build `{base}/files/{segments...}` with each segment percent-encoded.
    fn files_url(&self, segments: &[&str]) -> Url {
        let mut url = self.base.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().push("files").extend(segments);
        }
        url
    }
}

/// Send a request and decode a successful JSON body.
///
/// Non-success statuses become [`HandoverError::Api`] carrying the body text.
pub(crate) async fn send_json<T: DeserializeOwned>(request: RequestBuilder) -> Result<T> {
    let response = request.send().await?;
    let status = response.status();

    if !status.is_success() {
        let message = response
            .text()
            .await
            .unwrap_or_else(|_| status.to_string());
        return Err(HandoverError::Api {
            status: status.as_u16(),
            message,
        });
    }

    Ok(response.json::<T>().await?)
}

#[async_trait]
impl DriveApi for HttpDriveApi {
    async fn get_file(&self, token: &str, file_id: &str) -> Result<DriveFile> {
        let request = self
            .client
            .get(self.files_url(&[file_id]))
            .query(&[("fields", FILE_FIELDS)])
            .bearer_auth(token);
        send_json(request).await
    }

    async fn list_children(
        &self,
        token: &str,
        folder_id: &str,
        page_token: Option<&str>,
    ) -> Result<ChildList> {
        let mut request = self
            .client
            .get(self.files_url(&[folder_id, "children"]))
            .query(&[("fields", CHILDREN_FIELDS)])
            .bearer_auth(token);
        if let Some(page_token) = page_token {
            request = request.query(&[("pageToken", page_token)]);
        }
        send_json(request).await
    }

    async fn insert_permission(
        &self,
        token: &str,
        file_id: &str,
        permission: &Permission,
    ) -> Result<Permission> {
        let request = self
            .client
            .post(self.files_url(&[file_id, "permissions"]))
            .bearer_auth(token)
            .json(permission);
        send_json(request).await
    }

    async fn get_permission(
        &self,
        token: &str,
        file_id: &str,
        permission_id: &str,
    ) -> Result<Permission> {
        let request = self
            .client
            .get(self.files_url(&[file_id, "permissions", permission_id]))
            .bearer_auth(token);
        send_json(request).await
    }

    async fn update_permission(
        &self,
        token: &str,
        file_id: &str,
        permission_id: &str,
        permission: &Permission,
    ) -> Result<Permission> {
        let request = self
            .client
            .put(self.files_url(&[file_id, "permissions", permission_id]))
            .bearer_auth(token)
            .json(permission);
        send_json(request).await
    }
}
