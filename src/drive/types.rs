//! Drive v2 resource types.

use serde::{Deserialize, Serialize};

/// MIME type Drive uses for folders.
pub const FOLDER_MIME_TYPE: &str = "application/vnd.google-apps.folder";

/// Fields requested when fetching file metadata.
pub const FILE_FIELDS: &str = "id,title,mimeType,ownerNames";

/// Fields requested when listing folder children.
pub const CHILDREN_FIELDS: &str = "items(id),nextPageToken";

/// File or folder metadata.
///
/// Only the fields this service reads are kept.
/// refer to https://developers.google.com/drive/api/v2/reference/files
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DriveFile {
    pub id: String,
    #[serde(default)]
    pub title: String,
    pub mime_type: String,
    #[serde(default)]
    pub owner_names: Vec<String>,
}

impl DriveFile {
    pub fn is_folder(&self) -> bool {
        self.mime_type == FOLDER_MIME_TYPE
    }

    /// Owner display names joined with `,`.
    pub fn owner_name_string(&self) -> String {
        self.owner_names.join(",")
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChildReference {
    pub id: String,
}

/// One page of `children.list`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChildList {
    #[serde(default)]
    pub items: Vec<ChildReference>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_page_token: Option<String>,
}

/// Capability level granted by a permission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PermissionRole {
    Owner,
    Writer,
    Reader,
}

/// Kind of principal a permission applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PermissionType {
    User,
    Group,
    Domain,
    Anyone,
}

/// A (value, type, role) grant on a file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Permission {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Email address or domain name; absent for `anyone`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(rename = "type")]
    pub kind: PermissionType,
    pub role: PermissionRole,
}

impl Permission {
    pub fn new(value: impl Into<String>, kind: PermissionType, role: PermissionRole) -> Self {
        Self {
            id: None,
            value: Some(value.into()),
            kind,
            role,
        }
    }

    /// Ownership grant for a single user.
    pub fn owner(email: impl Into<String>) -> Self {
        Self::new(email, PermissionType::User, PermissionRole::Owner)
    }
}
