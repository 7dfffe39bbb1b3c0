//! Folder traversal and permission changes on behalf of one user.
//!
//! Remote failures are logged and treated as "no effect": a failed lookup
//! counts as "not a folder", a failed listing ends that folder's children,
//! and a failed permission call yields `None` without stopping the caller.

use futures::future::{BoxFuture, FutureExt};
use tracing::{debug, info, warn};

use super::client::DriveApi;
use super::types::{DriveFile, Permission, PermissionRole, PermissionType};

/// A Drive API handle authorized with one access token.
pub struct Drive<'a> {
    api: &'a dyn DriveApi,
    token: &'a str,
}

/// Outcome of granting ownership on one entry.
#[derive(Debug, Clone)]
pub struct TransferredFile {
    pub file: DriveFile,
    /// The inserted permission, `None` when the call failed.
    pub permission: Option<Permission>,
}

impl TransferredFile {
    pub fn granted(&self) -> bool {
        self.permission.is_some()
    }
}

impl<'a> Drive<'a> {
    pub fn new(api: &'a dyn DriveApi, token: &'a str) -> Self {
        Self { api, token }
    }

    /// Whether `file_id` is a folder. Lookup failures count as `false`.
    pub async fn is_folder(&self, file_id: &str) -> bool {
        match self.api.get_file(self.token, file_id).await {
            Ok(file) => file.is_folder(),
            Err(e) => {
                warn!(file_id, error = %e, "Failed to fetch file metadata");
                false
            }
        }
    }

    /// Every child id of a folder, following continuation tokens.
    ///
    /// A failing page ends the listing with what was collected so far.
    pub async fn list_all_children(&self, folder_id: &str) -> Vec<String> {
        let mut ids = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let page = match self
                .api
                .list_children(self.token, folder_id, page_token.as_deref())
                .await
            {
                Ok(page) => page,
                Err(e) => {
                    warn!(folder_id, error = %e, "Failed to list folder children");
                    break;
                }
            };

            ids.extend(page.items.into_iter().map(|child| child.id));

            match page.next_page_token.filter(|t| !t.is_empty()) {
                Some(next) => page_token = Some(next),
                None => break,
            }
        }

        ids
    }

    /// Descendants of `folder_id` within `depth` levels.
    ///
    /// Returns `None` without listing anything when `folder_id` is not a folder.
    pub async fn traverse(&self, folder_id: &str, depth: u32) -> Option<Vec<DriveFile>> {
        if !self.is_folder(folder_id).await {
            return None;
        }
        Some(self.descendants(folder_id, depth).await)
    }

    /// Descendants of a known folder within `depth` levels, depth-first.
    ///
    /// Sub-folders are included alongside files. Empty when `depth` is 0.
    pub fn descendants<'b>(
        &'b self,
        folder_id: &'b str,
        depth: u32,
    ) -> BoxFuture<'b, Vec<DriveFile>> {
        async move {
            if depth == 0 {
                return Vec::new();
            }

            let mut files = Vec::new();

            for child_id in self.list_all_children(folder_id).await {
                let file = match self.api.get_file(self.token, &child_id).await {
                    Ok(file) => file,
                    Err(e) => {
                        warn!(file_id = %child_id, error = %e, "Skipping unreadable child");
                        continue;
                    }
                };

                if file.is_folder() {
                    let sub_folder = file.id.clone();
                    files.push(file);
                    files.extend(self.descendants(&sub_folder, depth - 1).await);
                } else {
                    files.push(file);
                }
            }

            debug!(folder_id, depth, found = files.len(), "Traversed folder");
            files
        }
        .boxed()
    }

    /// Insert a permission. `None` if the call failed.
    pub async fn insert_permission(
        &self,
        file_id: &str,
        value: &str,
        kind: PermissionType,
        role: PermissionRole,
    ) -> Option<Permission> {
        let permission = Permission::new(value, kind, role);
        match self
            .api
            .insert_permission(self.token, file_id, &permission)
            .await
        {
            Ok(inserted) => Some(inserted),
            Err(e) => {
                warn!(file_id, value, error = %e, "Failed to insert permission");
                None
            }
        }
    }

    /// Change the role of an existing permission. `None` if either call failed.
    pub async fn update_permission(
        &self,
        file_id: &str,
        permission_id: &str,
        new_role: PermissionRole,
    ) -> Option<Permission> {
        let mut permission = match self
            .api
            .get_permission(self.token, file_id, permission_id)
            .await
        {
            Ok(permission) => permission,
            Err(e) => {
                warn!(file_id, permission_id, error = %e, "Failed to fetch permission");
                return None;
            }
        };

        permission.role = new_role;

        match self
            .api
            .update_permission(self.token, file_id, permission_id, &permission)
            .await
        {
            Ok(updated) => Some(updated),
            Err(e) => {
                warn!(file_id, permission_id, error = %e, "Failed to update permission");
                None
            }
        }
    }

    /// Grant `new_owner` the owner role on every entry, one call each.
    ///
    /// Failures are recorded per entry and never stop the loop.
    pub async fn transfer_ownership(
        &self,
        files: Vec<DriveFile>,
        new_owner: &str,
    ) -> Vec<TransferredFile> {
        let mut results = Vec::with_capacity(files.len());

        for file in files {
            let permission = self
                .insert_permission(&file.id, new_owner, PermissionType::User, PermissionRole::Owner)
                .await;
            results.push(TransferredFile { file, permission });
        }

        let granted = results.iter().filter(|r| r.granted()).count();
        info!(
            new_owner,
            granted,
            failed = results.len() - granted,
            "Ownership transfer finished"
        );

        results
    }
}
