//! Drive access: REST client, UI integration state, folder traversal and
//! permission changes.

mod client;
mod ops;
mod state;
mod types;

pub use client::{DriveApi, HttpDriveApi};
pub(crate) use client::send_json;
pub use ops::{Drive, TransferredFile};
pub use state::{DriveAction, DriveState};
pub use types::{
    ChildList, ChildReference, DriveFile, Permission, PermissionRole, PermissionType,
    FOLDER_MIME_TYPE,
};

/// Folder levels descended below the target folder unless configured otherwise.
pub const DEFAULT_MAX_DEPTH: u32 = 5;
