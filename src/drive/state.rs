//! Drive UI integration state.
//!
//! The Drive UI opens the app with a `state` query parameter holding a JSON
//! object, e.g. `{"action":"open","ids":["0Bx..."],"userId":"..."}` for
//! "Open With" or `{"action":"create","folderId":"0Bx..."}` for "Create New".

use serde::Deserialize;

/// Action requested by the Drive UI.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DriveAction {
    Open,
    Create,
    #[default]
    #[serde(other)]
    Unknown,
}

impl DriveAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            DriveAction::Open => "open",
            DriveAction::Create => "create",
            DriveAction::Unknown => "",
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawState {
    #[serde(default)]
    action: DriveAction,
    #[serde(default)]
    ids: Vec<String>,
    #[serde(alias = "parentId")]
    folder_id: Option<String>,
}

/// Parsed action and target identifiers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DriveState {
    pub action: DriveAction,
    pub ids: Vec<String>,
    /// Folder a new file should be created in.
    pub parent_id: Option<String>,
}

impl DriveState {
    /// Parse the `state` query parameter.
    ///
    /// A missing or malformed parameter gives an empty state.
    pub fn from_param(state: Option<&str>) -> Self {
        let Some(raw) = state.filter(|s| !s.is_empty()) else {
            return Self::default();
        };

        match serde_json::from_str::<RawState>(raw) {
            Ok(parsed) => Self {
                action: parsed.action,
                ids: parsed.ids,
                parent_id: parsed.folder_id,
            },
            Err(e) => {
                tracing::debug!(error = %e, "Ignoring malformed drive state");
                Self::default()
            }
        }
    }

    /// First target identifier, if any.
    pub fn first_id(&self) -> Option<&str> {
        self.ids.first().map(String::as_str)
    }
}
