//! Response envelope and payloads of the folder RPC endpoint.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use medianest_core::types::{FolderFilter, FolderId, ItemId, MediaItem, PageResponse};
use medianest_core::{AppError, AppResult, ErrorKind};

use crate::folder::{Folder, FolderSnapshot};

/// Envelope wrapping every RPC reply.
///
/// Success: `{"success": true, "data": ...}`.
/// Failure: `{"success": false, "error": {"code": "CYCLE", "message": "..."}}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionResponse<T = serde_json::Value> {
    /// Whether the action succeeded.
    pub success: bool,
    /// Payload on success.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    /// Error details on failure.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<ActionError>,
}

/// Error details carried by a failed [`ActionResponse`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionError {
    /// Machine-readable error code.
    pub code: ErrorKind,
    /// Human-readable message.
    pub message: String,
}

impl<T> ActionResponse<T> {
    /// Create a successful response.
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    /// Create a failed response from an application error.
    pub fn failure(err: &AppError) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(ActionError {
                code: err.kind,
                message: err.message.clone(),
            }),
        }
    }

    /// Convert the envelope back into a result.
    pub fn into_result(self) -> AppResult<T> {
        match (self.success, self.data, self.error) {
            (true, Some(data), _) => Ok(data),
            (true, None, _) => Err(AppError::serialization("Successful response without data")),
            (false, _, Some(error)) => Err(AppError::new(error.code, error.message)),
            (false, _, None) => Err(AppError::internal("Request failed without error details")),
        }
    }
}

impl ActionResponse<serde_json::Value> {
    /// Deserialize the payload of a generic envelope into a concrete type.
    pub fn decode<T: DeserializeOwned>(self) -> AppResult<T> {
        let data = self.into_result()?;
        Ok(serde_json::from_value(data)?)
    }
}

/// Result of create, rename and move.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FolderMutation {
    /// The affected folder after the change.
    pub folder: Folder,
    /// Full state after the change.
    pub snapshot: FolderSnapshot,
}

/// Result of delete.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeleteOutcome {
    /// Removed folders, deepest first, the requested folder last.
    pub deleted: Vec<FolderId>,
    /// Attachments moved to the system folder (or untagged).
    pub reassigned_items: u64,
    /// Full state after the change.
    pub snapshot: FolderSnapshot,
}

/// Result of assign.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssignOutcome {
    /// Target folder.
    pub folder_id: FolderId,
    /// Number of items now tagged with the target.
    pub assigned: u64,
    /// Requested ids that were missing or not attachments.
    pub skipped: Vec<ItemId>,
    /// Full state after the change.
    pub snapshot: FolderSnapshot,
}

/// A page of items for the selected folder.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FolderContents {
    /// The selection the page was computed for.
    pub folder_id: FolderFilter,
    /// The page itself.
    #[serde(flatten)]
    pub page: PageResponse<MediaItem>,
}
