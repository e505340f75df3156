//! Requests accepted by the folder RPC endpoint.

use serde::{Deserialize, Serialize};

use medianest_core::types::{FolderFilter, FolderId, ItemId};

/// One request of the folder protocol, tagged by its `action` field.
///
/// ```json
/// {"action": "moveFolder", "folder_id": 12, "new_parent": 0}
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "camelCase")]
pub enum FolderAction {
    /// Read the full snapshot.
    GetFolders,
    /// Create a folder under `parent` (`0` for top level).
    CreateFolder {
        /// Requested display name.
        name: String,
        /// Parent folder.
        #[serde(default = "root_parent")]
        parent: FolderId,
    },
    /// Rename a folder.
    RenameFolder {
        /// Folder to rename.
        folder_id: FolderId,
        /// New display name.
        name: String,
    },
    /// Delete a folder and its descendants.
    DeleteFolder {
        /// Folder to delete.
        folder_id: FolderId,
        /// Move contained items to the system folder (`true`) or just clear
        /// their tags (`false`).
        #[serde(default = "default_reassign")]
        reassign: bool,
    },
    /// Reparent a folder.
    MoveFolder {
        /// Folder to move.
        folder_id: FolderId,
        /// New parent (`0` for top level).
        new_parent: FolderId,
    },
    /// Assign items to a folder.
    AssignMedia {
        /// Items to assign.
        item_ids: Vec<ItemId>,
        /// Target folder.
        folder_id: FolderId,
    },
    /// Page through the items of a folder.
    GetFolderContents {
        /// Selected folder; `-1`, `0` or absent lists everything.
        #[serde(default)]
        folder_id: FolderFilter,
        /// 1-based page.
        #[serde(default)]
        page: Option<u64>,
        /// Page size.
        #[serde(default)]
        per_page: Option<u64>,
    },
}

impl FolderAction {
    /// Wire name of the action.
    pub fn name(&self) -> &'static str {
        match self {
            Self::GetFolders => "getFolders",
            Self::CreateFolder { .. } => "createFolder",
            Self::RenameFolder { .. } => "renameFolder",
            Self::DeleteFolder { .. } => "deleteFolder",
            Self::MoveFolder { .. } => "moveFolder",
            Self::AssignMedia { .. } => "assignMedia",
            Self::GetFolderContents { .. } => "getFolderContents",
        }
    }

    /// Whether the action changes folder or item state.
    pub fn is_mutation(&self) -> bool {
        !matches!(self, Self::GetFolders | Self::GetFolderContents { .. })
    }
}

fn root_parent() -> FolderId {
    FolderId::ROOT
}

fn default_reassign() -> bool {
    true
}
