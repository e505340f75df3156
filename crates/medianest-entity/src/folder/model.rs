//! Folder entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use medianest_core::types::FolderId;

/// Reserved slug of the system folder.
pub const SYSTEM_SLUG: &str = "uncategorized";

/// A virtual folder. Folders never contain files, only item tags point at them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Folder {
    /// Unique folder identifier (always positive).
    pub id: FolderId,
    /// Display name, unique among siblings ignoring case.
    pub name: String,
    /// Stable identifier, unique across the tree.
    pub slug: String,
    /// Parent folder, or [`FolderId::ROOT`] for top-level folders.
    pub parent: FolderId,
    /// Items tagged with exactly this folder.
    pub count: u64,
    /// Set only for the system folder.
    pub is_system: bool,
    /// When the folder was created.
    pub created_at: DateTime<Utc>,
    /// When the folder was last renamed, moved or recounted.
    pub updated_at: DateTime<Utc>,
}

impl Folder {
    /// Check if this is a top-level folder.
    pub fn is_top_level(&self) -> bool {
        self.parent.is_root()
    }
}
