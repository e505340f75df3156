//! Folder tree structures sent to clients.

use serde::{Deserialize, Serialize};

use medianest_core::types::FolderId;

use super::model::Folder;

/// A node in the nested folder tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FolderNode {
    /// Folder ID.
    pub id: FolderId,
    /// Folder name.
    pub name: String,
    /// Folder slug.
    pub slug: String,
    /// Parent folder ID (`0` for top level).
    pub parent: FolderId,
    /// Direct item count.
    pub count: u64,
    /// Whether this is the system folder.
    pub is_system: bool,
    /// Child folders, ordered by name.
    #[serde(default)]
    pub children: Vec<FolderNode>,
}

impl FolderNode {
    /// Build a childless node from a folder record.
    pub fn leaf(folder: &Folder) -> Self {
        Self {
            id: folder.id,
            name: folder.name.clone(),
            slug: folder.slug.clone(),
            parent: folder.parent,
            count: folder.count,
            is_system: folder.is_system,
            children: Vec::new(),
        }
    }

    /// Whether the node has child folders.
    pub fn has_children(&self) -> bool {
        !self.children.is_empty()
    }
}

/// A folder in depth-first order with its depth below the root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlatFolder {
    /// Folder ID.
    pub id: FolderId,
    /// Folder name.
    pub name: String,
    /// Folder slug.
    pub slug: String,
    /// Parent folder ID.
    pub parent: FolderId,
    /// Direct item count.
    pub count: u64,
    /// Number of ancestors (top-level folders have depth 0).
    pub depth: usize,
    /// Whether this is the system folder.
    pub is_system: bool,
}

/// Full folder state returned after every read and mutation.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FolderSnapshot {
    /// Nested tree of top-level folders.
    pub tree: Vec<FolderNode>,
    /// Every folder, depth-first, with depth.
    pub flat: Vec<FlatFolder>,
    /// Total item count across the whole store ("All Files").
    pub total_count: u64,
}

impl FolderSnapshot {
    /// Look up a folder by id.
    pub fn find(&self, id: FolderId) -> Option<&FlatFolder> {
        self.flat.iter().find(|f| f.id == id)
    }

    /// Whether the snapshot contains `id`.
    pub fn contains(&self, id: FolderId) -> bool {
        self.find(id).is_some()
    }

    /// Direct children of `parent` in tree order.
    pub fn children_of(&self, parent: FolderId) -> impl Iterator<Item = &FlatFolder> {
        self.flat.iter().filter(move |f| f.parent == parent)
    }

    /// Whether `id` has any child folders.
    pub fn has_children(&self, id: FolderId) -> bool {
        self.children_of(id).next().is_some()
    }

    /// The system folder, when present.
    pub fn system_folder(&self) -> Option<&FlatFolder> {
        self.flat.iter().find(|f| f.is_system)
    }

    /// Number of folders in the snapshot.
    pub fn len(&self) -> usize {
        self.flat.len()
    }

    /// Whether the snapshot holds no folders.
    pub fn is_empty(&self) -> bool {
        self.flat.is_empty()
    }
}
