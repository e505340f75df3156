//! Drag-and-drop rules.
//!
//! A surface is bound to one snapshot generation. Gestures carry the
//! generation they were started under; once the controller installs a newer
//! snapshot those gestures resolve to nothing.

use std::collections::HashSet;

use medianest_core::types::{FolderId, ItemId};
use medianest_entity::folder::FolderSnapshot;

/// What is being dragged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DragSource {
    /// Media items from the listing.
    Items(Vec<ItemId>),
    /// A folder row.
    Folder(FolderId),
}

/// Where it is dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DropTarget {
    /// A folder row.
    Folder(FolderId),
    /// The top-level drop zone.
    Root,
    /// The All Files row. Never accepts drops.
    AllFiles,
}

/// A completed drag, stamped with the generation it started in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DropGesture {
    /// Surface generation.
    pub generation: u64,
    /// Dragged payload.
    pub source: DragSource,
    /// Drop location.
    pub target: DropTarget,
}

/// Request a valid gesture turns into.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DropCommand {
    /// Assign items to a folder.
    Assign {
        /// Items to assign
        item_ids: Vec<ItemId>,
        /// Target folder
        folder_id: FolderId,
    },
    /// Reparent a folder.
    Move {
        /// Folder to move
        folder_id: FolderId,
        /// New parent, `0` for top level
        new_parent: FolderId,
    },
}

/// Drag-and-drop bindings for one snapshot.
#[derive(Debug, Clone, Default)]
pub struct DragDropSurface {
    generation: u64,
    folders: HashSet<FolderId>,
    system: Option<FolderId>,
}

impl DragDropSurface {
    /// Bind a surface to `snapshot`.
    pub fn bind(snapshot: &FolderSnapshot, generation: u64) -> Self {
        Self {
            generation,
            folders: snapshot.flat.iter().map(|f| f.id).collect(),
            system: snapshot.system_folder().map(|f| f.id),
        }
    }

    /// Generation this surface was bound to.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Whether `source` may start a drag.
    pub fn can_drag(&self, source: &DragSource) -> bool {
        match source {
            DragSource::Items(ids) => !ids.is_empty(),
            DragSource::Folder(id) => self.folders.contains(id) && self.system != Some(*id),
        }
    }

    /// Whether `target` accepts `source`.
    pub fn can_drop(&self, source: &DragSource, target: DropTarget) -> bool {
        if !self.can_drag(source) {
            return false;
        }
        match (source, target) {
            (_, DropTarget::AllFiles) => false,
            (DragSource::Items(_), DropTarget::Root) => false,
            (DragSource::Items(_), DropTarget::Folder(id)) => self.folders.contains(&id),
            (DragSource::Folder(_), DropTarget::Root) => true,
            (DragSource::Folder(source), DropTarget::Folder(id)) => {
                *source != id && self.folders.contains(&id)
            }
        }
    }

    /// Start a gesture on this surface.
    pub fn gesture(&self, source: DragSource, target: DropTarget) -> DropGesture {
        DropGesture {
            generation: self.generation,
            source,
            target,
        }
    }

    /// Turn a gesture into a command. Stale or invalid gestures yield `None`.
    pub fn resolve(&self, gesture: &DropGesture) -> Option<DropCommand> {
        if gesture.generation != self.generation
            || !self.can_drop(&gesture.source, gesture.target)
        {
            return None;
        }
        match (&gesture.source, gesture.target) {
            (DragSource::Items(ids), DropTarget::Folder(folder_id)) => Some(DropCommand::Assign {
                item_ids: ids.clone(),
                folder_id,
            }),
            (DragSource::Folder(id), DropTarget::Folder(parent)) => Some(DropCommand::Move {
                folder_id: *id,
                new_parent: parent,
            }),
            (DragSource::Folder(id), DropTarget::Root) => Some(DropCommand::Move {
                folder_id: *id,
                new_parent: FolderId::ROOT,
            }),
            _ => None,
        }
    }
}
