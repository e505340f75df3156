//! Persistence contracts and their PostgreSQL implementations.

pub mod folder;
pub mod item;

use async_trait::async_trait;

use medianest_core::result::AppResult;
use medianest_core::types::FolderId;
use medianest_entity::folder::Folder;

pub use folder::PgFolderRepository;
pub use item::PgItemStore;

/// Folder rows written by one service operation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FolderChangeSet {
    /// Folders to insert or overwrite.
    pub upserts: Vec<Folder>,
    /// Folders to delete, in the order given (deepest first for subtrees).
    pub removals: Vec<FolderId>,
}

impl FolderChangeSet {
    /// Record a folder to insert or overwrite. Later entries replace earlier
    /// ones for the same id.
    pub fn upsert(&mut self, folder: Folder) {
        self.upserts.retain(|f| f.id != folder.id);
        self.upserts.push(folder);
    }

    /// Record a folder removal.
    pub fn remove(&mut self, id: FolderId) {
        self.upserts.retain(|f| f.id != id);
        self.removals.push(id);
    }

    /// Whether nothing needs to be written.
    pub fn is_empty(&self) -> bool {
        self.upserts.is_empty() && self.removals.is_empty()
    }
}

/// Durable storage of folder records.
///
/// The folder service keeps the authoritative tree in memory and writes each
/// operation's changes through [`FolderRepository::apply`], which must be
/// all-or-nothing.
#[async_trait]
pub trait FolderRepository: Send + Sync + std::fmt::Debug + 'static {
    /// Load every stored folder.
    async fn load_all(&self) -> AppResult<Vec<Folder>>;

    /// Apply removals, then upserts, atomically.
    async fn apply(&self, changes: &FolderChangeSet) -> AppResult<()>;
}
