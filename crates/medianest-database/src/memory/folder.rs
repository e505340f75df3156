//! In-memory folder repository.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use dashmap::DashMap;

use medianest_core::error::AppError;
use medianest_core::result::AppResult;
use medianest_core::types::FolderId;
use medianest_entity::folder::Folder;

use crate::repositories::{FolderChangeSet, FolderRepository};

/// Folder storage kept in a concurrent map. Cloning shares the same map.
#[derive(Debug, Clone, Default)]
pub struct MemoryFolderRepository {
    folders: Arc<DashMap<FolderId, Folder>>,
    fail_next: Arc<AtomicBool>,
}

impl MemoryFolderRepository {
    /// Create an empty repository.
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next [`FolderRepository::apply`] fail without writing.
    /// Lets tests exercise the service's rollback path.
    pub fn fail_next_apply(&self) {
        self.fail_next.store(true, Ordering::SeqCst);
    }

    /// Stored copy of a folder.
    pub fn get(&self, id: FolderId) -> Option<Folder> {
        self.folders.get(&id).map(|f| f.clone())
    }

    /// Number of stored folders.
    pub fn len(&self) -> usize {
        self.folders.len()
    }

    /// Whether nothing is stored.
    pub fn is_empty(&self) -> bool {
        self.folders.is_empty()
    }
}

#[async_trait]
impl FolderRepository for MemoryFolderRepository {
    async fn load_all(&self) -> AppResult<Vec<Folder>> {
        let mut folders: Vec<Folder> = self.folders.iter().map(|e| e.value().clone()).collect();
        folders.sort_by_key(|f| f.id);
        Ok(folders)
    }

    async fn apply(&self, changes: &FolderChangeSet) -> AppResult<()> {
        if self.fail_next.swap(false, Ordering::SeqCst) {
            return Err(AppError::database("Simulated folder write failure"));
        }
        for id in &changes.removals {
            self.folders.remove(id);
        }
        for folder in &changes.upserts {
            self.folders.insert(folder.id, folder.clone());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn folder(id: i64) -> Folder {
        Folder {
            id: FolderId(id),
            name: format!("Folder {id}"),
            slug: format!("folder-{id}"),
            parent: FolderId::ROOT,
            count: 0,
            is_system: false,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_apply_and_load() {
        let repo = MemoryFolderRepository::new();
        let mut changes = FolderChangeSet::default();
        changes.upsert(folder(2));
        changes.upsert(folder(1));
        repo.apply(&changes).await.unwrap();

        let loaded = repo.load_all().await.unwrap();
        assert_eq!(
            loaded.iter().map(|f| f.id).collect::<Vec<_>>(),
            vec![FolderId(1), FolderId(2)]
        );

        let mut changes = FolderChangeSet::default();
        changes.remove(FolderId(1));
        repo.apply(&changes).await.unwrap();
        assert_eq!(repo.len(), 1);
        assert!(repo.get(FolderId(1)).is_none());
    }

    #[tokio::test]
    async fn test_simulated_failure_writes_nothing() {
        let repo = MemoryFolderRepository::new();
        repo.fail_next_apply();
        let mut changes = FolderChangeSet::default();
        changes.upsert(folder(1));
        assert!(repo.apply(&changes).await.is_err());
        assert!(repo.is_empty());
        repo.apply(&changes).await.unwrap();
        assert_eq!(repo.len(), 1);
    }
}
