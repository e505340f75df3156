//! In-memory item store.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;

use medianest_core::result::AppResult;
use medianest_core::traits::ItemStore;
use medianest_core::types::{FolderId, ItemId, ItemPredicate, MediaItem, PageRequest, PageResponse};

/// Item store kept in a concurrent map. Cloning shares the same map.
#[derive(Debug, Clone, Default)]
pub struct MemoryItemStore {
    items: Arc<DashMap<ItemId, MediaItem>>,
}

impl MemoryItemStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace an item.
    pub fn insert_item(&self, item: MediaItem) {
        self.items.insert(item.id, item);
    }

    /// Current copy of an item.
    pub fn get(&self, id: ItemId) -> Option<MediaItem> {
        self.items.get(&id).map(|item| item.clone())
    }

    fn attachments(&self) -> impl Iterator<Item = MediaItem> + '_ {
        self.items
            .iter()
            .filter(|e| e.value().is_attachment())
            .map(|e| e.value().clone())
    }
}

#[async_trait]
impl ItemStore for MemoryItemStore {
    async fn list_items(
        &self,
        predicate: &ItemPredicate,
        page: &PageRequest,
    ) -> AppResult<PageResponse<MediaItem>> {
        let mut matching: Vec<MediaItem> = self
            .attachments()
            .filter(|item| predicate.matches(item.folder))
            .collect();
        matching.sort_by(|a, b| {
            b.uploaded_at
                .cmp(&a.uploaded_at)
                .then_with(|| b.id.cmp(&a.id))
        });

        let total = matching.len() as u64;
        let items = matching
            .into_iter()
            .skip(page.offset() as usize)
            .take(page.limit() as usize)
            .collect();
        Ok(PageResponse::new(items, page, total))
    }

    async fn find_item(&self, id: ItemId) -> AppResult<Option<MediaItem>> {
        Ok(self.get(id))
    }

    async fn set_item_tags(&self, ids: &[ItemId], folder: Option<FolderId>) -> AppResult<u64> {
        let mut updated = 0;
        for id in ids {
            if let Some(mut item) = self.items.get_mut(id) {
                item.folder = folder;
                updated += 1;
            }
        }
        Ok(updated)
    }

    async fn items_in_folders(&self, folders: &[FolderId]) -> AppResult<Vec<ItemId>> {
        let mut ids: Vec<ItemId> = self
            .items
            .iter()
            .filter(|e| e.value().folder.is_some_and(|f| folders.contains(&f)))
            .map(|e| *e.key())
            .collect();
        ids.sort();
        Ok(ids)
    }

    async fn count_items_by_tag(&self, folder: Option<FolderId>) -> AppResult<u64> {
        Ok(self.attachments().filter(|item| item.folder == folder).count() as u64)
    }

    async fn tag_counts(&self) -> AppResult<HashMap<FolderId, u64>> {
        let mut counts = HashMap::new();
        for item in self.attachments() {
            if let Some(folder) = item.folder {
                *counts.entry(folder).or_insert(0) += 1;
            }
        }
        Ok(counts)
    }

    async fn count_all(&self) -> AppResult<u64> {
        Ok(self.attachments().count() as u64)
    }
}
