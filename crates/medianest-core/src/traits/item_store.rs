//! Item store trait for the external media collection.

use std::collections::HashMap;

use async_trait::async_trait;

use crate::result::AppResult;
use crate::types::filter::ItemPredicate;
use crate::types::id::{FolderId, ItemId};
use crate::types::item::{ItemKind, MediaItem};
use crate::types::pagination::{PageRequest, PageResponse};

/// Opaque store of media items keyed by integer id.
///
/// Each item carries at most one folder tag. The store knows nothing about
/// the folder hierarchy; it filters and counts by tag only.
#[async_trait]
pub trait ItemStore: Send + Sync + std::fmt::Debug + 'static {
    /// List items matching `predicate`, newest first.
    async fn list_items(
        &self,
        predicate: &ItemPredicate,
        page: &PageRequest,
    ) -> AppResult<PageResponse<MediaItem>>;

    /// Fetch a single item.
    async fn find_item(&self, id: ItemId) -> AppResult<Option<MediaItem>>;

    /// Overwrite the folder tag of every listed item in one batch.
    /// `None` clears the tag. Returns the number of items updated.
    async fn set_item_tags(&self, ids: &[ItemId], folder: Option<FolderId>) -> AppResult<u64>;

    /// Ids of all items tagged with any of `folders`.
    async fn items_in_folders(&self, folders: &[FolderId]) -> AppResult<Vec<ItemId>>;

    /// Number of items tagged with `folder`; `None` counts untagged items.
    async fn count_items_by_tag(&self, folder: Option<FolderId>) -> AppResult<u64>;

    /// Number of items per folder tag, for every tag in use.
    async fn tag_counts(&self) -> AppResult<HashMap<FolderId, u64>>;

    /// Total number of items.
    async fn count_all(&self) -> AppResult<u64>;

    /// Kind of an item, or `None` when it does not exist.
    async fn item_kind(&self, id: ItemId) -> AppResult<Option<ItemKind>> {
        Ok(self.find_item(id).await?.map(|item| item.kind))
    }

    /// Current folder tag of an item. Missing items report `None`.
    async fn item_folder(&self, id: ItemId) -> AppResult<Option<FolderId>> {
        Ok(self.find_item(id).await?.and_then(|item| item.folder))
    }

    /// Overwrite the folder tag of a single item.
    async fn set_item_tag(&self, id: ItemId, folder: Option<FolderId>) -> AppResult<()> {
        self.set_item_tags(&[id], folder).await.map(|_| ())
    }
}
