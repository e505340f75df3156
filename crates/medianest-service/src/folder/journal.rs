//! Record of item tags overwritten by an operation, for rollback.

use std::collections::BTreeMap;

use tracing::error;

use medianest_core::result::AppResult;
use medianest_core::traits::ItemStore;
use medianest_core::types::{FolderId, ItemId};

/// Prior folder tag of every item an operation is about to retag.
#[derive(Debug, Default)]
pub(crate) struct TagJournal {
    entries: BTreeMap<Option<FolderId>, Vec<ItemId>>,
}

impl TagJournal {
    /// Remember that `id` was tagged with `prior`.
    pub(crate) fn record(&mut self, prior: Option<FolderId>, id: ItemId) {
        self.entries.entry(prior).or_default().push(id);
    }

    /// Remember that all of `ids` were tagged with `prior`.
    pub(crate) fn record_all(&mut self, prior: Option<FolderId>, ids: Vec<ItemId>) {
        if !ids.is_empty() {
            self.entries.entry(prior).or_default().extend(ids);
        }
    }

    /// Every journaled item.
    pub(crate) fn items(&self) -> Vec<ItemId> {
        self.entries.values().flatten().copied().collect()
    }

    /// Folders that held the journaled items.
    pub(crate) fn prior_folders(&self) -> impl Iterator<Item = Option<FolderId>> + '_ {
        self.entries.keys().copied()
    }

    /// Put every journaled item back on its prior tag.
    pub(crate) async fn restore(&self, items: &dyn ItemStore) -> AppResult<()> {
        for (prior, ids) in &self.entries {
            items.set_item_tags(ids, *prior).await?;
        }
        Ok(())
    }

    /// Restore, logging instead of failing. The caller is already returning
    /// the error that triggered the rollback.
    pub(crate) async fn rollback(&self, items: &dyn ItemStore) {
        if let Err(e) = self.restore(items).await {
            error!(error = %e, items = self.items().len(), "Failed to restore item folders");
        }
    }
}
