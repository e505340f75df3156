//! Translates the active folder selection into an item store predicate.

use medianest_core::result::AppResult;
use medianest_core::types::{FolderFilter, ItemPredicate};

use crate::tree::TreeStore;

/// Resolves [`FolderFilter`] values against the current tree.
#[derive(Debug, Clone, Copy)]
pub struct QueryFilter<'a> {
    tree: &'a TreeStore,
}

impl<'a> QueryFilter<'a> {
    /// Create a filter bound to `tree`.
    pub fn new(tree: &'a TreeStore) -> Self {
        Self { tree }
    }

    /// Predicate for `filter`.
    ///
    /// A folder selection matches items tagged with exactly that folder,
    /// never its descendants. Selecting the system folder also matches
    /// untagged items. Unknown folders fail with `NotFound`.
    pub fn predicate(&self, filter: FolderFilter) -> AppResult<ItemPredicate> {
        match filter {
            FolderFilter::Unfiltered => Ok(ItemPredicate::All),
            FolderFilter::Folder(id) => {
                let folder = self.tree.require(id)?;
                Ok(ItemPredicate::InFolder {
                    folder: folder.id,
                    include_untagged: folder.is_system,
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use medianest_core::ErrorKind;
    use medianest_core::types::FolderId;

    #[test]
    fn test_predicates() {
        let mut tree = TreeStore::new();
        let system = tree.ensure_system_folder("Uncategorized").unwrap().unwrap();
        let logos = tree.insert("Logos", FolderId::ROOT).unwrap();
        let filter = QueryFilter::new(&tree);

        assert_eq!(
            filter.predicate(FolderFilter::Unfiltered).unwrap(),
            ItemPredicate::All
        );
        assert_eq!(
            filter.predicate(FolderFilter::Folder(logos.id)).unwrap(),
            ItemPredicate::InFolder {
                folder: logos.id,
                include_untagged: false,
            }
        );
        assert_eq!(
            filter.predicate(FolderFilter::Folder(system.id)).unwrap(),
            ItemPredicate::InFolder {
                folder: system.id,
                include_untagged: true,
            }
        );
    }

    #[test]
    fn test_all_sentinel_matches_unfiltered() {
        let tree = TreeStore::new();
        let filter = QueryFilter::new(&tree);
        let legacy = FolderFilter::from_raw(-1).unwrap();
        assert_eq!(
            filter.predicate(legacy).unwrap(),
            filter.predicate(FolderFilter::Unfiltered).unwrap()
        );
    }

    #[test]
    fn test_unknown_folder() {
        let tree = TreeStore::new();
        let err = QueryFilter::new(&tree)
            .predicate(FolderFilter::Folder(FolderId(77)))
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::NotFound);
    }
}
