//! Folder operations as atomic units over the tree, the folder repository
//! and the item store.

use std::collections::BTreeSet;
use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use medianest_core::config::folders::FolderConfig;
use medianest_core::error::AppError;
use medianest_core::result::AppResult;
use medianest_core::traits::{AuthorizationGate, ItemStore};
use medianest_core::types::{FolderFilter, FolderId, ItemId, PageRequest};
use medianest_database::{FolderChangeSet, FolderRepository};
use medianest_entity::action::{AssignOutcome, DeleteOutcome, FolderContents, FolderMutation};
use medianest_entity::folder::{Folder, FolderSnapshot};

use crate::context::RequestContext;
use crate::query::QueryFilter;
use crate::tree::{TreeStore, sanitize_name};

use super::journal::TagJournal;

/// Runs folder operations.
///
/// The tree lives behind one lock. Each mutation holds the write lock for
/// its whole duration and works on a cloned draft: item store writes go
/// first, then the folder rows are persisted, and only then does the draft
/// replace the live tree. When a step fails, item tags already written are
/// restored and the live tree is left as it was.
#[derive(Debug)]
pub struct FolderService {
    tree: RwLock<TreeStore>,
    folders: Arc<dyn FolderRepository>,
    items: Arc<dyn ItemStore>,
    gate: Arc<dyn AuthorizationGate>,
    config: FolderConfig,
}

impl FolderService {
    /// Load the stored tree, create the system folder if needed and bring
    /// every count in line with the item store.
    pub async fn load(
        folders: Arc<dyn FolderRepository>,
        items: Arc<dyn ItemStore>,
        gate: Arc<dyn AuthorizationGate>,
        config: FolderConfig,
    ) -> AppResult<Self> {
        let stored = folders.load_all().await?;
        let mut tree = TreeStore::from_folders(stored)?;
        let mut changes = FolderChangeSet::default();

        if let Some(system) = tree.ensure_system_folder(&config.system_folder_name)? {
            info!(folder_id = %system.id, name = %system.name, "System folder created");
            changes.upsert(system);
        }

        let service = Self {
            tree: RwLock::new(TreeStore::new()),
            folders,
            items,
            gate,
            config,
        };
        service.reconcile(&mut tree, &mut changes).await?;
        service.folders.apply(&changes).await?;

        info!(
            folders = tree.len(),
            recounted = changes.upserts.len(),
            "Folder tree loaded"
        );
        *service.tree.write().await = tree;
        Ok(service)
    }

    /// Snapshot of the whole tree.
    pub async fn get_folders(&self, ctx: &RequestContext) -> AppResult<FolderSnapshot> {
        let tree = self.tree.read().await;
        debug!(request_id = %ctx.request_id, folders = tree.len(), "Folder snapshot requested");
        self.snapshot(&tree).await
    }

    /// Create a folder under `parent` (`0` for top level).
    pub async fn create_folder(
        &self,
        ctx: &RequestContext,
        name: &str,
        parent: FolderId,
    ) -> AppResult<FolderMutation> {
        self.authorize(ctx, "createFolder")?;
        let name = sanitize_name(name, self.config.max_name_length)?;

        let mut tree = self.tree.write().await;
        let mut draft = tree.clone();
        let folder = draft.insert(&name, parent)?;

        let mut changes = FolderChangeSet::default();
        changes.upsert(folder.clone());
        self.folders.apply(&changes).await?;

        let snapshot = self.snapshot(&draft).await?;
        *tree = draft;

        info!(
            request_id = %ctx.request_id,
            folder_id = %folder.id,
            parent_id = %folder.parent,
            name = %folder.name,
            "Folder created"
        );
        Ok(FolderMutation { folder, snapshot })
    }

    /// Rename a folder.
    pub async fn rename_folder(
        &self,
        ctx: &RequestContext,
        folder_id: FolderId,
        name: &str,
    ) -> AppResult<FolderMutation> {
        self.authorize(ctx, "renameFolder")?;
        let name = sanitize_name(name, self.config.max_name_length)?;

        let mut tree = self.tree.write().await;
        let old_name = tree.require(folder_id)?.name.clone();
        let mut draft = tree.clone();
        let folder = draft.rename(folder_id, &name)?;

        let mut changes = FolderChangeSet::default();
        changes.upsert(folder.clone());
        self.folders.apply(&changes).await?;

        let snapshot = self.snapshot(&draft).await?;
        *tree = draft;

        info!(
            request_id = %ctx.request_id,
            folder_id = %folder.id,
            old_name = %old_name,
            new_name = %folder.name,
            "Folder renamed"
        );
        Ok(FolderMutation { folder, snapshot })
    }

    /// Move a folder under `new_parent` (`0` for top level).
    pub async fn move_folder(
        &self,
        ctx: &RequestContext,
        folder_id: FolderId,
        new_parent: FolderId,
    ) -> AppResult<FolderMutation> {
        self.authorize(ctx, "moveFolder")?;

        let mut tree = self.tree.write().await;
        let old_parent = tree.require(folder_id)?.parent;
        let mut draft = tree.clone();
        let folder = draft.reparent(folder_id, new_parent)?;

        if folder.parent != old_parent {
            let mut changes = FolderChangeSet::default();
            changes.upsert(folder.clone());
            self.folders.apply(&changes).await?;
        }

        let snapshot = self.snapshot(&draft).await?;
        *tree = draft;

        info!(
            request_id = %ctx.request_id,
            folder_id = %folder.id,
            from = %old_parent,
            to = %folder.parent,
            "Folder moved"
        );
        Ok(FolderMutation { folder, snapshot })
    }

    /// Delete a folder with all of its descendants.
    ///
    /// Items filed anywhere in the subtree are moved to the system folder in
    /// one batch (or untagged when `reassign` is false, which leaves them
    /// implicitly uncategorized). Folders are removed deepest first.
    pub async fn delete_folder(
        &self,
        ctx: &RequestContext,
        folder_id: FolderId,
        reassign: bool,
    ) -> AppResult<DeleteOutcome> {
        self.authorize(ctx, "deleteFolder")?;

        let mut tree = self.tree.write().await;
        let folder = tree.require(folder_id)?.clone();
        if folder.is_system {
            return Err(AppError::system_protected(format!(
                "The '{}' folder cannot be deleted",
                folder.name
            )));
        }
        let system_id = self.system_id(&tree)?;

        let descendants = tree.descendants(folder_id);
        let order: Vec<FolderId> = descendants
            .iter()
            .rev()
            .copied()
            .chain(std::iter::once(folder_id))
            .collect();

        let mut journal = TagJournal::default();
        let mut reassigned = 0;
        for id in &order {
            reassigned += self.items.count_items_by_tag(Some(*id)).await?;
            let ids = self.items.items_in_folders(&[*id]).await?;
            journal.record_all(Some(*id), ids);
        }

        // Non-attachments follow their folder but are not counted.
        let moved = journal.items();
        let target = reassign.then_some(system_id);
        self.items.set_item_tags(&moved, target).await?;

        let result = async {
            let mut draft = tree.clone();
            let mut changes = FolderChangeSet::default();
            for id in &order {
                draft.remove(*id)?;
                changes.remove(*id);
            }
            self.recount(&mut draft, [system_id], &mut changes).await?;
            self.folders.apply(&changes).await?;
            let snapshot = self.snapshot(&draft).await?;
            Ok::<_, AppError>((draft, snapshot))
        }
        .await;

        let (draft, snapshot) = match result {
            Ok(done) => done,
            Err(e) => {
                journal.rollback(self.items.as_ref()).await;
                return Err(e);
            }
        };
        *tree = draft;

        info!(
            request_id = %ctx.request_id,
            folder_id = %folder_id,
            name = %folder.name,
            descendants = descendants.len(),
            reassigned_items = reassigned,
            reassign,
            "Folder deleted"
        );
        Ok(DeleteOutcome {
            deleted: order,
            reassigned_items: reassigned,
            snapshot,
        })
    }

    /// File items into `folder_id`, replacing each item's previous folder.
    ///
    /// Ids that do not exist or are not attachments are skipped and
    /// reported. Counts of the target and of every previous folder are
    /// recomputed.
    pub async fn assign_items(
        &self,
        ctx: &RequestContext,
        item_ids: &[ItemId],
        folder_id: FolderId,
    ) -> AppResult<AssignOutcome> {
        self.authorize(ctx, "assignMedia")?;
        if item_ids.is_empty() {
            return Err(AppError::validation("No items selected"));
        }

        let mut tree = self.tree.write().await;
        tree.require(folder_id)?;

        let mut seen = BTreeSet::new();
        let mut journal = TagJournal::default();
        let mut skipped = Vec::new();
        for id in item_ids.iter().copied().filter(|id| seen.insert(*id)) {
            match self.items.find_item(id).await? {
                Some(item) if item.is_attachment() => journal.record(item.folder, id),
                _ => skipped.push(id),
            }
        }

        let accepted = journal.items();
        if accepted.is_empty() {
            warn!(
                request_id = %ctx.request_id,
                folder_id = %folder_id,
                skipped = skipped.len(),
                "No assignable items in request"
            );
            let snapshot = self.snapshot(&tree).await?;
            return Ok(AssignOutcome {
                folder_id,
                assigned: 0,
                skipped,
                snapshot,
            });
        }

        self.items.set_item_tags(&accepted, Some(folder_id)).await?;

        let result = async {
            let mut affected: BTreeSet<FolderId> = BTreeSet::from([folder_id]);
            for prior in journal.prior_folders() {
                match prior {
                    Some(id) => affected.insert(id),
                    None => affected.insert(self.system_id(&tree)?),
                };
            }

            let mut draft = tree.clone();
            let mut changes = FolderChangeSet::default();
            self.recount(&mut draft, affected, &mut changes).await?;
            self.folders.apply(&changes).await?;
            let snapshot = self.snapshot(&draft).await?;
            Ok::<_, AppError>((draft, snapshot))
        }
        .await;

        let (draft, snapshot) = match result {
            Ok(done) => done,
            Err(e) => {
                journal.rollback(self.items.as_ref()).await;
                return Err(e);
            }
        };
        *tree = draft;

        info!(
            request_id = %ctx.request_id,
            folder_id = %folder_id,
            assigned = accepted.len(),
            skipped = skipped.len(),
            "Items assigned"
        );
        Ok(AssignOutcome {
            folder_id,
            assigned: accepted.len() as u64,
            skipped,
            snapshot,
        })
    }

    /// One page of the items in the selected folder, newest first.
    pub async fn folder_contents(
        &self,
        ctx: &RequestContext,
        filter: FolderFilter,
        page: Option<u64>,
        per_page: Option<u64>,
    ) -> AppResult<FolderContents> {
        let tree = self.tree.read().await;
        let predicate = QueryFilter::new(&tree).predicate(filter)?;
        let request = PageRequest::bounded(
            page.unwrap_or(1),
            per_page.unwrap_or(self.config.default_page_size),
            self.config.max_page_size,
        );
        let page = self.items.list_items(&predicate, &request).await?;

        debug!(
            request_id = %ctx.request_id,
            folder = %filter,
            page = page.page,
            total = page.total_items,
            "Folder contents listed"
        );
        Ok(FolderContents {
            folder_id: filter,
            page,
        })
    }

    /// Recompute every folder count from the item store and persist the
    /// ones that drifted.
    pub async fn reconcile_counts(&self) -> AppResult<usize> {
        let mut tree = self.tree.write().await;
        let mut draft = tree.clone();
        let mut changes = FolderChangeSet::default();
        self.reconcile(&mut draft, &mut changes).await?;
        self.folders.apply(&changes).await?;
        *tree = draft;
        Ok(changes.upserts.len())
    }

    /// Current copy of a folder.
    pub async fn folder(&self, folder_id: FolderId) -> AppResult<Folder> {
        Ok(self.tree.read().await.require(folder_id)?.clone())
    }

    fn authorize(&self, ctx: &RequestContext, action: &str) -> AppResult<()> {
        if self.gate.can_manage_folders(&ctx.principal) {
            return Ok(());
        }
        warn!(
            request_id = %ctx.request_id,
            principal = %ctx.principal.label(),
            action,
            "Folder management denied"
        );
        Err(AppError::permission_denied(
            "You do not have permission to manage folders",
        ))
    }

    fn system_id(&self, tree: &TreeStore) -> AppResult<FolderId> {
        tree.system_id()
            .ok_or_else(|| AppError::internal("System folder is missing"))
    }

    async fn snapshot(&self, tree: &TreeStore) -> AppResult<FolderSnapshot> {
        Ok(FolderSnapshot {
            tree: tree.tree(FolderId::ROOT),
            flat: tree.flat(),
            total_count: self.items.count_all().await?,
        })
    }

    async fn count_for(&self, tree: &TreeStore, id: FolderId) -> AppResult<u64> {
        let mut count = self.items.count_items_by_tag(Some(id)).await?;
        if tree.is_system(id) {
            count += self.items.count_items_by_tag(None).await?;
        }
        Ok(count)
    }

    async fn recount(
        &self,
        draft: &mut TreeStore,
        ids: impl IntoIterator<Item = FolderId>,
        changes: &mut FolderChangeSet,
    ) -> AppResult<()> {
        for id in ids {
            if !draft.contains(id) {
                continue;
            }
            let count = self.count_for(draft, id).await?;
            if draft.set_count(id, count)? {
                changes.upsert(draft.require(id)?.clone());
            }
        }
        Ok(())
    }

    async fn reconcile(&self, tree: &mut TreeStore, changes: &mut FolderChangeSet) -> AppResult<()> {
        let tagged = self.items.tag_counts().await?;
        let untagged = self.items.count_items_by_tag(None).await?;
        let ids: Vec<FolderId> = tree.ids().collect();
        for id in ids {
            let mut count = tagged.get(&id).copied().unwrap_or(0);
            if tree.is_system(id) {
                count += untagged;
            }
            if tree.set_count(id, count)? {
                changes.upsert(tree.require(id)?.clone());
            }
        }
        Ok(())
    }
}
