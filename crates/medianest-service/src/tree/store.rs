//! Authoritative folder hierarchy with invariant-preserving mutations.

use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap, HashSet, VecDeque};

use chrono::Utc;

use medianest_core::error::AppError;
use medianest_core::result::AppResult;
use medianest_core::types::FolderId;
use medianest_entity::folder::{FlatFolder, Folder, FolderNode, SYSTEM_SLUG};

use super::name::unique_slug;

/// The canonical set of folders.
///
/// Every mutation validates before it changes anything, so a failed call
/// leaves the store untouched. Invariants:
///
/// * every parent is either [`FolderId::ROOT`] or a stored folder, and
///   following parents always reaches the root (no cycles);
/// * sibling names are unique ignoring case;
/// * slugs are unique across the store;
/// * at most one folder is the system folder, and it is never renamed,
///   moved or removed.
#[derive(Debug, Clone, Default)]
pub struct TreeStore {
    folders: BTreeMap<FolderId, Folder>,
    system_id: Option<FolderId>,
    next_id: i64,
}

impl TreeStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self {
            folders: BTreeMap::new(),
            system_id: None,
            next_id: 1,
        }
    }

    /// Build a store from persisted folders, checking every invariant.
    pub fn from_folders(folders: Vec<Folder>) -> AppResult<Self> {
        let mut store = Self::new();
        for mut folder in folders {
            if folder.id.get() <= 0 {
                return Err(AppError::validation(format!(
                    "Stored folder has invalid id {}",
                    folder.id
                )));
            }
            if folder.slug == SYSTEM_SLUG {
                folder.is_system = true;
            }
            if folder.is_system {
                if let Some(existing) = store.system_id {
                    return Err(AppError::validation(format!(
                        "Both folder {existing} and folder {} claim to be the system folder",
                        folder.id
                    )));
                }
                store.system_id = Some(folder.id);
            }
            store.next_id = store.next_id.max(folder.id.get() + 1);
            if store.folders.insert(folder.id, folder).is_some() {
                return Err(AppError::validation("Stored folders contain a duplicate id"));
            }
        }
        store.check_structure()?;
        Ok(store)
    }

    fn check_structure(&self) -> AppResult<()> {
        let mut slugs = HashSet::new();
        let mut sibling_names = HashSet::new();
        for folder in self.folders.values() {
            if !folder.parent.is_root() && !self.folders.contains_key(&folder.parent) {
                return Err(AppError::not_found(format!(
                    "Folder {} references missing parent {}",
                    folder.id, folder.parent
                )));
            }
            if !slugs.insert(folder.slug.as_str()) {
                return Err(AppError::validation(format!(
                    "Slug '{}' is used more than once",
                    folder.slug
                )));
            }
            if !sibling_names.insert((folder.parent, folder.name.to_lowercase())) {
                return Err(AppError::validation(format!(
                    "Folder name '{}' appears twice under parent {}",
                    folder.name, folder.parent
                )));
            }
        }
        for id in self.folders.keys() {
            // A chain longer than the store itself can only be a loop.
            let mut current = *id;
            let mut steps = 0;
            while let Some(folder) = self.folders.get(&current) {
                current = folder.parent;
                steps += 1;
                if steps > self.folders.len() {
                    return Err(AppError::cycle(format!(
                        "Folder {id} is part of a parent cycle"
                    )));
                }
            }
        }
        Ok(())
    }

    /// Look up a folder.
    pub fn get(&self, id: FolderId) -> Option<&Folder> {
        self.folders.get(&id)
    }

    /// Look up a folder, failing with `NotFound`.
    pub fn require(&self, id: FolderId) -> AppResult<&Folder> {
        self.folders
            .get(&id)
            .ok_or_else(|| AppError::not_found(format!("Folder {id} not found")))
    }

    /// Whether `id` is a stored folder.
    pub fn contains(&self, id: FolderId) -> bool {
        self.folders.contains_key(&id)
    }

    /// Number of folders.
    pub fn len(&self) -> usize {
        self.folders.len()
    }

    /// Whether the store holds no folders.
    pub fn is_empty(&self) -> bool {
        self.folders.is_empty()
    }

    /// All folder ids in ascending order.
    pub fn ids(&self) -> impl Iterator<Item = FolderId> + '_ {
        self.folders.keys().copied()
    }

    /// Id of the system folder, once it exists.
    pub fn system_id(&self) -> Option<FolderId> {
        self.system_id
    }

    /// Whether `id` is the system folder.
    pub fn is_system(&self, id: FolderId) -> bool {
        self.system_id == Some(id)
    }

    /// Create the system folder if it does not exist yet.
    ///
    /// A top-level folder already carrying `name` is adopted instead of
    /// creating a sibling with the same name. Returns the folder when it was
    /// created or adopted.
    pub fn ensure_system_folder(&mut self, name: &str) -> AppResult<Option<Folder>> {
        if self.system_id.is_some() {
            return Ok(None);
        }
        let name = name.trim();
        if name.is_empty() {
            return Err(AppError::validation("System folder name cannot be empty"));
        }

        let slug_free = !self.slug_taken(SYSTEM_SLUG, None);
        let now = Utc::now();
        let folder = match self.sibling_named(FolderId::ROOT, name, None) {
            Some(existing) => {
                let mut adopted = self.require(existing)?.clone();
                adopted.is_system = true;
                if slug_free {
                    adopted.slug = SYSTEM_SLUG.to_string();
                }
                adopted.updated_at = now;
                adopted
            }
            None => {
                if !slug_free {
                    return Err(AppError::validation(format!(
                        "Slug '{SYSTEM_SLUG}' is held by a non-system folder"
                    )));
                }
                Folder {
                    id: self.allocate_id(),
                    name: name.to_string(),
                    slug: SYSTEM_SLUG.to_string(),
                    parent: FolderId::ROOT,
                    count: 0,
                    is_system: true,
                    created_at: now,
                    updated_at: now,
                }
            }
        };

        self.system_id = Some(folder.id);
        self.folders.insert(folder.id, folder.clone());
        Ok(Some(folder))
    }

    /// Direct children of `parent`, ordered by name.
    pub fn children_of(&self, parent: FolderId) -> Vec<&Folder> {
        let mut children: Vec<&Folder> = self
            .folders
            .values()
            .filter(|f| f.parent == parent)
            .collect();
        children.sort_by(|a, b| name_order(a, b));
        children
    }

    fn child_index(&self) -> HashMap<FolderId, Vec<&Folder>> {
        let mut index: HashMap<FolderId, Vec<&Folder>> = HashMap::new();
        for folder in self.folders.values() {
            index.entry(folder.parent).or_default().push(folder);
        }
        for children in index.values_mut() {
            children.sort_by(|a, b| name_order(a, b));
        }
        index
    }

    /// Nested tree of the folders below `parent`.
    pub fn tree(&self, parent: FolderId) -> Vec<FolderNode> {
        let index = self.child_index();
        build_nodes(&index, parent)
    }

    /// Every folder, depth-first in tree order, with its depth.
    pub fn flat(&self) -> Vec<FlatFolder> {
        let index = self.child_index();
        let mut out = Vec::with_capacity(self.folders.len());
        let mut stack: Vec<(&Folder, usize)> = index
            .get(&FolderId::ROOT)
            .map(|roots| roots.iter().rev().map(|f| (*f, 0)).collect())
            .unwrap_or_default();

        while let Some((folder, depth)) = stack.pop() {
            out.push(FlatFolder {
                id: folder.id,
                name: folder.name.clone(),
                slug: folder.slug.clone(),
                parent: folder.parent,
                count: folder.count,
                depth,
                is_system: folder.is_system,
            });
            if let Some(children) = index.get(&folder.id) {
                stack.extend(children.iter().rev().map(|c| (*c, depth + 1)));
            }
        }
        out
    }

    /// Parent chain of `id`, nearest first, excluding the root sentinel.
    pub fn ancestors(&self, id: FolderId) -> Vec<FolderId> {
        let mut chain = Vec::new();
        let mut current = self.folders.get(&id).map(|f| f.parent);
        while let Some(parent) = current {
            if parent.is_root() || chain.len() > self.folders.len() {
                break;
            }
            chain.push(parent);
            current = self.folders.get(&parent).map(|f| f.parent);
        }
        chain
    }

    /// Number of ancestors of `id`.
    pub fn depth(&self, id: FolderId) -> usize {
        self.ancestors(id).len()
    }

    /// Whether `candidate` lies strictly below `ancestor`.
    pub fn is_descendant(&self, candidate: FolderId, ancestor: FolderId) -> bool {
        self.ancestors(candidate).contains(&ancestor)
    }

    /// Every folder below `id`, breadth-first. Reversing the result gives
    /// an order in which each folder comes before its parent.
    pub fn descendants(&self, id: FolderId) -> Vec<FolderId> {
        let index = self.child_index();
        let mut out = Vec::new();
        let mut queue = VecDeque::from([id]);
        while let Some(current) = queue.pop_front() {
            if let Some(children) = index.get(&current) {
                for child in children {
                    out.push(child.id);
                    queue.push_back(child.id);
                }
            }
        }
        out
    }

    /// Add a folder under `parent` with a zero count.
    pub fn insert(&mut self, name: &str, parent: FolderId) -> AppResult<Folder> {
        let name = checked_name(name)?;
        if !parent.is_root() {
            self.require(parent)?;
        }
        if self.sibling_named(parent, name, None).is_some() {
            return Err(AppError::validation(format!(
                "A folder named '{name}' already exists here"
            )));
        }

        let now = Utc::now();
        let folder = Folder {
            id: self.allocate_id(),
            name: name.to_string(),
            slug: unique_slug(name, |s| self.slug_taken(s, None)),
            parent,
            count: 0,
            is_system: false,
            created_at: now,
            updated_at: now,
        };
        self.folders.insert(folder.id, folder.clone());
        Ok(folder)
    }

    /// Change a folder's name and regenerate its slug.
    pub fn rename(&mut self, id: FolderId, name: &str) -> AppResult<Folder> {
        let name = checked_name(name)?;
        let parent = self.require_mutable(id, "renamed")?.parent;
        if self.sibling_named(parent, name, Some(id)).is_some() {
            return Err(AppError::validation(format!(
                "A folder named '{name}' already exists here"
            )));
        }

        let slug = unique_slug(name, |s| self.slug_taken(s, Some(id)));
        let folder = self.folder_mut(id)?;
        folder.name = name.to_string();
        folder.slug = slug;
        folder.updated_at = Utc::now();
        Ok(folder.clone())
    }

    /// Move a folder under `new_parent`. Only the parent changes; the
    /// folder keeps its id, name, slug and count.
    pub fn reparent(&mut self, id: FolderId, new_parent: FolderId) -> AppResult<Folder> {
        let current = self.require_mutable(id, "moved")?;
        if current.parent == new_parent {
            return Ok(current.clone());
        }
        let name = current.name.clone();
        if new_parent == id {
            return Err(AppError::cycle("A folder cannot be its own parent"));
        }
        if !new_parent.is_root() {
            self.require(new_parent)?;
            if self.is_descendant(new_parent, id) {
                return Err(AppError::cycle(
                    "Cannot move a folder into one of its own subfolders",
                ));
            }
        }
        if self.sibling_named(new_parent, &name, Some(id)).is_some() {
            return Err(AppError::validation(format!(
                "A folder named '{name}' already exists in the destination"
            )));
        }

        let folder = self.folder_mut(id)?;
        folder.parent = new_parent;
        folder.updated_at = Utc::now();
        Ok(folder.clone())
    }

    /// Remove a folder that has no child folders left.
    pub fn remove(&mut self, id: FolderId) -> AppResult<Folder> {
        self.require_mutable(id, "deleted")?;
        if self.folders.values().any(|f| f.parent == id) {
            return Err(AppError::validation(format!(
                "Folder {id} still has subfolders"
            )));
        }
        self.folders
            .remove(&id)
            .ok_or_else(|| AppError::not_found(format!("Folder {id} not found")))
    }

    /// Store a recomputed item count. Returns whether the value changed.
    pub fn set_count(&mut self, id: FolderId, count: u64) -> AppResult<bool> {
        let folder = self.folder_mut(id)?;
        if folder.count == count {
            return Ok(false);
        }
        folder.count = count;
        folder.updated_at = Utc::now();
        Ok(true)
    }

    fn require_mutable(&self, id: FolderId, verb: &str) -> AppResult<&Folder> {
        let folder = self.require(id)?;
        if folder.is_system {
            return Err(AppError::system_protected(format!(
                "The '{}' folder cannot be {verb}",
                folder.name
            )));
        }
        Ok(folder)
    }

    fn folder_mut(&mut self, id: FolderId) -> AppResult<&mut Folder> {
        self.folders
            .get_mut(&id)
            .ok_or_else(|| AppError::not_found(format!("Folder {id} not found")))
    }

    fn sibling_named(
        &self,
        parent: FolderId,
        name: &str,
        exclude: Option<FolderId>,
    ) -> Option<FolderId> {
        let wanted = name.to_lowercase();
        self.folders
            .values()
            .find(|f| f.parent == parent && Some(f.id) != exclude && f.name.to_lowercase() == wanted)
            .map(|f| f.id)
    }

    fn slug_taken(&self, slug: &str, exclude: Option<FolderId>) -> bool {
        self.folders
            .values()
            .any(|f| f.slug == slug && Some(f.id) != exclude)
    }

    fn allocate_id(&mut self) -> FolderId {
        let id = FolderId(self.next_id.max(1));
        self.next_id = id.get() + 1;
        id
    }
}

fn checked_name(name: &str) -> AppResult<&str> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(AppError::validation("Folder name cannot be empty"));
    }
    Ok(trimmed)
}

fn name_order(a: &Folder, b: &Folder) -> Ordering {
    a.name
        .to_lowercase()
        .cmp(&b.name.to_lowercase())
        .then_with(|| a.name.cmp(&b.name))
        .then_with(|| a.id.cmp(&b.id))
}

fn build_nodes(index: &HashMap<FolderId, Vec<&Folder>>, parent: FolderId) -> Vec<FolderNode> {
    index
        .get(&parent)
        .map(|children| {
            children
                .iter()
                .map(|folder| {
                    let mut node = FolderNode::leaf(folder);
                    node.children = build_nodes(index, folder.id);
                    node
                })
                .collect()
        })
        .unwrap_or_default()
}
