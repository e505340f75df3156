//! Client tree controller.
//!
//! Holds the last snapshot received from the server together with local UI
//! state (selection, expanded folders, drag visuals). Every successful
//! mutation reply carries a full snapshot which replaces the local one
//! wholesale; nothing is patched in place. Requests are never coalesced or
//! cancelled, so the reply that arrives last wins.

use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde::de::DeserializeOwned;
use tracing::{debug, info};

use medianest_core::result::AppResult;
use medianest_core::types::{FolderFilter, FolderId, ItemId};
use medianest_entity::action::{
    AssignOutcome, DeleteOutcome, FolderAction, FolderContents, FolderMutation,
};
use medianest_entity::folder::{Folder, FolderSnapshot};

use crate::dnd::{DragDropSurface, DropCommand, DropGesture, DropTarget};
use crate::notify::{Notifier, SelectionListener};
use crate::render::{self, DragVisual, MenuAction, RenderedTree, SelectOption};
use crate::transport::{self, FolderTransport};

/// Whether requests are outstanding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Showing the last snapshot.
    Idle,
    /// One or more requests in flight.
    Pending,
}

#[derive(Debug, Default)]
struct ControllerState {
    in_flight: usize,
    selected: FolderFilter,
    expanded: HashSet<FolderId>,
    snapshot: FolderSnapshot,
    generation: u64,
    drag: DragVisual,
}

/// Replies that carry a full snapshot.
trait CarriesSnapshot {
    fn snapshot(&self) -> &FolderSnapshot;
}

impl CarriesSnapshot for FolderSnapshot {
    fn snapshot(&self) -> &FolderSnapshot {
        self
    }
}

impl CarriesSnapshot for FolderMutation {
    fn snapshot(&self) -> &FolderSnapshot {
        &self.snapshot
    }
}

impl CarriesSnapshot for DeleteOutcome {
    fn snapshot(&self) -> &FolderSnapshot {
        &self.snapshot
    }
}

impl CarriesSnapshot for AssignOutcome {
    fn snapshot(&self) -> &FolderSnapshot {
        &self.snapshot
    }
}

/// Keeps the in-flight counter balanced across early returns.
struct InFlight<'a> {
    state: &'a Mutex<ControllerState>,
}

impl<'a> InFlight<'a> {
    fn start(state: &'a Mutex<ControllerState>) -> Self {
        lock(state).in_flight += 1;
        Self { state }
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        let mut state = lock(self.state);
        state.in_flight = state.in_flight.saturating_sub(1);
    }
}

fn lock(state: &Mutex<ControllerState>) -> MutexGuard<'_, ControllerState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Synchronizes a local folder tree with the server.
pub struct TreeController {
    transport: Arc<dyn FolderTransport>,
    notifier: Arc<dyn Notifier>,
    listener: Arc<dyn SelectionListener>,
    state: Mutex<ControllerState>,
}

impl std::fmt::Debug for TreeController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = lock(&self.state);
        f.debug_struct("TreeController")
            .field("generation", &state.generation)
            .field("in_flight", &state.in_flight)
            .field("selected", &state.selected)
            .finish()
    }
}

impl TreeController {
    /// Create a controller with an empty snapshot. Call [`refresh`] to load.
    ///
    /// [`refresh`]: TreeController::refresh
    pub fn new(
        transport: Arc<dyn FolderTransport>,
        notifier: Arc<dyn Notifier>,
        listener: Arc<dyn SelectionListener>,
    ) -> Self {
        Self {
            transport,
            notifier,
            listener,
            state: Mutex::new(ControllerState::default()),
        }
    }

    /// Current phase.
    pub fn phase(&self) -> Phase {
        if lock(&self.state).in_flight > 0 {
            Phase::Pending
        } else {
            Phase::Idle
        }
    }

    /// Copy of the current snapshot.
    pub fn snapshot(&self) -> FolderSnapshot {
        lock(&self.state).snapshot.clone()
    }

    /// Generation of the current snapshot. Bumped on every replacement.
    pub fn generation(&self) -> u64 {
        lock(&self.state).generation
    }

    /// Current selection.
    pub fn selected(&self) -> FolderFilter {
        lock(&self.state).selected
    }

    /// Whether `id` is expanded.
    pub fn is_expanded(&self, id: FolderId) -> bool {
        lock(&self.state).expanded.contains(&id)
    }

    /// Rows for the current state.
    pub fn render(&self) -> RenderedTree {
        let state = lock(&self.state);
        RenderedTree::build(
            &state.snapshot,
            state.generation,
            state.selected,
            &state.expanded,
            state.drag,
        )
    }

    /// Folder dropdown entries.
    pub fn dropdown(&self) -> Vec<SelectOption> {
        render::dropdown_options(&lock(&self.state).snapshot)
    }

    /// Context menu for a row.
    pub fn context_menu(&self, target: FolderFilter) -> Vec<MenuAction> {
        render::context_menu(&lock(&self.state).snapshot, target)
    }

    /// Drag-and-drop surface bound to the current generation.
    pub fn surface(&self) -> DragDropSurface {
        let state = lock(&self.state);
        DragDropSurface::bind(&state.snapshot, state.generation)
    }

    /// Select a folder (or All Files). Takes effect immediately.
    pub fn select(&self, selected: FolderFilter) {
        lock(&self.state).selected = selected;
        self.listener.selection_changed(selected);
    }

    /// Open or close a folder. Returns the new state.
    pub fn toggle(&self, id: FolderId) -> bool {
        let mut state = lock(&self.state);
        if !state.snapshot.has_children(id) {
            return false;
        }
        if state.expanded.remove(&id) {
            false
        } else {
            state.expanded.insert(id);
            true
        }
    }

    /// A folder row started dragging.
    pub fn drag_started(&self, id: FolderId) {
        lock(&self.state).drag.dragging = Some(id);
    }

    /// The pointer moved over a target.
    pub fn drag_hover(&self, target: Option<DropTarget>) {
        lock(&self.state).drag.hover = target;
    }

    /// The drag ended without a drop.
    pub fn drag_ended(&self) {
        lock(&self.state).drag = DragVisual::default();
    }

    /// Reload the snapshot from the server.
    pub async fn refresh(&self) -> AppResult<FolderSnapshot> {
        self.sync(FolderAction::GetFolders).await
    }

    /// Create a folder under the selected folder, or at top level when All
    /// Files is selected.
    pub async fn create_folder(&self, name: &str) -> AppResult<Folder> {
        let parent = self.selected().folder().unwrap_or(FolderId::ROOT);
        self.create_subfolder(parent, name).await
    }

    /// Create a folder under `parent`.
    pub async fn create_subfolder(&self, parent: FolderId, name: &str) -> AppResult<Folder> {
        let reply: FolderMutation = self
            .sync(FolderAction::CreateFolder {
                name: name.to_string(),
                parent,
            })
            .await?;
        if !parent.is_root() {
            lock(&self.state).expanded.insert(parent);
        }
        Ok(reply.folder)
    }

    /// Rename a folder. An unchanged name sends nothing and returns `None`.
    pub async fn rename_folder(&self, id: FolderId, name: &str) -> AppResult<Option<Folder>> {
        let unchanged = lock(&self.state)
            .snapshot
            .find(id)
            .is_some_and(|f| f.name == name.trim());
        if unchanged {
            debug!(folder_id = %id, "Rename skipped, name unchanged");
            return Ok(None);
        }
        let reply: FolderMutation = self
            .sync(FolderAction::RenameFolder {
                folder_id: id,
                name: name.to_string(),
            })
            .await?;
        Ok(Some(reply.folder))
    }

    /// Delete a folder and its subtree; its items move to the system folder.
    pub async fn delete_folder(&self, id: FolderId) -> AppResult<DeleteOutcome> {
        self.sync(FolderAction::DeleteFolder {
            folder_id: id,
            reassign: true,
        })
        .await
    }

    /// Move a folder under `new_parent` (`0` for top level).
    pub async fn move_folder(&self, id: FolderId, new_parent: FolderId) -> AppResult<Folder> {
        let reply: FolderMutation = self
            .sync(FolderAction::MoveFolder {
                folder_id: id,
                new_parent,
            })
            .await?;
        Ok(reply.folder)
    }

    /// Assign items to a folder. When a specific folder is selected the
    /// listener is asked to reload the listing.
    pub async fn assign_items(&self, item_ids: &[ItemId], folder: FolderId) -> AppResult<AssignOutcome> {
        let outcome: AssignOutcome = self
            .sync(FolderAction::AssignMedia {
                item_ids: item_ids.to_vec(),
                folder_id: folder,
            })
            .await?;
        let selected = self.selected();
        if selected.folder().is_some() {
            self.listener.refresh_listing(selected);
        }
        Ok(outcome)
    }

    /// One page of the selected folder's items.
    pub async fn contents(&self, page: Option<u64>, per_page: Option<u64>) -> AppResult<FolderContents> {
        let action = FolderAction::GetFolderContents {
            folder_id: self.selected(),
            page,
            per_page,
        };
        self.send(action).await
    }

    /// Apply a finished drag. Stale or invalid gestures are ignored and
    /// return `Ok(false)`.
    pub async fn handle_drop(&self, gesture: &DropGesture) -> AppResult<bool> {
        self.drag_ended();
        let Some(command) = self.surface().resolve(gesture) else {
            debug!(generation = gesture.generation, "Drop ignored");
            return Ok(false);
        };
        match command {
            DropCommand::Assign {
                item_ids,
                folder_id,
            } => {
                self.assign_items(&item_ids, folder_id).await?;
            }
            DropCommand::Move {
                folder_id,
                new_parent,
            } => {
                self.move_folder(folder_id, new_parent).await?;
            }
        }
        Ok(true)
    }

    async fn send<T: DeserializeOwned>(&self, action: FolderAction) -> AppResult<T> {
        let result = {
            let _guard = InFlight::start(&self.state);
            transport::request(self.transport.as_ref(), &action).await
        };
        if let Err(e) = &result {
            self.notifier.notify_error(action.name(), e);
        }
        result
    }

    async fn sync<T: DeserializeOwned + CarriesSnapshot>(&self, action: FolderAction) -> AppResult<T> {
        let name = action.name();
        let reply: T = self.send(action).await?;
        self.replace_snapshot(reply.snapshot().clone());
        if name != "getFolders" {
            info!(action = name, generation = self.generation(), "Folder tree updated");
        }
        Ok(reply)
    }

    fn replace_snapshot(&self, snapshot: FolderSnapshot) {
        let reset = {
            let mut state = lock(&self.state);
            state.snapshot = snapshot;
            state.generation += 1;
            state.drag = DragVisual::default();

            let ControllerState {
                snapshot, expanded, ..
            } = &mut *state;
            expanded.retain(|id| snapshot.contains(*id));

            match state.selected.folder() {
                Some(id) if !state.snapshot.contains(id) => {
                    state.selected = FolderFilter::Unfiltered;
                    true
                }
                _ => false,
            }
        };
        if reset {
            self.listener.selection_changed(FolderFilter::Unfiltered);
        }
    }
}
