//! Integration tests driving the tree controller against the real router.

mod helpers;

use std::sync::{Arc, Mutex};

use medianest_client::render::ALL_FILES_LABEL;
use medianest_client::{
    DragSource, DropTarget, MenuAction, Notifier, Phase, SelectionListener, TreeController,
};
use medianest_core::error::{AppError, ErrorKind};
use medianest_core::types::{FolderFilter, FolderId, ItemId};

use helpers::{MANAGER_TOKEN, SEEDED_ATTACHMENTS, TestApp};

#[derive(Default)]
struct Recorder {
    errors: Mutex<Vec<(String, ErrorKind)>>,
    selections: Mutex<Vec<FolderFilter>>,
    refreshes: Mutex<Vec<FolderFilter>>,
}

impl Notifier for Recorder {
    fn notify_error(&self, action: &str, error: &AppError) {
        self.errors.lock().unwrap().push((action.to_string(), error.kind));
    }
}

impl SelectionListener for Recorder {
    fn selection_changed(&self, selected: FolderFilter) {
        self.selections.lock().unwrap().push(selected);
    }

    fn refresh_listing(&self, selected: FolderFilter) {
        self.refreshes.lock().unwrap().push(selected);
    }
}

async fn controller(app: &TestApp, token: Option<&str>) -> (TreeController, Arc<Recorder>) {
    let recorder = Arc::new(Recorder::default());
    let controller = TreeController::new(
        Arc::new(app.transport(token)),
        recorder.clone(),
        recorder.clone(),
    );
    controller.refresh().await.expect("initial refresh");
    (controller, recorder)
}

#[tokio::test]
async fn test_initial_render() {
    let app = TestApp::new().await;
    let (controller, _) = controller(&app, None).await;

    let tree = controller.render();
    assert_eq!(tree.rows.len(), 2);
    assert_eq!(tree.rows[0].name, ALL_FILES_LABEL);
    assert_eq!(tree.rows[0].count, SEEDED_ATTACHMENTS);
    assert!(tree.rows[0].has_class("selected"));
    assert!(tree.rows[1].has_class("is-system"));
    assert_eq!(controller.phase(), Phase::Idle);
}

#[tokio::test]
async fn test_create_rename_move_through_controller() {
    let app = TestApp::new().await;
    let (controller, _) = controller(&app, None).await;

    let logos = controller.create_folder("Logos").await.unwrap();
    controller.select(FolderFilter::Folder(logos.id));
    let year = controller.create_folder("2024").await.unwrap();
    assert_eq!(year.parent, logos.id);
    assert!(controller.is_expanded(logos.id));

    let renamed = controller
        .rename_folder(logos.id, "Brand Logos")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(renamed.slug, "brand-logos");

    let options: Vec<String> = controller.dropdown().into_iter().map(|o| o.label).collect();
    assert_eq!(
        options,
        vec![
            format!("All Files ({SEEDED_ATTACHMENTS})"),
            "Brand Logos (0)".to_string(),
            "\u{a0}\u{a0}2024 (0)".to_string(),
            format!("Uncategorized ({SEEDED_ATTACHMENTS})"),
        ]
    );

    let gesture = controller
        .surface()
        .gesture(DragSource::Folder(year.id), DropTarget::Root);
    assert!(controller.handle_drop(&gesture).await.unwrap());

    let snapshot = controller.snapshot();
    assert!(!snapshot.has_children(logos.id));
    assert_eq!(snapshot.find(year.id).unwrap().parent, FolderId::ROOT);
    // the only expanded folder lost its children, so nothing is shown nested
    assert!(controller.render().rows.iter().all(|r| r.depth == 0));
}

#[tokio::test]
async fn test_drop_items_and_listing_refresh() {
    let app = TestApp::new().await;
    let (controller, recorder) = controller(&app, None).await;
    let logos = controller.create_folder("Logos").await.unwrap();

    controller.select(FolderFilter::Folder(logos.id));
    let gesture = controller.surface().gesture(
        DragSource::Items(vec![ItemId(1), ItemId(2)]),
        DropTarget::Folder(logos.id),
    );
    assert!(controller.handle_drop(&gesture).await.unwrap());

    assert_eq!(
        *recorder.refreshes.lock().unwrap(),
        vec![FolderFilter::Folder(logos.id)]
    );
    assert_eq!(controller.snapshot().find(logos.id).unwrap().count, 2);

    let contents = controller.contents(None, None).await.unwrap();
    assert_eq!(contents.page.total_items, 2);
    assert_eq!(contents.folder_id, FolderFilter::Folder(logos.id));

    // dropping onto All Files is never allowed
    let gesture = controller
        .surface()
        .gesture(DragSource::Items(vec![ItemId(3)]), DropTarget::AllFiles);
    assert!(!controller.handle_drop(&gesture).await.unwrap());
}

#[tokio::test]
async fn test_server_errors_reach_notifier() {
    let app = TestApp::new().await;
    let (controller, recorder) = controller(&app, None).await;
    let a = controller.create_folder("A").await.unwrap();
    let b = controller.create_subfolder(a.id, "B").await.unwrap();
    let generation = controller.generation();

    let err = controller.move_folder(a.id, b.id).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::Cycle);

    let system = controller.snapshot().system_folder().unwrap().id;
    assert!(controller.context_menu(FolderFilter::Folder(system)).is_empty());
    assert_eq!(
        controller.context_menu(FolderFilter::Folder(a.id)),
        vec![MenuAction::Rename, MenuAction::Delete, MenuAction::NewSubfolder]
    );
    let err = controller.delete_folder(system).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::SystemProtected);

    assert_eq!(
        *recorder.errors.lock().unwrap(),
        vec![
            ("moveFolder".to_string(), ErrorKind::Cycle),
            ("deleteFolder".to_string(), ErrorKind::SystemProtected),
        ]
    );
    assert_eq!(controller.generation(), generation);
    assert_eq!(controller.snapshot().find(a.id).unwrap().parent, FolderId::ROOT);
}

#[tokio::test]
async fn test_deleting_selected_folder_resets_selection() {
    let app = TestApp::new().await;
    let (controller, recorder) = controller(&app, None).await;
    let parent = controller.create_folder("Parent").await.unwrap();
    let child = controller.create_subfolder(parent.id, "Child").await.unwrap();
    controller.select(FolderFilter::Folder(child.id));

    let outcome = controller.delete_folder(parent.id).await.unwrap();
    assert_eq!(outcome.deleted, vec![child.id, parent.id]);
    assert_eq!(controller.selected(), FolderFilter::Unfiltered);
    assert_eq!(
        recorder.selections.lock().unwrap().last(),
        Some(&FolderFilter::Unfiltered)
    );
    assert!(!controller.is_expanded(parent.id));
}

#[tokio::test]
async fn test_second_client_sees_changes_after_refresh() {
    let app = TestApp::with_auth().await;
    let (editor, _) = controller(&app, Some(MANAGER_TOKEN)).await;
    let (viewer, viewer_log) = controller(&app, None).await;

    editor.create_folder("Shared").await.unwrap();
    assert_eq!(viewer.snapshot().len(), 1);

    let err = viewer.create_folder("Nope").await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::PermissionDenied);
    assert_eq!(viewer_log.errors.lock().unwrap().len(), 1);

    viewer.refresh().await.unwrap();
    assert_eq!(viewer.snapshot().len(), 2);
}
