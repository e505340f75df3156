//! End-to-end folder flows across create, rename, move, delete and assign.

mod helpers;

use axum::http::StatusCode;
use serde_json::{Value, json};

use medianest_core::error::ErrorKind;
use medianest_core::types::{FolderId, ItemId};
use medianest_service::RequestContext;

use helpers::{SEEDED_ATTACHMENTS, TestApp, flat_entry, system_id};

fn children(snapshot: &Value, parent: i64) -> Vec<i64> {
    snapshot["flat"]
        .as_array()
        .unwrap()
        .iter()
        .filter(|f| f["parent"] == parent)
        .map(|f| f["id"].as_i64().unwrap())
        .collect()
}

#[tokio::test]
async fn test_logos_flow() {
    let app = TestApp::new().await;

    let logos = app.create_folder("Logos", 0).await;
    let renamed = app
        .rpc(json!({"action": "renameFolder", "folder_id": logos, "name": "Brand Logos"}))
        .await;
    assert_eq!(renamed.status, StatusCode::OK);
    assert_eq!(renamed.body["data"]["folder"]["slug"], "brand-logos");

    let year = app.create_folder("2024", logos).await;
    app.rpc(json!({"action": "assignMedia", "item_ids": [1, 2], "folder_id": year}))
        .await;

    let snapshot = app.snapshot().await;
    assert_eq!(flat_entry(&snapshot, year).unwrap()["depth"], 1);
    assert_eq!(snapshot["tree"][0]["children"][0]["id"], year);

    let moved = app
        .rpc(json!({"action": "moveFolder", "folder_id": year, "new_parent": 0}))
        .await;
    assert_eq!(moved.status, StatusCode::OK);

    let snapshot = moved.body["data"]["snapshot"].clone();
    assert!(children(&snapshot, logos).is_empty());
    let entry = flat_entry(&snapshot, year).unwrap();
    assert_eq!(entry["parent"], 0);
    assert_eq!(entry["depth"], 0);
    assert_eq!(entry["count"], 2);
    assert_eq!(entry["name"], "2024");

    // the stored rows follow the tree
    let stored = app.folders.get(FolderId(year)).unwrap();
    assert!(stored.is_top_level());
    assert_eq!(stored.count, 2);
}

#[tokio::test]
async fn test_cascading_delete_moves_items_to_system_folder() {
    let app = TestApp::new().await;
    let f = app.create_folder("Campaigns", 0).await;
    let child = app.create_folder("Spring", f).await;
    let grandchild = app.create_folder("Week 1", child).await;
    let keep = app.create_folder("Keep", 0).await;

    app.rpc(json!({"action": "assignMedia", "item_ids": [1], "folder_id": f}))
        .await;
    app.rpc(json!({"action": "assignMedia", "item_ids": [2, 3], "folder_id": grandchild}))
        .await;
    app.rpc(json!({"action": "assignMedia", "item_ids": [4], "folder_id": keep}))
        .await;

    let before = app.snapshot().await;
    let system = system_id(&before);
    let system_before = flat_entry(&before, system).unwrap()["count"].as_u64().unwrap();
    assert_eq!(system_before, 1);

    let response = app
        .rpc(json!({"action": "deleteFolder", "folder_id": f}))
        .await;
    assert_eq!(response.status, StatusCode::OK);
    let data = &response.body["data"];
    assert_eq!(data["deleted"], json!([grandchild, child, f]));
    assert_eq!(data["reassigned_items"], 3);

    let after = &data["snapshot"];
    for id in [f, child, grandchild] {
        assert!(flat_entry(after, id).is_none());
        assert!(app.folders.get(FolderId(id)).is_none());
    }
    assert_eq!(
        flat_entry(after, system).unwrap()["count"],
        system_before + 3
    );
    assert_eq!(flat_entry(after, keep).unwrap()["count"], 1);
    assert_eq!(after["total_count"], SEEDED_ATTACHMENTS);

    for id in [1, 2, 3] {
        assert_eq!(
            app.items.get(ItemId(id)).unwrap().folder,
            Some(FolderId(system))
        );
    }
}

#[tokio::test]
async fn test_delete_without_reassign_untags_items() {
    let app = TestApp::new().await;
    let f = app.create_folder("Temp", 0).await;
    app.rpc(json!({"action": "assignMedia", "item_ids": [5], "folder_id": f}))
        .await;

    let response = app
        .rpc(json!({"action": "deleteFolder", "folder_id": f, "reassign": false}))
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(app.items.get(ItemId(5)).unwrap().folder, None);

    // untagged items still count toward the system folder
    let snapshot = &response.body["data"]["snapshot"];
    let system = system_id(snapshot);
    assert_eq!(flat_entry(snapshot, system).unwrap()["count"], SEEDED_ATTACHMENTS);
}

#[tokio::test]
async fn test_failed_persist_leaves_everything_unchanged() {
    let app = TestApp::new().await;
    let f = app.create_folder("Doomed", 0).await;
    app.rpc(json!({"action": "assignMedia", "item_ids": [1, 2], "folder_id": f}))
        .await;
    let before = app.snapshot().await;

    app.folders.fail_next_apply();
    let response = app
        .rpc(json!({"action": "deleteFolder", "folder_id": f}))
        .await;
    assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);

    assert_eq!(app.snapshot().await, before);
    assert_eq!(app.items.get(ItemId(1)).unwrap().folder, Some(FolderId(f)));
    assert!(app.folders.get(FolderId(f)).is_some());
}

#[tokio::test]
async fn test_concurrent_overlapping_deletes() {
    let app = TestApp::new().await;
    let parent = app.create_folder("Parent", 0).await;
    let child = app.create_folder("Child", parent).await;
    app.rpc(json!({"action": "assignMedia", "item_ids": [1, 2], "folder_id": child}))
        .await;
    app.rpc(json!({"action": "assignMedia", "item_ids": [3], "folder_id": parent}))
        .await;

    let service = app.ctx.folders.clone();
    let ctx = RequestContext::system();
    let (a, b) = tokio::join!(
        service.delete_folder(&ctx, FolderId(parent), true),
        service.delete_folder(&ctx, FolderId(child), true),
    );

    // whichever ran second either found its folder gone or had nothing left
    let reassigned: u64 = [&a, &b]
        .iter()
        .filter_map(|r| r.as_ref().ok())
        .map(|outcome| outcome.reassigned_items)
        .sum();
    assert_eq!(reassigned, 3);
    for result in [&a, &b] {
        if let Err(e) = result {
            assert_eq!(e.kind, ErrorKind::NotFound);
        }
    }

    let snapshot = app.snapshot().await;
    let system = system_id(&snapshot);
    assert_eq!(flat_entry(&snapshot, system).unwrap()["count"], SEEDED_ATTACHMENTS);
    assert_eq!(snapshot["flat"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_reassignment_between_folders_updates_both_counts() {
    let app = TestApp::new().await;
    let a = app.create_folder("A", 0).await;
    let b = app.create_folder("B", 0).await;
    app.rpc(json!({"action": "assignMedia", "item_ids": [1, 2, 3], "folder_id": a}))
        .await;
    let response = app
        .rpc(json!({"action": "assignMedia", "item_ids": [2, 3], "folder_id": b}))
        .await;

    let snapshot = &response.body["data"]["snapshot"];
    assert_eq!(flat_entry(snapshot, a).unwrap()["count"], 1);
    assert_eq!(flat_entry(snapshot, b).unwrap()["count"], 2);
}
