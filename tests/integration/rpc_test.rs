//! Integration tests for the folder RPC endpoint.

mod helpers;

use axum::http::StatusCode;
use serde_json::json;

use helpers::{MANAGER_TOKEN, SEEDED_ATTACHMENTS, TestApp, flat_entry, system_id};

#[tokio::test]
async fn test_initial_snapshot_has_system_folder_only() {
    let app = TestApp::new().await;
    let snapshot = app.snapshot().await;

    let flat = snapshot["flat"].as_array().unwrap();
    assert_eq!(flat.len(), 1);
    assert_eq!(flat[0]["slug"], "uncategorized");
    assert_eq!(flat[0]["name"], "Uncategorized");
    assert_eq!(flat[0]["count"], SEEDED_ATTACHMENTS);
    assert_eq!(snapshot["total_count"], SEEDED_ATTACHMENTS);
    assert_eq!(app.folders.len(), 1);
}

#[tokio::test]
async fn test_duplicate_sibling_name_rejected() {
    let app = TestApp::new().await;
    let logos = app.create_folder("Logos", 0).await;
    let archive = app.create_folder("Archive", 0).await;

    let dup = app
        .rpc(json!({"action": "createFolder", "name": "logos", "parent": 0}))
        .await;
    assert_eq!(dup.status, StatusCode::BAD_REQUEST);
    assert_eq!(dup.error_code(), "VALIDATION");

    // same name under a different parent is fine
    let nested = app.create_folder("Logos", archive).await;
    assert_ne!(nested, logos);

    let snapshot = app.snapshot().await;
    let slug = flat_entry(&snapshot, nested).unwrap()["slug"].clone();
    assert_eq!(slug, "logos-2");
}

#[tokio::test]
async fn test_blank_name_rejected() {
    let app = TestApp::new().await;
    let response = app
        .rpc(json!({"action": "createFolder", "name": "  \t "}))
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(app.folders.len(), 1);
}

#[tokio::test]
async fn test_system_folder_is_protected() {
    let app = TestApp::new().await;
    let system = system_id(&app.snapshot().await);
    let logos = app.create_folder("Logos", 0).await;

    for body in [
        json!({"action": "renameFolder", "folder_id": system, "name": "Misc"}),
        json!({"action": "deleteFolder", "folder_id": system}),
        json!({"action": "moveFolder", "folder_id": system, "new_parent": logos}),
    ] {
        let response = app.rpc(body).await;
        assert_eq!(response.status, StatusCode::CONFLICT);
        assert_eq!(response.error_code(), "SYSTEM_PROTECTED");
    }

    let snapshot = app.snapshot().await;
    let entry = flat_entry(&snapshot, system).unwrap();
    assert_eq!(entry["name"], "Uncategorized");
    assert_eq!(entry["parent"], 0);
}

#[tokio::test]
async fn test_move_into_descendant_is_cycle() {
    let app = TestApp::new().await;
    let a = app.create_folder("A", 0).await;
    let b = app.create_folder("B", a).await;
    let c = app.create_folder("C", b).await;
    let before = app.snapshot().await;

    let response = app
        .rpc(json!({"action": "moveFolder", "folder_id": a, "new_parent": c}))
        .await;
    assert_eq!(response.status, StatusCode::CONFLICT);
    assert_eq!(response.error_code(), "CYCLE");

    let response = app
        .rpc(json!({"action": "moveFolder", "folder_id": a, "new_parent": a}))
        .await;
    assert_eq!(response.error_code(), "CYCLE");

    assert_eq!(app.snapshot().await, before);
}

#[tokio::test]
async fn test_unknown_folder_is_not_found() {
    let app = TestApp::new().await;
    for body in [
        json!({"action": "renameFolder", "folder_id": 999, "name": "X"}),
        json!({"action": "deleteFolder", "folder_id": 999}),
        json!({"action": "createFolder", "name": "X", "parent": 999}),
        json!({"action": "getFolderContents", "folder_id": 999}),
    ] {
        let response = app.rpc(body).await;
        assert_eq!(response.status, StatusCode::NOT_FOUND);
        assert_eq!(response.body["success"], false);
    }
}

#[tokio::test]
async fn test_malformed_requests() {
    let app = TestApp::new().await;

    let response = app.rpc(json!({"action": "renameFolder", "folder_id": 1})).await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.error_code(), "VALIDATION");

    let response = app.rpc(json!({"folder_id": 1})).await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);

    let response = app
        .rpc(json!({"action": "getFolderContents", "folder_id": -7}))
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);

    let response = app
        .rpc(json!({"action": "assignMedia", "item_ids": [], "folder_id": 1}))
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_assign_then_list_returns_exactly_assigned() {
    let app = TestApp::new().await;
    let x = app.create_folder("X", 0).await;

    let response = app
        .rpc(json!({"action": "assignMedia", "item_ids": [1, 2, 3, 3, 6, 42], "folder_id": x}))
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["data"]["assigned"], 3);
    assert_eq!(response.body["data"]["skipped"], json!([6, 42]));

    let listing = app
        .rpc(json!({"action": "getFolderContents", "folder_id": x}))
        .await;
    let mut ids: Vec<i64> = listing.body["data"]["items"]
        .as_array()
        .unwrap()
        .iter()
        .map(|item| item["id"].as_i64().unwrap())
        .collect();
    ids.sort_unstable();
    assert_eq!(ids, vec![1, 2, 3]);
    assert_eq!(listing.body["data"]["total_items"], 3);

    let snapshot = app.snapshot().await;
    assert_eq!(flat_entry(&snapshot, x).unwrap()["count"], 3);
    let system = system_id(&snapshot);
    assert_eq!(flat_entry(&snapshot, system).unwrap()["count"], 2);
    assert_eq!(snapshot["total_count"], SEEDED_ATTACHMENTS);
}

#[tokio::test]
async fn test_system_folder_listing_includes_untagged() {
    let app = TestApp::new().await;
    let x = app.create_folder("X", 0).await;
    app.rpc(json!({"action": "assignMedia", "item_ids": [1], "folder_id": x}))
        .await;
    let system = system_id(&app.snapshot().await);

    let listing = app
        .rpc(json!({"action": "getFolderContents", "folder_id": system}))
        .await;
    assert_eq!(listing.body["data"]["total_items"], 4);

    let all = app
        .rpc(json!({"action": "getFolderContents", "folder_id": -1, "per_page": 2, "page": 3}))
        .await;
    assert_eq!(all.body["data"]["total_items"], SEEDED_ATTACHMENTS);
    assert_eq!(all.body["data"]["total_pages"], 3);
    assert_eq!(all.body["data"]["items"].as_array().unwrap().len(), 1);
    assert_eq!(all.body["data"]["folder_id"], -1);
}

#[tokio::test]
async fn test_mutations_gated_by_manager_token() {
    let app = TestApp::with_auth().await;
    let create = json!({"action": "createFolder", "name": "Logos"});

    let anonymous = app.request("POST", "/api/rpc", Some(create.clone()), None).await;
    assert_eq!(anonymous.status, StatusCode::FORBIDDEN);
    assert_eq!(anonymous.error_code(), "PERMISSION_DENIED");

    let wrong = app
        .request("POST", "/api/rpc", Some(create.clone()), Some("guess"))
        .await;
    assert_eq!(wrong.status, StatusCode::FORBIDDEN);

    let ok = app
        .request("POST", "/api/rpc", Some(create), Some(MANAGER_TOKEN))
        .await;
    assert_eq!(ok.status, StatusCode::OK);

    // reads stay open
    let read = app.request("GET", "/api/folders", None, None).await;
    assert_eq!(read.status, StatusCode::OK);
    assert_eq!(read.body["data"]["flat"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_health_endpoint() {
    let app = TestApp::new().await;
    let response = app.request("GET", "/api/health", None, None).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["data"]["status"], "ok");
    assert_eq!(response.body["data"]["storage_ok"], true);
}
