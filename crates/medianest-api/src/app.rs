//! Application assembly.

use std::time::Duration;

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::http::StatusCode;
use axum::middleware as axum_middleware;
use tower_http::compression::CompressionLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::middleware;
use crate::router::api_routes;
use crate::state::AppState;

/// Build the full router with every middleware layer applied.
pub fn build_app(state: AppState) -> Router {
    let server = state.config.server.clone();
    let cors = middleware::cors::build_cors_layer(&server.cors);

    Router::new()
        .nest("/api", api_routes())
        .layer(DefaultBodyLimit::max(server.max_body_bytes))
        .layer(axum_middleware::from_fn(middleware::logging::request_logging))
        .layer(timeout_layer(server.request_timeout_seconds))
        .layer(CompressionLayer::new())
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Requests running longer than `seconds` are answered with 408.
fn timeout_layer(seconds: u64) -> TimeoutLayer {
    TimeoutLayer::with_status_code(StatusCode::REQUEST_TIMEOUT, Duration::from_secs(seconds))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{Body, to_bytes};
    use axum::http::{Request, StatusCode, header};
    use serde_json::{Value, json};
    use tower::ServiceExt;

    use medianest_core::config::AppConfig;
    use medianest_core::types::{ItemId, MediaItem};
    use medianest_database::StoreManager;
    use medianest_database::memory::{MemoryFolderRepository, MemoryItemStore};
    use medianest_service::ServiceContext;

    async fn app_with(config: AppConfig) -> Router {
        let items = MemoryItemStore::new();
        items.insert_item(MediaItem::attachment(ItemId(1), "logo.png"));
        items.insert_item(MediaItem::attachment(ItemId(2), "banner.jpg"));
        let stores = StoreManager::in_memory(MemoryFolderRepository::new(), items);
        let ctx = ServiceContext::with_stores(config, stores).await.unwrap();
        build_app(AppState::new(ctx))
    }

    async fn rpc(app: &Router, body: Value, token: Option<&str>) -> (StatusCode, Value) {
        let mut request = Request::post("/api/rpc").header(header::CONTENT_TYPE, "application/json");
        if let Some(token) = token {
            request = request.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let response = app
            .clone()
            .oneshot(request.body(Body::from(body.to_string())).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_get_folders_includes_system_folder() {
        let app = app_with(AppConfig::default()).await;
        let (status, body) = rpc(&app, json!({"action": "getFolders"}), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        assert_eq!(body["data"]["total_count"], 2);
        assert_eq!(body["data"]["flat"][0]["slug"], "uncategorized");
        assert_eq!(body["data"]["flat"][0]["count"], 2);
    }

    #[tokio::test]
    async fn test_unknown_action_is_bad_request() {
        let app = app_with(AppConfig::default()).await;
        let (status, body) = rpc(&app, json!({"action": "dropTables"}), None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], false);
        assert_eq!(body["error"]["code"], "VALIDATION");
    }

    #[tokio::test]
    async fn test_mutation_requires_manager_token() {
        let mut config = AppConfig::default();
        config.auth.enabled = true;
        config.auth.manager_tokens = vec!["editor-token".into()];
        let app = app_with(config).await;

        let create = json!({"action": "createFolder", "name": "Logos"});
        let (status, body) = rpc(&app, create.clone(), None).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["error"]["code"], "PERMISSION_DENIED");

        let (status, _) = rpc(&app, create.clone(), Some("wrong")).await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (status, body) = rpc(&app, create, Some("editor-token")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["folder"]["name"], "Logos");

        let (status, _) = rpc(&app, json!({"action": "getFolders"}), None).await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_cycle_maps_to_conflict() {
        let app = app_with(AppConfig::default()).await;
        let (_, parent) = rpc(&app, json!({"action": "createFolder", "name": "Logos"}), None).await;
        let parent_id = parent["data"]["folder"]["id"].as_i64().unwrap();
        let (_, child) = rpc(
            &app,
            json!({"action": "createFolder", "name": "Brand", "parent": parent_id}),
            None,
        )
        .await;
        let child_id = child["data"]["folder"]["id"].as_i64().unwrap();

        let (status, body) = rpc(
            &app,
            json!({"action": "moveFolder", "folder_id": parent_id, "new_parent": child_id}),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["error"]["code"], "CYCLE");
    }

    #[tokio::test]
    async fn test_contents_route_and_health() {
        let app = app_with(AppConfig::default()).await;
        let response = app
            .clone()
            .oneshot(
                Request::get("/api/folders/contents?folder_id=all&per_page=1")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["data"]["total_items"], 2);
        assert_eq!(body["data"]["items"].as_array().unwrap().len(), 1);
        assert_eq!(body["data"]["folder_id"], -1);

        let response = app
            .oneshot(Request::get("/api/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_request_times_out() {
        let app: Router = Router::new()
            .route(
                "/slow",
                axum::routing::get(|| async {
                    tokio::time::sleep(Duration::from_secs(5)).await;
                    "done"
                }),
            )
            .layer(timeout_layer(1));

        let response = app
            .oneshot(Request::get("/slow").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::REQUEST_TIMEOUT);
    }
}
