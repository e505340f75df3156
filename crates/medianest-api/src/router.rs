//! Route definitions.

use axum::Router;
use axum::routing::{get, post};

use crate::handlers;
use crate::state::AppState;

/// All routes under `/api`.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .merge(rpc_routes())
        .merge(folder_routes())
        .merge(health_routes())
}

fn rpc_routes() -> Router<AppState> {
    Router::new().route("/rpc", post(handlers::rpc::rpc))
}

fn folder_routes() -> Router<AppState> {
    Router::new()
        .route("/folders", get(handlers::folder::list_folders))
        .route("/folders/contents", get(handlers::folder::list_contents))
}

fn health_routes() -> Router<AppState> {
    Router::new().route("/health", get(handlers::health::health_check))
}
