//! # medianest-api
//!
//! HTTP API layer for MediaNest built on Axum.
//!
//! The folder protocol is served from a single RPC endpoint
//! (`POST /api/rpc`) taking `{"action": ..., ...}` bodies. Read-only
//! convenience routes and a health check sit next to it.

pub mod app;
pub mod dto;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod state;

pub use app::build_app;
pub use error::ApiError;
pub use state::AppState;
