//! Application state shared across all handlers and middleware.

use std::sync::Arc;
use std::time::Instant;

use medianest_core::config::AppConfig;
use medianest_database::StoreManager;
use medianest_service::{FolderService, ServiceContext};

/// Application state passed to every Axum handler via `State<AppState>`.
/// All fields are cheap to clone.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Application configuration
    pub config: Arc<AppConfig>,
    /// Persistence backends
    pub stores: StoreManager,
    /// Folder operations
    pub folders: Arc<FolderService>,
    /// Process start, for uptime reporting
    pub started_at: Instant,
}

impl AppState {
    /// Wrap a loaded service context.
    pub fn new(ctx: ServiceContext) -> Self {
        Self {
            config: ctx.config,
            stores: ctx.stores,
            folders: ctx.folders,
            started_at: Instant::now(),
        }
    }
}
