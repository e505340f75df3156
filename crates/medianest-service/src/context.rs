//! Request and process contexts.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::info;
use uuid::Uuid;

use medianest_core::config::AppConfig;
use medianest_core::result::AppResult;
use medianest_core::types::Principal;
use medianest_database::StoreManager;

use crate::folder::FolderService;
use crate::gate::gate_from_config;

/// Context for the current request.
///
/// Built by the transport layer and passed into service methods so that
/// every operation knows *who* is acting.
#[derive(Debug, Clone)]
pub struct RequestContext {
    /// The caller.
    pub principal: Principal,
    /// Correlation id for logs.
    pub request_id: Uuid,
    /// When the request was received.
    pub request_time: DateTime<Utc>,
}

impl RequestContext {
    /// Creates a new request context.
    pub fn new(principal: Principal) -> Self {
        Self {
            principal,
            request_id: Uuid::new_v4(),
            request_time: Utc::now(),
        }
    }

    /// Context for local process access.
    pub fn system() -> Self {
        Self::new(Principal::System)
    }
}

/// Everything a transport needs, built once per process.
#[derive(Debug, Clone)]
pub struct ServiceContext {
    /// Loaded configuration.
    pub config: Arc<AppConfig>,
    /// Persistence backends.
    pub stores: StoreManager,
    /// Folder operations.
    pub folders: Arc<FolderService>,
}

impl ServiceContext {
    /// Connect the configured stores and load the folder tree.
    pub async fn build(config: AppConfig) -> AppResult<Self> {
        config.validate()?;
        let stores = StoreManager::new(&config.database).await?;
        Self::with_stores(config, stores).await
    }

    /// Load the folder tree on top of existing stores.
    pub async fn with_stores(config: AppConfig, stores: StoreManager) -> AppResult<Self> {
        let gate = gate_from_config(&config.auth);
        let folders = FolderService::load(
            stores.folders(),
            stores.items(),
            gate,
            config.folders.clone(),
        )
        .await?;

        info!(
            provider = %config.database.provider,
            auth_enabled = config.auth.enabled,
            "Service context ready"
        );

        Ok(Self {
            config: Arc::new(config),
            stores,
            folders: Arc::new(folders),
        })
    }
}
