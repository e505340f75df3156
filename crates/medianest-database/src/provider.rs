//! Store manager that dispatches to the configured persistence provider.

use std::sync::Arc;

use tracing::info;

use medianest_core::config::database::DatabaseConfig;
use medianest_core::error::AppError;
use medianest_core::result::AppResult;
use medianest_core::traits::ItemStore;

use crate::connection::DatabasePool;
use crate::memory::{MemoryFolderRepository, MemoryItemStore};
use crate::migration::run_migrations;
use crate::repositories::{FolderRepository, PgFolderRepository, PgItemStore};

/// Folder repository and item store selected from configuration.
#[derive(Debug, Clone)]
pub struct StoreManager {
    folders: Arc<dyn FolderRepository>,
    items: Arc<dyn ItemStore>,
    pool: Option<DatabasePool>,
}

impl StoreManager {
    /// Create the stores from configuration.
    pub async fn new(config: &DatabaseConfig) -> AppResult<Self> {
        match config.provider.as_str() {
            "postgres" => {
                info!("Initializing PostgreSQL stores");
                let pool = DatabasePool::connect(config).await?;
                if config.run_migrations {
                    run_migrations(pool.pool()).await?;
                }
                Ok(Self {
                    folders: Arc::new(PgFolderRepository::new(pool.pool().clone())),
                    items: Arc::new(PgItemStore::new(pool.pool().clone())),
                    pool: Some(pool),
                })
            }
            "memory" => {
                info!("Initializing in-memory stores");
                Ok(Self::in_memory(
                    MemoryFolderRepository::new(),
                    MemoryItemStore::new(),
                ))
            }
            other => Err(AppError::configuration(format!(
                "Unknown database provider: '{other}'. Supported: memory, postgres"
            ))),
        }
    }

    /// Build from in-memory stores the caller keeps handles to.
    pub fn in_memory(folders: MemoryFolderRepository, items: MemoryItemStore) -> Self {
        Self::from_parts(Arc::new(folders), Arc::new(items))
    }

    /// Build from arbitrary implementations.
    pub fn from_parts(folders: Arc<dyn FolderRepository>, items: Arc<dyn ItemStore>) -> Self {
        Self {
            folders,
            items,
            pool: None,
        }
    }

    /// Folder repository.
    pub fn folders(&self) -> Arc<dyn FolderRepository> {
        Arc::clone(&self.folders)
    }

    /// Item store.
    pub fn items(&self) -> Arc<dyn ItemStore> {
        Arc::clone(&self.items)
    }

    /// Database pool, when the postgres provider is active.
    pub fn pool(&self) -> Option<&DatabasePool> {
        self.pool.as_ref()
    }

    /// Check backend connectivity. In-memory stores are always healthy.
    pub async fn health_check(&self) -> AppResult<bool> {
        match &self.pool {
            Some(pool) => pool.health_check().await,
            None => Ok(true),
        }
    }

    /// Release backend resources.
    pub async fn close(&self) {
        if let Some(pool) = &self.pool {
            pool.close().await;
        }
    }
}
