//! PostgreSQL folder repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use tracing::debug;

use medianest_core::error::{AppError, ErrorKind};
use medianest_core::result::AppResult;
use medianest_core::types::FolderId;
use medianest_entity::folder::Folder;

use super::{FolderChangeSet, FolderRepository};

/// Row shape of `media_folders`.
#[derive(Debug, FromRow)]
struct FolderRow {
    id: FolderId,
    name: String,
    slug: String,
    parent_id: FolderId,
    item_count: i64,
    is_system: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<FolderRow> for Folder {
    fn from(row: FolderRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            slug: row.slug,
            parent: row.parent_id,
            count: row.item_count.max(0) as u64,
            is_system: row.is_system,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Folder storage backed by the `media_folders` table.
#[derive(Debug, Clone)]
pub struct PgFolderRepository {
    pool: PgPool,
}

impl PgFolderRepository {
    /// Create a new folder repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl FolderRepository for PgFolderRepository {
    async fn load_all(&self) -> AppResult<Vec<Folder>> {
        let rows = sqlx::query_as::<_, FolderRow>(
            "SELECT id, name, slug, parent_id, item_count, is_system, created_at, updated_at \
             FROM media_folders ORDER BY id ASC",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to load folders", e))?;

        Ok(rows.into_iter().map(Folder::from).collect())
    }

    async fn apply(&self, changes: &FolderChangeSet) -> AppResult<()> {
        if changes.is_empty() {
            return Ok(());
        }

        let mut tx = self.pool.begin().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to begin transaction", e)
        })?;

        for id in &changes.removals {
            sqlx::query("DELETE FROM media_folders WHERE id = $1")
                .bind(*id)
                .execute(&mut *tx)
                .await
                .map_err(|e| {
                    AppError::with_source(ErrorKind::Database, "Failed to delete folder", e)
                })?;
        }

        for folder in &changes.upserts {
            sqlx::query(
                "INSERT INTO media_folders \
                 (id, name, slug, parent_id, item_count, is_system, created_at, updated_at) \
                 VALUES ($1, $2, $3, $4, $5, $6, $7, $8) \
                 ON CONFLICT (id) DO UPDATE SET \
                 name = EXCLUDED.name, slug = EXCLUDED.slug, parent_id = EXCLUDED.parent_id, \
                 item_count = EXCLUDED.item_count, updated_at = EXCLUDED.updated_at",
            )
            .bind(folder.id)
            .bind(&folder.name)
            .bind(&folder.slug)
            .bind(folder.parent)
            .bind(folder.count as i64)
            .bind(folder.is_system)
            .bind(folder.created_at)
            .bind(folder.updated_at)
            .execute(&mut *tx)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to save folder", e))?;
        }

        tx.commit().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to commit folder changes", e)
        })?;

        debug!(
            upserts = changes.upserts.len(),
            removals = changes.removals.len(),
            "Folder changes committed"
        );
        Ok(())
    }
}
