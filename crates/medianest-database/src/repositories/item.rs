//! PostgreSQL item store.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};

use medianest_core::error::{AppError, ErrorKind};
use medianest_core::result::AppResult;
use medianest_core::traits::ItemStore;
use medianest_core::types::{
    FolderId, ItemId, ItemKind, ItemPredicate, MediaItem, PageRequest, PageResponse,
};

/// Row shape of `media_items`.
#[derive(Debug, FromRow)]
struct ItemRow {
    id: ItemId,
    kind: String,
    title: String,
    filename: String,
    url: String,
    thumbnail: Option<String>,
    mime_type: String,
    folder_id: Option<FolderId>,
    uploaded_at: DateTime<Utc>,
}

impl From<ItemRow> for MediaItem {
    fn from(row: ItemRow) -> Self {
        Self {
            id: row.id,
            kind: ItemKind::from_label(&row.kind),
            title: row.title,
            filename: row.filename,
            url: row.url,
            thumbnail: row.thumbnail,
            mime_type: row.mime_type,
            folder: row.folder_id,
            uploaded_at: row.uploaded_at,
        }
    }
}

const ITEM_COLUMNS: &str =
    "id, kind, title, filename, url, thumbnail, mime_type, folder_id, uploaded_at";

/// Predicate shared by the listing and its count. `$1` is the folder (NULL
/// for no restriction) and `$2` whether untagged items also match.
const PREDICATE_SQL: &str = "kind = 'attachment' AND ($1::BIGINT IS NULL OR folder_id = $1 \
                             OR ($2 AND folder_id IS NULL))";

/// Item store backed by the `media_items` table.
#[derive(Debug, Clone)]
pub struct PgItemStore {
    pool: PgPool,
}

impl PgItemStore {
    /// Create a new item store.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert or replace an item. Used by imports and fixtures.
    pub async fn upsert_item(&self, item: &MediaItem) -> AppResult<()> {
        sqlx::query(
            "INSERT INTO media_items \
             (id, kind, title, filename, url, thumbnail, mime_type, folder_id, uploaded_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) \
             ON CONFLICT (id) DO UPDATE SET kind = EXCLUDED.kind, title = EXCLUDED.title, \
             filename = EXCLUDED.filename, url = EXCLUDED.url, thumbnail = EXCLUDED.thumbnail, \
             mime_type = EXCLUDED.mime_type, folder_id = EXCLUDED.folder_id",
        )
        .bind(item.id)
        .bind(item.kind.as_str())
        .bind(&item.title)
        .bind(&item.filename)
        .bind(&item.url)
        .bind(&item.thumbnail)
        .bind(&item.mime_type)
        .bind(item.folder)
        .bind(item.uploaded_at)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to save item", e))?;
        Ok(())
    }
}

fn predicate_binds(predicate: &ItemPredicate) -> (Option<FolderId>, bool) {
    match predicate {
        ItemPredicate::All => (None, false),
        ItemPredicate::InFolder {
            folder,
            include_untagged,
        } => (Some(*folder), *include_untagged),
    }
}

#[async_trait]
impl ItemStore for PgItemStore {
    async fn list_items(
        &self,
        predicate: &ItemPredicate,
        page: &PageRequest,
    ) -> AppResult<PageResponse<MediaItem>> {
        let (folder, include_untagged) = predicate_binds(predicate);

        let total: i64 =
            sqlx::query_scalar(&format!("SELECT COUNT(*) FROM media_items WHERE {PREDICATE_SQL}"))
                .bind(folder)
                .bind(include_untagged)
                .fetch_one(&self.pool)
                .await
                .map_err(|e| {
                    AppError::with_source(ErrorKind::Database, "Failed to count items", e)
                })?;

        let rows = sqlx::query_as::<_, ItemRow>(&format!(
            "SELECT {ITEM_COLUMNS} FROM media_items WHERE {PREDICATE_SQL} \
             ORDER BY uploaded_at DESC, id DESC LIMIT $3 OFFSET $4"
        ))
        .bind(folder)
        .bind(include_untagged)
        .bind(page.limit() as i64)
        .bind(page.offset() as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list items", e))?;

        Ok(PageResponse::new(
            rows.into_iter().map(MediaItem::from).collect(),
            page,
            total.max(0) as u64,
        ))
    }

    async fn find_item(&self, id: ItemId) -> AppResult<Option<MediaItem>> {
        let row = sqlx::query_as::<_, ItemRow>(&format!(
            "SELECT {ITEM_COLUMNS} FROM media_items WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find item", e))?;

        Ok(row.map(MediaItem::from))
    }

    async fn set_item_tags(&self, ids: &[ItemId], folder: Option<FolderId>) -> AppResult<u64> {
        if ids.is_empty() {
            return Ok(0);
        }
        let raw: Vec<i64> = ids.iter().map(|id| id.get()).collect();
        let result = sqlx::query("UPDATE media_items SET folder_id = $1 WHERE id = ANY($2)")
            .bind(folder)
            .bind(raw)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to update item folders", e)
            })?;
        Ok(result.rows_affected())
    }

    async fn items_in_folders(&self, folders: &[FolderId]) -> AppResult<Vec<ItemId>> {
        if folders.is_empty() {
            return Ok(Vec::new());
        }
        let raw: Vec<i64> = folders.iter().map(|id| id.get()).collect();
        let ids: Vec<i64> =
            sqlx::query_scalar("SELECT id FROM media_items WHERE folder_id = ANY($1) ORDER BY id")
                .bind(raw)
                .fetch_all(&self.pool)
                .await
                .map_err(|e| {
                    AppError::with_source(ErrorKind::Database, "Failed to list folder items", e)
                })?;
        Ok(ids.into_iter().map(ItemId).collect())
    }

    async fn count_items_by_tag(&self, folder: Option<FolderId>) -> AppResult<u64> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM media_items \
             WHERE kind = 'attachment' AND folder_id IS NOT DISTINCT FROM $1",
        )
        .bind(folder)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to count items", e))?;
        Ok(count.max(0) as u64)
    }

    async fn tag_counts(&self) -> AppResult<HashMap<FolderId, u64>> {
        let rows: Vec<(i64, i64)> = sqlx::query_as(
            "SELECT folder_id, COUNT(*) FROM media_items \
             WHERE kind = 'attachment' AND folder_id IS NOT NULL GROUP BY folder_id",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to count items", e))?;

        Ok(rows
            .into_iter()
            .map(|(folder, count)| (FolderId(folder), count.max(0) as u64))
            .collect())
    }

    async fn count_all(&self) -> AppResult<u64> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM media_items WHERE kind = 'attachment'")
                .fetch_one(&self.pool)
                .await
                .map_err(|e| {
                    AppError::with_source(ErrorKind::Database, "Failed to count items", e)
                })?;
        Ok(count.max(0) as u64)
    }
}
