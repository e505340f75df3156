//! Schema migrations for the folder and item tables.

use serde::Serialize;
use sqlx::PgPool;
use sqlx::migrate::Migrator;
use tracing::{info, warn};

use medianest_core::error::{AppError, ErrorKind};
use medianest_core::result::AppResult;

/// Migrations embedded from the workspace `migrations/` directory.
pub static MIGRATOR: Migrator = sqlx::migrate!("../../migrations");

/// Tables the stores read and write.
pub const SCHEMA_TABLES: [&str; 2] = ["media_folders", "media_items"];

/// One embedded migration and whether the database has it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MigrationState {
    /// Migration version (timestamp prefix of the file).
    pub version: i64,
    /// Description taken from the file name.
    pub description: String,
    /// Whether it has been applied successfully.
    pub applied: bool,
}

/// State of every embedded migration, oldest first.
pub async fn migration_status(pool: &PgPool) -> AppResult<Vec<MigrationState>> {
    let applied = applied_versions(pool).await?;
    Ok(plan(&applied))
}

/// Apply pending migrations and check that the folder and item tables exist.
/// Returns the migrations applied by this call.
pub async fn run_migrations(pool: &PgPool) -> AppResult<Vec<MigrationState>> {
    let pending: Vec<MigrationState> = migration_status(pool)
        .await?
        .into_iter()
        .filter(|m| !m.applied)
        .collect();
    info!(pending = pending.len(), "Running database migrations");

    MIGRATOR.run(pool).await.map_err(|e| {
        AppError::with_source(
            ErrorKind::Database,
            format!("Failed to run migrations: {e}"),
            e,
        )
    })?;

    let present: Vec<String> = sqlx::query_scalar(
        "SELECT table_name::text FROM information_schema.tables \
         WHERE table_schema = current_schema()",
    )
    .fetch_all(pool)
    .await
    .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to inspect schema", e))?;

    let missing = missing_tables(&present);
    if !missing.is_empty() {
        warn!(missing = ?missing, "Schema incomplete after migrations");
        return Err(AppError::database(format!(
            "Schema is missing tables: {}",
            missing.join(", ")
        )));
    }

    for m in &pending {
        info!(version = m.version, description = %m.description, "Migration applied");
    }
    Ok(pending
        .into_iter()
        .map(|m| MigrationState { applied: true, ..m })
        .collect())
}

async fn applied_versions(pool: &PgPool) -> AppResult<Vec<i64>> {
    let tracked: bool = sqlx::query_scalar("SELECT to_regclass('_sqlx_migrations') IS NOT NULL")
        .fetch_one(pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to inspect schema", e))?;
    if !tracked {
        return Ok(Vec::new());
    }

    sqlx::query_scalar("SELECT version FROM _sqlx_migrations WHERE success ORDER BY version")
        .fetch_all(pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to read migration history", e)
        })
}

fn plan(applied: &[i64]) -> Vec<MigrationState> {
    MIGRATOR
        .iter()
        .filter(|m| !m.migration_type.is_down_migration())
        .map(|m| MigrationState {
            version: m.version,
            description: m.description.to_string(),
            applied: applied.contains(&m.version),
        })
        .collect()
}

fn missing_tables(present: &[String]) -> Vec<&'static str> {
    SCHEMA_TABLES
        .iter()
        .copied()
        .filter(|table| !present.iter().any(|p| p == table))
        .collect()
}
