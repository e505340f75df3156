//! Database migration management commands.

use clap::{Args, Subcommand};
use serde::Serialize;
use tabled::Tabled;

use medianest_core::error::AppError;
use medianest_database::DatabasePool;
use medianest_database::connection::redact_url;
use medianest_database::migration::{self, MigrationState};

use crate::output::{self, OutputFormat};

/// Arguments for the migrate command
#[derive(Debug, Args)]
pub struct MigrateArgs {
    /// Configuration environment (`config/{env}.toml`)
    #[arg(long, env = "MEDIANEST_ENV", default_value = "development")]
    pub env: String,

    /// Migration subcommand
    #[command(subcommand)]
    pub command: MigrateCommand,
}

/// Migration subcommands
#[derive(Debug, Subcommand)]
pub enum MigrateCommand {
    /// Run all pending migrations
    Run,
    /// Show which migrations the database has applied
    Status,
}

/// Migration display row
#[derive(Debug, Serialize, Tabled)]
struct MigrationRow {
    /// Version
    version: i64,
    /// Description
    description: String,
    /// Applied marker
    applied: String,
}

impl From<MigrationState> for MigrationRow {
    fn from(m: MigrationState) -> Self {
        Self {
            version: m.version,
            description: m.description,
            applied: if m.applied { "✓" } else { "✗" }.to_string(),
        }
    }
}

/// Execute migration commands
pub async fn execute(args: &MigrateArgs, format: OutputFormat) -> Result<(), AppError> {
    let config = super::load_config(&args.env)?;
    if config.database.provider != "postgres" {
        output::print_warning(&format!(
            "Provider '{}' keeps no schema; nothing to migrate.",
            config.database.provider
        ));
        return Ok(());
    }

    output::print_kv("Database", &redact_url(&config.database.url));
    let pool = DatabasePool::connect(&config.database).await?;
    let result = match &args.command {
        MigrateCommand::Run => migration::run_migrations(pool.pool()).await.map(|applied| {
            if applied.is_empty() {
                output::print_success("Schema already up to date.");
            } else {
                output::print_success(&format!("Applied {} migration(s).", applied.len()));
                print_states(applied, format);
            }
        }),
        MigrateCommand::Status => migration::migration_status(pool.pool())
            .await
            .map(|states| print_states(states, format)),
    };
    pool.close().await;
    result
}

fn print_states(states: Vec<MigrationState>, format: OutputFormat) {
    let rows: Vec<MigrationRow> = states.into_iter().map(MigrationRow::from).collect();
    output::print_list(&rows, format);
}

