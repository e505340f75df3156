//! CLI command definitions and dispatch.

pub mod folder;
pub mod migrate;

use clap::{Parser, Subcommand};

use medianest_client::HttpTransport;
use medianest_core::config::AppConfig;
use medianest_core::error::AppError;

use crate::output::OutputFormat;

/// MediaNest: virtual folders for a media library
#[derive(Debug, Parser)]
#[command(name = "medianest", version, about, long_about = None)]
pub struct Cli {
    /// Server base URL
    #[arg(long, env = "MEDIANEST_SERVER", default_value = "http://localhost:8080", global = true)]
    pub server: String,

    /// Bearer token carrying the folder management capability
    #[arg(long, env = "MEDIANEST_TOKEN", global = true, hide_env_values = true)]
    pub token: Option<String>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table", global = true)]
    pub format: OutputFormat,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Folder management
    Folder(folder::FolderArgs),
    /// Database migration management
    Migrate(migrate::MigrateArgs),
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(&self) -> Result<(), AppError> {
        match &self.command {
            Commands::Folder(args) => {
                let transport = HttpTransport::new(&self.server, self.token.clone())?;
                folder::execute(args, &transport, self.format).await
            }
            Commands::Migrate(args) => migrate::execute(args, self.format).await,
        }
    }
}

/// Helper: load configuration for an environment
pub fn load_config(env: &str) -> Result<AppConfig, AppError> {
    AppConfig::load(env)
        .map_err(|e| AppError::configuration(format!("Failed to load config: {e}")))
}
