//! Folder management CLI commands.

use clap::{Args, Subcommand};
use serde::Serialize;
use tabled::Tabled;

use medianest_client::FolderTransport;
use medianest_client::transport::request;
use medianest_core::error::AppError;
use medianest_core::types::{FolderFilter, FolderId, ItemId};
use medianest_entity::action::{
    AssignOutcome, DeleteOutcome, FolderAction, FolderContents, FolderMutation,
};
use medianest_entity::folder::{FolderNode, FolderSnapshot};

use crate::output::{self, OutputFormat};

/// Arguments for folder commands
#[derive(Debug, Args)]
pub struct FolderArgs {
    /// Folder subcommand
    #[command(subcommand)]
    pub command: FolderCommand,
}

/// Folder subcommands
#[derive(Debug, Subcommand)]
pub enum FolderCommand {
    /// Show the folder tree
    Tree,
    /// List every folder depth-first
    List,
    /// Create a new folder
    Create {
        /// Folder name
        name: String,
        /// Parent folder ID (omit for top level)
        #[arg(short, long, default_value_t = 0)]
        parent: i64,
    },
    /// Rename a folder
    Rename {
        /// Folder ID
        id: i64,
        /// New name
        name: String,
    },
    /// Delete a folder and its subfolders
    Delete {
        /// Folder ID
        id: i64,
        /// Leave items untagged instead of moving them to the system folder
        #[arg(long)]
        no_reassign: bool,
        /// Skip confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
    /// Move a folder under another folder
    Move {
        /// Folder ID
        id: i64,
        /// New parent folder ID (0 for top level)
        #[arg(short, long)]
        to: i64,
    },
    /// Assign media items to a folder
    Assign {
        /// Target folder ID
        folder: i64,
        /// Item IDs
        #[arg(required = true, num_args = 1..)]
        items: Vec<i64>,
    },
    /// List the items of a folder
    Contents {
        /// Folder ID, or `all`
        #[arg(default_value = "all")]
        folder: String,
        /// Page number
        #[arg(short, long)]
        page: Option<u64>,
        /// Page size
        #[arg(long)]
        per_page: Option<u64>,
    },
}

/// Folder display row
#[derive(Debug, Serialize, Tabled)]
struct FolderRow {
    /// Folder ID
    id: i64,
    /// Name, indented by depth
    name: String,
    /// Slug
    slug: String,
    /// Parent ID
    parent: i64,
    /// Item count
    count: u64,
    /// System folder marker
    system: String,
}

/// Item display row
#[derive(Debug, Serialize, Tabled)]
struct ItemRow {
    /// Item ID
    id: i64,
    /// Title
    title: String,
    /// File name
    filename: String,
    /// MIME type
    mime_type: String,
    /// Folder ID, empty when untagged
    folder: String,
    /// Upload time
    uploaded_at: String,
}

/// Execute folder commands
pub async fn execute(
    args: &FolderArgs,
    transport: &dyn FolderTransport,
    format: OutputFormat,
) -> Result<(), AppError> {
    match &args.command {
        FolderCommand::Tree => {
            let snapshot: FolderSnapshot = request(transport, &FolderAction::GetFolders).await?;
            if format == OutputFormat::Json {
                output::print_json(&snapshot.tree);
                return Ok(());
            }
            println!("All Files ({})", snapshot.total_count);
            print_nodes(&snapshot.tree, "");
        }
        FolderCommand::List => {
            let snapshot: FolderSnapshot = request(transport, &FolderAction::GetFolders).await?;
            let rows: Vec<FolderRow> = snapshot
                .flat
                .iter()
                .map(|f| FolderRow {
                    id: f.id.get(),
                    name: format!("{}{}", "  ".repeat(f.depth), f.name),
                    slug: f.slug.clone(),
                    parent: f.parent.get(),
                    count: f.count,
                    system: if f.is_system { "yes" } else { "" }.to_string(),
                })
                .collect();
            output::print_list(&rows, format);
        }
        FolderCommand::Create { name, parent } => {
            let action = FolderAction::CreateFolder {
                name: name.clone(),
                parent: FolderId(*parent),
            };
            let reply: FolderMutation = request(transport, &action).await?;
            output::print_success(&format!(
                "Folder '{}' created (id: {}, slug: {})",
                reply.folder.name, reply.folder.id, reply.folder.slug
            ));
        }
        FolderCommand::Rename { id, name } => {
            let action = FolderAction::RenameFolder {
                folder_id: FolderId(*id),
                name: name.clone(),
            };
            let reply: FolderMutation = request(transport, &action).await?;
            output::print_success(&format!(
                "Folder {} renamed to '{}'",
                reply.folder.id, reply.folder.name
            ));
        }
        FolderCommand::Delete {
            id,
            no_reassign,
            yes,
        } => {
            if !yes {
                let confirm = dialoguer::Confirm::new()
                    .with_prompt(format!(
                        "Delete folder {id} and all of its subfolders?"
                    ))
                    .default(false)
                    .interact()
                    .map_err(|e| AppError::internal(format!("Input error: {e}")))?;

                if !confirm {
                    println!("Cancelled.");
                    return Ok(());
                }
            }

            let action = FolderAction::DeleteFolder {
                folder_id: FolderId(*id),
                reassign: !no_reassign,
            };
            let outcome: DeleteOutcome = request(transport, &action).await?;
            output::print_success(&format!(
                "Deleted {} folder(s), {} item(s) moved",
                outcome.deleted.len(),
                outcome.reassigned_items
            ));
        }
        FolderCommand::Move { id, to } => {
            let action = FolderAction::MoveFolder {
                folder_id: FolderId(*id),
                new_parent: FolderId(*to),
            };
            let reply: FolderMutation = request(transport, &action).await?;
            output::print_success(&format!(
                "Folder '{}' moved under {}",
                reply.folder.name,
                if reply.folder.parent.is_root() {
                    "the top level".to_string()
                } else {
                    reply.folder.parent.to_string()
                }
            ));
        }
        FolderCommand::Assign { folder, items } => {
            let action = FolderAction::AssignMedia {
                item_ids: items.iter().copied().map(ItemId).collect(),
                folder_id: FolderId(*folder),
            };
            let outcome: AssignOutcome = request(transport, &action).await?;
            output::print_success(&format!(
                "{} item(s) assigned to folder {}",
                outcome.assigned, outcome.folder_id
            ));
            if !outcome.skipped.is_empty() {
                let skipped: Vec<String> = outcome.skipped.iter().map(|id| id.to_string()).collect();
                output::print_warning(&format!("Skipped: {}", skipped.join(", ")));
            }
        }
        FolderCommand::Contents {
            folder,
            page,
            per_page,
        } => {
            let action = FolderAction::GetFolderContents {
                folder_id: FolderFilter::parse(folder)?,
                page: *page,
                per_page: *per_page,
            };
            let contents: FolderContents = request(transport, &action).await?;
            let rows: Vec<ItemRow> = contents
                .page
                .items
                .iter()
                .map(|item| ItemRow {
                    id: item.id.get(),
                    title: item.title.clone(),
                    filename: item.filename.clone(),
                    mime_type: item.mime_type.clone(),
                    folder: item.folder.map(|f| f.to_string()).unwrap_or_default(),
                    uploaded_at: item.uploaded_at.format("%Y-%m-%d %H:%M").to_string(),
                })
                .collect();
            output::print_list(&rows, format);
            if format == OutputFormat::Table {
                output::print_kv(
                    "Page",
                    &format!("{} of {}", contents.page.page, contents.page.total_pages),
                );
                output::print_kv("Total items", &contents.page.total_items.to_string());
            }
        }
    }

    Ok(())
}

fn print_nodes(nodes: &[FolderNode], prefix: &str) {
    for (i, node) in nodes.iter().enumerate() {
        let last = i + 1 == nodes.len();
        let marker = if node.is_system { " [system]" } else { "" };
        println!(
            "{prefix}{}{} ({}){marker}",
            if last { "└── " } else { "├── " },
            node.name,
            node.count
        );
        let child_prefix = format!("{prefix}{}", if last { "    " } else { "│   " });
        print_nodes(&node.children, &child_prefix);
    }
}
