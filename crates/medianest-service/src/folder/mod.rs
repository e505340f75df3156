//! Folder operations.

mod journal;
pub mod service;

pub use service::FolderService;
