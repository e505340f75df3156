//! Folder domain entities.

pub mod model;
pub mod tree;

pub use model::{Folder, SYSTEM_SLUG};
pub use tree::{FlatFolder, FolderNode, FolderSnapshot};
