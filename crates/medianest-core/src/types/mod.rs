//! Core type definitions used across the MediaNest workspace.

pub mod filter;
pub mod id;
pub mod item;
pub mod pagination;
pub mod principal;

pub use filter::{FolderFilter, ItemPredicate};
pub use id::*;
pub use item::{ItemKind, MediaItem};
pub use pagination::{PageRequest, PageResponse};
pub use principal::Principal;
