//! In-memory folder hierarchy.

pub mod name;
pub mod store;

pub use name::{sanitize_name, slugify};
pub use store::TreeStore;
