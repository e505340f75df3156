//! In-memory implementations backed by `dashmap`, for development and tests.

pub mod folder;
pub mod item;

pub use folder::MemoryFolderRepository;
pub use item::MemoryItemStore;
