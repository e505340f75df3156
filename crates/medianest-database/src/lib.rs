//! # medianest-database
//!
//! Persistence for MediaNest: the [`FolderRepository`] contract used by the
//! folder service, PostgreSQL implementations of folder storage and of the
//! item store, in-memory equivalents for development and tests, and the
//! [`StoreManager`] that picks one according to configuration.

pub mod connection;
pub mod memory;
pub mod migration;
pub mod provider;
pub mod repositories;

pub use connection::DatabasePool;
pub use provider::StoreManager;
pub use repositories::{FolderChangeSet, FolderRepository};
