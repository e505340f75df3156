//! # medianest-core
//!
//! Core crate for MediaNest. Contains the configuration schema, typed
//! identifiers, the folder filter, item and principal types, the traits
//! implemented by collaborators (item store, authorization gate), and the
//! unified error system.
//!
//! This crate has **no** internal dependencies on other MediaNest crates.

pub mod config;
pub mod error;
pub mod result;
pub mod traits;
pub mod types;

pub use error::{AppError, ErrorKind};
pub use result::AppResult;
