//! # medianest-service
//!
//! Business logic for MediaNest. The [`TreeStore`] holds the folder
//! hierarchy and enforces its invariants, the [`FolderService`] runs every
//! folder operation as one atomic unit against the tree, the folder
//! repository and the item store, and the [`QueryFilter`] turns an active
//! folder selection into an item store predicate.
//!
//! Services follow constructor injection: all dependencies are provided
//! at construction time via `Arc` references.

pub mod context;
pub mod folder;
pub mod gate;
pub mod query;
pub mod tree;

pub use context::{RequestContext, ServiceContext};
pub use folder::FolderService;
pub use gate::{AllowAllGate, TokenGate};
pub use query::QueryFilter;
pub use tree::TreeStore;
