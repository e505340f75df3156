//! Core traits defined in `medianest-core` and implemented by other crates.

pub mod gate;
pub mod item_store;

pub use gate::AuthorizationGate;
pub use item_store::ItemStore;
