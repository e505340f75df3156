//! Listing filters.

pub mod filter;

pub use filter::QueryFilter;
