//! Custom Axum extractors.

pub mod action;
pub mod auth;

pub use action::RpcAction;
pub use auth::Caller;
