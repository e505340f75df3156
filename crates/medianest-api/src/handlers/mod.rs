//! Request handlers.

pub mod folder;
pub mod health;
pub mod rpc;
