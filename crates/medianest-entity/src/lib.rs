//! # medianest-entity
//!
//! Domain entity models for MediaNest. The `folder` module holds the folder
//! record and the tree/flat shapes sent to clients; the `action` module holds
//! the request/response types of the folder RPC protocol shared by the
//! server, the client controller and the CLI.

pub mod action;
pub mod folder;
