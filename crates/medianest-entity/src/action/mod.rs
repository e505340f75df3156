//! Folder RPC protocol types.

pub mod request;
pub mod response;

pub use request::FolderAction;
pub use response::{
    ActionError, ActionResponse, AssignOutcome, DeleteOutcome, FolderContents, FolderMutation,
};
