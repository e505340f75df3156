//! # medianest-client
//!
//! Client side of the folder protocol: a transport abstraction with an HTTP
//! implementation, the tree controller that keeps a local snapshot in sync
//! with the server, and the render, dropdown and drag-and-drop models a UI
//! binds to.

pub mod controller;
pub mod dnd;
pub mod notify;
pub mod render;
pub mod transport;

pub use controller::{Phase, TreeController};
pub use dnd::{DragDropSurface, DragSource, DropCommand, DropGesture, DropTarget};
pub use notify::{LogNotifier, Notifier, SelectionListener};
pub use render::{MenuAction, RenderedTree, SelectOption, TreeRow};
pub use transport::{FolderTransport, HttpTransport};
