//! Hooks the controller calls into the hosting UI.

use medianest_core::error::AppError;
use medianest_core::types::FolderFilter;

/// Surfaces failed requests to the user.
pub trait Notifier: Send + Sync {
    /// Show a blocking error notification.
    fn notify_error(&self, action: &str, error: &AppError);
}

/// Receives selection changes so the item listing can follow.
pub trait SelectionListener: Send + Sync {
    /// The selected folder changed.
    fn selection_changed(&self, selected: FolderFilter);

    /// Items in the selected folder changed and the listing should reload.
    fn refresh_listing(&self, selected: FolderFilter) {
        self.selection_changed(selected);
    }
}

/// Notifier that only writes a log line. Used by headless callers.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify_error(&self, action: &str, error: &AppError) {
        tracing::warn!(action, code = %error.kind, error = %error.message, "Folder request failed");
    }
}

impl SelectionListener for LogNotifier {
    fn selection_changed(&self, selected: FolderFilter) {
        tracing::debug!(selected = %selected, "Selection changed");
    }
}
