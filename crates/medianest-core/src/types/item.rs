//! Media items as seen through the item store.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::id::{FolderId, ItemId};

/// Kind of an item in the store. Only attachments can be filed into folders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemKind {
    /// An uploaded media file.
    Attachment,
    /// Anything else sharing the id space (posts, pages, revisions).
    Other,
}

impl ItemKind {
    /// Storage label.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Attachment => "attachment",
            Self::Other => "other",
        }
    }

    /// Map a storage label back to a kind. Unknown labels are `Other`.
    pub fn from_label(label: &str) -> Self {
        if label.eq_ignore_ascii_case("attachment") {
            Self::Attachment
        } else {
            Self::Other
        }
    }
}

/// A media item and its current folder tag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaItem {
    /// Item identifier.
    pub id: ItemId,
    /// Item kind.
    pub kind: ItemKind,
    /// Display title.
    pub title: String,
    /// File name on disk.
    pub filename: String,
    /// Public URL.
    pub url: String,
    /// Thumbnail URL, when the item has one.
    #[serde(default)]
    pub thumbnail: Option<String>,
    /// MIME type.
    pub mime_type: String,
    /// Assigned folder; `None` means implicitly Uncategorized.
    #[serde(default)]
    pub folder: Option<FolderId>,
    /// Upload time.
    pub uploaded_at: DateTime<Utc>,
}

impl MediaItem {
    /// Build an attachment with derived url and mime type. Handy for seeding.
    pub fn attachment(id: ItemId, filename: impl Into<String>) -> Self {
        let filename = filename.into();
        let title = filename
            .rsplit_once('.')
            .map(|(stem, _)| stem.to_string())
            .unwrap_or_else(|| filename.clone());
        let mime_type = guess_mime(&filename).to_string();
        Self {
            id,
            kind: ItemKind::Attachment,
            title,
            url: format!("/media/{filename}"),
            thumbnail: None,
            filename,
            mime_type,
            folder: None,
            uploaded_at: Utc::now(),
        }
    }

    /// Whether the item can be filed into folders.
    pub fn is_attachment(&self) -> bool {
        self.kind == ItemKind::Attachment
    }
}

fn guess_mime(filename: &str) -> &'static str {
    let ext = filename
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "svg" => "image/svg+xml",
        "pdf" => "application/pdf",
        "mp4" => "video/mp4",
        "mp3" => "audio/mpeg",
        _ => "application/octet-stream",
    }
}
