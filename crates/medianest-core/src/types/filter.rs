//! Active-folder filter values and the item predicates they resolve to.

use std::fmt;

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::AppError;
use crate::types::id::FolderId;

/// Wire value of the virtual "All Files" pseudo-folder.
pub const ALL_FILES: i64 = -1;

/// The folder a listing is restricted to.
///
/// Only two states exist. The legacy "all" sentinel (`-1`), the root
/// sentinel (`0`), an empty string and an absent value all decode to
/// [`FolderFilter::Unfiltered`]. On the wire `Unfiltered` is written as `-1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum FolderFilter {
    /// No restriction: every item.
    #[default]
    Unfiltered,
    /// Items assigned directly to this folder.
    Folder(FolderId),
}

impl FolderFilter {
    /// Decode a raw integer selection.
    pub fn from_raw(value: i64) -> Result<Self, AppError> {
        match value {
            ALL_FILES | 0 => Ok(Self::Unfiltered),
            n if n > 0 => Ok(Self::Folder(FolderId(n))),
            n => Err(AppError::validation(format!("Invalid folder filter {n}"))),
        }
    }

    /// Decode a raw textual selection as found in query strings.
    pub fn parse(value: &str) -> Result<Self, AppError> {
        let trimmed = value.trim();
        if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("all") {
            return Ok(Self::Unfiltered);
        }
        let raw = trimmed
            .parse::<i64>()
            .map_err(|_| AppError::validation(format!("Invalid folder filter '{trimmed}'")))?;
        Self::from_raw(raw)
    }

    /// Integer form used on the wire.
    pub fn to_raw(self) -> i64 {
        match self {
            Self::Unfiltered => ALL_FILES,
            Self::Folder(id) => id.get(),
        }
    }

    /// The selected folder, if any.
    pub fn folder(self) -> Option<FolderId> {
        match self {
            Self::Unfiltered => None,
            Self::Folder(id) => Some(id),
        }
    }
}

impl From<FolderId> for FolderFilter {
    fn from(id: FolderId) -> Self {
        if id.is_root() {
            Self::Unfiltered
        } else {
            Self::Folder(id)
        }
    }
}

impl fmt::Display for FolderFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unfiltered => write!(f, "all"),
            Self::Folder(id) => write!(f, "{id}"),
        }
    }
}

impl Serialize for FolderFilter {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_i64(self.to_raw())
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawFilter {
    Number(i64),
    Text(String),
}

impl<'de> Deserialize<'de> for FolderFilter {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        match Option::<RawFilter>::deserialize(deserializer)? {
            None => Ok(Self::Unfiltered),
            Some(RawFilter::Number(n)) => Self::from_raw(n).map_err(D::Error::custom),
            Some(RawFilter::Text(s)) => Self::parse(&s).map_err(D::Error::custom),
        }
    }
}

/// Predicate handed to the item store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemPredicate {
    /// Every item.
    All,
    /// Items tagged with exactly `folder` (never its descendants).
    InFolder {
        /// The folder whose direct members are wanted.
        folder: FolderId,
        /// Also match items carrying no folder tag at all. Set for the
        /// system folder, which implicitly owns untagged items.
        include_untagged: bool,
    },
}

impl ItemPredicate {
    /// Whether an item carrying `tag` satisfies the predicate.
    pub fn matches(&self, tag: Option<FolderId>) -> bool {
        match (self, tag) {
            (Self::All, _) => true,
            (Self::InFolder { folder, .. }, Some(t)) => *folder == t,
            (
                Self::InFolder {
                    include_untagged, ..
                },
                None,
            ) => *include_untagged,
        }
    }
}
