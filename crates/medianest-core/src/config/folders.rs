//! Folder tree rules.

use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Tunables for the folder tree and the contents listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FolderConfig {
    /// Display name given to the system folder when it is first created.
    #[serde(default = "default_system_folder_name")]
    pub system_folder_name: String,
    /// Maximum folder name length in characters.
    #[serde(default = "default_max_name_length")]
    pub max_name_length: usize,
    /// Items per page when a listing request does not specify one.
    #[serde(default = "default_page_size")]
    pub default_page_size: u64,
    /// Upper bound for a requested page size.
    #[serde(default = "default_max_page_size")]
    pub max_page_size: u64,
}

impl FolderConfig {
    /// Check that the limits are usable.
    pub fn validate(&self) -> Result<(), AppError> {
        if self.system_folder_name.trim().is_empty() {
            return Err(AppError::configuration(
                "folders.system_folder_name must not be empty",
            ));
        }
        if self.max_name_length == 0 {
            return Err(AppError::configuration(
                "folders.max_name_length must be positive",
            ));
        }
        if self.default_page_size == 0 || self.default_page_size > self.max_page_size {
            return Err(AppError::configuration(
                "folders.default_page_size must be between 1 and folders.max_page_size",
            ));
        }
        Ok(())
    }
}

impl Default for FolderConfig {
    fn default() -> Self {
        Self {
            system_folder_name: default_system_folder_name(),
            max_name_length: default_max_name_length(),
            default_page_size: default_page_size(),
            max_page_size: default_max_page_size(),
        }
    }
}

fn default_system_folder_name() -> String {
    "Uncategorized".to_string()
}

fn default_max_name_length() -> usize {
    200
}

fn default_page_size() -> u64 {
    40
}

fn default_max_page_size() -> u64 {
    100
}
