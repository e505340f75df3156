//! Authorization configuration.

use serde::{Deserialize, Serialize};

/// Folder management capability settings.
///
/// With `enabled = false` every caller may manage folders. Otherwise a
/// mutating request must present one of `manager_tokens` as a bearer token.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Whether mutations require a manager token.
    #[serde(default)]
    pub enabled: bool,
    /// Bearer tokens that carry the folder management capability.
    #[serde(default)]
    pub manager_tokens: Vec<String>,
}
