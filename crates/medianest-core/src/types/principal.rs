//! The caller on whose behalf an operation runs.

use std::fmt;

/// Identity presented with a request.
#[derive(Clone, PartialEq, Eq, Default)]
pub enum Principal {
    /// No credentials were presented.
    #[default]
    Anonymous,
    /// A bearer token was presented.
    Bearer(String),
    /// Local process access (CLI against the database, startup tasks, tests).
    System,
}

impl Principal {
    /// Short label safe for logs.
    pub fn label(&self) -> String {
        match self {
            Self::Anonymous => "anonymous".to_string(),
            Self::Bearer(token) => format!("bearer:{}", mask_token(token)),
            Self::System => "system".to_string(),
        }
    }
}

impl fmt::Debug for Principal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label())
    }
}

fn mask_token(token: &str) -> String {
    let prefix: String = token.chars().take(4).collect();
    format!("{prefix}****")
}
