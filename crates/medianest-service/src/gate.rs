//! Authorization gates for folder management.

use std::collections::HashSet;
use std::sync::Arc;

use medianest_core::config::auth::AuthConfig;
use medianest_core::traits::AuthorizationGate;
use medianest_core::types::Principal;

/// Grants the folder management capability to everyone.
#[derive(Debug, Clone, Copy, Default)]
pub struct AllowAllGate;

impl AuthorizationGate for AllowAllGate {
    fn can_manage_folders(&self, _principal: &Principal) -> bool {
        true
    }
}

/// Grants the capability to holders of a configured bearer token and to
/// local system access.
#[derive(Clone)]
pub struct TokenGate {
    tokens: HashSet<String>,
}

impl TokenGate {
    /// Create a gate accepting `tokens`. Blank entries are ignored.
    pub fn new<I, S>(tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            tokens: tokens
                .into_iter()
                .map(Into::into)
                .filter(|t: &String| !t.trim().is_empty())
                .collect(),
        }
    }
}

impl std::fmt::Debug for TokenGate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenGate")
            .field("tokens", &self.tokens.len())
            .finish()
    }
}

impl AuthorizationGate for TokenGate {
    fn can_manage_folders(&self, principal: &Principal) -> bool {
        match principal {
            Principal::System => true,
            Principal::Bearer(token) => self.tokens.contains(token),
            Principal::Anonymous => false,
        }
    }
}

/// Build the gate described by configuration.
pub fn gate_from_config(config: &AuthConfig) -> Arc<dyn AuthorizationGate> {
    if config.enabled {
        Arc::new(TokenGate::new(config.manager_tokens.iter().cloned()))
    } else {
        Arc::new(AllowAllGate)
    }
}
