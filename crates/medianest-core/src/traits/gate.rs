//! Authorization gate consulted before every folder mutation.

use crate::types::principal::Principal;

/// Decides whether a caller holds the blanket folder management capability.
///
/// There is no per-folder permission model: a principal either manages all
/// folders or none.
pub trait AuthorizationGate: Send + Sync + std::fmt::Debug + 'static {
    /// Whether `principal` may create, rename, move or delete folders and
    /// assign items to them.
    fn can_manage_folders(&self, principal: &Principal) -> bool;
}
