//! Interaction guard
//!
//! Turns world interactions on chests into allow/deny decisions. The host
//! resolves the clicked, placed or exploded block into a [`ResourceIdentity`]
//! and applies whatever this module decides.

use chestlock_types::ResourceIdentity;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;

use crate::outcome::RegistrationOutcome;
use crate::registry::PermissionRegistry;

/// Shown when someone tries to break a claimed chest
pub const PROTECTED_MESSAGE: &str = "This chest is protected!";

/// Shown when someone without access tries to open a claimed chest
pub const NO_ACCESS_MESSAGE: &str = "You do not have access to this chest!";

/// Decision on a single interaction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum AccessDecision {
    /// Interaction proceeds
    Allow,

    /// Interaction is cancelled
    Deny {
        /// Message for the acting user
        reason: String,
    },
}

impl AccessDecision {
    pub fn allow() -> Self {
        Self::Allow
    }

    pub fn deny(reason: impl Into<String>) -> Self {
        Self::Deny {
            reason: reason.into(),
        }
    }

    pub fn is_allowed(&self) -> bool {
        matches!(self, Self::Allow)
    }
}

/// Result of placing a chest
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlacementDecision {
    /// Claim outcome, shown to the placing user
    pub outcome: RegistrationOutcome,

    /// Whether the host should undo the placement
    pub cancel_placement: bool,
}

/// Applies registry state to world interactions
#[derive(Debug, Clone)]
pub struct AccessGuard {
    registry: Arc<PermissionRegistry>,
}

impl AccessGuard {
    pub fn new(registry: Arc<PermissionRegistry>) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &Arc<PermissionRegistry> {
        &self.registry
    }

    /// Claimed chests cannot be broken by anyone.
    pub fn check_break(&self, resource: &ResourceIdentity) -> AccessDecision {
        if self.registry.contains(resource) {
            debug!(resource = %resource, "Blocked break of claimed chest");
            AccessDecision::deny(PROTECTED_MESSAGE)
        } else {
            AccessDecision::allow()
        }
    }

    pub fn check_open(&self, user: &str, resource: &ResourceIdentity) -> AccessDecision {
        if self.registry.can_open(user, resource) {
            AccessDecision::allow()
        } else {
            debug!(user = %user, resource = %resource, "Blocked open of claimed chest");
            AccessDecision::deny(NO_ACCESS_MESSAGE)
        }
    }

    /// Placing a chest claims it. The placement is undone only when it would
    /// join a neighbor owned by someone else.
    pub fn on_place(
        &self,
        user: &str,
        placed: &ResourceIdentity,
        neighbor: Option<&ResourceIdentity>,
    ) -> PlacementDecision {
        let outcome = self.registry.claim(user, placed, neighbor);
        PlacementDecision {
            outcome,
            cancel_placement: outcome == RegistrationOutcome::NeighborAlreadyRegistered,
        }
    }

    /// Drop claimed chests from an explosion's affected blocks
    pub fn filter_explosion(&self, affected: Vec<ResourceIdentity>) -> Vec<ResourceIdentity> {
        let before = affected.len();
        let remaining: Vec<ResourceIdentity> = affected
            .into_iter()
            .filter(|resource| !self.registry.contains(resource))
            .collect();

        if remaining.len() != before {
            debug!(
                protected = before - remaining.len(),
                "Shielded claimed chests from explosion"
            );
        }
        remaining
    }
}
