//! Outcomes of registry mutations
//!
//! Every claim, grant and revoke returns one of these values. Each kind maps
//! to a single fixed message and a tone a presentation layer can colour.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Result of a mutating registry call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RegistrationOutcome {
    PermissionDenied,
    AlreadyRegistered,
    UnregisteredChest,
    UserIsUnregistered,
    CantModifyOwnPermissions,
    NeighborAlreadyRegistered,
    AlreadyHasPermissions,
    SuccessfullyRemoved,
    SuccessfullyAdded,
    Success,
}

/// How an outcome should be presented to the user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutcomeTone {
    Error,
    Warning,
    Success,
}

impl RegistrationOutcome {
    pub const fn message(self) -> &'static str {
        match self {
            Self::PermissionDenied => {
                "You do not have high enough permission levels to run this command!"
            }
            Self::AlreadyRegistered => "This chest has already been claimed!",
            Self::UnregisteredChest => "That chest is not registered to anyone!",
            Self::UserIsUnregistered => "The user isn't registered with this chest!",
            Self::CantModifyOwnPermissions => "You cannot modify your own permissions!",
            Self::NeighborAlreadyRegistered => "The surrounding chest is already registered!",
            Self::AlreadyHasPermissions => "That user already has those permissions!",
            Self::SuccessfullyRemoved => "Successfully removed user from chest!",
            Self::SuccessfullyAdded => "Successfully added user to chest!",
            Self::Success => "Successfully registered chest!",
        }
    }

    pub const fn tone(self) -> OutcomeTone {
        match self {
            Self::AlreadyHasPermissions => OutcomeTone::Warning,
            Self::SuccessfullyRemoved | Self::SuccessfullyAdded | Self::Success => {
                OutcomeTone::Success
            }
            _ => OutcomeTone::Error,
        }
    }

    /// Whether the call changed registry state
    pub const fn is_success(self) -> bool {
        matches!(self.tone(), OutcomeTone::Success)
    }

    /// Stable machine-readable name of the outcome kind
    pub const fn kind(self) -> &'static str {
        match self {
            Self::PermissionDenied => "PERMISSION_DENIED",
            Self::AlreadyRegistered => "ALREADY_REGISTERED",
            Self::UnregisteredChest => "UNREGISTERED_CHEST",
            Self::UserIsUnregistered => "USER_IS_UNREGISTERED",
            Self::CantModifyOwnPermissions => "CANT_MODIFY_OWN_PERMISSIONS",
            Self::NeighborAlreadyRegistered => "NEIGHBOR_ALREADY_REGISTERED",
            Self::AlreadyHasPermissions => "ALREADY_HAS_PERMISSIONS",
            Self::SuccessfullyRemoved => "SUCCESSFULLY_REMOVED",
            Self::SuccessfullyAdded => "SUCCESSFULLY_ADDED",
            Self::Success => "SUCCESS",
        }
    }
}

impl fmt::Display for RegistrationOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}
