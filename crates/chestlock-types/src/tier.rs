//! Permission tiers
//!
//! Tiers are ordered by numeric level; a lower level carries more authority.
//! A holder may only modify grants at a strictly higher level than its own,
//! so `ROOT` can manage owners, mods and users, while `USER` manages nobody.

use crate::error::ParseError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Access level a user holds on a resource
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PermissionTier {
    /// The user who claimed the resource
    Root,
    Owner,
    Mod,
    User,
    /// No recorded relationship; never stored as a grant
    None,
}

impl PermissionTier {
    /// All tiers in ascending level order
    pub const ALL: [PermissionTier; 5] = [
        PermissionTier::Root,
        PermissionTier::Owner,
        PermissionTier::Mod,
        PermissionTier::User,
        PermissionTier::None,
    ];

    pub const fn level(self) -> u8 {
        match self {
            PermissionTier::Root => 0,
            PermissionTier::Owner => 1,
            PermissionTier::Mod => 2,
            PermissionTier::User => 3,
            PermissionTier::None => 4,
        }
    }

    /// Whether a holder of `self` may add or remove a grant of `other`
    pub const fn can_modify(self, other: PermissionTier) -> bool {
        self.level() < other.level()
    }

    /// Whether this tier grants any access at all
    pub const fn grants_access(self) -> bool {
        !matches!(self, PermissionTier::None)
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            PermissionTier::Root => "ROOT",
            PermissionTier::Owner => "OWNER",
            PermissionTier::Mod => "MOD",
            PermissionTier::User => "USER",
            PermissionTier::None => "NONE",
        }
    }
}

impl fmt::Display for PermissionTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PermissionTier {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|tier| tier.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ParseError::UnknownTier(s.to_string()))
    }
}
