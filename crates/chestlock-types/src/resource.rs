//! Resource identities for lockable containers
//!
//! A resource is one physical container unit: a block kind at a coordinate.
//! Two adjacent units of the same kind may later be linked into one compound
//! resource by the registry; the identities themselves never change.

use crate::error::ParseError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Discrete block coordinate
///
/// Field names on the wire match the save format written by earlier releases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ChestPos {
    #[serde(rename = "chestPosX")]
    pub x: i32,
    #[serde(rename = "chestPosY")]
    pub y: i32,
    #[serde(rename = "chestPosZ")]
    pub z: i32,
}

/// Steps wrap at the ends of the coordinate range, so every position has
/// four neighbors.
impl ChestPos {
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    pub const fn north(self) -> Self {
        Self::new(self.x, self.y, self.z.wrapping_sub(1))
    }

    pub const fn south(self) -> Self {
        Self::new(self.x, self.y, self.z.wrapping_add(1))
    }

    pub const fn west(self) -> Self {
        Self::new(self.x.wrapping_sub(1), self.y, self.z)
    }

    pub const fn east(self) -> Self {
        Self::new(self.x.wrapping_add(1), self.y, self.z)
    }
}

impl fmt::Display for ChestPos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.x, self.y, self.z)
    }
}

impl FromStr for ChestPos {
    type Err = ParseError;

    /// Parses `x,y,z`, tolerating whitespace and surrounding parentheses.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ParseError::InvalidPosition(s.to_string());
        let inner = s.trim().trim_start_matches('(').trim_end_matches(')');

        let mut parts = inner.split(',').map(|p| p.trim().parse::<i32>());
        match (parts.next(), parts.next(), parts.next(), parts.next()) {
            (Some(Ok(x)), Some(Ok(y)), Some(Ok(z)), None) => Ok(Self::new(x, y, z)),
            _ => Err(invalid()),
        }
    }
}

/// Identity of one lockable container unit
///
/// Equality and hashing are structural over the kind tag and all three
/// coordinates.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ResourceIdentity {
    /// Block kind tag, e.g. `tile.chest`
    #[serde(rename = "unlocalizedName")]
    pub kind: String,

    #[serde(rename = "chestPos")]
    pub pos: ChestPos,
}

impl ResourceIdentity {
    pub fn new(kind: impl Into<String>, x: i32, y: i32, z: i32) -> Self {
        Self::at(kind, ChestPos::new(x, y, z))
    }

    pub fn at(kind: impl Into<String>, pos: ChestPos) -> Self {
        Self {
            kind: kind.into(),
            pos,
        }
    }

    /// The four horizontally adjacent identities of the same kind, in
    /// north, south, west, east order.
    pub fn neighbors(&self) -> [ResourceIdentity; 4] {
        [
            self.with_pos(self.pos.north()),
            self.with_pos(self.pos.south()),
            self.with_pos(self.pos.west()),
            self.with_pos(self.pos.east()),
        ]
    }

    /// Whether `other` is one of this identity's horizontal neighbors
    pub fn is_adjacent_to(&self, other: &ResourceIdentity) -> bool {
        self.neighbors().iter().any(|n| n == other)
    }

    fn with_pos(&self, pos: ChestPos) -> Self {
        Self {
            kind: self.kind.clone(),
            pos,
        }
    }
}

impl fmt::Display for ResourceIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.kind, self.pos)
    }
}
