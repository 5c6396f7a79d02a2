//! CLI command implementations

pub mod access;
pub mod inspect;

use chestlock_types::{ChestPos, ResourceIdentity};
use clap::Args;

/// Block kind of a plain single chest
pub const DEFAULT_KIND: &str = "tile.chest";

/// Chest the command acts on
#[derive(Debug, Clone, Args)]
pub struct TargetArgs {
    /// Block kind tag
    #[arg(long, default_value = DEFAULT_KIND)]
    pub kind: String,

    /// Block position as x,y,z
    #[arg(long, allow_hyphen_values = true)]
    pub pos: ChestPos,
}

impl TargetArgs {
    pub fn identity(&self) -> ResourceIdentity {
        ResourceIdentity::at(self.kind.clone(), self.pos)
    }

    /// The unit at `pos` with the same kind as the target
    pub fn sibling(&self, pos: ChestPos) -> ResourceIdentity {
        ResourceIdentity::at(self.kind.clone(), pos)
    }
}
