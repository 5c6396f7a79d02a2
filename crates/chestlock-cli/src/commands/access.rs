//! Claim and permission commands

use crate::commands::TargetArgs;
use crate::error::CliResult;
use crate::output::{print_outcome, print_warning, OutputFormat};
use chestlock_registry::{PermissionRegistry, RegistrationOutcome};
use chestlock_types::{ChestPos, PermissionTier};
use clap::Subcommand;
use tracing::info;

/// Registry-mutating subcommands
#[derive(Debug, Subcommand)]
pub enum AccessCommands {
    /// Claim a chest for a user
    Register {
        /// User claiming the chest
        #[arg(long)]
        user: String,

        #[command(flatten)]
        target: TargetArgs,

        /// Adjacent unit forming a double chest with the target, as x,y,z
        #[arg(long, allow_hyphen_values = true)]
        neighbor: Option<ChestPos>,
    },

    /// Grant OWNER on a chest
    AddOwner {
        /// User making the change
        #[arg(long)]
        requester: String,

        /// User receiving the grant
        #[arg(long)]
        user: String,

        #[command(flatten)]
        target: TargetArgs,
    },

    /// Grant MOD on a chest
    AddMod {
        /// User making the change
        #[arg(long)]
        requester: String,

        /// User receiving the grant
        #[arg(long)]
        user: String,

        #[command(flatten)]
        target: TargetArgs,
    },

    /// Grant USER on a chest
    AddUser {
        /// User making the change
        #[arg(long)]
        requester: String,

        /// User receiving the grant
        #[arg(long)]
        user: String,

        #[command(flatten)]
        target: TargetArgs,
    },

    /// Remove a user's grant from a chest
    Remove {
        /// User making the change
        #[arg(long)]
        requester: String,

        /// User losing the grant
        #[arg(long)]
        user: String,

        #[command(flatten)]
        target: TargetArgs,
    },
}

/// Apply a mutating command and print its outcome
pub fn execute(
    command: AccessCommands,
    registry: &PermissionRegistry,
    format: OutputFormat,
) -> CliResult<RegistrationOutcome> {
    let outcome = match command {
        AccessCommands::Register {
            user,
            target,
            neighbor,
        } => {
            let resource = target.identity();
            let neighbor = neighbor.map(|pos| target.sibling(pos));
            if let Some(neighbor) = &neighbor {
                if !resource.is_adjacent_to(neighbor) {
                    print_warning(&format!(
                        "{} is not next to {}; registering them separately",
                        neighbor, resource
                    ));
                }
            }
            registry.claim(&user, &resource, neighbor.as_ref())
        }

        AccessCommands::AddOwner {
            requester,
            user,
            target,
        } => registry.grant(&requester, &user, &target.identity(), PermissionTier::Owner),

        AccessCommands::AddMod {
            requester,
            user,
            target,
        } => registry.grant(&requester, &user, &target.identity(), PermissionTier::Mod),

        AccessCommands::AddUser {
            requester,
            user,
            target,
        } => registry.grant(&requester, &user, &target.identity(), PermissionTier::User),

        AccessCommands::Remove {
            requester,
            user,
            target,
        } => registry.revoke(&requester, &user, &target.identity()),
    };

    info!(outcome = outcome.kind(), "Command applied");
    print_outcome(outcome, format)?;
    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chestlock_types::ResourceIdentity;

    fn target(x: i32) -> TargetArgs {
        TargetArgs {
            kind: "tile.chest".into(),
            pos: ChestPos::new(x, 64, 0),
        }
    }

    #[test]
    fn test_register_then_grant() {
        let registry = PermissionRegistry::new();

        let outcome = execute(
            AccessCommands::Register {
                user: "alice".into(),
                target: target(0),
                neighbor: None,
            },
            &registry,
            OutputFormat::Json,
        )
        .unwrap();
        assert_eq!(outcome, RegistrationOutcome::Success);

        let outcome = execute(
            AccessCommands::AddMod {
                requester: "alice".into(),
                user: "bob".into(),
                target: target(0),
            },
            &registry,
            OutputFormat::Json,
        )
        .unwrap();
        assert_eq!(outcome, RegistrationOutcome::SuccessfullyAdded);
        assert_eq!(
            registry.permission("bob", &ResourceIdentity::new("tile.chest", 0, 64, 0)),
            PermissionTier::Mod
        );
    }

    #[test]
    fn test_register_with_neighbor_uses_target_kind() {
        let registry = PermissionRegistry::new();
        let trapped = TargetArgs {
            kind: "tile.chestTrap".into(),
            pos: ChestPos::new(0, 64, 0),
        };

        execute(
            AccessCommands::Register {
                user: "alice".into(),
                target: trapped,
                neighbor: Some(ChestPos::new(1, 64, 0)),
            },
            &registry,
            OutputFormat::Json,
        )
        .unwrap();

        assert!(registry.contains(&ResourceIdentity::new("tile.chestTrap", 1, 64, 0)));
        assert!(!registry.contains(&ResourceIdentity::new("tile.chest", 1, 64, 0)));
    }

    #[test]
    fn test_refusal_is_not_an_error() {
        let registry = PermissionRegistry::new();
        let outcome = execute(
            AccessCommands::Remove {
                requester: "alice".into(),
                user: "bob".into(),
                target: target(9),
            },
            &registry,
            OutputFormat::Table,
        )
        .unwrap();
        assert_eq!(outcome, RegistrationOutcome::UnregisteredChest);
    }
}
