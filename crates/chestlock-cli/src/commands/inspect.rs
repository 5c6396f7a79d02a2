//! Read-only registry queries

use crate::commands::{TargetArgs, DEFAULT_KIND};
use crate::error::CliResult;
use crate::output::{self, OutputFormat};
use chestlock_registry::PermissionRegistry;
use chestlock_types::{ChestPos, PermissionTier, ResourceIdentity};
use clap::Subcommand;
use serde::Serialize;
use tabled::Tabled;

/// Query subcommands
#[derive(Debug, Subcommand)]
pub enum InspectCommands {
    /// Show a user's tier on a chest and whether they can open it
    Check {
        /// User to look up
        #[arg(long)]
        user: String,

        #[command(flatten)]
        target: TargetArgs,
    },

    /// List claimed chests, or the members of one chest
    Show {
        /// Block kind tag
        #[arg(long, requires = "pos")]
        kind: Option<String>,

        /// Block position as x,y,z
        #[arg(long, allow_hyphen_values = true)]
        pos: Option<ChestPos>,
    },
}

/// Result of a `check` lookup
#[derive(Debug, Serialize, Tabled)]
struct AccessRow {
    /// Chest
    chest: String,
    /// User looked up
    user: String,
    /// Tier held
    tier: PermissionTier,
    /// Whether the user may open the chest
    can_open: bool,
}

/// Table row for chest listings
#[derive(Debug, Serialize, Tabled)]
struct ChestRow {
    /// Chest
    chest: String,
    /// Root owner
    owner: String,
    /// Members with their tiers
    members: String,
    /// Units sharing this chest's members
    linked: String,
}

/// Table row for the members of one chest
#[derive(Debug, Serialize, Tabled)]
struct MemberRow {
    user: String,
    tier: PermissionTier,
}

/// Execute a query command
pub fn execute(
    command: InspectCommands,
    registry: &PermissionRegistry,
    format: OutputFormat,
) -> CliResult<()> {
    match command {
        InspectCommands::Check { user, target } => {
            let resource = target.identity();
            let row = AccessRow {
                chest: resource.to_string(),
                tier: registry.permission(&user, &resource),
                can_open: registry.can_open(&user, &resource),
                user,
            };
            output::print_output(vec![row], format)
        }

        InspectCommands::Show { kind, pos: Some(pos) } => {
            let resource = ResourceIdentity::at(kind.unwrap_or_else(|| DEFAULT_KIND.into()), pos);
            if !registry.contains(&resource) {
                output::print_warning(&format!("{} is not registered", resource));
                return Ok(());
            }

            let rows: Vec<MemberRow> = registry
                .members(&resource)
                .into_iter()
                .map(|(user, tier)| MemberRow { user, tier })
                .collect();
            output::print_output(rows, format)
        }

        InspectCommands::Show { pos: None, .. } => {
            let rows: Vec<ChestRow> = registry
                .resources()
                .into_iter()
                .map(|resource| chest_row(registry, &resource))
                .collect();
            output::print_output(rows, format)
        }
    }
}

fn chest_row(registry: &PermissionRegistry, resource: &ResourceIdentity) -> ChestRow {
    let members = registry
        .members(resource)
        .into_iter()
        .map(|(user, tier)| format!("{}:{}", user, tier))
        .collect::<Vec<_>>()
        .join(", ");

    let linked = resource
        .neighbors()
        .iter()
        .filter(|neighbor| registry.shares_permissions(resource, neighbor))
        .map(|neighbor| neighbor.pos.to_string())
        .collect::<Vec<_>>();

    ChestRow {
        chest: resource.to_string(),
        owner: registry.owner(resource).unwrap_or_else(|| "-".to_string()),
        members,
        linked: if linked.is_empty() {
            "-".to_string()
        } else {
            linked.join(" ")
        },
    }
}
