//! Save-state codec for the permission registry.
//!
//! The save is a JSON document with two fixed keys. Permissions are written as
//! a list of per-resource records rather than a map, one record per unit, and
//! the sharing between the units of a compound resource is not written at all.
//! Loading rebuilds it: a record whose same-kind neighbor was already rebuilt
//! reuses that neighbor's member map instead of its own decoded copy. When a
//! record touches several rebuilt groups, they are folded into one.
//!
//! Units sharing a map are written from a single read of that map, so the
//! halves of a compound resource never disagree in a save.
//!
//! Owners are keyed by a structured identity, so they are written as a list
//! of `[identity, username]` pairs.

use chestlock_types::{PermissionTier, ResourceIdentity};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use std::time::Instant;
use tracing::debug;

use crate::error::{RegistryError, Result};
use crate::registry::{PermissionMap, PermissionRegistry, SharedPermissions};

/// Key holding the per-resource permission records
pub const PERMISSIONS_KEY: &str = "chest_lock_ChestLockManager_ChestPermissions";

/// Key holding the resource to owner pairs
pub const OWNERS_KEY: &str = "chest_lock_ChestLockManager_ChestOwners";

#[derive(Debug, Serialize, Deserialize)]
struct RegistrySnapshot {
    #[serde(rename = "chest_lock_ChestLockManager_ChestPermissions")]
    permissions: Vec<PermissionRecord>,

    #[serde(rename = "chest_lock_ChestLockManager_ChestOwners")]
    owners: Vec<(ResourceIdentity, String)>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PermissionRecord {
    chest_block: ResourceIdentity,
    permissions_map: BTreeMap<String, PermissionTier>,
}

/// Maps rebuilt from a save, not yet installed in a registry
struct DecodedState {
    permissions: HashMap<ResourceIdentity, SharedPermissions>,
    owners: HashMap<ResourceIdentity, String>,
}

impl DecodedState {
    fn install(self, registry: &PermissionRegistry) {
        for (resource, owner) in self.owners {
            registry.owners.insert(resource, owner);
        }
        for (resource, members) in self.permissions {
            registry.permissions.insert(resource, members);
        }
    }
}

impl PermissionRegistry {
    /// Encode the registry as compact JSON
    pub fn serialize_state(&self) -> Result<Vec<u8>> {
        self.encode_state(false)
    }

    /// Encode the registry as indented JSON
    pub fn serialize_state_pretty(&self) -> Result<Vec<u8>> {
        self.encode_state(true)
    }

    /// Build a registry from saved bytes.
    ///
    /// The returned registry is clean; nothing needs saving until it changes.
    pub fn from_state(bytes: &[u8]) -> Result<Self> {
        let registry = Self::new();
        decode_state(bytes)?.install(&registry);
        Ok(registry)
    }

    /// Replace the registry contents with saved bytes.
    ///
    /// The bytes are fully decoded and checked before anything is replaced,
    /// so a corrupt save leaves the current contents untouched.
    pub fn restore_state(&self, bytes: &[u8]) -> Result<()> {
        let decoded = decode_state(bytes)?;

        let _guard = self.claim_lock.lock();
        self.permissions.clear();
        self.owners.clear();
        decoded.install(self);
        self.clear_dirty();
        Ok(())
    }

    fn encode_state(&self, pretty: bool) -> Result<Vec<u8>> {
        let started = Instant::now();

        // Linked units hold one map; read it once so every unit of a compound
        // resource is written with the same members.
        let units: Vec<(ResourceIdentity, SharedPermissions)> = self
            .permissions
            .iter()
            .map(|entry| (entry.key().clone(), Arc::clone(entry.value())))
            .collect();

        let mut member_snapshots: HashMap<*const PermissionMap, BTreeMap<String, PermissionTier>> =
            HashMap::new();
        let mut permissions: Vec<PermissionRecord> = Vec::with_capacity(units.len());
        for (resource, members) in &units {
            let permissions_map = member_snapshots
                .entry(Arc::as_ptr(members))
                .or_insert_with(|| {
                    members
                        .iter()
                        .map(|member| (member.key().clone(), *member.value()))
                        .collect()
                })
                .clone();
            permissions.push(PermissionRecord {
                chest_block: resource.clone(),
                permissions_map,
            });
        }
        permissions.sort_by(|a, b| a.chest_block.cmp(&b.chest_block));

        let mut owners: Vec<(ResourceIdentity, String)> = self
            .owners
            .iter()
            .map(|entry| (entry.key().clone(), entry.value().clone()))
            .collect();
        owners.sort();

        let snapshot = RegistrySnapshot {
            permissions,
            owners,
        };
        let bytes = if pretty {
            serde_json::to_vec_pretty(&snapshot)?
        } else {
            serde_json::to_vec(&snapshot)?
        };

        debug!(
            records = snapshot.permissions.len(),
            bytes = bytes.len(),
            elapsed_us = started.elapsed().as_micros() as u64,
            "Encoded registry state"
        );
        Ok(bytes)
    }
}

fn decode_state(bytes: &[u8]) -> Result<DecodedState> {
    let started = Instant::now();
    let snapshot: RegistrySnapshot = serde_json::from_slice(bytes)?;
    let record_count = snapshot.permissions.len();

    let mut permissions: HashMap<ResourceIdentity, SharedPermissions> =
        HashMap::with_capacity(record_count);
    let mut linked = 0usize;

    for record in snapshot.permissions {
        if permissions.contains_key(&record.chest_block) {
            return Err(RegistryError::CorruptState(format!(
                "duplicate permission record for {}",
                record.chest_block
            )));
        }

        if let Some((user, _)) = record
            .permissions_map
            .iter()
            .find(|(_, tier)| **tier == PermissionTier::None)
        {
            return Err(RegistryError::CorruptState(format!(
                "user '{}' stored with NONE on {}",
                user, record.chest_block
            )));
        }

        let rebuilt: Vec<SharedPermissions> = record
            .chest_block
            .neighbors()
            .iter()
            .filter_map(|neighbor| permissions.get(neighbor).map(Arc::clone))
            .collect();

        let members = match rebuilt.split_first() {
            Some((first, others)) => {
                linked += 1;
                for other in others {
                    if !Arc::ptr_eq(first, other) {
                        fold_into(&mut permissions, other, first);
                    }
                }
                Arc::clone(first)
            }
            None => Arc::new(record.permissions_map.into_iter().collect::<PermissionMap>()),
        };
        permissions.insert(record.chest_block, members);
    }

    let mut owners: HashMap<ResourceIdentity, String> =
        HashMap::with_capacity(snapshot.owners.len());
    for (resource, owner) in snapshot.owners {
        if !permissions.contains_key(&resource) {
            return Err(RegistryError::CorruptState(format!(
                "owner recorded for unregistered chest {}",
                resource
            )));
        }
        if owners.insert(resource.clone(), owner).is_some() {
            return Err(RegistryError::CorruptState(format!(
                "duplicate owner record for {}",
                resource
            )));
        }
    }

    if let Some(orphan) = permissions.keys().find(|r| !owners.contains_key(*r)) {
        return Err(RegistryError::CorruptState(format!(
            "chest {} has no recorded owner",
            orphan
        )));
    }

    debug!(
        records = record_count,
        linked,
        elapsed_us = started.elapsed().as_micros() as u64,
        "Decoded registry state"
    );
    Ok(DecodedState {
        permissions,
        owners,
    })
}

/// Point every unit holding `from` at `into`, joining two rebuilt groups that
/// turn out to be one compound resource.
fn fold_into(
    permissions: &mut HashMap<ResourceIdentity, SharedPermissions>,
    from: &SharedPermissions,
    into: &SharedPermissions,
) {
    for members in permissions.values_mut() {
        if Arc::ptr_eq(members, from) {
            *members = Arc::clone(into);
        }
    }
}
