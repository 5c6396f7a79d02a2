//! Permission registry
//!
//! Holds two concurrent maps: resource to a shared member map, and resource
//! to its recorded root owner. Both halves of a compound resource point at the
//! same member map instance, so a grant made through either half is visible
//! through the other.
//!
//! Claims run under one global lock because the neighbor-linking path is a
//! check-then-act across both maps. Grants and revokes only touch a member map
//! and never take that lock.

use chestlock_types::{PermissionTier, ResourceIdentity};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, warn};

use crate::outcome::RegistrationOutcome;

/// Username to tier mapping for one logical resource
pub type PermissionMap = DashMap<String, PermissionTier>;

/// Member map shared by every unit of a logical resource
pub type SharedPermissions = Arc<PermissionMap>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PermissionOp {
    Add,
    Remove,
}

/// Access-control registry for lockable containers
pub struct PermissionRegistry {
    pub(crate) permissions: DashMap<ResourceIdentity, SharedPermissions>,
    pub(crate) owners: DashMap<ResourceIdentity, String>,
    pub(crate) claim_lock: Mutex<()>,
    dirty: AtomicBool,
}

impl PermissionRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self {
            permissions: DashMap::new(),
            owners: DashMap::new(),
            claim_lock: Mutex::new(()),
            dirty: AtomicBool::new(false),
        }
    }

    /// Claim `target` for `user`.
    ///
    /// `neighbor` is an adjacent unit of the same kind that may form a
    /// compound resource with `target`. If the neighbor is already claimed
    /// and `user` has any access to it, `target` joins the neighbor's member
    /// map and keeps its root owner. If the neighbor is unclaimed, both units
    /// are claimed for `user` as independent resources.
    pub fn claim(
        &self,
        user: &str,
        target: &ResourceIdentity,
        neighbor: Option<&ResourceIdentity>,
    ) -> RegistrationOutcome {
        if self.contains(target) {
            return RegistrationOutcome::AlreadyRegistered;
        }

        let _guard = self.claim_lock.lock();

        // Another claim may have won the race for the lock.
        if self.contains(target) {
            return RegistrationOutcome::AlreadyRegistered;
        }

        if let Some(neighbor) = neighbor {
            if let Some(members) = self.members_of(neighbor) {
                if !tier_of(&members, user).grants_access() {
                    debug!(
                        user = %user,
                        resource = %target,
                        neighbor = %neighbor,
                        "Neighbor belongs to another user"
                    );
                    return RegistrationOutcome::NeighborAlreadyRegistered;
                }

                let root = self.root_of(neighbor, &members);
                self.owners.insert(target.clone(), root.clone());
                self.permissions.insert(target.clone(), members);
                self.mark_dirty();

                debug!(
                    user = %user,
                    resource = %target,
                    neighbor = %neighbor,
                    root = %root,
                    "Linked chest to claimed neighbor"
                );
                return RegistrationOutcome::Success;
            }

            self.insert_fresh(user, neighbor);
        }

        self.insert_fresh(user, target);
        self.mark_dirty();

        debug!(user = %user, resource = %target, "Claimed chest");
        RegistrationOutcome::Success
    }

    /// Give `target_user` the `tier` on `resource`
    pub fn grant(
        &self,
        requester: &str,
        target_user: &str,
        resource: &ResourceIdentity,
        tier: PermissionTier,
    ) -> RegistrationOutcome {
        self.update_permission(requester, target_user, resource, tier, PermissionOp::Add)
    }

    /// Remove whatever grant `target_user` holds on `resource`
    pub fn revoke(
        &self,
        requester: &str,
        target_user: &str,
        resource: &ResourceIdentity,
    ) -> RegistrationOutcome {
        let current = self.permission(target_user, resource);
        self.update_permission(requester, target_user, resource, current, PermissionOp::Remove)
    }

    /// Checks run in a fixed order so that a caller without authority learns
    /// nothing about who else is registered on the resource.
    fn update_permission(
        &self,
        requester: &str,
        target_user: &str,
        resource: &ResourceIdentity,
        tier: PermissionTier,
        op: PermissionOp,
    ) -> RegistrationOutcome {
        let Some(members) = self.members_of(resource) else {
            return RegistrationOutcome::UnregisteredChest;
        };

        let requester_tier = tier_of(&members, requester);
        if !requester_tier.can_modify(tier) {
            debug!(
                requester = %requester,
                requester_tier = %requester_tier,
                tier = %tier,
                resource = %resource,
                "Permission change denied"
            );
            return RegistrationOutcome::PermissionDenied;
        }

        if requester == target_user {
            return RegistrationOutcome::CantModifyOwnPermissions;
        }

        if tier == PermissionTier::None {
            return RegistrationOutcome::UserIsUnregistered;
        }

        let outcome = match op {
            PermissionOp::Add => match members.entry(target_user.to_string()) {
                Entry::Occupied(entry) if *entry.get() == tier => {
                    return RegistrationOutcome::AlreadyHasPermissions;
                }
                Entry::Occupied(mut entry) => {
                    entry.insert(tier);
                    RegistrationOutcome::SuccessfullyAdded
                }
                Entry::Vacant(entry) => {
                    entry.insert(tier);
                    RegistrationOutcome::SuccessfullyAdded
                }
            },
            PermissionOp::Remove => {
                members.remove(target_user);
                RegistrationOutcome::SuccessfullyRemoved
            }
        };

        self.mark_dirty();
        debug!(
            requester = %requester,
            user = %target_user,
            tier = %tier,
            resource = %resource,
            outcome = outcome.kind(),
            "Permission updated"
        );
        outcome
    }

    /// Whether `resource` has been claimed
    pub fn contains(&self, resource: &ResourceIdentity) -> bool {
        self.permissions.contains_key(resource)
    }

    /// Unclaimed resources are open to everyone.
    pub fn can_open(&self, user: &str, resource: &ResourceIdentity) -> bool {
        match self.members_of(resource) {
            Some(members) => tier_of(&members, user).grants_access(),
            None => true,
        }
    }

    /// Tier `user` holds on `resource`, or `NONE`
    pub fn permission(&self, user: &str, resource: &ResourceIdentity) -> PermissionTier {
        self.members_of(resource)
            .map(|members| tier_of(&members, user))
            .unwrap_or(PermissionTier::None)
    }

    /// Recorded root owner of `resource`
    pub fn owner(&self, resource: &ResourceIdentity) -> Option<String> {
        self.owners.get(resource).map(|owner| owner.value().clone())
    }

    /// Members of `resource`, most authoritative first, then by name
    pub fn members(&self, resource: &ResourceIdentity) -> Vec<(String, PermissionTier)> {
        let Some(members) = self.members_of(resource) else {
            return Vec::new();
        };

        let mut list: Vec<(String, PermissionTier)> = members
            .iter()
            .map(|entry| (entry.key().clone(), *entry.value()))
            .collect();
        list.sort_by(|a, b| a.1.cmp(&b.1).then_with(|| a.0.cmp(&b.0)));
        list
    }

    /// All claimed resources, sorted
    pub fn resources(&self) -> Vec<ResourceIdentity> {
        let mut list: Vec<ResourceIdentity> =
            self.permissions.iter().map(|entry| entry.key().clone()).collect();
        list.sort();
        list
    }

    /// Whether `a` and `b` are units of one compound resource
    pub fn shares_permissions(&self, a: &ResourceIdentity, b: &ResourceIdentity) -> bool {
        match (self.members_of(a), self.members_of(b)) {
            (Some(a), Some(b)) => Arc::ptr_eq(&a, &b),
            _ => false,
        }
    }

    /// Number of claimed resource units
    pub fn len(&self) -> usize {
        self.permissions.len()
    }

    /// Number of logical resources; linked units count once
    pub fn logical_len(&self) -> usize {
        let mut maps: Vec<*const PermissionMap> = self
            .permissions
            .iter()
            .map(|entry| Arc::as_ptr(entry.value()))
            .collect();
        maps.sort();
        maps.dedup();
        maps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.permissions.is_empty()
    }

    /// Whether state changed since the last save
    pub fn is_dirty(&self) -> bool {
        self.dirty.load(Ordering::Acquire)
    }

    /// Request a save on the next flush
    pub fn mark_dirty(&self) {
        self.dirty.store(true, Ordering::Release);
    }

    /// Clear the dirty flag, returning whether it was set
    pub fn take_dirty(&self) -> bool {
        self.dirty.swap(false, Ordering::AcqRel)
    }

    pub(crate) fn clear_dirty(&self) {
        self.dirty.store(false, Ordering::Release);
    }

    /// The member map handle; cloned out so no shard guard outlives the call.
    pub(crate) fn members_of(&self, resource: &ResourceIdentity) -> Option<SharedPermissions> {
        self.permissions
            .get(resource)
            .map(|entry| Arc::clone(entry.value()))
    }

    /// Owners are written before permissions, so a visible resource always
    /// has a recorded owner; the member scan only covers hand-edited saves.
    fn root_of(&self, resource: &ResourceIdentity, members: &PermissionMap) -> String {
        if let Some(owner) = self.owner(resource) {
            return owner;
        }

        warn!(resource = %resource, "Claimed chest has no recorded owner");
        members
            .iter()
            .filter(|entry| *entry.value() == PermissionTier::Root)
            .map(|entry| entry.key().clone())
            .min()
            .unwrap_or_default()
    }

    fn insert_fresh(&self, user: &str, resource: &ResourceIdentity) {
        let members = PermissionMap::new();
        members.insert(user.to_string(), PermissionTier::Root);

        self.owners.insert(resource.clone(), user.to_string());
        self.permissions.insert(resource.clone(), Arc::new(members));
    }
}

impl Default for PermissionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for PermissionRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PermissionRegistry")
            .field("resources", &self.permissions.len())
            .field("dirty", &self.is_dirty())
            .finish()
    }
}

fn tier_of(members: &PermissionMap, user: &str) -> PermissionTier {
    members
        .get(user)
        .map(|tier| *tier.value())
        .unwrap_or(PermissionTier::None)
}
