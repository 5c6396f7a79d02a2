//! End-to-end properties of the permission registry.

use chestlock_registry::{PermissionRegistry, RegistrationOutcome};
use chestlock_types::{PermissionTier, ResourceIdentity};
use proptest::prelude::*;
use std::sync::{Arc, Barrier};
use std::thread;

fn chest(x: i32, z: i32) -> ResourceIdentity {
    ResourceIdentity::new("tile.chest", x, 64, z)
}

#[test]
fn test_unclaimed_chest_is_open_to_everyone() {
    let registry = PermissionRegistry::new();
    for resource in [chest(0, 0), chest(-3, 7), ResourceIdentity::new("tile.barrel", 1, 2, 3)] {
        assert!(!registry.contains(&resource));
        assert!(registry.can_open("anyone", &resource));
        assert_eq!(registry.permission("anyone", &resource), PermissionTier::None);
    }
}

#[test]
fn test_second_claim_leaves_state_unchanged() {
    let registry = PermissionRegistry::new();
    assert_eq!(registry.claim("alice", &chest(0, 0), None), RegistrationOutcome::Success);
    let before = registry.serialize_state().unwrap();

    assert_eq!(
        registry.claim("alice", &chest(0, 0), None),
        RegistrationOutcome::AlreadyRegistered
    );
    assert_eq!(
        registry.claim("bob", &chest(0, 0), None),
        RegistrationOutcome::AlreadyRegistered
    );
    assert_eq!(registry.serialize_state().unwrap(), before);
}

#[test]
fn test_foreign_neighbor_blocks_claim() {
    let registry = PermissionRegistry::new();
    registry.claim("alice", &chest(0, 0), None);

    assert_eq!(
        registry.claim("bob", &chest(0, 1), Some(&chest(0, 0))),
        RegistrationOutcome::NeighborAlreadyRegistered
    );
    assert!(!registry.contains(&chest(0, 1)));
    assert!(registry.owner(&chest(0, 1)).is_none());
}

#[test]
fn test_linked_chest_shares_members_and_root() {
    let registry = PermissionRegistry::new();
    registry.claim("alice", &chest(0, 0), None);
    registry.grant("alice", "bob", &chest(0, 0), PermissionTier::Owner);

    assert_eq!(
        registry.claim("bob", &chest(1, 0), Some(&chest(0, 0))),
        RegistrationOutcome::Success
    );
    assert_eq!(registry.permission("alice", &chest(1, 0)), PermissionTier::Root);
    assert_eq!(registry.owner(&chest(1, 0)).as_deref(), Some("alice"));

    // A change made through either half shows on the other.
    registry.grant("bob", "carol", &chest(0, 0), PermissionTier::Mod);
    assert_eq!(registry.permission("carol", &chest(1, 0)), PermissionTier::Mod);

    registry.revoke("alice", "carol", &chest(1, 0));
    assert_eq!(registry.permission("carol", &chest(0, 0)), PermissionTier::None);
    assert_eq!(registry.logical_len(), 1);
}

#[test]
fn test_root_cannot_modify_self() {
    let registry = PermissionRegistry::new();
    registry.claim("alice", &chest(0, 0), None);

    for tier in PermissionTier::ALL {
        assert_eq!(
            registry.grant("alice", "alice", &chest(0, 0), tier),
            RegistrationOutcome::CantModifyOwnPermissions
        );
    }
    assert_eq!(
        registry.revoke("alice", "alice", &chest(0, 0)),
        RegistrationOutcome::CantModifyOwnPermissions
    );
}

#[test]
fn test_user_tier_cannot_grant() {
    let registry = PermissionRegistry::new();
    registry.claim("alice", &chest(0, 0), None);
    registry.grant("alice", "bob", &chest(0, 0), PermissionTier::User);

    assert_eq!(
        registry.grant("bob", "carol", &chest(0, 0), PermissionTier::Mod),
        RegistrationOutcome::PermissionDenied
    );
    assert_eq!(
        registry.grant("bob", "carol", &chest(0, 0), PermissionTier::User),
        RegistrationOutcome::PermissionDenied
    );
    assert_eq!(registry.permission("carol", &chest(0, 0)), PermissionTier::None);
}

#[test]
fn test_revoke_without_grant_changes_nothing() {
    let registry = PermissionRegistry::new();
    registry.claim("alice", &chest(0, 0), None);
    registry.grant("alice", "bob", &chest(0, 0), PermissionTier::User);
    registry.take_dirty();

    assert_eq!(registry.permission("carol", &chest(0, 0)), PermissionTier::None);
    assert_eq!(
        registry.revoke("alice", "carol", &chest(0, 0)),
        RegistrationOutcome::UserIsUnregistered
    );
    assert_eq!(registry.permission("carol", &chest(0, 0)), PermissionTier::None);
    assert!(!registry.is_dirty());

    // Removing twice: the second call finds nothing left to remove.
    assert_eq!(
        registry.revoke("alice", "bob", &chest(0, 0)),
        RegistrationOutcome::SuccessfullyRemoved
    );
    assert_eq!(
        registry.revoke("alice", "bob", &chest(0, 0)),
        RegistrationOutcome::UserIsUnregistered
    );
    assert_eq!(registry.permission("bob", &chest(0, 0)), PermissionTier::None);
}

#[test]
fn test_round_trip_keeps_linked_pair_shared() {
    let registry = PermissionRegistry::new();
    registry.claim("alice", &chest(0, 0), None);
    registry.grant("alice", "bob", &chest(0, 0), PermissionTier::Owner);
    registry.claim("bob", &chest(0, 1), Some(&chest(0, 0)));
    registry.claim("dave", &chest(40, 40), None);
    registry.grant("dave", "erin", &chest(40, 40), PermissionTier::User);

    let bytes = registry.serialize_state().unwrap();
    let restored = PermissionRegistry::from_state(&bytes).unwrap();

    let resources = [chest(0, 0), chest(0, 1), chest(40, 40)];
    for resource in &resources {
        assert_eq!(restored.contains(resource), registry.contains(resource));
        assert_eq!(restored.owner(resource), registry.owner(resource));
        for user in ["alice", "bob", "dave", "erin", "nobody"] {
            assert_eq!(
                restored.permission(user, resource),
                registry.permission(user, resource),
                "{user} on {resource}"
            );
        }
    }

    assert!(restored.shares_permissions(&chest(0, 0), &chest(0, 1)));
    restored.grant("alice", "frank", &chest(0, 1), PermissionTier::Mod);
    assert_eq!(restored.permission("frank", &chest(0, 0)), PermissionTier::Mod);
    assert_eq!(restored.permission("frank", &chest(40, 40)), PermissionTier::None);
}

#[test]
fn test_racing_claims_have_one_winner() {
    const THREADS: usize = 8;

    let registry = Arc::new(PermissionRegistry::new());
    let barrier = Arc::new(Barrier::new(THREADS));
    let target = chest(7, 7);

    let handles: Vec<_> = (0..THREADS)
        .map(|i| {
            let registry = Arc::clone(&registry);
            let barrier = Arc::clone(&barrier);
            let target = target.clone();
            thread::spawn(move || {
                barrier.wait();
                registry.claim(&format!("user{i}"), &target, None)
            })
        })
        .collect();

    let outcomes: Vec<RegistrationOutcome> =
        handles.into_iter().map(|h| h.join().unwrap()).collect();

    let winners = outcomes
        .iter()
        .filter(|o| **o == RegistrationOutcome::Success)
        .count();
    assert_eq!(winners, 1);
    assert!(outcomes
        .iter()
        .all(|o| matches!(o, RegistrationOutcome::Success | RegistrationOutcome::AlreadyRegistered)));

    let owner = registry.owner(&target).unwrap();
    assert_eq!(registry.permission(&owner, &target), PermissionTier::Root);
    assert_eq!(registry.members(&target).len(), 1);
}

#[test]
fn test_concurrent_grants_on_linked_pair() {
    let registry = Arc::new(PermissionRegistry::new());
    registry.claim("alice", &chest(0, 0), None);
    registry.grant("alice", "bob", &chest(0, 0), PermissionTier::User);
    registry.claim("bob", &chest(1, 0), Some(&chest(0, 0)));

    let handles: Vec<_> = (0..4)
        .map(|i| {
            let registry = Arc::clone(&registry);
            thread::spawn(move || {
                let half = if i % 2 == 0 { chest(0, 0) } else { chest(1, 0) };
                for n in 0..25 {
                    let user = format!("guest{i}_{n}");
                    assert_eq!(
                        registry.grant("alice", &user, &half, PermissionTier::User),
                        RegistrationOutcome::SuccessfullyAdded
                    );
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    // alice, bob and 100 guests, seen identically from both halves.
    assert_eq!(registry.members(&chest(0, 0)).len(), 102);
    assert_eq!(registry.members(&chest(0, 0)), registry.members(&chest(1, 0)));
}

/// Units 3s and 3s + 1 form one double-chest slot; slots never touch.
fn unit(slot: i32, half: i32) -> ResourceIdentity {
    chest(slot * 3 + half, 0)
}

#[derive(Debug, Clone)]
enum Action {
    Place { user: usize, slot: i32, half: i32 },
    Grant { requester: usize, user: usize, slot: i32, half: i32, tier: usize },
    Revoke { requester: usize, user: usize, slot: i32, half: i32 },
}

fn action_strategy() -> impl Strategy<Value = Action> {
    prop_oneof![
        (0..4usize, 0..3i32, 0..2i32).prop_map(|(user, slot, half)| Action::Place {
            user,
            slot,
            half
        }),
        (0..4usize, 0..4usize, 0..3i32, 0..2i32, 0..5usize).prop_map(
            |(requester, user, slot, half, tier)| Action::Grant {
                requester,
                user,
                slot,
                half,
                tier,
            }
        ),
        (0..4usize, 0..4usize, 0..3i32, 0..2i32).prop_map(|(requester, user, slot, half)| {
            Action::Revoke {
                requester,
                user,
                slot,
                half,
            }
        }),
    ]
}

const USERS: [&str; 4] = ["alice", "bob", "carol", "dave"];

proptest! {
    #[test]
    fn property_reload_preserves_queries(actions in prop::collection::vec(action_strategy(), 1..40)) {
        let registry = PermissionRegistry::new();
        for action in &actions {
            match *action {
                Action::Place { user, slot, half } => {
                    // Placing next to a claimed chest always offers it as the neighbor.
                    let other = unit(slot, 1 - half);
                    let neighbor = registry.contains(&other).then_some(&other);
                    registry.claim(USERS[user], &unit(slot, half), neighbor);
                }
                Action::Grant { requester, user, slot, half, tier } => {
                    registry.grant(USERS[requester], USERS[user], &unit(slot, half), PermissionTier::ALL[tier]);
                }
                Action::Revoke { requester, user, slot, half } => {
                    registry.revoke(USERS[requester], USERS[user], &unit(slot, half));
                }
            }
        }

        let restored = PermissionRegistry::from_state(&registry.serialize_state().unwrap()).unwrap();
        prop_assert_eq!(restored.resources(), registry.resources());
        prop_assert_eq!(restored.logical_len(), registry.logical_len());
        for slot in 0..3 {
            for half in 0..2 {
                let resource = unit(slot, half);
                prop_assert_eq!(restored.contains(&resource), registry.contains(&resource));
                prop_assert_eq!(restored.owner(&resource), registry.owner(&resource));
                for user in USERS {
                    prop_assert_eq!(
                        restored.permission(user, &resource),
                        registry.permission(user, &resource)
                    );
                }
            }

            if registry.shares_permissions(&unit(slot, 0), &unit(slot, 1)) {
                prop_assert!(restored.shares_permissions(&unit(slot, 0), &unit(slot, 1)));
            }
        }
    }
}
