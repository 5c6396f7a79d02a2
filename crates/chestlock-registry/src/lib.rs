//! Chest Lock Registry - Permission registry for lockable containers
//!
//! This crate provides the access-control core for Chest Lock:
//!
//! - **PermissionRegistry**: Claims, grants, revokes and access queries
//! - **RegistrationOutcome**: Closed result of every mutating call
//! - **Snapshot codec**: Save format that rebuilds linked chests on load
//! - **RegistryStorage**: Save backends (file, in-memory)
//! - **RegistryPersistence**: Startup load, dirty flushing and shutdown save
//! - **AccessGuard**: Break/open/place/explosion decisions for the host world
//!
//! ## Compound chests
//!
//! Two adjacent chests of the same kind can form one logical chest. Both
//! units then share a single member map, so granting access through either
//! unit grants it on both.

#![deny(unsafe_code)]
#![cfg_attr(feature = "strict-docs", warn(missing_docs))]
#![cfg_attr(not(feature = "strict-docs"), allow(missing_docs))]

pub mod config;
pub mod error;
pub mod guard;
pub mod outcome;
pub mod persistence;
pub mod registry;
pub mod snapshot;
pub mod storage;

// Re-exports
pub use chestlock_types::{ChestPos, PermissionTier, ResourceIdentity};
pub use config::RegistryConfig;
pub use error::{RegistryError, Result};
pub use guard::{AccessDecision, AccessGuard, PlacementDecision};
pub use outcome::{OutcomeTone, RegistrationOutcome};
pub use persistence::RegistryPersistence;
pub use registry::{PermissionMap, PermissionRegistry, SharedPermissions};
pub use snapshot::{OWNERS_KEY, PERMISSIONS_KEY};
pub use storage::{FileRegistryStorage, InMemoryRegistryStorage, RegistryStorage};
