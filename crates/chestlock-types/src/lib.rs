//! Chest Lock Types - Core value types for the chest registry
//!
//! A lockable container is identified by the kind of block it is and where it
//! sits in the world. Users hold a tier of access on each claimed container.
//!
//! ## Key Concepts
//!
//! - **ChestPos**: Discrete block coordinate
//! - **ResourceIdentity**: Kind tag plus position; the registry's map key
//! - **PermissionTier**: Ordered access levels, `ROOT` through `NONE`

#![deny(unsafe_code)]
#![cfg_attr(feature = "strict-docs", warn(missing_docs))]
#![cfg_attr(not(feature = "strict-docs"), allow(missing_docs))]

pub mod error;
pub mod resource;
pub mod tier;

// Re-export main types
pub use error::ParseError;
pub use resource::{ChestPos, ResourceIdentity};
pub use tier::PermissionTier;
