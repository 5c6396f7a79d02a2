//! Registry storage backends.
//!
//! Provides storage abstractions for persisting the registry save.

pub mod file;
pub mod memory;
pub mod traits;

pub use file::FileRegistryStorage;
pub use memory::InMemoryRegistryStorage;
pub use traits::RegistryStorage;
