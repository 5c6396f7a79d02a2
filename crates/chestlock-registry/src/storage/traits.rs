//! Storage trait definition.
//!
//! Defines the interface for registry save backends.

use async_trait::async_trait;

use crate::error::Result;

/// Trait for registry save backends.
#[async_trait]
pub trait RegistryStorage: Send + Sync {
    /// Load the most recent save, if any.
    async fn load(&self) -> Result<Option<Vec<u8>>>;

    /// Replace the save with `bytes`.
    async fn store(&self, bytes: &[u8]) -> Result<()>;

    /// Check if a save exists.
    async fn exists(&self) -> Result<bool> {
        Ok(self.load().await?.is_some())
    }

    /// Human-readable location, for logs.
    fn describe(&self) -> String;
}
