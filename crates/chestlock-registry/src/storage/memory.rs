//! In-memory registry storage for development and testing.

use async_trait::async_trait;
use parking_lot::RwLock;
use std::sync::atomic::{AtomicU64, Ordering};

use super::traits::RegistryStorage;
use crate::error::Result;

/// In-memory storage implementation.
pub struct InMemoryRegistryStorage {
    save: RwLock<Option<Vec<u8>>>,
    store_count: AtomicU64,
}

impl InMemoryRegistryStorage {
    /// Create an empty storage.
    pub fn new() -> Self {
        Self {
            save: RwLock::new(None),
            store_count: AtomicU64::new(0),
        }
    }

    /// Create a storage that already holds a save.
    pub fn with_save(bytes: Vec<u8>) -> Self {
        Self {
            save: RwLock::new(Some(bytes)),
            store_count: AtomicU64::new(0),
        }
    }

    /// Number of completed stores.
    pub fn store_count(&self) -> u64 {
        self.store_count.load(Ordering::SeqCst)
    }

    /// Current save contents.
    pub fn snapshot(&self) -> Option<Vec<u8>> {
        self.save.read().clone()
    }
}

impl Default for InMemoryRegistryStorage {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RegistryStorage for InMemoryRegistryStorage {
    async fn load(&self) -> Result<Option<Vec<u8>>> {
        Ok(self.save.read().clone())
    }

    async fn store(&self, bytes: &[u8]) -> Result<()> {
        *self.save.write() = Some(bytes.to_vec());
        self.store_count.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn describe(&self) -> String {
        "memory".to_string()
    }
}
