//! Registry persistence lifecycle.
//!
//! Loads the registry once at startup, writes it back whenever it is dirty,
//! and forces a final write at shutdown. Registry calls never wait on I/O;
//! they only raise the dirty flag that this module watches.

use std::sync::Arc;

use tokio::sync::watch;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{error, info, instrument};

use crate::config::RegistryConfig;
use crate::error::Result;
use crate::registry::PermissionRegistry;
use crate::storage::RegistryStorage;

/// Owns the registry instance and its save backend
pub struct RegistryPersistence {
    registry: Arc<PermissionRegistry>,
    storage: Arc<dyn RegistryStorage>,
    config: RegistryConfig,
}

impl RegistryPersistence {
    /// Restore the registry from `storage`, or start empty when there is no
    /// save yet. A save that cannot be decoded is an error.
    #[instrument(skip(storage, config), fields(backend = %storage.describe()))]
    pub async fn open(storage: Arc<dyn RegistryStorage>, config: RegistryConfig) -> Result<Self> {
        config.validate()?;

        let registry = match storage.load().await? {
            Some(bytes) => {
                let registry = PermissionRegistry::from_state(&bytes)?;
                info!(
                    chests = registry.len(),
                    logical = registry.logical_len(),
                    "Restored chest registry"
                );
                registry
            }
            None => {
                info!("No registry save found, starting empty");
                PermissionRegistry::new()
            }
        };

        Ok(Self {
            registry: Arc::new(registry),
            storage,
            config,
        })
    }

    /// The shared registry handed to every collaborator
    pub fn registry(&self) -> Arc<PermissionRegistry> {
        Arc::clone(&self.registry)
    }

    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    /// Save if anything changed since the last save.
    ///
    /// Returns whether a save was written. A failed write re-raises the dirty
    /// flag so the next flush retries.
    pub async fn flush_if_dirty(&self) -> Result<bool> {
        if !self.registry.take_dirty() {
            return Ok(false);
        }

        match self.write().await {
            Ok(()) => Ok(true),
            Err(e) => {
                self.registry.mark_dirty();
                Err(e)
            }
        }
    }

    /// Save unconditionally
    pub async fn flush(&self) -> Result<()> {
        self.registry.take_dirty();
        if let Err(e) = self.write().await {
            self.registry.mark_dirty();
            return Err(e);
        }
        Ok(())
    }

    /// Final save before the process stops
    #[instrument(skip(self))]
    pub async fn shutdown(&self) -> Result<()> {
        self.registry.mark_dirty();
        self.flush_if_dirty().await?;
        info!(chests = self.registry.len(), "Registry saved for shutdown");
        Ok(())
    }

    /// Flush on every tick of the configured interval until `shutdown` turns
    /// true, then write a final save.
    pub async fn run_flush_loop(self: Arc<Self>, mut shutdown: watch::Receiver<bool>) {
        let mut ticker = interval(self.config.flush_interval());
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        info!(
            interval_secs = self.config.flush_interval_secs,
            "Registry flush loop started"
        );

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    if let Err(e) = self.flush_if_dirty().await {
                        error!(error = %e, "Registry flush failed");
                    }
                }
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
            }
        }

        if let Err(e) = self.shutdown().await {
            error!(error = %e, "Final registry flush failed");
        }
        info!("Registry flush loop stopped");
    }

    async fn write(&self) -> Result<()> {
        let bytes = if self.config.pretty {
            self.registry.serialize_state_pretty()?
        } else {
            self.registry.serialize_state()?
        };
        self.storage.store(&bytes).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RegistryError;
    use crate::storage::InMemoryRegistryStorage;
    use chestlock_types::ResourceIdentity;

    fn chest(x: i32, z: i32) -> ResourceIdentity {
        ResourceIdentity::new("tile.chest", x, 64, z)
    }

    #[tokio::test]
    async fn test_open_empty_storage() {
        let storage = Arc::new(InMemoryRegistryStorage::new());
        let persistence = RegistryPersistence::open(storage, RegistryConfig::default())
            .await
            .unwrap();
        assert!(persistence.registry().is_empty());
    }

    #[tokio::test]
    async fn test_open_corrupt_save_fails() {
        let storage = Arc::new(InMemoryRegistryStorage::with_save(b"garbage".to_vec()));
        let result = RegistryPersistence::open(storage, RegistryConfig::default()).await;
        assert!(matches!(result, Err(RegistryError::Serialization(_))));
    }

    #[tokio::test]
    async fn test_flush_only_when_dirty() {
        let storage = Arc::new(InMemoryRegistryStorage::new());
        let persistence = RegistryPersistence::open(storage.clone(), RegistryConfig::default())
            .await
            .unwrap();

        assert!(!persistence.flush_if_dirty().await.unwrap());
        assert_eq!(storage.store_count(), 0);

        persistence.registry().claim("alice", &chest(0, 0), None);
        assert!(persistence.flush_if_dirty().await.unwrap());
        assert!(!persistence.flush_if_dirty().await.unwrap());
        assert_eq!(storage.store_count(), 1);
    }

    #[tokio::test]
    async fn test_shutdown_always_writes() {
        let storage = Arc::new(InMemoryRegistryStorage::new());
        let persistence = RegistryPersistence::open(storage.clone(), RegistryConfig::default())
            .await
            .unwrap();

        persistence.shutdown().await.unwrap();
        assert_eq!(storage.store_count(), 1);

        let reopened = PermissionRegistry::from_state(&storage.snapshot().unwrap()).unwrap();
        assert!(reopened.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_flush_loop_saves_and_stops() {
        let storage = Arc::new(InMemoryRegistryStorage::new());
        let config = RegistryConfig {
            flush_interval_secs: 5,
            ..RegistryConfig::default()
        };
        let persistence = Arc::new(
            RegistryPersistence::open(storage.clone(), config)
                .await
                .unwrap(),
        );
        let (tx, rx) = watch::channel(false);
        let handle = tokio::spawn(persistence.clone().run_flush_loop(rx));

        persistence.registry().claim("alice", &chest(0, 0), None);
        tokio::time::sleep(std::time::Duration::from_secs(6)).await;
        assert!(storage.store_count() >= 1);

        tx.send(true).unwrap();
        handle.await.unwrap();

        let saved = PermissionRegistry::from_state(&storage.snapshot().unwrap()).unwrap();
        assert!(saved.contains(&chest(0, 0)));
    }
}
