//! File-backed registry storage.
//!
//! The save lives in a single file. Writes go to a sibling temporary file
//! which is then renamed over the save, so readers never see a partial write.
//! Writes are serialized so two saves never share the temporary file.

use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use tracing::debug;

use super::traits::RegistryStorage;
use crate::error::{RegistryError, Result};

/// Single-file storage implementation.
pub struct FileRegistryStorage {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl FileRegistryStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    /// Get the save file path
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> Result<PathBuf> {
        let mut name = self
            .path
            .file_name()
            .ok_or_else(|| {
                RegistryError::Storage(format!(
                    "save path {} does not name a file",
                    self.path.display()
                ))
            })?
            .to_os_string();
        name.push(".tmp");
        Ok(self.path.with_file_name(name))
    }
}

#[async_trait]
impl RegistryStorage for FileRegistryStorage {
    async fn load(&self) -> Result<Option<Vec<u8>>> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn store(&self, bytes: &[u8]) -> Result<()> {
        let temp = self.temp_path()?;
        let _guard = self.write_lock.lock().await;

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }

        let mut file = tokio::fs::File::create(&temp).await?;
        file.write_all(bytes).await?;
        file.sync_all().await?;
        drop(file);

        tokio::fs::rename(&temp, &self.path).await?;
        debug!(path = %self.path.display(), bytes = bytes.len(), "Wrote registry save");
        Ok(())
    }

    async fn exists(&self) -> Result<bool> {
        Ok(tokio::fs::try_exists(&self.path).await?)
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}
