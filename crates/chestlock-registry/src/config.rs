//! Registry configuration

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::error::{RegistryError, Result};

/// Configuration for registry persistence
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistryConfig {
    /// Save file holding the registry state
    #[serde(default = "default_save_file")]
    pub save_file: PathBuf,

    /// Seconds between background flushes of a dirty registry
    #[serde(default = "default_flush_interval")]
    pub flush_interval_secs: u64,

    /// Write the save file as indented JSON
    #[serde(default)]
    pub pretty: bool,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            save_file: default_save_file(),
            flush_interval_secs: default_flush_interval(),
            pretty: false,
        }
    }
}

impl RegistryConfig {
    pub fn flush_interval(&self) -> Duration {
        Duration::from_secs(self.flush_interval_secs)
    }

    /// Reject values the persistence loop cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.flush_interval_secs == 0 {
            return Err(RegistryError::Config(
                "flush_interval_secs must be at least 1".into(),
            ));
        }
        if self.save_file.as_os_str().is_empty() {
            return Err(RegistryError::Config("save_file must not be empty".into()));
        }
        Ok(())
    }
}

fn default_save_file() -> PathBuf {
    dirs::data_dir()
        .map(|dir| dir.join("chestlock").join("chest_lock.json"))
        .unwrap_or_else(|| PathBuf::from("chest_lock.json"))
}

const fn default_flush_interval() -> u64 {
    30
}
