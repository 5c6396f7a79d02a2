//! CLI configuration

use crate::error::{CliError, CliResult};
use chestlock_registry::RegistryConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// CLI configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct CliConfig {
    /// Registry persistence settings
    #[serde(default)]
    pub registry: RegistryConfig,
}

impl CliConfig {
    /// Load configuration from file
    pub fn load(path: Option<&Path>) -> CliResult<Self> {
        let config_path = match path {
            Some(p) => p.to_path_buf(),
            None => Self::default_config_path()?,
        };

        if config_path.exists() {
            let contents = std::fs::read_to_string(&config_path)?;
            let config: CliConfig =
                toml::from_str(&contents).map_err(|e| CliError::Config(e.to_string()))?;
            Ok(config)
        } else {
            Ok(CliConfig::default())
        }
    }

    /// Apply command-line overrides on top of the file values
    pub fn with_save_file(mut self, save_file: Option<PathBuf>) -> Self {
        if let Some(path) = save_file {
            self.registry.save_file = path;
        }
        self
    }

    /// Get the default configuration file path
    fn default_config_path() -> CliResult<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| CliError::Config("Cannot find config directory".into()))?;
        Ok(config_dir.join("chestlock").join("config.toml"))
    }
}
