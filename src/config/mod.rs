//! Configuration management for stagepath

pub mod schema;

pub use schema::{Config, MountConfig, StagingConfig};

use crate::error::{StagingError, StagingResult};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info};

/// Name of the project-local config file
pub const LOCAL_CONFIG_NAME: &str = ".stagepath.toml";

/// Configuration manager
pub struct ConfigManager {
    config_path: PathBuf,
}

impl ConfigManager {
    /// Create a new config manager with default path
    pub fn new() -> Self {
        Self {
            config_path: Self::default_config_path(),
        }
    }

    /// Create a config manager with a custom path
    pub fn with_path(path: PathBuf) -> Self {
        Self { config_path: path }
    }

    /// Get the default config file path
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("stagepath")
            .join("config.toml")
    }

    /// Walk up from `start` looking for a project-local config file
    pub fn find_local_config(start: &Path) -> Option<PathBuf> {
        start
            .ancestors()
            .map(|dir| dir.join(LOCAL_CONFIG_NAME))
            .find(|candidate| candidate.is_file())
    }

    /// Load configuration, creating default if not exists
    pub async fn load(&self) -> StagingResult<Config> {
        if !self.config_path.exists() {
            debug!("Config file not found, using defaults");
            return Ok(Config::default());
        }

        self.load_from_file(&self.config_path).await
    }

    /// Load configuration from a specific file
    pub async fn load_from_file(&self, path: &Path) -> StagingResult<Config> {
        let value = Self::read_table(path).await?;
        Self::into_config(value, path)
    }

    /// Load the global config with a local config layered on top
    ///
    /// Keys present in the local file win; tables merge recursively and
    /// everything else is replaced wholesale.
    pub async fn load_merged(&self, local: Option<&Path>) -> StagingResult<Config> {
        let Some(local) = local else {
            return self.load().await;
        };

        let mut merged = if self.config_path.exists() {
            Self::read_table(&self.config_path).await?
        } else {
            toml::Value::Table(toml::map::Map::new())
        };
        merge_toml(&mut merged, Self::read_table(local).await?);

        debug!("Merged local config from {}", local.display());
        Self::into_config(merged, local)
    }

    /// Save configuration to file
    pub async fn save(&self, config: &Config) -> StagingResult<()> {
        self.ensure_config_dir().await?;

        let content = toml::to_string_pretty(config)?;
        fs::write(&self.config_path, content).await.map_err(|e| {
            StagingError::io(
                format!("writing config to {}", self.config_path.display()),
                e,
            )
        })?;

        info!("Configuration saved to {}", self.config_path.display());
        Ok(())
    }

    /// Ensure the config directory exists
    async fn ensure_config_dir(&self) -> StagingResult<()> {
        if let Some(parent) = self.config_path.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| StagingError::ConfigDirCreate {
                    path: parent.to_path_buf(),
                    source: e,
                })?;
        }
        Ok(())
    }

    async fn read_table(path: &Path) -> StagingResult<toml::Value> {
        let content = fs::read_to_string(path)
            .await
            .map_err(|e| StagingError::io(format!("reading config from {}", path.display()), e))?;

        content
            .parse::<toml::Value>()
            .map_err(|e| StagingError::ConfigInvalid {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })
    }

    fn into_config(value: toml::Value, path: &Path) -> StagingResult<Config> {
        let config: Config = value.try_into().map_err(|e: toml::de::Error| {
            StagingError::ConfigInvalid {
                path: path.to_path_buf(),
                reason: e.to_string(),
            }
        })?;

        config
            .staging
            .validate()
            .map_err(|e| StagingError::ConfigInvalid {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?;

        Ok(config)
    }

    /// Get the config file path
    pub fn path(&self) -> &Path {
        &self.config_path
    }
}

impl Default for ConfigManager {
    fn default() -> Self {
        Self::new()
    }
}

fn merge_toml(base: &mut toml::Value, overlay: toml::Value) {
    match (base, overlay) {
        (toml::Value::Table(base), toml::Value::Table(overlay)) => {
            for (key, value) in overlay {
                match base.get_mut(&key) {
                    Some(existing) => merge_toml(existing, value),
                    None => {
                        base.insert(key, value);
                    }
                }
            }
        }
        (base, overlay) => *base = overlay,
    }
}
