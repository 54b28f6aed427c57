//! Configuration schema for stagepath
//!
//! Configuration is stored at `~/.config/stagepath/config.toml`

use crate::error::{StagingError, StagingResult};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// General settings
    pub general: GeneralConfig,

    /// Staging allocation settings
    pub staging: StagingConfig,

    /// Logical namespaces served from local directories
    pub mounts: Vec<MountConfig>,
}

/// General application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Enable verbose logging
    pub verbose: bool,

    /// Log format: "text" or "json"
    pub log_format: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            verbose: false,
            log_format: "text".to_string(),
        }
    }
}

/// Staging allocation settings, fixed once an allocator is built
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StagingConfig {
    /// Relative staging directory name placed next to destinations
    pub dir: String,

    /// New staging directories take their parent's permissions
    pub inherit_perms: bool,

    /// Prefix of generated temp leaf names
    pub tmp_prefix: String,

    /// Starting value of the path id counter; first id is `id_seed + 1`
    pub id_seed: u64,

    /// Schemes that route across several filesystems (cross-mount
    /// renames unsafe), staged next to the destination's parent
    pub view_schemes: Vec<String>,

    /// Prefix for generated execution ids
    pub execution_prefix: String,
}

impl Default for StagingConfig {
    fn default() -> Self {
        Self {
            dir: ".staging".to_string(),
            inherit_perms: false,
            tmp_prefix: "_tmp.ext.".to_string(),
            id_seed: 10000,
            view_schemes: vec!["viewfs".to_string()],
            execution_prefix: "stagepath".to_string(),
        }
    }
}

impl StagingConfig {
    /// Check the settings an allocator relies on
    pub fn validate(&self) -> StagingResult<()> {
        let dir = self.dir.trim();
        if dir.is_empty() {
            return Err(StagingError::SettingsInvalid(
                "staging.dir must not be empty".to_string(),
            ));
        }
        if dir.starts_with('/') || dir.contains("://") {
            return Err(StagingError::SettingsInvalid(format!(
                "staging.dir must be relative, got {}",
                self.dir
            )));
        }
        if dir.split('/').any(|s| s == ".." || s == ".") {
            return Err(StagingError::SettingsInvalid(format!(
                "staging.dir must not contain relative segments, got {}",
                self.dir
            )));
        }
        if self.tmp_prefix.is_empty() || self.tmp_prefix.contains('/') {
            return Err(StagingError::SettingsInvalid(
                "staging.tmp_prefix must be a non-empty name without '/'".to_string(),
            ));
        }
        Ok(())
    }

    /// Whether `scheme` names a federated/view mount
    pub fn is_view_scheme(&self, scheme: &str) -> bool {
        self.view_schemes
            .iter()
            .any(|s| s.eq_ignore_ascii_case(scheme))
    }
}

/// A logical namespace served out of a local directory
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MountConfig {
    /// Namespace, e.g. `hdfs://nn1`
    pub uri: String,

    /// Local directory backing the namespace
    pub root: PathBuf,
}
