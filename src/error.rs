//! Error types for stagepath
//!
//! All modules use `StagingResult<T>` as their return type.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for stagepath operations
pub type StagingResult<T> = Result<T, StagingError>;

/// All errors that can occur in stagepath
#[derive(Error, Debug)]
pub enum StagingError {
    // Input errors
    #[error("Malformed path '{path}': {reason}")]
    MalformedPath { path: String, reason: String },

    // Filesystem errors
    #[error("No filesystem client for '{path}': {reason}")]
    FileSystemUnavailable { path: String, reason: String },

    #[error("Cannot create staging directory '{path}'")]
    StagingDirDenied { path: String },

    #[error("Cannot create staging directory '{path}': {source}")]
    StagingDirIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    // Configuration errors
    #[error("Invalid configuration at {path}: {reason}")]
    ConfigInvalid { path: PathBuf, reason: String },

    #[error("Invalid staging settings: {0}")]
    SettingsInvalid(String),

    #[error("Failed to create config directory {path}: {source}")]
    ConfigDirCreate {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // IO errors
    #[error("IO error: {context}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    // Serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    // General errors
    #[error("{0}")]
    User(String),
}

impl StagingError {
    /// Create an IO error with context
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    /// Create a malformed path error
    pub fn malformed(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::MalformedPath {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Create a filesystem-unavailable error
    pub fn unavailable(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::FileSystemUnavailable {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Whether this error came out of staging-directory allocation
    ///
    /// Nothing retries these internally; the caller decides.
    pub fn is_allocation_failure(&self) -> bool {
        matches!(
            self,
            Self::MalformedPath { .. }
                | Self::FileSystemUnavailable { .. }
                | Self::StagingDirDenied { .. }
                | Self::StagingDirIo { .. }
        )
    }

    /// Get actionable hint for the error
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            Self::MalformedPath { .. } => {
                Some("Use a fully qualified path, e.g. hdfs://namenode/warehouse/db/tbl")
            }
            Self::FileSystemUnavailable { .. } => {
                Some("Add a [[mounts]] entry for this scheme and authority")
            }
            Self::StagingDirDenied { .. } => Some("Check write permissions on the destination"),
            Self::SettingsInvalid(_) => Some("Run: stagepath config show"),
            _ => None,
        }
    }
}
