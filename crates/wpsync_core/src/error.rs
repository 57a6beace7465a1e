use std::path::PathBuf;

use serde::Serialize;
use thiserror::Error;

use crate::post::PostId;
use crate::sync::GatewayError;

/// Unified error type for wpsync operations
#[derive(Debug, Error)]
pub enum WpSyncError {
    // IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to read file '{path}': {source}")]
    FileRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to write file '{path}': {source}")]
    FileWrite {
        path: PathBuf,
        source: std::io::Error,
    },

    // Serialization errors
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Malformed editable metadata in '{path}': {source}")]
    MalformedEditable {
        path: PathBuf,
        source: serde_yaml::Error,
    },

    // Config errors
    #[error("Config parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("Config serialize error: {0}")]
    ConfigSerialize(#[from] toml::ser::Error),

    #[error("Could not determine config directory")]
    NoConfigDir,

    #[error("Configuration not initialized. Run 'wpsync config init' first.")]
    ConfigNotInitialized,

    // Cache errors
    #[error("Cache at '{0}' is locked by another wpsync process")]
    CacheLocked(PathBuf),

    // Remote errors
    #[error("{operation} failed{}: {source}", post_suffix(.id))]
    Gateway {
        id: Option<PostId>,
        operation: &'static str,
        source: GatewayError,
    },
}

fn post_suffix(id: &Option<PostId>) -> String {
    id.map(|id| format!(" for post {id}")).unwrap_or_default()
}

impl WpSyncError {
    /// Wrap a gateway failure with the operation and post it concerned.
    pub fn gateway(operation: &'static str, id: Option<PostId>, source: GatewayError) -> Self {
        WpSyncError::Gateway {
            id,
            operation,
            source,
        }
    }
}

/// Result type alias for wpsync operations
pub type Result<T> = std::result::Result<T, WpSyncError>;

/// A serializable representation of WpSyncError for JSON output
#[derive(Debug, Clone, Serialize)]
pub struct SerializableError {
    /// Error kind/variant name
    pub kind: String,
    /// Human-readable error message
    pub message: String,
    /// Associated path (if applicable)
    pub path: Option<PathBuf>,
    /// Associated post id (if applicable)
    pub post_id: Option<PostId>,
}

impl From<&WpSyncError> for SerializableError {
    fn from(err: &WpSyncError) -> Self {
        let kind = match err {
            WpSyncError::Io(_) => "Io",
            WpSyncError::FileRead { .. } => "FileRead",
            WpSyncError::FileWrite { .. } => "FileWrite",
            WpSyncError::Yaml(_) => "Yaml",
            WpSyncError::Json(_) => "Json",
            WpSyncError::MalformedEditable { .. } => "MalformedEditable",
            WpSyncError::ConfigParse(_) => "ConfigParse",
            WpSyncError::ConfigSerialize(_) => "ConfigSerialize",
            WpSyncError::NoConfigDir => "NoConfigDir",
            WpSyncError::ConfigNotInitialized => "ConfigNotInitialized",
            WpSyncError::CacheLocked(_) => "CacheLocked",
            WpSyncError::Gateway { .. } => "Gateway",
        }
        .to_string();

        let path = match err {
            WpSyncError::FileRead { path, .. } => Some(path.clone()),
            WpSyncError::FileWrite { path, .. } => Some(path.clone()),
            WpSyncError::MalformedEditable { path, .. } => Some(path.clone()),
            WpSyncError::CacheLocked(path) => Some(path.clone()),
            _ => None,
        };

        let post_id = match err {
            WpSyncError::Gateway { id, .. } => *id,
            _ => None,
        };

        Self {
            kind,
            message: err.to_string(),
            path,
            post_id,
        }
    }
}

impl From<WpSyncError> for SerializableError {
    fn from(err: WpSyncError) -> Self {
        SerializableError::from(&err)
    }
}

impl WpSyncError {
    /// Convert to a serializable representation for JSON output
    pub fn to_serializable(&self) -> SerializableError {
        SerializableError::from(self)
    }
}
