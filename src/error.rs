//! Error types for dbseed
//!
//! All modules use `DbseedResult<T>` as their return type.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for dbseed operations
pub type DbseedResult<T> = Result<T, DbseedError>;

/// All errors that can occur in dbseed
#[derive(Error, Debug)]
pub enum DbseedError {
    // Validation errors
    #[error("Invalid database name '{0}'")]
    InvalidDatabaseName(String),

    #[error("Invalid cache prefix '{0}' (1-8 chars, letter first, alphanumeric or '-')")]
    InvalidCachePrefix(String),

    // Catalog errors
    #[error("Component not found: {0}")]
    ComponentNotFound(String),

    #[error("Invalid component manifest at {path}: {reason}")]
    ManifestInvalid { path: PathBuf, reason: String },

    #[error("Invalid exclusion pattern '{pattern}': {reason}")]
    ExcludePatternInvalid { pattern: String, reason: String },

    // Configuration errors
    #[error("Invalid configuration at {path}: {reason}")]
    ConfigInvalid { path: PathBuf, reason: String },

    #[error("Failed to create config directory {path}: {source}")]
    ConfigDirCreate {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // Store errors
    #[error("Store error: {0}")]
    Store(String),

    // Build errors
    #[error("Fresh build failed: {command}: {reason}")]
    BuildFailed { command: String, reason: String },

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

impl DbseedError {
    /// Create an IO error with context
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    /// Create a store error from anything displayable
    pub fn store(reason: impl std::fmt::Display) -> Self {
        Self::Store(reason.to_string())
    }

    /// Get actionable hint for the error
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            Self::ComponentNotFound(_) => {
                Some("Check catalog.roots in the configuration (dbseed config show)")
            }
            Self::BuildFailed { .. } => Some("Check builder.command in the configuration"),
            Self::Store(_) => Some("Check store.url and that the server is reachable"),
            _ => None,
        }
    }
}

impl From<tokio_postgres::Error> for DbseedError {
    fn from(e: tokio_postgres::Error) -> Self {
        Self::Store(e.to_string())
    }
}
