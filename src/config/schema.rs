//! Configuration schema for dbseed
//!
//! Configuration is stored at `~/.config/dbseed/config.toml`

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Shared store connection
    pub store: StoreConfig,

    /// Component catalog settings
    pub catalog: CatalogConfig,

    /// Template cache settings
    pub cache: CacheConfig,

    /// Fresh-build settings
    pub builder: BuilderConfig,
}

/// Store connection settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Connection string for the maintenance session
    /// (URL or key-value form)
    pub url: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            url: "host=localhost user=postgres dbname=postgres".to_string(),
        }
    }
}

/// Component catalog settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    /// Directories searched for components, in priority order
    pub roots: Vec<PathBuf>,

    /// Glob patterns excluded from fingerprinting
    pub exclude: Vec<String>,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            roots: vec![],
            exclude: crate::fingerprint::EXCLUDE_PATTERNS
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

/// Template cache settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Use the template cache (default: true)
    pub enabled: bool,

    /// Prefix for cache template names (max 8 characters).
    /// All databases named `{prefix}-____________-%` are subject to
    /// cache trimming, so choose it carefully.
    pub prefix: String,

    /// Drop templates unused for more than N days (-1 disables)
    pub max_age_days: i64,

    /// Keep the N most recently used templates
    /// (-1 disables, 0 empties the cache)
    pub max_size: i64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            prefix: "cache".to_string(),
            max_age_days: 30,
            max_size: 5,
        }
    }
}

/// Fresh-build settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BuilderConfig {
    /// Command run to build a database from scratch. Placeholders:
    /// `{database}`, `{components}` (comma-joined), `{demo}` (true/false).
    pub command: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_serializes() {
        let config = Config::default();
        let toml = toml::to_string_pretty(&config).unwrap();
        assert!(toml.contains("[store]"));
        assert!(toml.contains("[cache]"));
    }

    #[test]
    fn config_deserializes_empty() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.cache.prefix, "cache");
        assert_eq!(config.cache.max_age_days, 30);
        assert_eq!(config.cache.max_size, 5);
        assert!(config.cache.enabled);
        assert_eq!(config.catalog.exclude, vec!["*.pyc", "*.pyo"]);
    }

    #[test]
    fn config_deserializes_partial() {
        let toml = r#"
            [cache]
            prefix = "pytest"
            max_size = -1
        "#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.cache.prefix, "pytest");
        assert_eq!(config.cache.max_size, -1);
        assert_eq!(config.cache.max_age_days, 30); // default preserved
    }
}
