//! Component manifest parsing
//!
//! Each component directory carries a `component.toml` describing its
//! metadata, declared dependencies, and activation flags.

use crate::error::{DbseedError, DbseedResult};
use serde::Deserialize;
use std::path::Path;

/// Manifest file name inside a component directory
pub const MANIFEST_FILE: &str = "component.toml";

/// Parsed component manifest from component.toml
#[derive(Debug, Clone, Deserialize)]
pub struct ComponentManifest {
    /// Human-readable description
    pub description: String,

    /// Schema version for forward compatibility
    #[serde(default = "default_version")]
    pub version: String,

    /// Declared direct dependencies. When absent, the component implicitly
    /// depends on `core`.
    pub depends: Option<Vec<String>>,

    /// Activated automatically once all declared dependencies are present
    #[serde(default)]
    pub auto_activate: bool,

    /// Activated in every database regardless of the requested set
    #[serde(default)]
    pub always_active: bool,

    /// Whether the component can be installed at all
    #[serde(default = "default_installable")]
    pub installable: bool,
}

fn default_version() -> String {
    "1".to_string()
}

fn default_installable() -> bool {
    true
}

impl ComponentManifest {
    /// Parse a manifest from a TOML file on disk
    pub fn from_file(path: &Path) -> DbseedResult<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| DbseedError::io(format!("reading manifest {}", path.display()), e))?;
        Self::parse(&content, path)
    }

    /// Parse a manifest from a TOML string
    pub fn parse(content: &str, path: &Path) -> DbseedResult<Self> {
        toml::from_str(content).map_err(|e| DbseedError::ManifestInvalid {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }

    /// Direct dependencies, applying the implicit `core` default
    pub fn dependencies(&self) -> Vec<String> {
        match &self.depends {
            Some(deps) => deps.clone(),
            None => vec!["core".to_string()],
        }
    }
}
