//! Component resolution and dependency expansion
//!
//! Components are resolved by name against a list of catalog roots (first
//! match wins). [`expand`] computes the closure of a requested set: direct
//! dependencies transitively, optionally every `always_active` component,
//! and optionally the fixed point of `auto_activate` components whose
//! dependencies are already satisfied.

use crate::catalog::manifest::{ComponentManifest, MANIFEST_FILE};
use crate::error::{DbseedError, DbseedResult};
use std::collections::BTreeSet;
use std::path::PathBuf;

/// A resolved component
#[derive(Debug, Clone)]
pub struct Component {
    /// Component name (directory name)
    pub name: String,
    /// Directory holding the component's files
    pub root: PathBuf,
    /// Parsed manifest
    pub manifest: ComponentManifest,
}

/// Source of component metadata
///
/// Keeps fingerprinting and expansion independent of where components are
/// declared; the default implementation reads manifest directories, but a
/// registry-backed catalog satisfies the same contract.
pub trait Catalog: Send + Sync {
    /// Resolve a component by name
    fn resolve(&self, name: &str) -> DbseedResult<Component>;

    /// All installable component names, sorted ascending
    fn names(&self) -> DbseedResult<Vec<String>>;
}

/// Catalog backed by directories of `component.toml` manifests
pub struct ManifestCatalog {
    roots: Vec<PathBuf>,
}

impl ManifestCatalog {
    /// Create a catalog searching `roots` in order
    pub fn new(roots: Vec<PathBuf>) -> Self {
        Self { roots }
    }
}

/// Reject names that could escape the catalog roots.
fn validate_component_name(name: &str) -> DbseedResult<()> {
    let safe = !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if safe {
        Ok(())
    } else {
        Err(DbseedError::ComponentNotFound(name.to_string()))
    }
}

impl Catalog for ManifestCatalog {
    fn resolve(&self, name: &str) -> DbseedResult<Component> {
        validate_component_name(name)?;
        for root in &self.roots {
            let dir = root.join(name);
            let manifest_path = dir.join(MANIFEST_FILE);
            if manifest_path.is_file() {
                let manifest = ComponentManifest::from_file(&manifest_path)?;
                return Ok(Component {
                    name: name.to_string(),
                    root: dir,
                    manifest,
                });
            }
        }
        Err(DbseedError::ComponentNotFound(name.to_string()))
    }

    fn names(&self) -> DbseedResult<Vec<String>> {
        let mut names = BTreeSet::new();
        for root in &self.roots {
            let entries = match std::fs::read_dir(root) {
                Ok(entries) => entries,
                Err(e) => {
                    return Err(DbseedError::io(
                        format!("reading catalog root {}", root.display()),
                        e,
                    ))
                }
            };
            for entry in entries {
                let entry =
                    entry.map_err(|e| DbseedError::io("reading catalog entry", e))?;
                let dir = entry.path();
                let manifest_path = dir.join(MANIFEST_FILE);
                if !manifest_path.is_file() {
                    continue;
                }
                let Some(name) = dir.file_name().and_then(|n| n.to_str()) else {
                    continue;
                };
                if names.contains(name) {
                    continue; // earlier root wins
                }
                let manifest = ComponentManifest::from_file(&manifest_path)?;
                if manifest.installable {
                    names.insert(name.to_string());
                }
            }
        }
        Ok(names.into_iter().collect())
    }
}

/// Expand a component set to its dependency closure.
///
/// `include_always_active` additionally seeds every component flagged
/// `always_active`. `include_auto_activate` then iterates to a fixed point:
/// any `auto_activate` component whose declared dependencies are all present
/// is added (with its own dependencies), repeating until nothing changes —
/// auto-activated components may themselves satisfy further ones.
pub fn expand(
    catalog: &dyn Catalog,
    names: &[String],
    include_auto_activate: bool,
    include_always_active: bool,
) -> DbseedResult<BTreeSet<String>> {
    let mut result = BTreeSet::new();
    for name in names {
        add_with_deps(catalog, name, &mut result)?;
    }

    if include_always_active {
        for name in catalog.names()? {
            if catalog.resolve(&name)?.manifest.always_active {
                add_with_deps(catalog, &name, &mut result)?;
            }
        }
    }

    if include_auto_activate {
        let mut candidates = Vec::new();
        for name in catalog.names()? {
            let component = catalog.resolve(&name)?;
            if component.manifest.auto_activate {
                candidates.push((name, component.manifest.dependencies()));
            }
        }
        let mut changed = true;
        while changed {
            changed = false;
            for (name, deps) in &candidates {
                if result.contains(name) {
                    continue;
                }
                if deps.iter().all(|dep| result.contains(dep)) {
                    add_with_deps(catalog, name, &mut result)?;
                    changed = true;
                }
            }
        }
    }

    Ok(result)
}

fn add_with_deps(
    catalog: &dyn Catalog,
    name: &str,
    result: &mut BTreeSet<String>,
) -> DbseedResult<()> {
    if result.contains(name) {
        return Ok(());
    }
    result.insert(name.to_string());
    let component = catalog.resolve(name)?;
    for dep in component.manifest.dependencies() {
        add_with_deps(catalog, &dep, result)?;
    }
    Ok(())
}
