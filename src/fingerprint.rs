//! Content fingerprinting of build inputs
//!
//! A template is reusable only for the exact same build inputs, so the cache
//! key is a SHA-256 digest over the fully expanded component set: a marker
//! for the demo-data flag, then for each component in sorted order its name
//! and the relative path plus raw bytes of every non-excluded file under its
//! root. The walk visits directories and files in sorted order with
//! `/`-normalized paths, so the digest does not depend on filesystem
//! iteration order or platform path separators.

use crate::catalog::{expand, Catalog};
use crate::error::{DbseedError, DbseedResult};
use globset::{Glob, GlobSet, GlobSetBuilder};
use sha2::{Digest, Sha256};
use std::fs;
use std::path::Path;

/// Default exclusion globs: compiled-bytecode artifacts
pub const EXCLUDE_PATTERNS: &[&str] = &["*.pyc", "*.pyo"];

/// Compile exclusion globs into a match set
pub fn build_exclusions(patterns: &[String]) -> DbseedResult<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        let glob = Glob::new(pattern).map_err(|e| DbseedError::ExcludePatternInvalid {
            pattern: pattern.clone(),
            reason: e.to_string(),
        })?;
        builder.add(glob);
    }
    builder.build().map_err(|e| DbseedError::ExcludePatternInvalid {
        pattern: patterns.join(","),
        reason: e.to_string(),
    })
}

/// Compute the fingerprint for a requested component set.
///
/// The set is expanded exactly as the build would expand it (dependencies
/// plus auto-activated components), so cache correctness tracks build
/// correctness. Fails with `ComponentNotFound` before hashing anything if a
/// name does not resolve.
pub fn fingerprint(
    catalog: &dyn Catalog,
    components: &[String],
    demo: bool,
    exclude_patterns: &[String],
) -> DbseedResult<String> {
    let exclude = build_exclusions(exclude_patterns)?;
    let expanded = expand(catalog, components, true, false)?;

    let mut hasher = Sha256::new();
    hasher.update(format!("!demo={}!", u8::from(demo)).as_bytes());
    for name in &expanded {
        let component = catalog.resolve(name)?;
        hasher.update(name.as_bytes());
        let mut paths = Vec::new();
        walk_sorted(&component.root, "", &exclude, &mut paths)?;
        for relpath in paths {
            hasher.update(relpath.as_bytes());
            let file = join_relative(&component.root, &relpath);
            let bytes = fs::read(&file)
                .map_err(|e| DbseedError::io(format!("reading {}", file.display()), e))?;
            hasher.update(&bytes);
        }
    }
    Ok(hex::encode(hasher.finalize()))
}

/// Collect `/`-joined relative paths of non-excluded files under `dir`:
/// files of each directory in sorted order, then subdirectories in sorted
/// order, top-down.
fn walk_sorted(
    dir: &Path,
    rel: &str,
    exclude: &GlobSet,
    out: &mut Vec<String>,
) -> DbseedResult<()> {
    let entries = fs::read_dir(dir)
        .map_err(|e| DbseedError::io(format!("reading directory {}", dir.display()), e))?;

    let mut files = Vec::new();
    let mut dirs = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| DbseedError::io("reading directory entry", e))?;
        let file_type = entry
            .file_type()
            .map_err(|e| DbseedError::io("reading file type", e))?;
        let name = entry.file_name().to_string_lossy().into_owned();
        if file_type.is_dir() {
            dirs.push(name);
        } else {
            files.push(name);
        }
    }
    files.sort();
    dirs.sort();

    for file in files {
        let relpath = join_rel(rel, &file);
        if !exclude.is_match(&relpath) {
            out.push(relpath);
        }
    }
    for sub in dirs {
        let relpath = join_rel(rel, &sub);
        walk_sorted(&dir.join(&sub), &relpath, exclude, out)?;
    }
    Ok(())
}

fn join_rel(rel: &str, name: &str) -> String {
    if rel.is_empty() {
        name.to_string()
    } else {
        format!("{rel}/{name}")
    }
}

fn join_relative(root: &Path, relpath: &str) -> std::path::PathBuf {
    relpath.split('/').fold(root.to_path_buf(), |p, seg| p.join(seg))
}
