//! Component catalog
//!
//! Components are named, independently versioned units of installable
//! content: a directory of files plus a `component.toml` manifest declaring
//! dependencies and activation flags.

pub mod manifest;
pub mod resolve;

pub use manifest::{ComponentManifest, MANIFEST_FILE};
pub use resolve::{expand, Catalog, Component, ManifestCatalog};
