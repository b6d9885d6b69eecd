//! Dbseed - Database Provisioning with a Template Cache
//!
//! Creates databases with a preinstalled component set, cloning from
//! cached database templates keyed by a content fingerprint so repeated
//! builds of the same component set cost one clone instead of a rebuild.

pub mod cache;
pub mod catalog;
pub mod cli;
pub mod config;
pub mod error;
pub mod fingerprint;
pub mod provision;
pub mod store;

pub use error::{DbseedError, DbseedResult};
