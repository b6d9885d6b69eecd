//! Store abstraction
//!
//! The template cache talks to the shared database server through a narrow
//! interface: sessions with autocommit semantics, advisory locks by integer
//! id, pattern listing, and the rename/drop/clone primitives. This trait
//! allows the cache to work with different backends:
//! - production: PostgreSQL ([`PostgresStore`])
//! - tests and embedding: an in-process store ([`MemoryStore`])

mod memory;
mod postgres;

pub use memory::MemoryStore;
pub use postgres::PostgresStore;

use crate::config::Config;
use crate::error::DbseedResult;
use async_trait::async_trait;

/// A shared store holding databases and advisory locks
#[async_trait]
pub trait Store: Send + Sync {
    /// Open a new session. Statements execute with autocommit semantics,
    /// and advisory locks acquired on the session are released when it is
    /// dropped.
    async fn session(&self) -> DbseedResult<Box<dyn StoreSession>>;
}

/// A single session against the store
///
/// Advisory locks are session-scoped and non-reentrant: acquiring the same id
/// twice on one session without releasing it deadlocks.
#[async_trait]
pub trait StoreSession: Send {
    /// Acquire an advisory lock, blocking until granted
    async fn acquire_lock(&mut self, lock_id: i64) -> DbseedResult<()>;

    /// Release a previously acquired advisory lock
    async fn release_lock(&mut self, lock_id: i64) -> DbseedResult<()>;

    /// List database names matching a SQL-LIKE pattern, descending
    async fn list_databases(&mut self, pattern: &str) -> DbseedResult<Vec<String>>;

    /// Whether a database exists (case-insensitive, matching server rules)
    async fn database_exists(&mut self, name: &str) -> DbseedResult<bool>;

    /// Clone `template` into a new database `name`.
    ///
    /// Fails if `name` already exists; the store, not just the cache lock,
    /// enforces one entry per name.
    async fn create_from_template(&mut self, name: &str, template: &str) -> DbseedResult<()>;

    /// Rename a database. Fails if `to` already exists.
    async fn rename_database(&mut self, from: &str, to: &str) -> DbseedResult<()>;

    /// Drop a database
    async fn drop_database(&mut self, name: &str) -> DbseedResult<()>;
}

/// Create the store configured in `[store]`.
pub fn create_store(config: &Config) -> DbseedResult<Box<dyn Store>> {
    Ok(Box::new(PostgresStore::new(&config.store.url)?))
}
