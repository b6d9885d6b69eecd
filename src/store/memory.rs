//! In-process store
//!
//! Backs the cache with plain in-memory state: a sorted set of database
//! names and one async mutex per advisory lock id. Sessions share state
//! through the parent [`MemoryStore`], so concurrent tasks observe the same
//! serialization the real server would provide. Used by the test suite and
//! available to embedders who want cache behavior without a server.

use crate::error::{DbseedError, DbseedResult};
use crate::store::{Store, StoreSession};
use async_trait::async_trait;
use std::collections::{BTreeSet, HashMap};
use std::sync::{Arc, Mutex as StdMutex};
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

/// Shared in-memory store
#[derive(Clone, Default)]
pub struct MemoryStore {
    state: Arc<State>,
}

#[derive(Default)]
struct State {
    databases: StdMutex<BTreeSet<String>>,
    locks: StdMutex<HashMap<i64, Arc<AsyncMutex<()>>>>,
}

impl MemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a database directly, bypassing the clone primitive.
    ///
    /// Test fixture helper: lets fixtures fabricate pre-existing databases
    /// and cache entries with arbitrary names.
    pub fn seed(&self, name: &str) {
        self.state
            .databases
            .lock()
            .expect("store state poisoned")
            .insert(name.to_string());
    }

    /// All database names, ascending
    pub fn database_names(&self) -> Vec<String> {
        self.state
            .databases
            .lock()
            .expect("store state poisoned")
            .iter()
            .cloned()
            .collect()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn session(&self) -> DbseedResult<Box<dyn StoreSession>> {
        Ok(Box::new(MemorySession {
            state: Arc::clone(&self.state),
            held: HashMap::new(),
        }))
    }
}

struct MemorySession {
    state: Arc<State>,
    // Guards held by this session; dropping the session releases them,
    // mirroring server advisory locks dying with their session.
    held: HashMap<i64, OwnedMutexGuard<()>>,
}

impl MemorySession {
    fn with_databases<T>(&self, f: impl FnOnce(&mut BTreeSet<String>) -> T) -> T {
        let mut dbs = self.state.databases.lock().expect("store state poisoned");
        f(&mut dbs)
    }
}

#[async_trait]
impl StoreSession for MemorySession {
    async fn acquire_lock(&mut self, lock_id: i64) -> DbseedResult<()> {
        let mutex = {
            let mut locks = self.state.locks.lock().expect("store state poisoned");
            Arc::clone(locks.entry(lock_id).or_default())
        };
        // Blocks until the current holder's session releases or drops.
        // Re-acquiring on the same session deadlocks, as with the server.
        let guard = mutex.lock_owned().await;
        self.held.insert(lock_id, guard);
        Ok(())
    }

    async fn release_lock(&mut self, lock_id: i64) -> DbseedResult<()> {
        match self.held.remove(&lock_id) {
            Some(_guard) => Ok(()),
            None => Err(DbseedError::store(format!(
                "advisory lock {lock_id} not held by this session"
            ))),
        }
    }

    async fn list_databases(&mut self, pattern: &str) -> DbseedResult<Vec<String>> {
        let mut names = self.with_databases(|dbs| {
            dbs.iter()
                .filter(|name| like_match(pattern, name))
                .cloned()
                .collect::<Vec<_>>()
        });
        names.reverse(); // BTreeSet iterates ascending
        Ok(names)
    }

    async fn database_exists(&mut self, name: &str) -> DbseedResult<bool> {
        let lower = name.to_lowercase();
        Ok(self.with_databases(|dbs| dbs.iter().any(|db| db.to_lowercase() == lower)))
    }

    async fn create_from_template(&mut self, name: &str, template: &str) -> DbseedResult<()> {
        self.with_databases(|dbs| {
            if !dbs.contains(template) {
                return Err(DbseedError::store(format!(
                    "template database \"{template}\" does not exist"
                )));
            }
            if dbs.contains(name) {
                return Err(DbseedError::store(format!(
                    "database \"{name}\" already exists"
                )));
            }
            dbs.insert(name.to_string());
            Ok(())
        })
    }

    async fn rename_database(&mut self, from: &str, to: &str) -> DbseedResult<()> {
        self.with_databases(|dbs| {
            if !dbs.contains(from) {
                return Err(DbseedError::store(format!(
                    "database \"{from}\" does not exist"
                )));
            }
            if dbs.contains(to) {
                return Err(DbseedError::store(format!(
                    "database \"{to}\" already exists"
                )));
            }
            dbs.remove(from);
            dbs.insert(to.to_string());
            Ok(())
        })
    }

    async fn drop_database(&mut self, name: &str) -> DbseedResult<()> {
        self.with_databases(|dbs| {
            if dbs.remove(name) {
                Ok(())
            } else {
                Err(DbseedError::store(format!(
                    "database \"{name}\" does not exist"
                )))
            }
        })
    }
}

/// SQL-LIKE matching: `_` matches exactly one character, `%` any run.
fn like_match(pattern: &str, value: &str) -> bool {
    let p: Vec<char> = pattern.chars().collect();
    let v: Vec<char> = value.chars().collect();

    // Greedy match with backtracking on the last '%'
    let (mut pi, mut vi) = (0usize, 0usize);
    let mut star: Option<(usize, usize)> = None;

    while vi < v.len() {
        if pi < p.len() && (p[pi] == '_' || p[pi] == v[vi]) {
            pi += 1;
            vi += 1;
        } else if pi < p.len() && p[pi] == '%' {
            star = Some((pi, vi));
            pi += 1;
        } else if let Some((spi, svi)) = star {
            pi = spi + 1;
            vi = svi + 1;
            star = Some((spi, svi + 1));
        } else {
            return false;
        }
    }
    while pi < p.len() && p[pi] == '%' {
        pi += 1;
    }
    pi == p.len()
}
