//! Provisioning orchestration
//!
//! Ties the pieces together: fingerprint the requested component set, clone
//! from the template cache on a hit, fall back to a fresh build and register
//! the result on a miss, then apply the configured trim thresholds. Errors
//! propagate as-is; retry policy belongs to whoever calls [`provision`].

mod command;

pub use command::CommandBuilder;

use crate::cache::{check_database_name, TemplateCache};
use crate::catalog::Catalog;
use crate::config::schema::CacheConfig;
use crate::error::{DbseedError, DbseedResult};
use crate::fingerprint::fingerprint;
use crate::store::Store;
use async_trait::async_trait;
use chrono::Duration;
use tracing::info;

/// The expensive build step: create `database` from scratch with the given
/// components installed. Opaque and potentially slow; failures propagate
/// unchanged and nothing is cached when they occur.
#[async_trait]
pub trait Builder: Send + Sync {
    /// Build a database from scratch
    async fn build_fresh(
        &self,
        database: &str,
        components: &[String],
        demo: bool,
    ) -> DbseedResult<()>;
}

/// Cache behavior for one provisioning run
#[derive(Debug, Clone)]
pub struct CacheOptions {
    /// Use the cache at all
    pub enabled: bool,
    /// Cache prefix
    pub prefix: String,
    /// Age threshold in days (-1 disables age trimming)
    pub max_age_days: i64,
    /// Count threshold (-1 disables, 0 empties the cache)
    pub max_size: i64,
}

impl From<&CacheConfig> for CacheOptions {
    fn from(config: &CacheConfig) -> Self {
        Self {
            enabled: config.enabled,
            prefix: config.prefix.clone(),
            max_age_days: config.max_age_days,
            max_size: config.max_size,
        }
    }
}

/// How a provisioning run was satisfied
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProvisionOutcome {
    /// Cloned from a cached template
    FromTemplate,
    /// Built from scratch (and registered in the cache when enabled)
    BuiltFresh,
    /// No database requested; only cache trimming ran
    TrimOnly,
    /// Cache disabled and no database requested
    Nothing,
}

/// Provision a database, using the template cache when enabled.
///
/// With no database name, only the trim thresholds are applied. Trimming
/// runs after every invocation with a non-negative threshold.
pub async fn provision(
    store: &dyn Store,
    builder: &dyn Builder,
    catalog: &dyn Catalog,
    new_database: Option<&str>,
    components: &[String],
    demo: bool,
    cache: &CacheOptions,
    exclude: &[String],
) -> DbseedResult<ProvisionOutcome> {
    if let Some(database) = new_database {
        check_database_name(database)?;
    }

    if !cache.enabled {
        return match new_database {
            Some(database) => {
                builder.build_fresh(database, components, demo).await?;
                Ok(ProvisionOutcome::BuiltFresh)
            }
            None => {
                info!("cache disabled and no database name provided; nothing to do");
                Ok(ProvisionOutcome::Nothing)
            }
        };
    }

    // Prefix validation happens before any fingerprinting or store work
    let template_cache = TemplateCache::new(&cache.prefix)?;

    let mut outcome = ProvisionOutcome::TrimOnly;
    let mut session = match new_database {
        Some(database) => {
            // Fingerprinting can fail with ComponentNotFound; do it before
            // opening a session so nothing touches the store on bad input
            let digest = fingerprint(catalog, components, demo, exclude)?;
            let mut session = store.session().await?;
            if session.database_exists(database).await? {
                return Err(DbseedError::User(format!(
                    "Database {database} already exists"
                )));
            }
            if template_cache
                .create(session.as_mut(), database, &digest)
                .await?
            {
                info!("found matching template for {database}");
                outcome = ProvisionOutcome::FromTemplate;
            } else {
                builder.build_fresh(database, components, demo).await?;
                template_cache.add(session.as_mut(), database, &digest).await?;
                outcome = ProvisionOutcome::BuiltFresh;
            }
            session
        }
        None => store.session().await?,
    };

    if cache.max_size >= 0 {
        template_cache
            .trim_size(session.as_mut(), cache.max_size as usize)
            .await?;
    }
    if cache.max_age_days >= 0 {
        template_cache
            .trim_age(session.as_mut(), Duration::days(cache.max_age_days))
            .await?;
    }

    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{ManifestCatalog, MANIFEST_FILE};
    use crate::error::DbseedError;
    use crate::fingerprint::EXCLUDE_PATTERNS;
    use crate::store::MemoryStore;
    use std::fs;
    use std::sync::{Arc, Mutex};
    use tempfile::TempDir;

    /// Builder that "builds" by seeding the database into the memory store
    struct MockBuilder {
        store: MemoryStore,
        calls: Arc<Mutex<Vec<String>>>,
        fail: bool,
    }

    impl MockBuilder {
        fn new(store: &MemoryStore) -> Self {
            Self {
                store: store.clone(),
                calls: Arc::new(Mutex::new(Vec::new())),
                fail: false,
            }
        }

        fn failing(store: &MemoryStore) -> Self {
            Self {
                fail: true,
                ..Self::new(store)
            }
        }

        fn call_count(&self) -> usize {
            self.calls.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl Builder for MockBuilder {
        async fn build_fresh(
            &self,
            database: &str,
            _components: &[String],
            _demo: bool,
        ) -> DbseedResult<()> {
            self.calls.lock().unwrap().push(database.to_string());
            if self.fail {
                return Err(DbseedError::BuildFailed {
                    command: "mock".to_string(),
                    reason: "simulated failure".to_string(),
                });
            }
            self.store.seed(database);
            Ok(())
        }
    }

    fn catalog_fixture() -> (TempDir, ManifestCatalog) {
        let temp = TempDir::new().unwrap();
        let root = temp.path().to_path_buf();
        for (name, manifest) in [
            ("core", "description = \"Core\"\ndepends = []\n"),
            ("auth", "description = \"Auth\"\n"),
            ("auth_signup", "description = \"Signup\"\ndepends = [\"auth\"]\n"),
        ] {
            let dir = root.join(name);
            fs::create_dir_all(&dir).unwrap();
            fs::write(dir.join(MANIFEST_FILE), manifest).unwrap();
        }
        (temp, ManifestCatalog::new(vec![root]))
    }

    fn options() -> CacheOptions {
        CacheOptions {
            enabled: true,
            prefix: "cache".to_string(),
            max_age_days: 30,
            max_size: 5,
        }
    }

    fn exclude() -> Vec<String> {
        EXCLUDE_PATTERNS.iter().map(|s| s.to_string()).collect()
    }

    fn components() -> Vec<String> {
        vec!["auth_signup".to_string()]
    }

    #[tokio::test]
    async fn miss_builds_then_hit_clones() {
        let (_temp, catalog) = catalog_fixture();
        let store = MemoryStore::new();
        let builder = MockBuilder::new(&store);
        let opts = options();

        let first = provision(
            &store,
            &builder,
            &catalog,
            Some("db1"),
            &components(),
            true,
            &opts,
            &exclude(),
        )
        .await
        .unwrap();
        assert_eq!(first, ProvisionOutcome::BuiltFresh);
        assert_eq!(builder.call_count(), 1);

        let names = store.database_names();
        assert!(names.contains(&"db1".to_string()));
        assert_eq!(
            names.iter().filter(|n| n.starts_with("cache-")).count(),
            1
        );

        let second = provision(
            &store,
            &builder,
            &catalog,
            Some("db2"),
            &components(),
            true,
            &opts,
            &exclude(),
        )
        .await
        .unwrap();
        assert_eq!(second, ProvisionOutcome::FromTemplate);
        // No second fresh build
        assert_eq!(builder.call_count(), 1);
        assert!(store.database_names().contains(&"db2".to_string()));
    }

    #[tokio::test]
    async fn demo_flag_is_part_of_the_key() {
        let (_temp, catalog) = catalog_fixture();
        let store = MemoryStore::new();
        let builder = MockBuilder::new(&store);
        let opts = options();

        for (db, demo) in [("db1", true), ("db2", false)] {
            provision(
                &store,
                &builder,
                &catalog,
                Some(db),
                &components(),
                demo,
                &opts,
                &exclude(),
            )
            .await
            .unwrap();
        }

        // Different flag, different fingerprint: two builds, two templates
        assert_eq!(builder.call_count(), 2);
        let names = store.database_names();
        assert_eq!(
            names.iter().filter(|n| n.starts_with("cache-")).count(),
            2
        );
    }

    #[tokio::test]
    async fn cache_disabled_always_builds() {
        let (_temp, catalog) = catalog_fixture();
        let store = MemoryStore::new();
        let builder = MockBuilder::new(&store);
        let opts = CacheOptions {
            enabled: false,
            ..options()
        };

        for db in ["db1", "db2"] {
            let outcome = provision(
                &store,
                &builder,
                &catalog,
                Some(db),
                &components(),
                true,
                &opts,
                &exclude(),
            )
            .await
            .unwrap();
            assert_eq!(outcome, ProvisionOutcome::BuiltFresh);
        }

        assert_eq!(builder.call_count(), 2);
        assert!(!store.database_names().iter().any(|n| n.starts_with("cache-")));
    }

    #[tokio::test]
    async fn cache_disabled_without_database_does_nothing() {
        let (_temp, catalog) = catalog_fixture();
        let store = MemoryStore::new();
        let builder = MockBuilder::new(&store);
        let opts = CacheOptions {
            enabled: false,
            ..options()
        };

        let outcome = provision(
            &store, &builder, &catalog, None, &components(), true, &opts, &exclude(),
        )
        .await
        .unwrap();
        assert_eq!(outcome, ProvisionOutcome::Nothing);
        assert_eq!(builder.call_count(), 0);
    }

    #[tokio::test]
    async fn no_database_only_trims() {
        let (_temp, catalog) = catalog_fixture();
        let store = MemoryStore::new();
        let builder = MockBuilder::new(&store);

        // Populate one entry, then run with max_size 0 to empty the cache
        provision(
            &store,
            &builder,
            &catalog,
            Some("db1"),
            &components(),
            true,
            &options(),
            &exclude(),
        )
        .await
        .unwrap();

        let opts = CacheOptions {
            max_size: 0,
            ..options()
        };
        let outcome = provision(
            &store, &builder, &catalog, None, &components(), true, &opts, &exclude(),
        )
        .await
        .unwrap();
        assert_eq!(outcome, ProvisionOutcome::TrimOnly);
        assert!(!store.database_names().iter().any(|n| n.starts_with("cache-")));
        // The provisioned database itself is untouched
        assert!(store.database_names().contains(&"db1".to_string()));
    }

    #[tokio::test]
    async fn negative_thresholds_disable_trimming() {
        let (_temp, catalog) = catalog_fixture();
        let store = MemoryStore::new();
        let builder = MockBuilder::new(&store);
        let opts = CacheOptions {
            max_size: -1,
            max_age_days: -1,
            ..options()
        };

        provision(
            &store,
            &builder,
            &catalog,
            Some("db1"),
            &components(),
            true,
            &opts,
            &exclude(),
        )
        .await
        .unwrap();
        assert_eq!(
            store
                .database_names()
                .iter()
                .filter(|n| n.starts_with("cache-"))
                .count(),
            1
        );
    }

    #[tokio::test]
    async fn build_failure_caches_nothing() {
        let (_temp, catalog) = catalog_fixture();
        let store = MemoryStore::new();
        let builder = MockBuilder::failing(&store);

        let err = provision(
            &store,
            &builder,
            &catalog,
            Some("db1"),
            &components(),
            true,
            &options(),
            &exclude(),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, DbseedError::BuildFailed { .. }));
        assert!(store.database_names().is_empty());
    }

    #[tokio::test]
    async fn invalid_database_name_rejected_early() {
        let (_temp, catalog) = catalog_fixture();
        let store = MemoryStore::new();
        let builder = MockBuilder::new(&store);

        let err = provision(
            &store,
            &builder,
            &catalog,
            Some("1bad name"),
            &components(),
            true,
            &options(),
            &exclude(),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, DbseedError::InvalidDatabaseName(_)));
        assert_eq!(builder.call_count(), 0);
    }

    #[tokio::test]
    async fn existing_database_rejected() {
        let (_temp, catalog) = catalog_fixture();
        let store = MemoryStore::new();
        let builder = MockBuilder::new(&store);
        store.seed("db1");

        let err = provision(
            &store,
            &builder,
            &catalog,
            Some("db1"),
            &components(),
            true,
            &options(),
            &exclude(),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, DbseedError::User(_)));
        assert_eq!(builder.call_count(), 0);
    }

    #[tokio::test]
    async fn unknown_component_fails_before_store_work() {
        let (_temp, catalog) = catalog_fixture();
        let store = MemoryStore::new();
        let builder = MockBuilder::new(&store);

        let err = provision(
            &store,
            &builder,
            &catalog,
            Some("db1"),
            &["ghost".to_string()],
            true,
            &options(),
            &exclude(),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, DbseedError::ComponentNotFound(_)));
        assert_eq!(builder.call_count(), 0);
        assert!(store.database_names().is_empty());
    }
}
