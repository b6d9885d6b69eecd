//! Template cache operations
//!
//! [`TemplateCache`] coordinates a cache of clonable database templates under
//! a shared prefix. Recency is encoded directly in the sortable template name
//! (see [`crate::cache::name`]), so touching an entry is a rename and both
//! trim dimensions are string comparisons over the listing.
//!
//! Every operation runs under the prefix's advisory lock, serializing cache
//! mutation across all cooperating processes on the same store. The cache
//! itself holds no state between calls; everything lives in the store.

use crate::cache::lock::lock_id;
use crate::cache::name;
use crate::error::DbseedResult;
use crate::store::StoreSession;
use chrono::{Duration, Utc};
use tracing::{debug, info};

/// Stateless coordinator for one cache prefix
pub struct TemplateCache {
    prefix: String,
    lock_id: i64,
}

impl TemplateCache {
    /// Create a cache handle, validating the prefix.
    ///
    /// Validation happens here, before any session or lock is involved.
    pub fn new(prefix: &str) -> DbseedResult<Self> {
        name::check_prefix(prefix)?;
        Ok(Self {
            prefix: prefix.to_string(),
            lock_id: lock_id(prefix),
        })
    }

    /// The cache prefix
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Create `new_database` from a cached template matching `fingerprint`.
    ///
    /// Returns `false` on a cache miss; on a hit the matched template is
    /// cloned and then touched (renamed to the current minute) so it becomes
    /// the most recently used entry.
    pub async fn create(
        &self,
        session: &mut dyn StoreSession,
        new_database: &str,
        fingerprint: &str,
    ) -> DbseedResult<bool> {
        session.acquire_lock(self.lock_id).await?;
        let result = self.create_locked(session, new_database, fingerprint).await;
        let released = session.release_lock(self.lock_id).await;
        let found = result?;
        released?;
        Ok(found)
    }

    async fn create_locked(
        &self,
        session: &mut dyn StoreSession,
        new_database: &str,
        fingerprint: &str,
    ) -> DbseedResult<bool> {
        let Some(template) = self.find_template(session, fingerprint).await? else {
            debug!("no cached template for fingerprint {fingerprint}");
            return Ok(false);
        };
        info!("creating database {new_database} from template {template}");
        session.create_from_template(new_database, &template).await?;
        let touched = name::template_name(&self.prefix, Utc::now(), fingerprint);
        if template != touched {
            session.rename_database(&template, &touched).await?;
        }
        Ok(true)
    }

    /// Register `source_database` under `fingerprint`.
    ///
    /// If an entry for the fingerprint already exists it is only touched;
    /// the content is identical, so duplicating storage would be wasted.
    /// Otherwise the source is cloned into a new template.
    pub async fn add(
        &self,
        session: &mut dyn StoreSession,
        source_database: &str,
        fingerprint: &str,
    ) -> DbseedResult<()> {
        session.acquire_lock(self.lock_id).await?;
        let result = self.add_locked(session, source_database, fingerprint).await;
        let released = session.release_lock(self.lock_id).await;
        result?;
        released
    }

    async fn add_locked(
        &self,
        session: &mut dyn StoreSession,
        source_database: &str,
        fingerprint: &str,
    ) -> DbseedResult<()> {
        let touched = name::template_name(&self.prefix, Utc::now(), fingerprint);
        match self.find_template(session, fingerprint).await? {
            Some(existing) => {
                debug!("fingerprint already cached as {existing}");
                if existing != touched {
                    session.rename_database(&existing, &touched).await?;
                }
            }
            None => {
                info!("caching {source_database} as template {touched}");
                session.create_from_template(&touched, source_database).await?;
            }
        }
        Ok(())
    }

    /// Number of entries under this prefix
    pub async fn size(&self, session: &mut dyn StoreSession) -> DbseedResult<usize> {
        session.acquire_lock(self.lock_id).await?;
        let result = self.list_all(session).await;
        let released = session.release_lock(self.lock_id).await;
        let entries = result?;
        released?;
        Ok(entries.len())
    }

    /// All entries under this prefix, most recently touched first
    pub async fn entries(&self, session: &mut dyn StoreSession) -> DbseedResult<Vec<String>> {
        session.acquire_lock(self.lock_id).await?;
        let result = self.list_all(session).await;
        let released = session.release_lock(self.lock_id).await;
        let entries = result?;
        released?;
        Ok(entries)
    }

    /// Drop every entry under this prefix
    pub async fn purge(&self, session: &mut dyn StoreSession) -> DbseedResult<()> {
        session.acquire_lock(self.lock_id).await?;
        let result = self.purge_locked(session).await;
        let released = session.release_lock(self.lock_id).await;
        result?;
        released
    }

    async fn purge_locked(&self, session: &mut dyn StoreSession) -> DbseedResult<()> {
        for entry in self.list_all(session).await? {
            info!("dropping database {entry}");
            session.drop_database(&entry).await?;
        }
        Ok(())
    }

    /// Keep the `max_size` most recently touched entries, drop the rest
    pub async fn trim_size(
        &self,
        session: &mut dyn StoreSession,
        max_size: usize,
    ) -> DbseedResult<()> {
        session.acquire_lock(self.lock_id).await?;
        let result = self.trim_size_locked(session, max_size).await;
        let released = session.release_lock(self.lock_id).await;
        result?;
        released
    }

    async fn trim_size_locked(
        &self,
        session: &mut dyn StoreSession,
        max_size: usize,
    ) -> DbseedResult<()> {
        let entries = self.list_all(session).await?;
        for entry in entries.iter().skip(max_size) {
            info!("dropping database {entry}");
            session.drop_database(entry).await?;
        }
        Ok(())
    }

    /// Drop entries last touched at or before `now - max_age`.
    ///
    /// The cutoff name carries the all-`f` fingerprint sentinel so the
    /// comparison is decided by the timestamp segment; an entry touched
    /// exactly at the threshold counts as too old.
    pub async fn trim_age(
        &self,
        session: &mut dyn StoreSession,
        max_age: Duration,
    ) -> DbseedResult<()> {
        session.acquire_lock(self.lock_id).await?;
        let result = self.trim_age_locked(session, max_age).await;
        let released = session.release_lock(self.lock_id).await;
        result?;
        released
    }

    async fn trim_age_locked(
        &self,
        session: &mut dyn StoreSession,
        max_age: Duration,
    ) -> DbseedResult<()> {
        let cutoff = name::pattern(
            &self.prefix,
            Some(Utc::now() - max_age),
            Some(name::MAX_FINGERPRINT),
        );
        let entries = self.list_all(session).await?;
        for entry in entries.iter().filter(|e| e.as_str() <= cutoff.as_str()) {
            info!("dropping database {entry}");
            session.drop_database(entry).await?;
        }
        Ok(())
    }

    /// Most recently touched entry for a fingerprint, if any.
    ///
    /// The listing is descending and the timestamp segment sorts
    /// lexicographically, so the first match is the MRU one.
    async fn find_template(
        &self,
        session: &mut dyn StoreSession,
        fingerprint: &str,
    ) -> DbseedResult<Option<String>> {
        let pattern = name::pattern(&self.prefix, None, Some(fingerprint));
        let mut matches = session.list_databases(&pattern).await?;
        Ok(if matches.is_empty() {
            None
        } else {
            Some(matches.remove(0))
        })
    }

    async fn list_all(&self, session: &mut dyn StoreSession) -> DbseedResult<Vec<String>> {
        let pattern = name::pattern(&self.prefix, None, None);
        session.list_databases(&pattern).await
    }
}
