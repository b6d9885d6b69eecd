//! PostgreSQL store
//!
//! One `tokio-postgres` client per session; statements run with autocommit
//! semantics, which the cache relies on (CREATE/DROP DATABASE cannot run
//! inside a transaction). Advisory locks map to `pg_advisory_lock`, and the
//! server releases them if the session dies mid-operation.

use crate::error::{DbseedError, DbseedResult};
use crate::store::{Store, StoreSession};
use async_trait::async_trait;
use postgres_protocol::escape::escape_identifier;
use tokio_postgres::{Client, NoTls};

/// Store backed by a PostgreSQL server
pub struct PostgresStore {
    config: tokio_postgres::Config,
}

impl PostgresStore {
    /// Create a store from a connection string
    /// (URL or key-value form, e.g. `host=localhost user=postgres dbname=postgres`).
    pub fn new(url: &str) -> DbseedResult<Self> {
        let config: tokio_postgres::Config = url
            .parse()
            .map_err(|e| DbseedError::store(format!("invalid store url: {e}")))?;
        Ok(Self { config })
    }
}

#[async_trait]
impl Store for PostgresStore {
    async fn session(&self) -> DbseedResult<Box<dyn StoreSession>> {
        let (client, connection) = self.config.connect(NoTls).await?;
        tokio::spawn(async move {
            if let Err(e) = connection.await {
                tracing::warn!("store connection error: {e}");
            }
        });
        Ok(Box::new(PostgresSession { client }))
    }
}

struct PostgresSession {
    client: Client,
}

#[async_trait]
impl StoreSession for PostgresSession {
    async fn acquire_lock(&mut self, lock_id: i64) -> DbseedResult<()> {
        self.client
            .query("SELECT pg_advisory_lock($1)", &[&lock_id])
            .await?;
        Ok(())
    }

    async fn release_lock(&mut self, lock_id: i64) -> DbseedResult<()> {
        let rows = self
            .client
            .query("SELECT pg_advisory_unlock($1)", &[&lock_id])
            .await?;
        let released: bool = rows
            .first()
            .map(|row| row.get(0))
            .unwrap_or(false);
        if released {
            Ok(())
        } else {
            Err(DbseedError::store(format!(
                "advisory lock {lock_id} not held by this session"
            )))
        }
    }

    async fn list_databases(&mut self, pattern: &str) -> DbseedResult<Vec<String>> {
        let rows = self
            .client
            .query(
                "SELECT datname FROM pg_database \
                 WHERE datname LIKE $1 \
                 ORDER BY datname DESC",
                &[&pattern],
            )
            .await?;
        Ok(rows.iter().map(|row| row.get(0)).collect())
    }

    async fn database_exists(&mut self, name: &str) -> DbseedResult<bool> {
        let rows = self
            .client
            .query(
                "SELECT 1 FROM pg_catalog.pg_database \
                 WHERE lower(datname) = lower($1)",
                &[&name],
            )
            .await?;
        Ok(!rows.is_empty())
    }

    async fn create_from_template(&mut self, name: &str, template: &str) -> DbseedResult<()> {
        // Identifiers cannot be bound as parameters; escape through the driver
        let sql = format!(
            "CREATE DATABASE {} ENCODING 'unicode' TEMPLATE {}",
            escape_identifier(name),
            escape_identifier(template),
        );
        self.client.batch_execute(&sql).await?;
        Ok(())
    }

    async fn rename_database(&mut self, from: &str, to: &str) -> DbseedResult<()> {
        let sql = format!(
            "ALTER DATABASE {} RENAME TO {}",
            escape_identifier(from),
            escape_identifier(to),
        );
        self.client.batch_execute(&sql).await?;
        Ok(())
    }

    async fn drop_database(&mut self, name: &str) -> DbseedResult<()> {
        let sql = format!("DROP DATABASE {}", escape_identifier(name));
        self.client.batch_execute(&sql).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Connected behavior is covered by the MemoryStore-backed cache tests;
    // exercising PostgresSession needs a running server.

    #[test]
    fn parses_url_and_keyvalue_forms() {
        assert!(PostgresStore::new("postgres://postgres@localhost/postgres").is_ok());
        assert!(PostgresStore::new("host=localhost user=postgres dbname=postgres").is_ok());
        assert!(PostgresStore::new("not a url ===").is_err());
    }
}
