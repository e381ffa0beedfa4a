//! # Database Pool
//!
//! The SQLite file behind the key/value backend.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  <data_dir>/unitill.db  (WAL)                                           │
//! │        │                                                                │
//! │        ├── settings (key TEXT PRIMARY KEY, value TEXT)                  │
//! │        │       └── SqliteSettingsStore: one row per top-level field     │
//! │        └── buttons  (code, label, price_cents, image_ref, position)     │
//! │                └── SqliteButtonStore: ordered by position               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Readers never see half of a `set_all` or `save`: both run in one
//! transaction and WAL keeps readers off the writer's pages. There is no
//! application lock on top; a writer waiting on another writer retries for
//! up to `busy_timeout`.

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::SqlitePool;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, info};

use crate::error::{StoreError, StoreResult};
use crate::migrations;
use crate::repository::button::SqliteButtonStore;
use crate::repository::settings::SqliteSettingsStore;

/// Where the database lives and how the pool behaves.
#[derive(Debug, Clone)]
pub struct DbConfig {
    /// File path, or `None` for a private in-memory database.
    pub database_path: Option<PathBuf>,

    /// One edge terminal needs very few. Default: 4
    pub max_connections: u32,

    /// How long a write waits for a competing writer. Default: 5 seconds
    pub busy_timeout: Duration,

    /// Apply pending schema migrations on open. Default: true
    pub run_migrations: bool,
}

impl DbConfig {
    /// A file database, created on first open.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        DbConfig {
            database_path: Some(path.into()),
            max_connections: 4,
            busy_timeout: Duration::from_secs(5),
            run_migrations: true,
        }
    }

    /// An in-memory database for tests. It lives as long as its single
    /// connection, so the pool never recycles it.
    pub fn in_memory() -> Self {
        DbConfig {
            database_path: None,
            max_connections: 1,
            busy_timeout: Duration::from_secs(1),
            run_migrations: true,
        }
    }

    pub fn max_connections(mut self, max: u32) -> Self {
        self.max_connections = max;
        self
    }

    pub fn run_migrations(mut self, run: bool) -> Self {
        self.run_migrations = run;
        self
    }

    fn connect_options(&self) -> SqliteConnectOptions {
        let options = match &self.database_path {
            Some(path) => SqliteConnectOptions::new()
                .filename(path)
                .create_if_missing(true)
                .journal_mode(SqliteJournalMode::Wal)
                .synchronous(SqliteSynchronous::Normal),
            None => SqliteConnectOptions::new().in_memory(true),
        };
        options.foreign_keys(true).busy_timeout(self.busy_timeout)
    }
}

/// Open pool plus constructors for the two key/value stores.
#[derive(Debug, Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Opens (creating if needed) the database and applies migrations.
    pub async fn new(config: DbConfig) -> StoreResult<Self> {
        let location = config
            .database_path
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| ":memory:".to_string());
        debug!(path = %location, "Opening database");

        let mut pool_options = SqlitePoolOptions::new().max_connections(config.max_connections);
        if config.database_path.is_none() {
            pool_options = pool_options
                .min_connections(1)
                .idle_timeout(None)
                .max_lifetime(None);
        }

        let pool = pool_options
            .connect_with(config.connect_options())
            .await
            .map_err(|e| StoreError::ConnectionFailed(format!("{}: {}", location, e)))?;

        let db = Database { pool };
        if config.run_migrations {
            migrations::run_migrations(&db.pool).await?;
        }

        info!(path = %location, max_connections = config.max_connections, "Database ready");
        Ok(db)
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub fn settings(&self) -> SqliteSettingsStore {
        SqliteSettingsStore::new(self.pool.clone())
    }

    pub fn buttons(&self) -> SqliteButtonStore {
        SqliteButtonStore::new(self.pool.clone())
    }

    /// Waits for in-flight queries, then closes every connection.
    pub async fn close(&self) {
        self.pool.close().await;
        debug!("Database closed");
    }

    pub async fn health_check(&self) -> bool {
        sqlx::query("SELECT 1").execute(&self.pool).await.is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_in_memory_database_is_migrated() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        assert!(db.health_check().await);
        assert_eq!(migrations::pending(db.pool()).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_file_database_created_on_demand() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("unitill.db");

        let db = Database::new(DbConfig::new(&path)).await.unwrap();
        assert!(path.exists());
        db.close().await;
        assert!(!db.health_check().await);
    }

    #[tokio::test]
    async fn test_unmigrated_database_has_pending_migrations() {
        let db = Database::new(DbConfig::in_memory().run_migrations(false))
            .await
            .unwrap();
        assert!(migrations::pending(db.pool()).await.unwrap() > 0);

        migrations::run_migrations(db.pool()).await.unwrap();
        assert_eq!(migrations::pending(db.pool()).await.unwrap(), 0);
    }

    #[test]
    fn test_config_defaults() {
        let config = DbConfig::new("/tmp/unitill.db").max_connections(2);
        assert_eq!(config.max_connections, 2);
        assert!(config.run_migrations);
        assert!(DbConfig::in_memory().database_path.is_none());
    }
}
