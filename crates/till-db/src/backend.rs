//! # Backend Selection
//!
//! Opens the settings and button stores for the configured backend.
//!
//! ## Data Directory Layout
//! ```text
//! <data_dir>/
//! ├── settings.json              document backend
//! ├── buttons.json               document backend
//! ├── unitill.db                 key/value backend (+ -wal, -shm)
//! ├── buttons.json.migrated      after the one-shot migration
//! └── plugins/<id>/index.html    (till-plugins)
//! ```

use std::fmt;
use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;

use thiserror::Error;
use tracing::info;

use crate::document::{FileButtonStore, FileSettingsStore};
use crate::error::{StoreError, StoreResult};
use crate::legacy::{migrate_legacy, LegacyPaths, MigrationReport};
use crate::pool::{Database, DbConfig};
use crate::store::{ButtonStore, SettingsStore};

pub const SETTINGS_FILE: &str = "settings.json";
pub const BUTTONS_FILE: &str = "buttons.json";
pub const DATABASE_FILE: &str = "unitill.db";

/// Which implementation backs the stores.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StorageBackend {
    /// One JSON document per store.
    Document,
    /// SQLite key/value tables.
    #[default]
    Sqlite,
}

#[derive(Debug, Error)]
#[error("unknown storage backend {0:?} (expected \"sqlite\" or \"file\")")]
pub struct UnknownBackend(pub String);

impl FromStr for StorageBackend {
    type Err = UnknownBackend;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sqlite" | "db" => Ok(StorageBackend::Sqlite),
            "file" | "json" | "document" => Ok(StorageBackend::Document),
            _ => Err(UnknownBackend(s.to_string())),
        }
    }
}

impl fmt::Display for StorageBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageBackend::Document => write!(f, "file"),
            StorageBackend::Sqlite => write!(f, "sqlite"),
        }
    }
}

/// Opened stores plus what it took to open them.
#[derive(Clone)]
pub struct Stores {
    pub backend: StorageBackend,
    pub settings: Arc<dyn SettingsStore>,
    pub buttons: Arc<dyn ButtonStore>,
    /// Present for the key/value backend.
    pub database: Option<Database>,
    /// Present when the key/value backend ran the legacy migration.
    pub migration: Option<MigrationReport>,
}

impl fmt::Debug for Stores {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Stores")
            .field("backend", &self.backend)
            .field("migration", &self.migration)
            .finish_non_exhaustive()
    }
}

impl Stores {
    /// Opens both stores under `data_dir`, creating it if needed.
    ///
    /// Selecting the key/value backend runs the legacy migration first.
    pub async fn open(backend: StorageBackend, data_dir: &Path) -> StoreResult<Self> {
        tokio::fs::create_dir_all(data_dir)
            .await
            .map_err(|e| StoreError::io(data_dir, e))?;

        info!(backend = %backend, data_dir = %data_dir.display(), "Opening stores");

        match backend {
            StorageBackend::Document => Ok(Stores {
                backend,
                settings: Arc::new(FileSettingsStore::new(data_dir.join(SETTINGS_FILE))),
                buttons: Arc::new(FileButtonStore::new(data_dir.join(BUTTONS_FILE))),
                database: None,
                migration: None,
            }),
            StorageBackend::Sqlite => {
                let db = Database::new(DbConfig::new(data_dir.join(DATABASE_FILE))).await?;
                let settings = db.settings();
                let buttons = db.buttons();

                let report =
                    migrate_legacy(&LegacyPaths::in_dir(data_dir), &settings, &buttons).await?;

                Ok(Stores {
                    backend,
                    settings: Arc::new(settings),
                    buttons: Arc::new(buttons),
                    database: Some(db),
                    migration: Some(report),
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::legacy::MigrationOutcome;
    use till_core::Button;

    #[test]
    fn test_backend_parsing() {
        assert_eq!("sqlite".parse::<StorageBackend>().unwrap(), StorageBackend::Sqlite);
        assert_eq!(" FILE ".parse::<StorageBackend>().unwrap(), StorageBackend::Document);
        assert!("postgres".parse::<StorageBackend>().is_err());
        assert_eq!(StorageBackend::default(), StorageBackend::Sqlite);
        assert_eq!(StorageBackend::Document.to_string(), "file");
    }

    #[tokio::test]
    async fn test_document_backend_writes_json_files() {
        let dir = tempfile::tempdir().unwrap();
        let stores = Stores::open(StorageBackend::Document, dir.path()).await.unwrap();
        stores.buttons.add(Button::new("A", "Coffee", 250)).await.unwrap();
        stores.settings.set_theme("dark").await.unwrap();

        assert!(dir.path().join(BUTTONS_FILE).exists());
        assert!(dir.path().join(SETTINGS_FILE).exists());
        assert!(stores.migration.is_none());
    }

    #[tokio::test]
    async fn test_sqlite_backend_picks_up_legacy_buttons() {
        let dir = tempfile::tempdir().unwrap();
        {
            let legacy = Stores::open(StorageBackend::Document, dir.path()).await.unwrap();
            legacy.buttons.add(Button::new("A", "Coffee", 250)).await.unwrap();
        }

        let stores = Stores::open(StorageBackend::Sqlite, dir.path()).await.unwrap();
        assert_eq!(
            stores.migration.as_ref().map(|r| r.buttons.clone()),
            Some(MigrationOutcome::Migrated { count: 1 })
        );
        assert_eq!(stores.buttons.load().await.unwrap().len(), 1);
        assert!(dir.path().join("buttons.json.migrated").exists());
    }
}
