//! Settings as one JSON document (`settings.json`).

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use till_core::{Settings, DEFAULT_THEME};
use tokio::sync::RwLock;
use tracing::{debug, warn};

use super::{read_document, write_document};
use crate::error::StoreResult;
use crate::store::SettingsStore;

/// Document-backed settings store.
#[derive(Debug)]
pub struct FileSettingsStore {
    path: PathBuf,
    lock: RwLock<()>,
}

impl FileSettingsStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        FileSettingsStore {
            path: path.into(),
            lock: RwLock::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the document without taking the lock. Absent or unreadable
    /// documents yield the defaults.
    async fn read_unlocked(&self) -> Settings {
        match read_document::<Settings>(&self.path).await {
            Ok(Some(settings)) => settings,
            Ok(None) => Settings::default(),
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "Settings unreadable, using defaults");
                Settings::default()
            }
        }
    }
}

#[async_trait]
impl SettingsStore for FileSettingsStore {
    async fn get_theme(&self) -> String {
        let theme = self.get_all().await.theme;
        if theme.trim().is_empty() {
            DEFAULT_THEME.to_string()
        } else {
            theme
        }
    }

    async fn set_theme(&self, theme: &str) -> StoreResult<()> {
        let _guard = self.lock.write().await;
        let mut settings = self.read_unlocked().await;
        settings.theme = theme.trim().to_string();
        write_document(&self.path, &settings).await?;
        debug!(theme = %settings.theme, "Theme saved");
        Ok(())
    }

    async fn get_all(&self) -> Settings {
        let _guard = self.lock.read().await;
        self.read_unlocked().await
    }

    async fn set_all(&self, settings: &Settings) -> StoreResult<()> {
        let _guard = self.lock.write().await;
        write_document(&self.path, settings).await?;
        debug!(path = %self.path.display(), "Settings saved");
        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use till_core::{MenuPlugin, PluginRecord};

    fn store(dir: &tempfile::TempDir) -> FileSettingsStore {
        FileSettingsStore::new(dir.path().join("settings.json"))
    }

    #[tokio::test]
    async fn test_absent_document_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let s = store(&dir);
        assert_eq!(s.get_all().await, Settings::default());
        assert_eq!(s.get_theme().await, "default");
    }

    #[tokio::test]
    async fn test_corrupt_document_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let s = store(&dir);
        tokio::fs::write(s.path(), b"\x00garbage").await.unwrap();
        assert_eq!(s.get_all().await, Settings::default());
    }

    #[tokio::test]
    async fn test_set_all_round_trips_nested_registries() {
        let dir = tempfile::tempdir().unwrap();
        let s = store(&dir);

        let mut settings = Settings {
            theme: "dark".to_string(),
            currency: "EUR".to_string(),
            country: "IE".to_string(),
            region: "Leinster".to_string(),
            tax_inclusive: true,
            tax_rate_pct: 23,
            ..Settings::default()
        };
        settings.register_plugin(
            "faq",
            PluginRecord {
                route: "/plug/faq".to_string(),
                label: "FAQ".to_string(),
                local_path: "data/plugins/faq".to_string(),
            },
        );
        settings.installed_plugins.insert("old".to_string(), false);
        settings.menu_plugins.insert(
            "docs".to_string(),
            MenuPlugin {
                route: "/ext/docs".to_string(),
                label: "Docs".to_string(),
                url: "https://docs.example".to_string(),
            },
        );

        s.set_all(&settings).await.unwrap();
        assert_eq!(s.get_all().await, settings);

        // A fresh instance reads the same document.
        assert_eq!(store(&dir).get_all().await, settings);
    }

    #[tokio::test]
    async fn test_set_theme_trims_and_keeps_other_fields() {
        let dir = tempfile::tempdir().unwrap();
        let s = store(&dir);
        s.set_all(&Settings {
            currency: "USD".to_string(),
            ..Settings::default()
        })
        .await
        .unwrap();

        s.set_theme("  midnight ").await.unwrap();
        assert_eq!(s.get_theme().await, "midnight");
        assert_eq!(s.get_all().await.currency, "USD");

        s.set_theme("   ").await.unwrap();
        assert_eq!(s.get_theme().await, "default");
    }
}
