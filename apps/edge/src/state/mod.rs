//! # State Module
//!
//! Everything a command needs, opened once at startup.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    State Architecture                                   │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                        AppState                                 │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │        │               │               │                │              │
//! │        ▼               ▼               ▼                ▼              │
//! │  ┌───────────┐  ┌─────────────┐  ┌─────────────┐  ┌───────────────┐   │
//! │  │  Stores   │  │ BasketState │  │DisplayState │  │PluginLifecycle│   │
//! │  │ settings  │  │ Mutex<      │  │ RwLock<     │  │ settings +    │   │
//! │  │ buttons   │  │  Basket     │  │  Currency   │  │ plugins dir   │   │
//! │  │ (Arc dyn) │  │  Engine>    │  │  Format>    │  │               │   │
//! │  └───────────┘  └─────────────┘  └─────────────┘  └───────────────┘   │
//! │                                                                         │
//! │  THREAD SAFETY:                                                        │
//! │  • Stores: backend-specific (instance RwLock or SQLite transactions)   │
//! │  • BasketState: one writer at a time                                   │
//! │  • DisplayState: replaced wholesale on settings save                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

mod basket;
mod display;

pub use basket::BasketState;
pub use display::DisplayState;

use till_core::BasketEngine;
use till_db::{ButtonPriceResolver, Stores};
use till_plugins::PluginLifecycle;
use tracing::info;

use crate::config::EdgeConfig;
use crate::error::StartupError;

/// Shared state of one edge terminal.
#[derive(Debug)]
pub struct AppState {
    pub config: EdgeConfig,
    pub stores: Stores,
    pub basket: BasketState,
    pub display: DisplayState,
    pub plugins: PluginLifecycle,
}

impl AppState {
    /// Opens the stores (running the legacy migration for SQLite) and wires
    /// the basket, display and plugin state from the saved settings.
    pub async fn open(config: EdgeConfig) -> Result<Self, StartupError> {
        let stores = Stores::open(config.store, &config.data_dir).await?;
        if let Some(report) = &stores.migration {
            if report.migrated_anything() {
                info!(buttons = %report.buttons, settings = %report.settings, "Legacy data migrated");
            }
        }

        let settings = stores.settings.get_all().await;

        let resolver = ButtonPriceResolver::new(stores.buttons.clone());
        let engine = BasketEngine::new(Box::new(resolver), settings.tax_policy());

        let plugins = PluginLifecycle::new(
            stores.settings.clone(),
            config.plugins_dir(),
            config.public_dir.clone(),
        )?;

        info!(
            env = %config.env,
            store = %config.store,
            data_dir = %config.data_dir.display(),
            "Edge state ready"
        );

        Ok(AppState {
            display: DisplayState::new(config.currency.as_deref(), &settings),
            basket: BasketState::new(engine),
            stores,
            plugins,
            config,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use till_db::StorageBackend;

    fn config_in(dir: &std::path::Path, store: StorageBackend) -> EdgeConfig {
        EdgeConfig {
            data_dir: dir.join("data"),
            store,
            env: "test".to_string(),
            public_dir: dir.join("public"),
            currency: None,
        }
    }

    #[tokio::test]
    async fn test_open_migrates_legacy_buttons_once() {
        let dir = tempfile::tempdir().unwrap();
        let data = dir.path().join("data");
        tokio::fs::create_dir_all(&data).await.unwrap();
        tokio::fs::write(
            data.join("buttons.json"),
            r#"[{"label":"Coffee","code":"A","priceCents":250}]"#,
        )
        .await
        .unwrap();
        tokio::fs::write(data.join("settings.json"), r#"{"theme":"dark","taxRatePct":5}"#)
            .await
            .unwrap();

        let state = AppState::open(config_in(dir.path(), StorageBackend::Sqlite))
            .await
            .unwrap();
        assert!(state.stores.migration.as_ref().unwrap().migrated_anything());
        assert_eq!(state.stores.buttons.load().await.unwrap().len(), 1);
        assert_eq!(state.basket.tax_policy().await.rate_percent, 5);
        assert!(data.join("buttons.json.migrated").exists());
        assert!(!data.join("buttons.json").exists());

        let basket = state.basket.scan("a", None).await;
        assert_eq!(basket.subtotal_cents, 250);
        if let Some(db) = &state.stores.database {
            db.close().await;
        }

        let reopened = AppState::open(config_in(dir.path(), StorageBackend::Sqlite))
            .await
            .unwrap();
        assert!(!reopened.stores.migration.as_ref().unwrap().migrated_anything());
        assert_eq!(reopened.stores.buttons.load().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_pinned_currency_from_config() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = config_in(dir.path(), StorageBackend::Document);
        config.currency = Some("EUR".to_string());

        let state = AppState::open(config).await.unwrap();
        assert_eq!(state.display.currency().await.symbol, "€");
        assert_eq!(state.plugins.plugins_dir(), dir.path().join("data").join("plugins"));
    }
}
