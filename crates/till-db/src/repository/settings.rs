//! # Settings Repository
//!
//! Settings stored as one row per top-level field in the `settings` table.
//!
//! ## Row Layout
//! ```text
//! ┌───────────────────┬────────────────────────────────────────────────────┐
//! │ key               │ value                                              │
//! ├───────────────────┼────────────────────────────────────────────────────┤
//! │ theme             │ default                                            │
//! │ currency          │ GBP                                                │
//! │ country           │ GB                                                 │
//! │ region            │                                                    │
//! │ taxInclusive      │ true | false                                       │
//! │ taxRatePct        │ 20                                                 │
//! │ installedPlugins  │ {"faq":true}                          (JSON text)  │
//! │ pluginRecords     │ {"faq":{"route":..,"label":..,"path":..}} (JSON)   │
//! │ menuPlugins       │ {"docs":{"route":..,"label":..,"url":..}} (JSON)   │
//! └───────────────────┴────────────────────────────────────────────────────┘
//! ```
//!
//! A missing row takes the same default as a missing field in the settings
//! document. String rows are returned as stored; an unparsable tax rate or
//! composite also falls back to its default.

use std::collections::HashMap;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use sqlx::SqlitePool;
use till_core::{Settings, DEFAULT_THEME};
use tracing::{debug, warn};

use crate::error::{StoreError, StoreResult};
use crate::store::SettingsStore;

pub const KEY_THEME: &str = "theme";
pub const KEY_CURRENCY: &str = "currency";
pub const KEY_COUNTRY: &str = "country";
pub const KEY_REGION: &str = "region";
pub const KEY_TAX_INCLUSIVE: &str = "taxInclusive";
pub const KEY_TAX_RATE_PCT: &str = "taxRatePct";
pub const KEY_INSTALLED_PLUGINS: &str = "installedPlugins";
pub const KEY_PLUGIN_RECORDS: &str = "pluginRecords";
pub const KEY_MENU_PLUGINS: &str = "menuPlugins";

const UPSERT_SQL: &str =
    "INSERT INTO settings (key, value) VALUES (?1, ?2) ON CONFLICT(key) DO UPDATE SET value = excluded.value";

/// Flattens a settings record into `(key, value)` rows.
pub fn settings_to_rows(settings: &Settings) -> StoreResult<Vec<(&'static str, String)>> {
    Ok(vec![
        (KEY_THEME, settings.theme.clone()),
        (KEY_CURRENCY, settings.currency.clone()),
        (KEY_COUNTRY, settings.country.clone()),
        (KEY_REGION, settings.region.clone()),
        (KEY_TAX_INCLUSIVE, settings.tax_inclusive.to_string()),
        (KEY_TAX_RATE_PCT, settings.tax_rate_pct.to_string()),
        (
            KEY_INSTALLED_PLUGINS,
            serde_json::to_string(&settings.installed_plugins)?,
        ),
        (
            KEY_PLUGIN_RECORDS,
            serde_json::to_string(&settings.plugin_records)?,
        ),
        (KEY_MENU_PLUGINS, serde_json::to_string(&settings.menu_plugins)?),
    ])
}

/// Rebuilds a settings record from rows, defaulting field by field.
///
/// A string field takes its row verbatim, blank or padded included, and
/// falls back only when the row is absent.
pub fn rows_to_settings(rows: &HashMap<String, String>) -> Settings {
    let mut settings = Settings::default();
    let get = |key: &str| rows.get(key).map(String::as_str);

    if let Some(v) = get(KEY_THEME) {
        settings.theme = v.to_string();
    }
    if let Some(v) = get(KEY_CURRENCY) {
        settings.currency = v.to_string();
    }
    if let Some(v) = get(KEY_COUNTRY) {
        settings.country = v.to_string();
    }
    if let Some(v) = get(KEY_REGION) {
        settings.region = v.to_string();
    }
    if let Some(v) = get(KEY_TAX_INCLUSIVE) {
        settings.tax_inclusive = v.trim() == "true";
    }
    if let Some(rate) = get(KEY_TAX_RATE_PCT).and_then(|v| v.trim().parse::<i64>().ok()) {
        settings.tax_rate_pct = rate;
    }
    if let Some(map) = get(KEY_INSTALLED_PLUGINS).and_then(|v| parse_composite(KEY_INSTALLED_PLUGINS, v)) {
        settings.installed_plugins = map;
    }
    if let Some(map) = get(KEY_PLUGIN_RECORDS).and_then(|v| parse_composite(KEY_PLUGIN_RECORDS, v)) {
        settings.plugin_records = map;
    }
    if let Some(map) = get(KEY_MENU_PLUGINS).and_then(|v| parse_composite(KEY_MENU_PLUGINS, v)) {
        settings.menu_plugins = map;
    }

    settings
}

fn parse_composite<T: DeserializeOwned>(key: &str, value: &str) -> Option<T> {
    match serde_json::from_str(value) {
        Ok(parsed) => Some(parsed),
        Err(e) => {
            warn!(key = %key, error = %e, "Stored value unparsable, using default");
            None
        }
    }
}

/// SQLite key/value settings store.
///
/// No application-level lock: `set_all` is one transaction and SQLite's
/// isolation decides what concurrent readers see.
#[derive(Debug, Clone)]
pub struct SqliteSettingsStore {
    pool: SqlitePool,
}

impl SqliteSettingsStore {
    pub fn new(pool: SqlitePool) -> Self {
        SqliteSettingsStore { pool }
    }

    async fn fetch_rows(&self) -> StoreResult<HashMap<String, String>> {
        let rows: Vec<(String, String)> = sqlx::query_as("SELECT key, value FROM settings")
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().collect())
    }
}

#[async_trait]
impl SettingsStore for SqliteSettingsStore {
    async fn get_theme(&self) -> String {
        let value: Result<Option<String>, sqlx::Error> =
            sqlx::query_scalar("SELECT value FROM settings WHERE key = ?1")
                .bind(KEY_THEME)
                .fetch_optional(&self.pool)
                .await;

        match value {
            Ok(Some(theme)) if !theme.trim().is_empty() => theme,
            Ok(_) => DEFAULT_THEME.to_string(),
            Err(e) => {
                warn!(error = %e, "Theme unreadable, using default");
                DEFAULT_THEME.to_string()
            }
        }
    }

    async fn set_theme(&self, theme: &str) -> StoreResult<()> {
        let theme = theme.trim();
        sqlx::query(UPSERT_SQL)
            .bind(KEY_THEME)
            .bind(theme)
            .execute(&self.pool)
            .await?;
        debug!(theme = %theme, "Theme saved");
        Ok(())
    }

    async fn get_all(&self) -> Settings {
        match self.fetch_rows().await {
            Ok(rows) => rows_to_settings(&rows),
            Err(e) => {
                warn!(error = %e, "Settings unreadable, using defaults");
                Settings::default()
            }
        }
    }

    /// Upserts every key inside one transaction.
    ///
    /// Dropping the transaction on an early `?` rolls it back, so a failed
    /// key leaves the previous record intact.
    async fn set_all(&self, settings: &Settings) -> StoreResult<()> {
        let rows = settings_to_rows(settings)?;

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| StoreError::TransactionFailed(e.to_string()))?;

        for (key, value) in &rows {
            sqlx::query(UPSERT_SQL)
                .bind(*key)
                .bind(value)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit()
            .await
            .map_err(|e| StoreError::TransactionFailed(e.to_string()))?;

        debug!(keys = rows.len(), "Settings saved");
        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
