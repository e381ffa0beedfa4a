//! # Store Capabilities
//!
//! The two persistence capabilities consumed by the rest of the system.
//! Each has a JSON document implementation ([`crate::document`]) and a
//! SQLite key/value implementation ([`crate::repository`]); callers only ever
//! see `Arc<dyn SettingsStore>` / `Arc<dyn ButtonStore>`.
//!
//! ## Failure Policy
//! ```text
//! ┌──────────────────┬──────────────────────────────────────────────────────┐
//! │ Operation        │ On failure                                           │
//! ├──────────────────┼──────────────────────────────────────────────────────┤
//! │ get_theme        │ default theme, warn! logged                          │
//! │ get_all          │ default Settings, warn! logged                       │
//! │ set_theme        │ StoreError                                           │
//! │ set_all          │ StoreError, previous record still visible            │
//! ├──────────────────┼──────────────────────────────────────────────────────┤
//! │ load             │ absent → empty list; I/O or parse → StoreError       │
//! │ save / add       │ StoreError (ValidationError for bad input)           │
//! │ remove           │ StoreError; absent code is not an error              │
//! └──────────────────┴──────────────────────────────────────────────────────┘
//! ```

use async_trait::async_trait;
use till_core::validation::{dedupe_buttons, normalize_button};
use till_core::{Button, Settings};

use crate::error::StoreResult;

/// Theme, currency, tax policy and plugin registry persistence.
#[async_trait]
pub trait SettingsStore: Send + Sync {
    /// Current theme name; `"default"` if nothing usable is stored.
    async fn get_theme(&self) -> String;

    /// Persists the trimmed theme name, leaving every other field as is.
    async fn set_theme(&self, theme: &str) -> StoreResult<()>;

    /// Full settings record. Never fails: degrades to the defaults.
    async fn get_all(&self) -> Settings;

    /// Replaces the full settings record atomically.
    async fn set_all(&self, settings: &Settings) -> StoreResult<()>;
}

/// Quick-sale button persistence.
#[async_trait]
pub trait ButtonStore: Send + Sync {
    /// All buttons in insertion order.
    async fn load(&self) -> StoreResult<Vec<Button>>;

    /// Replaces the full set. Duplicate codes collapse, later wins in place.
    async fn save(&self, buttons: &[Button]) -> StoreResult<()>;

    /// Validates and upserts one button by case-insensitive code.
    async fn add(&self, button: Button) -> StoreResult<()>;

    /// Deletes the button matching `code` case-insensitively, if any.
    async fn remove(&self, code: &str) -> StoreResult<()>;
}

/// Normalizes every entry and collapses duplicate codes, later wins in place.
///
/// Both button backends run a full replacement through this first so they
/// accept and reject the same inputs.
pub(crate) fn prepare_for_save(buttons: &[Button]) -> StoreResult<Vec<Button>> {
    let normalized = buttons
        .iter()
        .cloned()
        .map(normalize_button)
        .collect::<Result<Vec<_>, _>>()?;
    Ok(dedupe_buttons(normalized))
}
