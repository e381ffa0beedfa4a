//! # Legacy Document Migration
//!
//! One-shot move of the JSON documents into the key/value backend.
//!
//! ## Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  buttons.json present?                                                  │
//! │       │ no ─────────────────────────────► NoLegacySource                │
//! │       ▼                                                                 │
//! │  parse ── fails ────────────────────────► Unreadable (file left alone)  │
//! │       │                                                                 │
//! │  empty list ────────────────────────────► Empty (file left alone)       │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ButtonStore::save(list) ── fails ──────► Err (retried next startup)    │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  rename buttons.json → buttons.json.migrated ─► Migrated { count }      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! `settings.json` follows the same flow through `SettingsStore::set_all`.
//! The rename is what makes this run at most once: a `.migrated` file is
//! never read again.

use std::fmt;
use std::path::{Path, PathBuf};

use till_core::validation::{dedupe_buttons, normalize_button};
use till_core::{Button, Settings};
use tracing::{info, warn};

use crate::document::read_document;
use crate::error::{StoreError, StoreResult};
use crate::store::{ButtonStore, SettingsStore};

/// Suffix appended to a legacy document once its contents have moved.
pub const MIGRATED_SUFFIX: &str = ".migrated";

/// What happened to one legacy document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MigrationOutcome {
    /// No legacy document at the expected path.
    NoLegacySource,
    /// The document held nothing worth moving.
    Empty,
    /// Contents written to the key/value backend and the document renamed.
    Migrated { count: usize },
    /// The document could not be read or parsed; it was left in place.
    Unreadable { reason: String },
}

impl fmt::Display for MigrationOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MigrationOutcome::NoLegacySource => write!(f, "no legacy source"),
            MigrationOutcome::Empty => write!(f, "empty"),
            MigrationOutcome::Migrated { count } => write!(f, "migrated {}", count),
            MigrationOutcome::Unreadable { reason } => write!(f, "unreadable: {}", reason),
        }
    }
}

/// Outcome per legacy document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationReport {
    pub buttons: MigrationOutcome,
    pub settings: MigrationOutcome,
}

impl MigrationReport {
    /// True if anything moved.
    pub fn migrated_anything(&self) -> bool {
        matches!(self.buttons, MigrationOutcome::Migrated { .. })
            || matches!(self.settings, MigrationOutcome::Migrated { .. })
    }
}

/// Locations of the legacy documents.
#[derive(Debug, Clone)]
pub struct LegacyPaths {
    pub buttons: PathBuf,
    pub settings: PathBuf,
}

impl LegacyPaths {
    /// The document backend's file names under `data_dir`.
    pub fn in_dir(data_dir: &Path) -> Self {
        LegacyPaths {
            buttons: data_dir.join(crate::backend::BUTTONS_FILE),
            settings: data_dir.join(crate::backend::SETTINGS_FILE),
        }
    }
}

/// Moves any legacy documents into the given stores.
///
/// Store write failures are returned and leave the legacy file in place, so
/// the next startup tries again.
pub async fn migrate_legacy(
    paths: &LegacyPaths,
    settings: &dyn SettingsStore,
    buttons: &dyn ButtonStore,
) -> StoreResult<MigrationReport> {
    let report = MigrationReport {
        buttons: migrate_buttons(&paths.buttons, buttons).await?,
        settings: migrate_settings(&paths.settings, settings).await?,
    };

    info!(
        buttons = %report.buttons,
        settings = %report.settings,
        "Legacy migration finished"
    );
    Ok(report)
}

async fn migrate_buttons(path: &Path, store: &dyn ButtonStore) -> StoreResult<MigrationOutcome> {
    let list = match read_document::<Vec<Button>>(path).await {
        Ok(None) => return Ok(MigrationOutcome::NoLegacySource),
        Ok(Some(list)) => list,
        Err(e) => return Ok(unreadable(path, e)),
    };

    let valid: Vec<Button> = list
        .into_iter()
        .filter_map(|b| match normalize_button(b) {
            Ok(b) => Some(b),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Skipping invalid legacy button");
                None
            }
        })
        .collect();
    let valid = dedupe_buttons(valid);

    if valid.is_empty() {
        return Ok(MigrationOutcome::Empty);
    }

    store.save(&valid).await?;
    mark_migrated(path).await?;
    Ok(MigrationOutcome::Migrated { count: valid.len() })
}

async fn migrate_settings(
    path: &Path,
    store: &dyn SettingsStore,
) -> StoreResult<MigrationOutcome> {
    let settings = match read_document::<Settings>(path).await {
        Ok(None) => return Ok(MigrationOutcome::NoLegacySource),
        Ok(Some(settings)) => settings,
        Err(e) => return Ok(unreadable(path, e)),
    };

    store.set_all(&settings).await?;
    mark_migrated(path).await?;
    Ok(MigrationOutcome::Migrated { count: 1 })
}

fn unreadable(path: &Path, err: StoreError) -> MigrationOutcome {
    warn!(path = %path.display(), error = %err, "Legacy document unreadable, left in place");
    MigrationOutcome::Unreadable {
        reason: err.to_string(),
    }
}

/// `<path>.migrated` next to the original.
pub fn migrated_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(MIGRATED_SUFFIX);
    PathBuf::from(name)
}

async fn mark_migrated(path: &Path) -> StoreResult<()> {
    let target = migrated_path(path);
    tokio::fs::rename(path, &target)
        .await
        .map_err(|e| StoreError::io(path, e))?;
    info!(from = %path.display(), to = %target.display(), "Legacy document retired");
    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
