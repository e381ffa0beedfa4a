//! Buttons as one JSON array document (`buttons.json`).

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use till_core::validation::{code_key, normalize_button};
use till_core::Button;
use tokio::sync::RwLock;
use tracing::debug;

use super::{read_document, write_document};
use crate::error::StoreResult;
use crate::store::{prepare_for_save, ButtonStore};

/// Document-backed button store.
///
/// All operations go through one instance-scoped `RwLock`; `add` and
/// `remove` hold the write guard across their load/save pair.
#[derive(Debug)]
pub struct FileButtonStore {
    path: PathBuf,
    lock: RwLock<()>,
}

impl FileButtonStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        FileButtonStore {
            path: path.into(),
            lock: RwLock::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn load_unlocked(&self) -> StoreResult<Vec<Button>> {
        Ok(read_document::<Vec<Button>>(&self.path)
            .await?
            .unwrap_or_default())
    }

    async fn save_unlocked(&self, buttons: &[Button]) -> StoreResult<()> {
        let buttons = prepare_for_save(buttons)?;
        write_document(&self.path, &buttons).await?;
        debug!(count = buttons.len(), "Buttons saved");
        Ok(())
    }
}

#[async_trait]
impl ButtonStore for FileButtonStore {
    async fn load(&self) -> StoreResult<Vec<Button>> {
        let _guard = self.lock.read().await;
        self.load_unlocked().await
    }

    async fn save(&self, buttons: &[Button]) -> StoreResult<()> {
        let _guard = self.lock.write().await;
        self.save_unlocked(buttons).await
    }

    async fn add(&self, button: Button) -> StoreResult<()> {
        let button = normalize_button(button)?;

        let _guard = self.lock.write().await;
        let mut buttons = self.load_unlocked().await?;
        match buttons.iter_mut().find(|b| b.matches(&button.code)) {
            Some(existing) => *existing = button,
            None => buttons.push(button),
        }
        self.save_unlocked(&buttons).await
    }

    async fn remove(&self, code: &str) -> StoreResult<()> {
        let key = code_key(code);

        let _guard = self.lock.write().await;
        let mut buttons = self.load_unlocked().await?;
        let before = buttons.len();
        buttons.retain(|b| code_key(&b.code) != key);

        if buttons.len() == before {
            debug!(code = %code, "Remove: no such button");
            return Ok(());
        }
        self.save_unlocked(&buttons).await
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
