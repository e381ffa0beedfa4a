//! # Document Backends
//!
//! Settings and buttons stored as one JSON document each.
//!
//! ## Write Path
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  serialize ──► <file>.<pid>.<n>.tmp ──► fsync ──► rename over <file>    │
//! │                                                                         │
//! │  A reader sees either the old document or the new one, never a torn     │
//! │  write. A crash leaves at worst a stray .tmp sibling.                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Each store instance owns one `tokio::sync::RwLock`; read-modify-write
//! operations keep the write guard for the whole cycle.

pub mod buttons;
pub mod settings;

pub use buttons::FileButtonStore;
pub use settings::FileSettingsStore;

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::io::AsyncWriteExt;
use tracing::debug;

use crate::error::{StoreError, StoreResult};

/// Reads and parses a JSON document. `Ok(None)` when the file doesn't exist.
pub(crate) async fn read_document<T: DeserializeOwned>(path: &Path) -> StoreResult<Option<T>> {
    let bytes = match tokio::fs::read(path).await {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(StoreError::io(path, e)),
    };

    let value = serde_json::from_slice(&bytes)?;
    Ok(Some(value))
}

/// Serializes `value` and atomically replaces `path` with it.
pub(crate) async fn write_document<T: Serialize + ?Sized>(path: &Path, value: &T) -> StoreResult<()> {
    let bytes = serde_json::to_vec_pretty(value)?;
    write_atomic(path, &bytes).await
}

/// Writes `bytes` to a temporary sibling, then renames it over `path`.
///
/// The parent directory is created if needed.
pub async fn write_atomic(path: &Path, bytes: &[u8]) -> StoreResult<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| StoreError::io(parent, e))?;
    }

    let tmp = temp_sibling(path);
    let result = async {
        let mut file = tokio::fs::File::create(&tmp)
            .await
            .map_err(|e| StoreError::io(&tmp, e))?;
        file.write_all(bytes)
            .await
            .map_err(|e| StoreError::io(&tmp, e))?;
        file.sync_all().await.map_err(|e| StoreError::io(&tmp, e))?;
        drop(file);

        tokio::fs::rename(&tmp, path)
            .await
            .map_err(|e| StoreError::io(path, e))
    }
    .await;

    if result.is_err() {
        let _ = tokio::fs::remove_file(&tmp).await;
    } else {
        debug!(path = %path.display(), bytes = bytes.len(), "Document written");
    }
    result
}

static TEMP_COUNTER: AtomicU64 = AtomicU64::new(0);

/// `<name>.<pid>.<n>.tmp` next to `path`, on the same filesystem so rename is
/// atomic. `n` differs on every call, so concurrent writers never share a
/// temporary file.
pub fn temp_sibling(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let n = TEMP_COUNTER.fetch_add(1, Ordering::Relaxed);
    path.with_file_name(format!("{}.{}.{}.tmp", name, std::process::id(), n))
}
