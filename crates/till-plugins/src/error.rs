//! Plugin lifecycle errors.

use std::path::{Path, PathBuf};

use thiserror::Error;
use till_core::ValidationError;
use till_db::StoreError;

#[derive(Debug, Error)]
pub enum PluginError {
    /// Bad id or bundle source.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Install requested before the entry document exists.
    #[error("plugin {id} is not downloaded")]
    NotDownloaded { id: String },

    /// Registry read/write failed.
    #[error(transparent)]
    Persistence(#[from] StoreError),

    /// Plugin directory or entry document I/O failed.
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Bundle could not be fetched. `download` logs and absorbs this.
    #[error("failed to fetch bundle from {source_ref}: {reason}")]
    RemoteFetch { source_ref: String, reason: String },

    /// The HTTP client could not be built.
    #[error("HTTP client unavailable: {0}")]
    HttpClient(String),
}

impl PluginError {
    pub fn io(path: impl AsRef<Path>, source: std::io::Error) -> Self {
        PluginError::Io {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    pub(crate) fn fetch(source_ref: impl Into<String>, reason: impl ToString) -> Self {
        PluginError::RemoteFetch {
            source_ref: source_ref.into(),
            reason: reason.to_string(),
        }
    }
}

pub type PluginResult<T> = Result<T, PluginError>;
