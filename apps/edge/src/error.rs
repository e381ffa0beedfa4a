//! # API Error Type
//!
//! Unified error type for edge commands.
//!
//! ## Error Handling Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Flow in the Edge App                           │
//! │                                                                         │
//! │  Request boundary                Command layer                          │
//! │  ────────────────                ─────────────                          │
//! │                                                                         │
//! │  POST /api/buttons/add                                                  │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │  commands::buttons::add_button → Result<T, ApiError>             │  │
//! │  │         │                                                        │  │
//! │  │  ValidationError ────────────────► VALIDATION_ERROR   (400)      │  │
//! │  │  StoreError ─────────────────────► PERSISTENCE_ERROR  (500)      │  │
//! │  │  PluginError::NotDownloaded ─────► PLUGIN_ERROR       (400)      │  │
//! │  │  anything else ──────────────────► INTERNAL           (500)      │  │
//! │  └──────────────────────────────────────────────────────────────────┘  │
//! │                                                                         │
//! │  Scans never produce an ApiError: unknown codes are not errors.         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::Serialize;
use thiserror::Error;
use till_core::ValidationError;
use till_db::StoreError;
use till_plugins::PluginError;

use crate::config::ConfigError;

/// API error returned from commands.
///
/// ## Serialization
/// ```json
/// {
///   "code": "VALIDATION_ERROR",
///   "message": "code is required"
/// }
/// ```
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiError {
    /// Machine-readable error code for programmatic handling
    pub code: ErrorCode,

    /// Human-readable error message for display
    pub message: String,
}

/// Error codes for API responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Input validation failed (400)
    ValidationError,

    /// A write to settings or buttons failed (500)
    PersistenceError,

    /// Plugin lifecycle precondition failed (400)
    PluginError,

    /// Internal server error (500)
    Internal,
}

impl ErrorCode {
    /// HTTP status a request boundary should answer with.
    pub fn http_status(self) -> u16 {
        match self {
            ErrorCode::ValidationError | ErrorCode::PluginError => 400,
            ErrorCode::PersistenceError | ErrorCode::Internal => 500,
        }
    }
}

impl ApiError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        ApiError {
            code,
            message: message.into(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::ValidationError, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::Internal, message)
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        ApiError::validation(err.to_string())
    }
}

/// Converts persistence errors to API errors.
impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Validation(e) => e.into(),
            other => {
                // Log the actual error but return a generic message
                tracing::error!(error = %other, "Persistence failed");
                ApiError::new(ErrorCode::PersistenceError, "Saving failed")
            }
        }
    }
}

impl From<PluginError> for ApiError {
    fn from(err: PluginError) -> Self {
        match err {
            PluginError::Validation(e) => e.into(),
            PluginError::Persistence(e) => e.into(),
            PluginError::NotDownloaded { .. } => {
                ApiError::new(ErrorCode::PluginError, err.to_string())
            }
            other => {
                tracing::error!(error = %other, "Plugin operation failed");
                ApiError::internal(other.to_string())
            }
        }
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{:?}] {}", self.code, self.message)
    }
}

impl std::error::Error for ApiError {}

/// Failures that stop the edge app from starting.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("cannot open stores: {0}")]
    Store(#[from] StoreError),

    #[error("cannot set up plugins: {0}")]
    Plugin(#[from] PluginError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serializes_screaming_code() {
        let err = ApiError::from(ValidationError::required("label"));
        let json = serde_json::to_value(&err).unwrap();
        assert_eq!(json["code"], "VALIDATION_ERROR");
        assert_eq!(json["message"], "label is required");
    }

    #[test]
    fn test_store_errors_are_generic_persistence_errors() {
        let err = ApiError::from(StoreError::TransactionFailed("disk I/O error".into()));
        assert_eq!(err.code, ErrorCode::PersistenceError);
        assert!(!err.message.contains("disk"));
        assert_eq!(err.code.http_status(), 500);

        let err = ApiError::from(StoreError::Validation(ValidationError::required("code")));
        assert_eq!(err.code, ErrorCode::ValidationError);
    }

    #[test]
    fn test_not_downloaded_is_plugin_error() {
        let err = ApiError::from(PluginError::NotDownloaded { id: "p1".into() });
        assert_eq!(err.code, ErrorCode::PluginError);
        assert_eq!(err.code.http_status(), 400);
        assert_eq!(err.message, "plugin p1 is not downloaded");
    }
}
