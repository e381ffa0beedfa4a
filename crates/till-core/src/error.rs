//! # Error Types
//!
//! Domain-specific error types for till-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  till-core errors (this file)                                          │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  till-db errors (separate crate)                                       │
//! │  └── StoreError       - Persistence failures (write paths)             │
//! │                                                                         │
//! │  till-plugins errors (separate crate)                                  │
//! │  └── PluginError      - Lifecycle failures (install before download)   │
//! │                                                                         │
//! │  Flow: ValidationError → StoreError/PluginError → ApiError → caller    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Unknown scan codes and unknown plugin ids are deliberately NOT errors
//! anywhere in this crate: lookups answer with a negative result instead.

use thiserror::Error;

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// Raised on administrator write paths (adding a button, registering a
/// plugin) before anything is persisted, so a failed call leaves the stores
/// untouched.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    /// A required field is missing or empty (after trimming).
    #[error("{field} is required")]
    Required { field: String },

    /// Monetary amount below zero.
    #[error("{field} must not be negative")]
    NegativeAmount { field: String },

    /// Invalid format (e.g., a plugin id containing a path separator).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
}

impl ValidationError {
    /// Creates a `Required` error for the given field.
    pub fn required(field: impl Into<String>) -> Self {
        ValidationError::Required {
            field: field.into(),
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error_messages() {
        let err = ValidationError::required("code");
        assert_eq!(err.to_string(), "code is required");

        let err = ValidationError::NegativeAmount {
            field: "priceCents".to_string(),
        };
        assert_eq!(err.to_string(), "priceCents must not be negative");
    }
}
