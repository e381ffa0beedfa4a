//! # Repository Module
//!
//! SQLite key/value backend for the store capabilities.
//!
//! ## Layout
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  SettingsStore ──► SqliteSettingsStore ──► settings(key, value)        │
//! │                                                                         │
//! │  ButtonStore   ──► SqliteButtonStore   ──► buttons(code, label,        │
//! │                                                price_cents, image_ref,  │
//! │                                                position)                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`SqliteSettingsStore`] - one row per settings field
//! - [`SqliteButtonStore`] - ordered quick-sale buttons

pub mod button;
pub mod settings;

pub use button::SqliteButtonStore;
pub use settings::SqliteSettingsStore;
