//! # till-core: Pure Business Logic for Universal Till
//!
//! This crate is the **heart** of Universal Till. It contains the basket and
//! tax logic as pure functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Universal Till Architecture                        │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │               Request boundary (pages, htmx, scanner)           │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ scalars (code, qty, amount)            │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ till-core (THIS CRATE) ★                        │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │   money   │  │  basket   │  │ validation│  │   │
//! │  │   │  Button   │  │   Money   │  │  Engine   │  │   rules   │  │   │
//! │  │   │ Settings  │  │    tax    │  │ Resolver  │  │           │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │           till-db (settings + buttons persistence)              │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (BasketLine, Button, Settings, plugin records)
//! - [`money`] - Money type and explicit currency formatting
//! - [`tax`] - Tax policy and the percent tax engine
//! - [`basket`] - Basket engine and the `PriceResolver` capability
//! - [`menu`] - Navigation menu derived from settings
//! - [`error`] - Domain error types
//! - [`validation`] - Business rule validation
//!
//! ## Example Usage
//!
//! ```rust
//! use till_core::tax::{PercentTaxEngine, TaxEngine, TaxPolicy};
//!
//! let engine = PercentTaxEngine::new(TaxPolicy::exclusive(20));
//! let breakdown = engine.compute(10_000).unwrap();
//!
//! assert_eq!(breakdown.tax_cents, 2_000);
//! assert_eq!(breakdown.total_cents, 12_000);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod basket;
pub mod error;
pub mod menu;
pub mod money;
pub mod tax;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use basket::{BasketEngine, PriceResolver};
pub use error::ValidationError;
pub use money::{CurrencyFormat, Money};
pub use tax::{PercentTaxEngine, TaxBreakdown, TaxEngine, TaxPolicy};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Theme used when nothing has been persisted yet.
pub const DEFAULT_THEME: &str = "default";

/// Currency used when nothing has been persisted yet (ISO 4217).
pub const DEFAULT_CURRENCY: &str = "GBP";

/// Country used when nothing has been persisted yet (ISO 3166-1 alpha-2).
pub const DEFAULT_COUNTRY: &str = "GB";

/// Tax rate (whole percent) used when nothing has been persisted yet.
pub const DEFAULT_TAX_RATE_PCT: i64 = 20;
