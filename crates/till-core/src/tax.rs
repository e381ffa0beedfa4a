//! # Tax Module
//!
//! Pure tax computation: subtotal in, (tax, total) out.
//!
//! ## Modes
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  EXCLUSIVE (tax added on top)                                          │
//! │    tax   = subtotal × rate / 100                                        │
//! │    total = subtotal + tax                                               │
//! │    10000 @ 20% → tax 2000, total 12000                                  │
//! │                                                                         │
//! │  INCLUSIVE (prices already contain tax)                                 │
//! │    net   = subtotal × 100 / (100 + rate)                                │
//! │    tax   = subtotal − net                                               │
//! │    total = subtotal                                                     │
//! │    12000 @ 20% → net 10000, tax 2000, total 12000                       │
//! │                                                                         │
//! │  rate ≤ 0 → tax 0, total = subtotal (either mode)                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every division truncates toward zero. Intermediate products are widened
//! to i128; a tax or total that does not fit back in i64 is `None`.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::DEFAULT_TAX_RATE_PCT;

// =============================================================================
// Tax Policy
// =============================================================================

/// Rate and mode under which a tax engine computes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct TaxPolicy {
    /// Whole percent, e.g. 20 for 20%.
    pub rate_percent: i64,

    /// True when prices already include tax.
    pub inclusive: bool,
}

impl TaxPolicy {
    /// Tax added on top of the subtotal.
    pub const fn exclusive(rate_percent: i64) -> Self {
        TaxPolicy {
            rate_percent,
            inclusive: false,
        }
    }

    /// Tax already contained in the subtotal.
    pub const fn inclusive(rate_percent: i64) -> Self {
        TaxPolicy {
            rate_percent,
            inclusive: true,
        }
    }
}

impl Default for TaxPolicy {
    fn default() -> Self {
        TaxPolicy::exclusive(DEFAULT_TAX_RATE_PCT)
    }
}

// =============================================================================
// Tax Engine
// =============================================================================

/// Result of a tax computation, in minor units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaxBreakdown {
    pub tax_cents: i64,
    pub total_cents: i64,
}

/// Pluggable tax computation used by the basket engine.
pub trait TaxEngine: Send + Sync {
    /// Computes tax and total for a subtotal. `None` when the tax or the
    /// total does not fit in minor units.
    fn compute(&self, subtotal_cents: i64) -> Option<TaxBreakdown>;

    /// The policy this engine applies.
    fn policy(&self) -> TaxPolicy;
}

/// Flat percentage tax, exclusive or inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PercentTaxEngine {
    policy: TaxPolicy,
}

impl PercentTaxEngine {
    pub const fn new(policy: TaxPolicy) -> Self {
        PercentTaxEngine { policy }
    }
}

impl TaxEngine for PercentTaxEngine {
    fn compute(&self, subtotal_cents: i64) -> Option<TaxBreakdown> {
        let rate = self.policy.rate_percent;
        if rate <= 0 {
            return Some(TaxBreakdown {
                tax_cents: 0,
                total_cents: subtotal_cents,
            });
        }

        let subtotal = subtotal_cents as i128;
        let rate = rate as i128;

        if self.policy.inclusive {
            let net = (subtotal * 100) / (100 + rate);
            Some(TaxBreakdown {
                tax_cents: i64::try_from(subtotal - net).ok()?,
                total_cents: subtotal_cents,
            })
        } else {
            let tax = i64::try_from((subtotal * rate) / 100).ok()?;
            Some(TaxBreakdown {
                tax_cents: tax,
                total_cents: subtotal_cents.checked_add(tax)?,
            })
        }
    }

    fn policy(&self) -> TaxPolicy {
        self.policy
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
