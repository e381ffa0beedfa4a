//! # Basket Engine
//!
//! Accumulates scanned lines for one in-progress sale.
//!
//! ## Scan Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         scan_qty(code, qty)                             │
//! │                                                                         │
//! │  qty ≤ 0 ──► clamp to 1                                                 │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  PriceResolver::resolve(code)                                          │
//! │       │                                                                 │
//! │       ├── None ──────────────► basket returned unchanged, no error      │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  sku already present? ── yes ──► line.qty += qty (position kept)        │
//! │       │                                                                 │
//! │       no ──► append line at the end                                     │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  recompute subtotal / tax / total from ALL lines                        │
//! │       │                                                                 │
//! │       └── overflow ──────────► basket returned unchanged, warn!         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Concurrency
//! The engine holds plain in-process state. Callers must serialize access
//! per basket (one writer per terminal/session).

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::money::Money;
use crate::tax::{PercentTaxEngine, TaxEngine, TaxPolicy};
use crate::types::{Basket, BasketLine, TenderReceipt};

// =============================================================================
// Price Resolver
// =============================================================================

/// Resolves a scan code to a priced single-unit line.
///
/// A miss is `None`, never an error: a mistyped code must not abort a sale.
#[async_trait]
pub trait PriceResolver: Send + Sync {
    async fn resolve(&self, code: &str) -> Option<BasketLine>;
}

// =============================================================================
// Basket Engine
// =============================================================================

/// Basket accumulation plus pluggable tax computation.
pub struct BasketEngine {
    basket: Basket,
    resolver: Box<dyn PriceResolver>,
    tax: Box<dyn TaxEngine>,
}

impl std::fmt::Debug for BasketEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BasketEngine")
            .field("basket", &self.basket)
            .field("tax_policy", &self.tax.policy())
            .finish_non_exhaustive()
    }
}

impl BasketEngine {
    /// Creates an engine with an empty basket and a percent tax engine.
    pub fn new(resolver: Box<dyn PriceResolver>, policy: TaxPolicy) -> Self {
        Self::with_tax_engine(resolver, Box::new(PercentTaxEngine::new(policy)))
    }

    /// Creates an engine with a custom tax engine.
    pub fn with_tax_engine(resolver: Box<dyn PriceResolver>, tax: Box<dyn TaxEngine>) -> Self {
        BasketEngine {
            basket: Basket::default(),
            resolver,
            tax,
        }
    }

    /// Current basket state.
    pub fn basket(&self) -> &Basket {
        &self.basket
    }

    /// Policy of the active tax engine.
    pub fn tax_policy(&self) -> TaxPolicy {
        self.tax.policy()
    }

    /// Scans one unit of `code`.
    pub async fn scan(&mut self, code: &str) -> &Basket {
        self.scan_qty(code, 1).await
    }

    /// Scans `qty` units of `code`. Never fails.
    ///
    /// A scan whose quantity or totals would not fit in i64 is dropped like
    /// an unknown code.
    pub async fn scan_qty(&mut self, code: &str, qty: i64) -> &Basket {
        let qty = if qty <= 0 { 1 } else { qty };

        let Some(item) = self.resolver.resolve(code).await else {
            debug!(code = %code, "Unknown scan code, basket unchanged");
            return &self.basket;
        };

        let mut lines = self.basket.lines.clone();
        match lines.iter_mut().find(|l| l.sku == item.sku) {
            Some(line) => match line.qty.checked_add(qty) {
                Some(total_qty) => line.qty = total_qty,
                None => {
                    warn!(code = %code, qty, "Quantity overflow, basket unchanged");
                    return &self.basket;
                }
            },
            None => lines.push(BasketLine { qty, ..item }),
        }

        let Some(basket) = Self::priced(lines, self.tax.as_ref()) else {
            warn!(code = %code, qty, "Basket total overflow, basket unchanged");
            return &self.basket;
        };
        self.basket = basket;

        debug!(
            code = %code,
            qty,
            lines = self.basket.lines.len(),
            total = self.basket.total_cents,
            "Scanned item"
        );
        &self.basket
    }

    /// Settles the sale: clears the basket and acknowledges.
    ///
    /// The amount is not checked against the total and no receipt is kept.
    pub fn tender(&mut self, amount_cents: i64, method: &str) -> TenderReceipt {
        debug!(amount_cents, method = %method, total = self.basket.total_cents, "Tender");
        self.basket = Basket::default();
        TenderReceipt::ok(method, amount_cents)
    }

    /// Switches to a new tax policy and recomputes totals over existing lines.
    pub fn set_tax_policy(&mut self, policy: TaxPolicy) {
        self.set_tax_engine(Box::new(PercentTaxEngine::new(policy)));
    }

    /// Switches to a new tax engine and recomputes totals over existing lines.
    ///
    /// If the current lines cannot be totalled under the new engine, the
    /// previous engine and totals stay in place.
    pub fn set_tax_engine(&mut self, tax: Box<dyn TaxEngine>) {
        match Self::priced(self.basket.lines.clone(), tax.as_ref()) {
            Some(basket) => {
                self.basket = basket;
                self.tax = tax;
            }
            None => warn!(
                policy = ?tax.policy(),
                subtotal = self.basket.subtotal_cents,
                "Tax policy overflows the current basket, keeping previous policy"
            ),
        }
    }

    /// Builds a basket over `lines` with subtotal, tax and total computed
    /// from scratch. `None` on overflow.
    fn priced(lines: Vec<BasketLine>, tax: &dyn TaxEngine) -> Option<Basket> {
        let subtotal = lines.iter().try_fold(Money::zero(), |acc, l| {
            let line_total = Money::from_cents(l.unit_price_cents).checked_multiply_quantity(l.qty)?;
            acc.checked_add(line_total)
        })?;
        let breakdown = tax.compute(subtotal.cents())?;

        Some(Basket {
            lines,
            subtotal_cents: subtotal.cents(),
            tax_cents: breakdown.tax_cents,
            total_cents: breakdown.total_cents,
        })
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
