//! # Basket State
//!
//! The running basket of this terminal.
//!
//! ## Thread Safety
//! `BasketEngine` is plain in-process state with a single writer. It sits
//! behind a `tokio::sync::Mutex` so the async scan (which awaits the button
//! store) holds the lock across the whole lookup-and-update.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  scanner / request ──► scan() ──► lock ──► engine.scan_qty ──► clone   │
//! │  settings save     ──► apply_tax_policy() ──► lock ──► recompute       │
//! │  tender            ──► tender() ──► lock ──► clear + receipt           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use till_core::{Basket, BasketEngine, TaxPolicy, TenderReceipt};
use tokio::sync::Mutex;

/// Shared, serialized access to one basket engine.
#[derive(Debug)]
pub struct BasketState {
    engine: Mutex<BasketEngine>,
}

impl BasketState {
    pub fn new(engine: BasketEngine) -> Self {
        BasketState {
            engine: Mutex::new(engine),
        }
    }

    /// Copy of the current basket.
    pub async fn snapshot(&self) -> Basket {
        self.engine.lock().await.basket().clone()
    }

    pub async fn tax_policy(&self) -> TaxPolicy {
        self.engine.lock().await.tax_policy()
    }

    /// Scans `qty` units (`None` = 1) and returns the resulting basket.
    pub async fn scan(&self, code: &str, qty: Option<i64>) -> Basket {
        let mut engine = self.engine.lock().await;
        engine.scan_qty(code, qty.unwrap_or(1)).await.clone()
    }

    /// Settles the basket. `None` tenders exactly the current total.
    pub async fn tender(&self, amount_cents: Option<i64>, method: &str) -> (TenderReceipt, Basket) {
        let mut engine = self.engine.lock().await;
        let amount = amount_cents.unwrap_or(engine.basket().total_cents);
        let receipt = engine.tender(amount, method);
        (receipt, engine.basket().clone())
    }

    /// Switches tax policy, keeping the lines, and returns the recomputed basket.
    pub async fn apply_tax_policy(&self, policy: TaxPolicy) -> Basket {
        let mut engine = self.engine.lock().await;
        engine.set_tax_policy(policy);
        engine.basket().clone()
    }
}
