//! # Basket Commands
//!
//! ## Sale Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  ┌──────────┐  scan / scan x qty  ┌──────────┐  tender  ┌──────────┐   │
//! │  │  Empty   │────────────────────►│ In Sale  │─────────►│  Empty   │   │
//! │  └──────────┘                     └──────────┘          └──────────┘   │
//! │                                   unknown code:                         │
//! │                                   basket unchanged                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::Serialize;
use till_core::{Basket, BasketLine, CurrencyFormat, Money, TenderReceipt};
use tracing::debug;

use crate::state::AppState;

/// One line as shown on the till.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LineView {
    #[serde(flatten)]
    pub line: BasketLine,
    pub unit_price: String,
    pub line_total: String,
}

/// Basket plus pre-formatted amounts.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BasketView {
    pub lines: Vec<LineView>,
    pub item_count: i64,
    pub subtotal_cents: i64,
    pub tax_cents: i64,
    pub total_cents: i64,
    pub subtotal: String,
    pub tax: String,
    pub total: String,
}

impl BasketView {
    pub fn new(basket: &Basket, currency: &CurrencyFormat) -> Self {
        let fmt = |cents: i64| currency.format(Money::from_cents(cents));
        BasketView {
            lines: basket
                .lines
                .iter()
                .map(|l| LineView {
                    unit_price: fmt(l.unit_price_cents),
                    line_total: currency.format(l.line_total()),
                    line: l.clone(),
                })
                .collect(),
            item_count: basket.item_count(),
            subtotal_cents: basket.subtotal_cents,
            tax_cents: basket.tax_cents,
            total_cents: basket.total_cents,
            subtotal: fmt(basket.subtotal_cents),
            tax: fmt(basket.tax_cents),
            total: fmt(basket.total_cents),
        }
    }
}

/// Tender acknowledgment plus the (now empty) basket.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TenderView {
    pub receipt: TenderReceipt,
    pub amount: String,
    pub basket: BasketView,
}

pub async fn get_basket(state: &AppState) -> BasketView {
    let basket = state.basket.snapshot().await;
    BasketView::new(&basket, &state.display.currency().await)
}

/// Scans a code. Never fails; unknown codes leave the basket as it was.
pub async fn scan(state: &AppState, code: &str, qty: Option<i64>) -> BasketView {
    debug!(code = %code, ?qty, "scan command");
    let basket = state.basket.scan(code, qty).await;
    BasketView::new(&basket, &state.display.currency().await)
}

/// Settles the sale. `amount_cents = None` tenders the basket total.
pub async fn tender(state: &AppState, amount_cents: Option<i64>, method: &str) -> TenderView {
    let method = match method.trim() {
        "" => "cash",
        m => m,
    };
    let (receipt, basket) = state.basket.tender(amount_cents, method).await;
    let currency = state.display.currency().await;

    TenderView {
        amount: currency.format(Money::from_cents(receipt.amount_cents)),
        receipt,
        basket: BasketView::new(&basket, &currency),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::test_support::app;
    use till_core::Button;
    use till_db::StorageBackend;

    #[tokio::test]
    async fn test_scan_and_tender() {
        let (_dir, state) = app(StorageBackend::Sqlite).await;
        state
            .stores
            .buttons
            .save(&[Button::new("A", "Coffee", 250), Button::new("B", "Tea", 200)])
            .await
            .unwrap();

        scan(&state, "a", None).await;
        let view = scan(&state, "B", Some(2)).await;
        assert_eq!(view.lines.len(), 2);
        assert_eq!(view.item_count, 3);
        assert_eq!(view.subtotal, "£6.50");
        assert_eq!(view.tax, "£1.30");
        assert_eq!(view.total, "£7.80");
        assert_eq!(view.lines[1].line_total, "£4.00");

        let unchanged = scan(&state, "nope", None).await;
        assert_eq!(unchanged.total_cents, 780);

        let done = tender(&state, None, "").await;
        assert_eq!(done.receipt.method, "cash");
        assert_eq!(done.receipt.amount_cents, 780);
        assert_eq!(done.amount, "£7.80");
        assert!(done.basket.lines.is_empty());
        assert_eq!(get_basket(&state).await.total_cents, 0);
    }
}
