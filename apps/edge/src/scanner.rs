//! # Keyboard-Wedge Scanner Input
//!
//! A barcode scanner in keyboard-wedge mode "types" the code and presses
//! Enter, so each input line is one submission.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Line                       Parsed                                      │
//! │  ──────────────────────     ──────────────────────────────────────      │
//! │  5012345678900              Scan { code, qty: None }                    │
//! │  5012345678900 x3           Scan { code, qty: Some(3) }                 │
//! │  tender                     Tender { method: "cash", amount: None }     │
//! │  tender card 1250           Tender { method: "card", amount: 1250 }     │
//! │  (blank)                    ignored                                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Amounts are minor units. A trailing `x<n>` that is not a positive
//! number is kept as part of the code.

use till_core::ValidationError;

use crate::commands::basket::{self, BasketView};
use crate::state::AppState;

/// One parsed scanner line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanInput {
    Scan { code: String, qty: Option<i64> },
    Tender { method: String, amount_cents: Option<i64> },
}

impl ScanInput {
    /// Parses a line. `Ok(None)` for blank lines.
    pub fn parse(line: &str) -> Result<Option<Self>, ValidationError> {
        let line = line.trim();
        if line.is_empty() {
            return Ok(None);
        }

        let mut words = line.split_whitespace();
        if words
            .next()
            .is_some_and(|w| w.eq_ignore_ascii_case("tender"))
        {
            let method = words.next().unwrap_or("cash").to_string();
            let amount_cents = words
                .next()
                .map(|raw| {
                    raw.parse::<i64>().map_err(|_| ValidationError::InvalidFormat {
                        field: "amount".to_string(),
                        reason: format!("'{}' is not a whole number of minor units", raw),
                    })
                })
                .transpose()?;
            return Ok(Some(ScanInput::Tender {
                method,
                amount_cents,
            }));
        }

        let qty_suffix = line.rsplit_once(char::is_whitespace).and_then(|(code, last)| {
            let n = last.strip_prefix(['x', 'X'])?.parse::<i64>().ok()?;
            (n > 0).then(|| (code.trim_end(), n))
        });

        Ok(Some(match qty_suffix {
            Some((code, qty)) => ScanInput::Scan {
                code: code.to_string(),
                qty: Some(qty),
            },
            None => ScanInput::Scan {
                code: line.to_string(),
                qty: None,
            },
        }))
    }

    /// Runs this input against the basket and returns the basket afterwards.
    pub async fn apply(&self, state: &AppState) -> BasketView {
        match self {
            ScanInput::Scan { code, qty } => basket::scan(state, code, *qty).await,
            ScanInput::Tender {
                method,
                amount_cents,
            } => basket::tender(state, *amount_cents, method).await.basket,
        }
    }
}
