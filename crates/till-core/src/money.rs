//! # Money Module
//!
//! Provides the `Money` type for monetary values in minor currency units, and
//! `CurrencyFormat`, the explicit formatting configuration handed to every
//! call that renders an amount.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  Basket totals are recomputed from scratch after every scan.           │
//! │  With floats, 0.1 + 0.2 = 0.30000000000000004 and the drift grows      │
//! │  with every recomputation.                                              │
//! │                                                                         │
//! │  OUR SOLUTION: Integer minor units (pence, cents)                      │
//! │    250 + 200 = 450, always.                                            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Formatting Is Explicit
//! There is no process-wide "current currency". A `CurrencyFormat` value is
//! built from the saved settings and passed to whoever renders prices:
//!
//! ```rust
//! use till_core::money::{CurrencyFormat, Money};
//!
//! let gbp = CurrencyFormat::for_code("GBP");
//! assert_eq!(gbp.format(Money::from_cents(12345)), "£123.45");
//! assert_eq!(gbp.plain(Money::from_cents(250)), "2.50");
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Mul};
use ts_rs::TS;

use crate::DEFAULT_CURRENCY;

// =============================================================================
// Money Type
// =============================================================================

/// Represents a monetary value in the smallest currency unit.
///
/// ## Design Decisions
/// - **i64 (signed)**: amounts are non-negative in this system, but tender
///   amounts come from outside and are carried as-is
/// - **Single field tuple struct**: Zero-cost abstraction over i64
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from minor units.
    ///
    /// ```rust
    /// use till_core::money::Money;
    ///
    /// let price = Money::from_cents(250); // £2.50
    /// assert_eq!(price.cents(), 250);
    /// ```
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Returns the value in minor units.
    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Returns the major unit portion (truncated toward zero).
    #[inline]
    pub const fn major(&self) -> i64 {
        self.0 / 100
    }

    /// Returns the minor unit portion (always 0-99).
    #[inline]
    pub const fn minor(&self) -> i64 {
        (self.0 % 100).abs()
    }

    /// Returns zero money value.
    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    /// Checks if the value is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Checks if the value is negative (less than zero).
    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Multiplies money by a quantity, saturating at the i64 bounds.
    ///
    /// ```rust
    /// use till_core::money::Money;
    ///
    /// let unit_price = Money::from_cents(250);
    /// assert_eq!(unit_price.multiply_quantity(3).cents(), 750);
    /// assert_eq!(unit_price.multiply_quantity(i64::MAX).cents(), i64::MAX);
    /// ```
    #[inline]
    pub const fn multiply_quantity(&self, qty: i64) -> Self {
        Money(self.0.saturating_mul(qty))
    }

    /// Multiplies money by a quantity; `None` when the result does not fit.
    #[inline]
    pub const fn checked_multiply_quantity(&self, qty: i64) -> Option<Self> {
        match self.0.checked_mul(qty) {
            Some(cents) => Some(Money(cents)),
            None => None,
        }
    }

    /// Adds two amounts; `None` when the result does not fit.
    #[inline]
    pub const fn checked_add(&self, other: Money) -> Option<Self> {
        match self.0.checked_add(other.0) {
            Some(cents) => Some(Money(cents)),
            None => None,
        }
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Display without a symbol; use [`CurrencyFormat`] for anything user-facing.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(f, "{}{}.{:02}", sign, self.major().abs(), self.minor())
    }
}

impl Default for Money {
    fn default() -> Self {
        Money::zero()
    }
}

impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0.saturating_add(other.0))
    }
}

impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 = self.0.saturating_add(other.0);
    }
}

impl Mul<i64> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: i64) -> Self {
        self.multiply_quantity(qty)
    }
}

/// Saturating sum. Use [`Money::checked_add`] where overflow must be detected.
impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), |acc, m| acc + m)
    }
}

// =============================================================================
// Currency Format
// =============================================================================

/// Immutable formatting configuration for one currency.
///
/// Built once from the saved settings and passed by reference into every
/// rendering call. Changing the currency means building a new value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CurrencyFormat {
    /// ISO 4217 code, upper-cased.
    pub code: String,

    /// Prefix rendered before the amount (`£`, `$`, `€`, or `"CHF "`).
    pub symbol: String,
}

impl CurrencyFormat {
    /// Builds the format for an ISO 4217 code.
    ///
    /// Known codes get their symbol; anything else is rendered as the code
    /// followed by a space. A blank code falls back to the default currency.
    pub fn for_code(code: &str) -> Self {
        let code = match code.trim() {
            "" => DEFAULT_CURRENCY.to_string(),
            c => c.to_uppercase(),
        };
        let symbol = match code.as_str() {
            "GBP" => "£".to_string(),
            "USD" => "$".to_string(),
            "EUR" => "€".to_string(),
            other => format!("{} ", other),
        };
        CurrencyFormat { code, symbol }
    }

    /// Formats an amount with the currency symbol (`£123.45`, `-£1.50`).
    pub fn format(&self, amount: Money) -> String {
        let sign = if amount.is_negative() { "-" } else { "" };
        format!(
            "{}{}{}.{:02}",
            sign,
            self.symbol,
            amount.major().abs(),
            amount.minor()
        )
    }

    /// Formats an amount without a symbol (`2.50`).
    pub fn plain(&self, amount: Money) -> String {
        amount.to_string()
    }
}

impl Default for CurrencyFormat {
    fn default() -> Self {
        CurrencyFormat::for_code(DEFAULT_CURRENCY)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_cents() {
        let money = Money::from_cents(1099);
        assert_eq!(money.cents(), 1099);
        assert_eq!(money.major(), 10);
        assert_eq!(money.minor(), 99);
    }

    #[test]
    fn test_display() {
        assert_eq!(Money::from_cents(1099).to_string(), "10.99");
        assert_eq!(Money::from_cents(5).to_string(), "0.05");
        assert_eq!(Money::from_cents(-550).to_string(), "-5.50");
    }

    #[test]
    fn test_sum_and_multiply() {
        let lines = [Money::from_cents(250) * 3, Money::from_cents(200)];
        let total: Money = lines.into_iter().sum();
        assert_eq!(total.cents(), 950);
    }

    #[test]
    fn test_overflow_is_detected_or_saturated() {
        let price = Money::from_cents(250);
        assert_eq!(price.checked_multiply_quantity(4).map(|m| m.cents()), Some(1_000));
        assert_eq!(price.checked_multiply_quantity(i64::MAX / 100), None);
        assert_eq!(Money::from_cents(i64::MAX).checked_add(Money::from_cents(1)), None);

        let total: Money = [Money::from_cents(i64::MAX), Money::from_cents(1)].into_iter().sum();
        assert_eq!(total.cents(), i64::MAX);
        assert_eq!((price * i64::MAX).cents(), i64::MAX);
    }

    #[test]
    fn test_currency_symbols() {
        assert_eq!(CurrencyFormat::for_code("GBP").format(Money::from_cents(12345)), "£123.45");
        assert_eq!(CurrencyFormat::for_code("usd").format(Money::from_cents(100)), "$1.00");
        assert_eq!(CurrencyFormat::for_code("EUR").format(Money::from_cents(12345)), "€123.45");
        assert_eq!(CurrencyFormat::for_code("CHF").format(Money::from_cents(99)), "CHF 0.99");
    }

    #[test]
    fn test_currency_negative_and_default() {
        let fmt = CurrencyFormat::default();
        assert_eq!(fmt.code, "GBP");
        assert_eq!(fmt.format(Money::from_cents(-150)), "-£1.50");
        assert_eq!(CurrencyFormat::for_code("  ").code, "GBP");
    }

    #[test]
    fn test_plain_has_no_symbol() {
        let fmt = CurrencyFormat::for_code("EUR");
        assert_eq!(fmt.plain(Money::from_cents(250)), "2.50");
    }
}
