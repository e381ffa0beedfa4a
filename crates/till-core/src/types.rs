//! # Domain Types
//!
//! Core domain types used throughout Universal Till.
//!
//! ## Type Map
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │     Button      │──►│   BasketLine    │──►│     Basket      │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  code (nocase)  │   │  sku (identity) │   │  lines (ordered)│       │
//! │  │  label          │   │  name, qty      │   │  subtotal       │       │
//! │  │  price_cents    │   │  unit price     │   │  tax, total     │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │  Settings                                                       │   │
//! │  │  theme, currency, country, region, tax policy                   │   │
//! │  │  installed_plugins: id → bool                                   │   │
//! │  │  plugin_records:    id → { route, label, path }                 │   │
//! │  │  menu_plugins:      id → { route, label, url }                  │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! JSON field names match the documents already on disk at existing
//! installations (`priceCents`, `imageUrl`, `taxRatePct`, ...).

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

use crate::money::{CurrencyFormat, Money};
use crate::tax::TaxPolicy;
use crate::{DEFAULT_COUNTRY, DEFAULT_CURRENCY, DEFAULT_TAX_RATE_PCT, DEFAULT_THEME};

// =============================================================================
// Basket
// =============================================================================

/// One line of the basket. Identity is `sku`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct BasketLine {
    pub sku: String,
    pub name: String,

    /// Always ≥ 1.
    pub qty: i64,

    #[serde(rename = "priceCents")]
    pub unit_price_cents: i64,

    #[serde(rename = "imageUrl", default, skip_serializing_if = "Option::is_none")]
    pub image_ref: Option<String>,
}

impl BasketLine {
    /// Unit price × quantity, saturating.
    pub fn line_total(&self) -> Money {
        Money::from_cents(self.unit_price_cents).multiply_quantity(self.qty)
    }
}

/// The in-progress sale.
///
/// ## Invariants
/// - Lines keep first-seen order and are never reordered
/// - At most one line per sku
/// - `subtotal_cents` is Σ qty × unit price over all lines
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Basket {
    pub lines: Vec<BasketLine>,

    #[serde(rename = "subtotal")]
    pub subtotal_cents: i64,

    #[serde(rename = "tax")]
    pub tax_cents: i64,

    #[serde(rename = "total")]
    pub total_cents: i64,
}

impl Basket {
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Total number of units across all lines.
    pub fn item_count(&self) -> i64 {
        self.lines.iter().fold(0i64, |n, l| n.saturating_add(l.qty))
    }
}

/// Acknowledgment returned by a tender.
///
/// Settlement is a stub: nothing is checked against the basket total and
/// nothing is persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct TenderReceipt {
    pub status: String,
    pub method: String,
    pub amount_cents: i64,
    pub reference: String,
    #[ts(as = "String")]
    pub settled_at: DateTime<Utc>,
}

impl TenderReceipt {
    pub fn ok(method: impl Into<String>, amount_cents: i64) -> Self {
        TenderReceipt {
            status: "ok".to_string(),
            method: method.into(),
            amount_cents,
            reference: Uuid::new_v4().to_string(),
            settled_at: Utc::now(),
        }
    }
}

// =============================================================================
// Buttons
// =============================================================================

/// A quick-sale button. `code` is unique, compared case-insensitively.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Button {
    pub label: String,
    pub code: String,
    pub price_cents: i64,

    #[serde(rename = "imageUrl", default, skip_serializing_if = "Option::is_none")]
    pub image_ref: Option<String>,
}

impl Button {
    pub fn new(code: impl Into<String>, label: impl Into<String>, price_cents: i64) -> Self {
        Button {
            label: label.into(),
            code: code.into(),
            price_cents,
            image_ref: None,
        }
    }

    pub fn with_image(mut self, image_ref: impl Into<String>) -> Self {
        self.image_ref = Some(image_ref.into());
        self
    }

    /// Case-insensitive code match.
    pub fn matches(&self, code: &str) -> bool {
        crate::validation::code_key(&self.code) == crate::validation::code_key(code)
    }

    /// Converts this button into a single-unit basket line.
    pub fn to_line(&self) -> BasketLine {
        BasketLine {
            sku: self.code.clone(),
            name: self.label.clone(),
            qty: 1,
            unit_price_cents: self.price_cents,
            image_ref: self.image_ref.clone(),
        }
    }
}

/// Button as shown on the till, with a pre-formatted price.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct ButtonView {
    pub label: String,
    pub code: String,
    pub price_cents: i64,
    /// Price without symbol, e.g. "2.50".
    pub price: String,
    #[serde(rename = "imageUrl", default, skip_serializing_if = "Option::is_none")]
    pub image_ref: Option<String>,
}

impl ButtonView {
    pub fn new(button: &Button, currency: &CurrencyFormat) -> Self {
        ButtonView {
            label: button.label.clone(),
            code: button.code.clone(),
            price_cents: button.price_cents,
            price: currency.plain(Money::from_cents(button.price_cents)),
            image_ref: button.image_ref.clone(),
        }
    }
}

// =============================================================================
// Settings
// =============================================================================

/// Registry record that makes an installed plugin discoverable.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct PluginRecord {
    pub route: String,
    pub label: String,
    #[serde(rename = "path", alias = "localPath")]
    pub local_path: String,
}

/// Externally hosted plugin that appears in the navigation menu.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct MenuPlugin {
    pub route: String,
    pub label: String,
    pub url: String,
}

/// The full settings record, read and written wholesale.
///
/// Missing fields in a stored document take the documented defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    pub theme: String,
    pub currency: String,
    pub country: String,
    pub region: String,
    pub tax_inclusive: bool,
    pub tax_rate_pct: i64,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub installed_plugins: BTreeMap<String, bool>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub plugin_records: BTreeMap<String, PluginRecord>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub menu_plugins: BTreeMap<String, MenuPlugin>,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            theme: DEFAULT_THEME.to_string(),
            currency: DEFAULT_CURRENCY.to_string(),
            country: DEFAULT_COUNTRY.to_string(),
            region: String::new(),
            tax_inclusive: false,
            tax_rate_pct: DEFAULT_TAX_RATE_PCT,
            installed_plugins: BTreeMap::new(),
            plugin_records: BTreeMap::new(),
            menu_plugins: BTreeMap::new(),
        }
    }
}

impl Settings {
    /// Tax policy described by these settings.
    pub fn tax_policy(&self) -> TaxPolicy {
        TaxPolicy {
            rate_percent: self.tax_rate_pct,
            inclusive: self.tax_inclusive,
        }
    }

    /// Display format for the configured currency.
    pub fn currency_format(&self) -> CurrencyFormat {
        CurrencyFormat::for_code(&self.currency)
    }

    /// Installed = registry record present AND installed flag set.
    pub fn is_installed(&self, id: &str) -> bool {
        self.installed_plugins.get(id).copied().unwrap_or(false)
            && self.plugin_records.contains_key(id)
    }

    /// Ids for which [`Settings::is_installed`] holds, in id order.
    pub fn installed_ids(&self) -> Vec<String> {
        self.installed_plugins
            .keys()
            .filter(|id| self.is_installed(id))
            .cloned()
            .collect()
    }

    /// Registers a plugin and sets its installed flag.
    pub fn register_plugin(&mut self, id: &str, record: PluginRecord) {
        self.installed_plugins.insert(id.to_string(), true);
        self.plugin_records.insert(id.to_string(), record);
    }

    /// Clears a plugin's record and flag. Returns true if anything was removed.
    pub fn unregister_plugin(&mut self, id: &str) -> bool {
        let flag = self.installed_plugins.remove(id).is_some();
        let record = self.plugin_records.remove(id).is_some();
        flag || record
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
