//! # Settings Commands
//!
//! ## Save Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  SettingsUpdate ──► apply onto current ──► SettingsStore::set_all      │
//! │                                                │                        │
//! │                                  ok ───────────┤                        │
//! │                                                ▼                        │
//! │              BasketState::apply_tax_policy (lines kept, totals redone)  │
//! │              DisplayState::follow_settings (new CurrencyFormat)         │
//! │                                                                         │
//! │  A failed write leaves the basket and display untouched.                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::Serialize;
use till_core::menu::{menu_items, MenuItem};
use till_core::Settings;
use tracing::info;

use crate::commands::basket::BasketView;
use crate::error::ApiError;
use crate::state::AppState;

/// Fields of the settings form. Blank or absent values keep what is saved.
#[derive(Debug, Clone, Default)]
pub struct SettingsUpdate {
    pub currency: Option<String>,
    pub country: Option<String>,
    pub region: Option<String>,
    /// Checkbox semantics: unchecked means exclusive.
    pub tax_inclusive: bool,
    /// Negative values are ignored.
    pub tax_rate_pct: Option<i64>,
}

impl SettingsUpdate {
    pub fn apply(&self, mut settings: Settings) -> Settings {
        fn non_blank(v: &Option<String>) -> Option<String> {
            v.as_deref()
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(String::from)
        }

        if let Some(currency) = non_blank(&self.currency) {
            settings.currency = currency;
        }
        if let Some(country) = non_blank(&self.country) {
            settings.country = country;
        }
        if let Some(region) = non_blank(&self.region) {
            settings.region = region;
        }
        settings.tax_inclusive = self.tax_inclusive;
        if let Some(rate) = self.tax_rate_pct.filter(|r| *r >= 0) {
            settings.tax_rate_pct = rate;
        }
        settings
    }
}

/// Title, theme and menu every rendered page carries.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageFrame {
    pub title: String,
    pub theme: String,
    pub menu_items: Vec<MenuItem>,
}

/// Result of a successful save.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsSaved {
    pub settings: Settings,
    pub basket: BasketView,
}

pub async fn get_settings(state: &AppState) -> Settings {
    state.stores.settings.get_all().await
}

pub async fn get_theme(state: &AppState) -> String {
    state.stores.settings.get_theme().await
}

pub async fn set_theme(state: &AppState, theme: &str) -> Result<String, ApiError> {
    state.stores.settings.set_theme(theme).await?;
    Ok(get_theme(state).await)
}

pub async fn save_settings(
    state: &AppState,
    update: SettingsUpdate,
) -> Result<SettingsSaved, ApiError> {
    let settings = update.apply(get_settings(state).await);
    state.stores.settings.set_all(&settings).await?;

    let policy = settings.tax_policy();
    let basket = state.basket.apply_tax_policy(policy).await;
    let currency = state.display.follow_settings(&settings).await;

    info!(
        currency = %settings.currency,
        tax_rate_pct = policy.rate_percent,
        tax_inclusive = policy.inclusive,
        "Settings saved"
    );

    Ok(SettingsSaved {
        basket: BasketView::new(&basket, &currency),
        settings,
    })
}

pub async fn menu(state: &AppState) -> Vec<MenuItem> {
    menu_items(&get_settings(state).await)
}

/// Page chrome for `title`, read from the saved settings.
pub async fn page_frame(state: &AppState, title: &str) -> PageFrame {
    let settings = get_settings(state).await;
    PageFrame {
        title: title.to_string(),
        theme: get_theme(state).await,
        menu_items: menu_items(&settings),
    }
}
