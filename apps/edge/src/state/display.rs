//! Display currency.
//!
//! Callers take a `CurrencyFormat` value out of this state and pass it into
//! every formatting call; nothing formats against shared mutable state.

use till_core::{CurrencyFormat, Settings};
use tokio::sync::RwLock;
use tracing::info;

#[derive(Debug)]
pub struct DisplayState {
    currency: RwLock<CurrencyFormat>,
    /// Set when configuration overrides the saved currency.
    pinned: Option<CurrencyFormat>,
}

impl DisplayState {
    pub fn new(override_code: Option<&str>, settings: &Settings) -> Self {
        let pinned = override_code.map(CurrencyFormat::for_code);
        let initial = pinned.clone().unwrap_or_else(|| settings.currency_format());
        DisplayState {
            currency: RwLock::new(initial),
            pinned,
        }
    }

    /// The format to use for the next rendering.
    pub async fn currency(&self) -> CurrencyFormat {
        self.currency.read().await.clone()
    }

    /// Follows the saved currency unless configuration pins one.
    pub async fn follow_settings(&self, settings: &Settings) -> CurrencyFormat {
        let next = self
            .pinned
            .clone()
            .unwrap_or_else(|| settings.currency_format());

        let mut current = self.currency.write().await;
        if *current != next {
            info!(currency = %next.code, "Display currency changed");
            *current = next.clone();
        }
        next
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_follows_saved_currency() {
        let display = DisplayState::new(None, &Settings::default());
        assert_eq!(display.currency().await.code, "GBP");

        let usd = Settings {
            currency: "USD".to_string(),
            ..Settings::default()
        };
        assert_eq!(display.follow_settings(&usd).await.symbol, "$");
        assert_eq!(display.currency().await.code, "USD");
    }

    #[tokio::test]
    async fn test_pinned_currency_ignores_settings() {
        let display = DisplayState::new(Some("eur"), &Settings::default());
        let usd = Settings {
            currency: "USD".to_string(),
            ..Settings::default()
        };
        display.follow_settings(&usd).await;
        assert_eq!(display.currency().await.code, "EUR");
    }
}
