//! Button-backed [`PriceResolver`].

use std::sync::Arc;

use async_trait::async_trait;
use till_core::{BasketLine, PriceResolver};
use tracing::warn;

use crate::store::ButtonStore;

/// Resolves scan codes against the current button list.
///
/// The list is loaded on every lookup, so edits made by an administrator
/// are visible to the next scan.
#[derive(Clone)]
pub struct ButtonPriceResolver {
    buttons: Arc<dyn ButtonStore>,
}

impl ButtonPriceResolver {
    pub fn new(buttons: Arc<dyn ButtonStore>) -> Self {
        ButtonPriceResolver { buttons }
    }
}

#[async_trait]
impl PriceResolver for ButtonPriceResolver {
    async fn resolve(&self, code: &str) -> Option<BasketLine> {
        if code.trim().is_empty() {
            return None;
        }

        let buttons = match self.buttons.load().await {
            Ok(buttons) => buttons,
            Err(e) => {
                warn!(code = %code, error = %e, "Button list unreadable, treating scan as unknown");
                return None;
            }
        };

        buttons.iter().find(|b| b.matches(code)).map(|b| b.to_line())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::FileButtonStore;
    use till_core::{BasketEngine, Button, TaxPolicy};

    #[tokio::test]
    async fn test_resolves_case_insensitively() {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(FileButtonStore::new(dir.path().join("buttons.json")));
        store.add(Button::new("Coffee-1", "Coffee", 250)).await.unwrap();

        let resolver = ButtonPriceResolver::new(store);
        let line = resolver.resolve("coffee-1").await.unwrap();
        assert_eq!(line.sku, "Coffee-1");
        assert_eq!(line.qty, 1);
        assert_eq!(line.unit_price_cents, 250);

        assert!(resolver.resolve("tea").await.is_none());
        assert!(resolver.resolve("  ").await.is_none());
    }

    #[tokio::test]
    async fn test_unreadable_store_is_a_miss() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("buttons.json");
        tokio::fs::write(&path, "not json").await.unwrap();

        let resolver = ButtonPriceResolver::new(Arc::new(FileButtonStore::new(path)));
        assert!(resolver.resolve("A").await.is_none());
    }

    #[tokio::test]
    async fn test_drives_basket_engine() {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(FileButtonStore::new(dir.path().join("buttons.json")));
        store
            .save(&[Button::new("A", "Coffee", 250), Button::new("B", "Tea", 200)])
            .await
            .unwrap();

        let mut engine = BasketEngine::new(
            Box::new(ButtonPriceResolver::new(store)),
            TaxPolicy::exclusive(20),
        );
        engine.scan("a").await;
        engine.scan_qty("B", 2).await;
        let basket = engine.scan("missing").await;

        assert_eq!(basket.lines.len(), 2);
        assert_eq!(basket.subtotal_cents, 650);
        assert_eq!(basket.tax_cents, 130);
        assert_eq!(basket.total_cents, 780);
    }
}
