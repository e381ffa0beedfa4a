//! Quick-sale button admin.
//!
//! Every write answers with the re-rendered button list, prices formatted
//! with the current display currency.

use till_core::validation::resolve_image_ref;
use till_core::{Button, ButtonView, ValidationError};
use tracing::info;

use crate::error::ApiError;
use crate::state::AppState;

/// Form fields of the add-button page, as submitted.
#[derive(Debug, Clone, Default)]
pub struct NewButton {
    pub label: String,
    pub code: String,
    /// Minor units as typed; blank means 0.
    pub price_cents: String,
    pub image_url: String,
}

impl NewButton {
    fn into_button(self) -> Result<Button, ValidationError> {
        let price_cents = match self.price_cents.trim() {
            "" => 0,
            raw => raw.parse::<i64>().map_err(|_| ValidationError::InvalidFormat {
                field: "priceCents".to_string(),
                reason: format!("'{}' is not a whole number of minor units", raw),
            })?,
        };

        Ok(Button {
            label: self.label,
            code: self.code,
            price_cents,
            image_ref: resolve_image_ref(&self.image_url),
        })
    }
}

pub async fn list_buttons(state: &AppState) -> Result<Vec<ButtonView>, ApiError> {
    let buttons = state.stores.buttons.load().await?;
    let currency = state.display.currency().await;
    Ok(buttons.iter().map(|b| ButtonView::new(b, &currency)).collect())
}

/// Adds or replaces (same code, any case) a button.
pub async fn add_button(state: &AppState, form: NewButton) -> Result<Vec<ButtonView>, ApiError> {
    let button = form.into_button()?;
    let code = button.code.clone();
    state.stores.buttons.add(button).await?;
    info!(code = %code.trim(), "Button saved");
    list_buttons(state).await
}

/// Removes a button by code. Unknown codes are a no-op.
pub async fn remove_button(state: &AppState, code: &str) -> Result<Vec<ButtonView>, ApiError> {
    state.stores.buttons.remove(code).await?;
    info!(code = %code.trim(), "Button removed");
    list_buttons(state).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::test_support::app;
    use crate::error::ErrorCode;
    use till_db::StorageBackend;

    fn form(code: &str, label: &str, price: &str, image: &str) -> NewButton {
        NewButton {
            label: label.to_string(),
            code: code.to_string(),
            price_cents: price.to_string(),
            image_url: image.to_string(),
        }
    }

    #[tokio::test]
    async fn test_add_list_remove_on_both_backends() {
        for backend in [StorageBackend::Sqlite, StorageBackend::Document] {
            let (_dir, state) = app(backend).await;

            add_button(&state, form("A", "Coffee", "250", "coffee.png")).await.unwrap();
            let list = add_button(&state, form("B", "Tea", "", "")).await.unwrap();
            assert_eq!(list.len(), 2);
            assert_eq!(list[0].price, "2.50");
            assert_eq!(list[0].image_ref.as_deref(), Some("/public/images/coffee.png"));
            assert_eq!(list[1].price_cents, 0);
            assert_eq!(list[1].image_ref, None);

            let list = add_button(&state, form("a", "Latte", "300", "https://cdn.test/l.png"))
                .await
                .unwrap();
            assert_eq!(list.len(), 2, "{backend}");
            assert_eq!(list[0].label, "Latte");
            assert_eq!(list[0].image_ref.as_deref(), Some("https://cdn.test/l.png"));

            let list = remove_button(&state, "A").await.unwrap();
            assert_eq!(list.len(), 1);
            assert_eq!(list[0].code, "B");

            let list = remove_button(&state, "missing").await.unwrap();
            assert_eq!(list.len(), 1);
        }
    }

    #[tokio::test]
    async fn test_invalid_input_is_validation_error() {
        let (_dir, state) = app(StorageBackend::Sqlite).await;

        let err = add_button(&state, form("A", "Coffee", "2.50", "")).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);

        let err = add_button(&state, form("", "Coffee", "250", "")).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);
        assert_eq!(err.message, "code is required");

        let err = add_button(&state, form("A", "Coffee", "-1", "")).await.unwrap_err();
        assert_eq!(err.message, "priceCents must not be negative");

        assert!(list_buttons(&state).await.unwrap().is_empty());
    }
}
