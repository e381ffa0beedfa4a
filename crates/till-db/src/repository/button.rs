//! # Button Repository
//!
//! Quick-sale buttons in the `buttons` table.
//!
//! ## Ordering
//! Rows carry an explicit `position`; `load` returns them in that order, so
//! insertion order survives exactly as it does in the JSON array document.
//! An upsert that replaces an existing code keeps its position.
//!
//! ## Code Matching
//! Codes are matched in Rust with [`code_key`] inside the write transaction,
//! so this store and the document store agree on what counts as the same
//! code.

use async_trait::async_trait;
use sqlx::{Sqlite, SqlitePool, Transaction};
use till_core::validation::{code_key, normalize_button};
use till_core::Button;
use tracing::debug;

use crate::error::{StoreError, StoreResult};
use crate::store::{prepare_for_save, ButtonStore};

#[derive(Debug, sqlx::FromRow)]
struct ButtonRow {
    code: String,
    label: String,
    price_cents: i64,
    image_ref: Option<String>,
}

impl From<ButtonRow> for Button {
    fn from(row: ButtonRow) -> Self {
        Button {
            label: row.label,
            code: row.code,
            price_cents: row.price_cents,
            image_ref: row.image_ref,
        }
    }
}

/// SQLite button store.
#[derive(Debug, Clone)]
pub struct SqliteButtonStore {
    pool: SqlitePool,
}

impl SqliteButtonStore {
    pub fn new(pool: SqlitePool) -> Self {
        SqliteButtonStore { pool }
    }

    async fn begin(&self) -> StoreResult<Transaction<'static, Sqlite>> {
        self.pool
            .begin()
            .await
            .map_err(|e| StoreError::TransactionFailed(e.to_string()))
    }

    async fn commit(tx: Transaction<'static, Sqlite>) -> StoreResult<()> {
        tx.commit()
            .await
            .map_err(|e| StoreError::TransactionFailed(e.to_string()))
    }

    /// Stored code matching `code` case-insensitively, if any.
    async fn find_stored_code(
        tx: &mut Transaction<'static, Sqlite>,
        code: &str,
    ) -> StoreResult<Option<String>> {
        let key = code_key(code);
        let codes: Vec<String> = sqlx::query_scalar("SELECT code FROM buttons")
            .fetch_all(&mut **tx)
            .await?;
        Ok(codes.into_iter().find(|c| code_key(c) == key))
    }
}

#[async_trait]
impl ButtonStore for SqliteButtonStore {
    async fn load(&self) -> StoreResult<Vec<Button>> {
        let rows: Vec<ButtonRow> = sqlx::query_as(
            "SELECT code, label, price_cents, image_ref FROM buttons ORDER BY position",
        )
        .fetch_all(&self.pool)
        .await?;

        debug!(count = rows.len(), "Buttons loaded");
        Ok(rows.into_iter().map(Button::from).collect())
    }

    /// Replaces every row in one transaction.
    async fn save(&self, buttons: &[Button]) -> StoreResult<()> {
        let buttons = prepare_for_save(buttons)?;

        let mut tx = self.begin().await?;
        sqlx::query("DELETE FROM buttons").execute(&mut *tx).await?;

        for (position, b) in buttons.iter().enumerate() {
            sqlx::query(
                "INSERT INTO buttons (code, label, price_cents, image_ref, position)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
            )
            .bind(&b.code)
            .bind(&b.label)
            .bind(b.price_cents)
            .bind(&b.image_ref)
            .bind(position as i64)
            .execute(&mut *tx)
            .await?;
        }

        Self::commit(tx).await?;
        debug!(count = buttons.len(), "Buttons saved");
        Ok(())
    }

    async fn add(&self, button: Button) -> StoreResult<()> {
        let button = normalize_button(button)?;

        let mut tx = self.begin().await?;
        match Self::find_stored_code(&mut tx, &button.code).await? {
            Some(stored) => {
                sqlx::query(
                    "UPDATE buttons SET code = ?1, label = ?2, price_cents = ?3, image_ref = ?4
                     WHERE code = ?5",
                )
                .bind(&button.code)
                .bind(&button.label)
                .bind(button.price_cents)
                .bind(&button.image_ref)
                .bind(&stored)
                .execute(&mut *tx)
                .await?;
                debug!(code = %button.code, "Button replaced");
            }
            None => {
                sqlx::query(
                    "INSERT INTO buttons (code, label, price_cents, image_ref, position)
                     VALUES (?1, ?2, ?3, ?4, (SELECT COALESCE(MAX(position), -1) + 1 FROM buttons))",
                )
                .bind(&button.code)
                .bind(&button.label)
                .bind(button.price_cents)
                .bind(&button.image_ref)
                .execute(&mut *tx)
                .await?;
                debug!(code = %button.code, "Button added");
            }
        }
        Self::commit(tx).await
    }

    async fn remove(&self, code: &str) -> StoreResult<()> {
        let mut tx = self.begin().await?;
        let Some(stored) = Self::find_stored_code(&mut tx, code).await? else {
            debug!(code = %code, "Remove: no such button");
            return Ok(());
        };

        sqlx::query("DELETE FROM buttons WHERE code = ?1")
            .bind(&stored)
            .execute(&mut *tx)
            .await?;
        Self::commit(tx).await?;

        debug!(code = %stored, "Button removed");
        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use till_core::ValidationError;

    async fn store() -> SqliteButtonStore {
        Database::new(DbConfig::in_memory()).await.unwrap().buttons()
    }

    #[tokio::test]
    async fn test_empty_table_is_empty_list() {
        assert!(store().await.load().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_add_keeps_insertion_order() {
        let s = store().await;
        for (code, label) in [("C", "Cake"), ("A", "Coffee"), ("B", "Tea")] {
            s.add(Button::new(code, label, 100)).await.unwrap();
        }
        let codes: Vec<_> = s.load().await.unwrap().into_iter().map(|b| b.code).collect();
        assert_eq!(codes, ["C", "A", "B"]);
    }

    #[tokio::test]
    async fn test_add_existing_code_replaces_in_place() {
        let s = store().await;
        s.add(Button::new("A", "Coffee", 250)).await.unwrap();
        s.add(Button::new("B", "Tea", 200)).await.unwrap();
        s.add(Button::new("a", "Latte", 300).with_image("/public/images/l.png"))
            .await
            .unwrap();

        let buttons = s.load().await.unwrap();
        assert_eq!(buttons.len(), 2);
        assert_eq!(
            buttons[0],
            Button::new("a", "Latte", 300).with_image("/public/images/l.png")
        );
        assert_eq!(buttons[1].code, "B");
    }

    #[tokio::test]
    async fn test_add_rejects_blank_label_and_leaves_store_unchanged() {
        let s = store().await;
        s.add(Button::new("A", "Coffee", 250)).await.unwrap();

        let err = s.add(Button::new("B", "  ", 100)).await.unwrap_err();
        assert!(matches!(
            err,
            StoreError::Validation(ValidationError::Required { .. })
        ));
        assert_eq!(s.load().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_save_replaces_whole_set_and_collapses_duplicates() {
        let s = store().await;
        s.add(Button::new("OLD", "Old", 1)).await.unwrap();

        s.save(&[
            Button::new("A", "Coffee", 250),
            Button::new("B", "Tea", 200),
            Button::new("A", "Mocha", 320),
        ])
        .await
        .unwrap();

        let buttons = s.load().await.unwrap();
        assert_eq!(
            buttons,
            vec![Button::new("A", "Mocha", 320), Button::new("B", "Tea", 200)]
        );
    }

    #[tokio::test]
    async fn test_remove_is_case_insensitive_and_tolerates_absent() {
        let s = store().await;
        s.add(Button::new("Coffee-1", "Coffee", 250)).await.unwrap();
        s.remove("nope").await.unwrap();
        s.remove("COFFEE-1").await.unwrap();
        assert!(s.load().await.unwrap().is_empty());
    }
}
