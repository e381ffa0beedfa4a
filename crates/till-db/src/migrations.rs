//! Schema migrations for the key/value backend, embedded from
//! `migrations/sqlite/NNN_description.sql`. Applied files are never edited;
//! changes go in a new file.
//!
//! Not to be confused with [`crate::legacy`], which moves data out of the old
//! JSON documents once.

use sqlx::SqlitePool;
use tracing::debug;

use crate::error::StoreResult;

static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("../../migrations/sqlite");

/// Applies every pending migration. Safe to call on an up-to-date database.
pub async fn run_migrations(pool: &SqlitePool) -> StoreResult<()> {
    MIGRATOR.run(pool).await?;
    debug!(known = MIGRATOR.migrations.len(), "Schema up to date");
    Ok(())
}

/// Number of embedded migrations not yet recorded as applied.
pub async fn pending(pool: &SqlitePool) -> StoreResult<usize> {
    let table_exists: bool = sqlx::query_scalar(
        "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = '_sqlx_migrations')",
    )
    .fetch_one(pool)
    .await?;
    if !table_exists {
        return Ok(MIGRATOR.migrations.len());
    }

    let applied: Vec<i64> =
        sqlx::query_scalar("SELECT version FROM _sqlx_migrations WHERE success = 1")
            .fetch_all(pool)
            .await?;

    Ok(MIGRATOR
        .migrations
        .iter()
        .filter(|m| !applied.contains(&m.version))
        .count())
}
