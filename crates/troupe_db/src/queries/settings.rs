//! Per-user settings queries.

use sqlx::SqlitePool;

use crate::error::DbResult;
use crate::models::Settings;

/// Insert or replace a user's settings blob.
///
/// Settings are singleton-per-user: a second upsert for the same user
/// rewrites the config in place instead of adding a row.
pub async fn upsert_settings(pool: &SqlitePool, settings: &Settings) -> DbResult<()> {
    sqlx::query(
        r#"
        INSERT INTO settings (created_at, updated_at, user_id, version, config)
        VALUES (?, ?, ?, ?, ?)
        ON CONFLICT(user_id) DO UPDATE SET
            config = excluded.config,
            version = excluded.version,
            updated_at = excluded.updated_at
        "#,
    )
    .bind(settings.created_at)
    .bind(settings.updated_at)
    .bind(&settings.user_id)
    .bind(&settings.version)
    .bind(&settings.config)
    .execute(pool)
    .await?;
    Ok(())
}

/// Get a user's settings.
pub async fn get_settings(pool: &SqlitePool, user_id: &str) -> DbResult<Option<Settings>> {
    let settings = sqlx::query_as::<_, Settings>(
        r#"
        SELECT id, created_at, updated_at, user_id, version, config
        FROM settings WHERE user_id = ?
        "#,
    )
    .bind(user_id)
    .fetch_optional(pool)
    .await?;
    Ok(settings)
}

/// Delete a user's settings.
pub async fn delete_settings(pool: &SqlitePool, user_id: &str) -> DbResult<bool> {
    let result = sqlx::query("DELETE FROM settings WHERE user_id = ?")
        .bind(user_id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}
