//! Session queries.

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

use crate::error::DbResult;
use crate::models::Session;

/// Create a new session, returning the assigned id.
pub async fn create_session(pool: &SqlitePool, session: &Session) -> DbResult<i64> {
    let result = sqlx::query(
        r#"
        INSERT INTO sessions (created_at, updated_at, user_id, version, name, team_id)
        VALUES (?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(session.created_at)
    .bind(session.updated_at)
    .bind(&session.user_id)
    .bind(&session.version)
    .bind(&session.name)
    .bind(session.team_id)
    .execute(pool)
    .await?;
    Ok(result.last_insert_rowid())
}

/// Get a session by id.
pub async fn get_session(pool: &SqlitePool, id: i64) -> DbResult<Option<Session>> {
    let session = sqlx::query_as::<_, Session>(
        r#"
        SELECT id, created_at, updated_at, user_id, version, name, team_id
        FROM sessions WHERE id = ?
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;
    Ok(session)
}

/// List sessions, optionally scoped to one user.
pub async fn list_sessions(pool: &SqlitePool, user_id: Option<&str>) -> DbResult<Vec<Session>> {
    let sessions = match user_id {
        Some(uid) => {
            sqlx::query_as::<_, Session>(
                r#"
                SELECT id, created_at, updated_at, user_id, version, name, team_id
                FROM sessions WHERE user_id = ? ORDER BY created_at DESC
                "#,
            )
            .bind(uid)
            .fetch_all(pool)
            .await?
        }
        None => {
            sqlx::query_as::<_, Session>(
                r#"
                SELECT id, created_at, updated_at, user_id, version, name, team_id
                FROM sessions ORDER BY created_at DESC
                "#,
            )
            .fetch_all(pool)
            .await?
        }
    };
    Ok(sessions)
}

/// Rename a session.
pub async fn rename_session(
    pool: &SqlitePool,
    id: i64,
    name: &str,
    now: DateTime<Utc>,
) -> DbResult<bool> {
    let result = sqlx::query("UPDATE sessions SET name = ?, updated_at = ? WHERE id = ?")
        .bind(name)
        .bind(now)
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

/// Delete a session.
///
/// Runs cascade (and cascade their own messages), but messages that
/// reference the session directly are NO ACTION: while any survive, the
/// delete fails with a foreign key violation.
pub async fn delete_session(pool: &SqlitePool, id: i64) -> DbResult<bool> {
    let result = sqlx::query("DELETE FROM sessions WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}
