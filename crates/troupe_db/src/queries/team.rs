//! Team queries.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::types::Json;
use sqlx::SqlitePool;

use crate::error::DbResult;
use crate::models::Team;

/// Create a new team, returning the assigned id.
pub async fn create_team(pool: &SqlitePool, team: &Team) -> DbResult<i64> {
    let result = sqlx::query(
        r#"
        INSERT INTO teams (created_at, updated_at, user_id, version, component)
        VALUES (?, ?, ?, ?, ?)
        "#,
    )
    .bind(team.created_at)
    .bind(team.updated_at)
    .bind(&team.user_id)
    .bind(&team.version)
    .bind(&team.component)
    .execute(pool)
    .await?;
    Ok(result.last_insert_rowid())
}

/// Get a team by id.
pub async fn get_team(pool: &SqlitePool, id: i64) -> DbResult<Option<Team>> {
    let team = sqlx::query_as::<_, Team>(
        r#"
        SELECT id, created_at, updated_at, user_id, version, component
        FROM teams WHERE id = ?
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;
    Ok(team)
}

/// List teams, optionally scoped to one user.
pub async fn list_teams(pool: &SqlitePool, user_id: Option<&str>) -> DbResult<Vec<Team>> {
    let teams = match user_id {
        Some(uid) => {
            sqlx::query_as::<_, Team>(
                r#"
                SELECT id, created_at, updated_at, user_id, version, component
                FROM teams WHERE user_id = ? ORDER BY created_at DESC
                "#,
            )
            .bind(uid)
            .fetch_all(pool)
            .await?
        }
        None => {
            sqlx::query_as::<_, Team>(
                r#"
                SELECT id, created_at, updated_at, user_id, version, component
                FROM teams ORDER BY created_at DESC
                "#,
            )
            .fetch_all(pool)
            .await?
        }
    };
    Ok(teams)
}

/// Replace a team's component descriptor.
pub async fn update_team_component(
    pool: &SqlitePool,
    id: i64,
    component: impl Serialize,
    now: DateTime<Utc>,
) -> DbResult<bool> {
    let component = Json(serde_json::to_value(component)?);
    let result = sqlx::query("UPDATE teams SET component = ?, updated_at = ? WHERE id = ?")
        .bind(component)
        .bind(now)
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

/// Delete a team. Sessions (and through them runs) cascade.
pub async fn delete_team(pool: &SqlitePool, id: i64) -> DbResult<bool> {
    let result = sqlx::query("DELETE FROM teams WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}
