//! Run lifecycle queries.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::types::Json;
use sqlx::SqlitePool;

use crate::error::DbResult;
use crate::models::{Run, RunStatus};

/// Create a new run, returning the assigned id.
pub async fn create_run(pool: &SqlitePool, run: &Run) -> DbResult<i64> {
    let result = sqlx::query(
        r#"
        INSERT INTO runs (created_at, updated_at, user_id, version, session_id,
                          status, task, team_result, error_message, messages)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(run.created_at)
    .bind(run.updated_at)
    .bind(&run.user_id)
    .bind(&run.version)
    .bind(run.session_id)
    .bind(run.status)
    .bind(&run.task)
    .bind(&run.team_result)
    .bind(&run.error_message)
    .bind(&run.messages)
    .execute(pool)
    .await?;
    Ok(result.last_insert_rowid())
}

/// Get a run by id.
pub async fn get_run(pool: &SqlitePool, id: i64) -> DbResult<Option<Run>> {
    let run = sqlx::query_as::<_, Run>(
        r#"
        SELECT id, created_at, updated_at, user_id, version, session_id,
               status, task, team_result, error_message, messages
        FROM runs WHERE id = ?
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;
    Ok(run)
}

/// List a session's runs, oldest first.
pub async fn list_runs_for_session(pool: &SqlitePool, session_id: i64) -> DbResult<Vec<Run>> {
    let runs = sqlx::query_as::<_, Run>(
        r#"
        SELECT id, created_at, updated_at, user_id, version, session_id,
               status, task, team_result, error_message, messages
        FROM runs WHERE session_id = ? ORDER BY created_at ASC, id ASC
        "#,
    )
    .bind(session_id)
    .fetch_all(pool)
    .await?;
    Ok(runs)
}

/// Write a new status. Transition legality is the execution engine's
/// responsibility; the schema only constrains the value set.
pub async fn update_run_status(
    pool: &SqlitePool,
    id: i64,
    status: RunStatus,
    now: DateTime<Utc>,
) -> DbResult<bool> {
    let result = sqlx::query("UPDATE runs SET status = ?, updated_at = ? WHERE id = ?")
        .bind(status)
        .bind(now)
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

/// Record a successful finish: status `complete` plus the team result.
pub async fn complete_run(
    pool: &SqlitePool,
    id: i64,
    team_result: impl Serialize,
    now: DateTime<Utc>,
) -> DbResult<bool> {
    let team_result = Json(serde_json::to_value(team_result)?);
    let result = sqlx::query(
        "UPDATE runs SET status = ?, team_result = ?, updated_at = ? WHERE id = ?",
    )
    .bind(RunStatus::Complete)
    .bind(team_result)
    .bind(now)
    .bind(id)
    .execute(pool)
    .await?;
    Ok(result.rows_affected() > 0)
}

/// Record a failed finish: status `error` plus the engine's message.
pub async fn fail_run(
    pool: &SqlitePool,
    id: i64,
    error_message: &str,
    now: DateTime<Utc>,
) -> DbResult<bool> {
    let result = sqlx::query(
        "UPDATE runs SET status = ?, error_message = ?, updated_at = ? WHERE id = ?",
    )
    .bind(RunStatus::Error)
    .bind(error_message)
    .bind(now)
    .bind(id)
    .execute(pool)
    .await?;
    Ok(result.rows_affected() > 0)
}

/// Replace the transcript snapshot.
pub async fn set_run_messages(
    pool: &SqlitePool,
    id: i64,
    messages: &[serde_json::Value],
    now: DateTime<Utc>,
) -> DbResult<bool> {
    let messages = Json(messages.to_vec());
    let result = sqlx::query("UPDATE runs SET messages = ?, updated_at = ? WHERE id = ?")
        .bind(messages)
        .bind(now)
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

/// Delete a run. Its transcript messages (and their feedback) cascade.
pub async fn delete_run(pool: &SqlitePool, id: i64) -> DbResult<bool> {
    let result = sqlx::query("DELETE FROM runs WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connection::StudioDb;
    use crate::error::DbError;
    use crate::models::{Feedback, Message, Session};
    use chrono::Duration;
    use serde_json::json;
    use troupe_core::{Clock, ManualClock, MessageConfig, TeamResult};

    fn test_clock() -> ManualClock {
        ManualClock::new("2024-01-01T00:00:00Z".parse().unwrap())
    }

    async fn session_fixture(db: &StudioDb, clock: &ManualClock) -> i64 {
        let session = Session::new(None, None, clock.now());
        crate::queries::create_session(db.pool(), &session)
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn new_run_starts_created_with_timestamps() {
        let db = StudioDb::open_in_memory().await.unwrap();
        let clock = test_clock();
        let session_id = session_fixture(&db, &clock).await;

        let run = Run::new(
            session_id,
            MessageConfig::new("user", "summarize the report"),
            clock.now(),
        )
        .unwrap();
        let id = create_run(db.pool(), &run).await.unwrap();

        let loaded = get_run(db.pool(), id).await.unwrap().unwrap();
        assert_eq!(loaded.status, RunStatus::Created);
        assert_eq!(loaded.created_at, clock.now());
        assert_eq!(loaded.updated_at, loaded.created_at);
        assert_eq!(loaded.task.0["content"], "summarize the report");
        assert!(loaded.team_result.is_none());
    }

    #[tokio::test]
    async fn status_updates_strictly_advance_updated_at() {
        let db = StudioDb::open_in_memory().await.unwrap();
        let clock = test_clock();
        let session_id = session_fixture(&db, &clock).await;

        let run = Run::with_empty_task(session_id, clock.now()).unwrap();
        let id = create_run(db.pool(), &run).await.unwrap();

        let mut previous = get_run(db.pool(), id).await.unwrap().unwrap().updated_at;
        for status in [RunStatus::Active, RunStatus::Complete] {
            clock.advance(Duration::seconds(1));
            update_run_status(db.pool(), id, status, clock.now())
                .await
                .unwrap();
            let current = get_run(db.pool(), id).await.unwrap().unwrap();
            assert_eq!(current.status, status);
            assert!(current.updated_at > previous);
            // created_at never moves
            assert_eq!(current.created_at, run.created_at);
            previous = current.updated_at;
        }
    }

    #[tokio::test]
    async fn complete_run_stores_team_result() {
        let db = StudioDb::open_in_memory().await.unwrap();
        let clock = test_clock();
        let session_id = session_fixture(&db, &clock).await;

        let run = Run::with_empty_task(session_id, clock.now()).unwrap();
        let id = create_run(db.pool(), &run).await.unwrap();

        let team_result = TeamResult {
            duration: 12.5,
            ..TeamResult::default()
        };
        clock.advance(Duration::seconds(3));
        complete_run(db.pool(), id, &team_result, clock.now())
            .await
            .unwrap();

        let loaded = get_run(db.pool(), id).await.unwrap().unwrap();
        assert_eq!(loaded.status, RunStatus::Complete);
        let stored: TeamResult =
            serde_json::from_value(loaded.team_result.unwrap().0).unwrap();
        assert_eq!(stored, team_result);
    }

    #[tokio::test]
    async fn out_of_enum_status_is_rejected_by_storage() {
        let db = StudioDb::open_in_memory().await.unwrap();
        let clock = test_clock();
        let session_id = session_fixture(&db, &clock).await;

        let run = Run::with_empty_task(session_id, clock.now()).unwrap();
        let id = create_run(db.pool(), &run).await.unwrap();

        let err: DbError = sqlx::query("UPDATE runs SET status = 'paused' WHERE id = ?")
            .bind(id)
            .execute(db.pool())
            .await
            .unwrap_err()
            .into();
        assert!(err.is_check_violation());
    }

    #[tokio::test]
    async fn deleting_run_cascades_messages_and_feedback() {
        let db = StudioDb::open_in_memory().await.unwrap();
        let clock = test_clock();
        let session_id = session_fixture(&db, &clock).await;

        let run = Run::with_empty_task(session_id, clock.now()).unwrap();
        let run_id = create_run(db.pool(), &run).await.unwrap();

        let message = Message::new(
            json!({"source": "assistant", "content": "done"}),
            Some(session_id),
            Some(run_id),
            clock.now(),
        )
        .unwrap();
        let message_id = crate::queries::create_message(db.pool(), &message)
            .await
            .unwrap();

        let feedback = Feedback::new(message_id, true, "nice answer", clock.now());
        let feedback_id = crate::queries::create_feedback(db.pool(), &feedback)
            .await
            .unwrap();

        assert!(delete_run(db.pool(), run_id).await.unwrap());
        assert!(crate::queries::get_message(db.pool(), message_id)
            .await
            .unwrap()
            .is_none());
        assert!(crate::queries::get_feedback(db.pool(), feedback_id)
            .await
            .unwrap()
            .is_none());
    }
}
