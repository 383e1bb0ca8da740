//! Transcript message and feedback queries.

use sqlx::SqlitePool;

use crate::error::{DbError, DbResult};
use crate::models::{Feedback, Message};

/// Create a new message, returning the assigned id.
pub async fn create_message(pool: &SqlitePool, message: &Message) -> DbResult<i64> {
    let result = sqlx::query(
        r#"
        INSERT INTO messages (created_at, updated_at, user_id, version, config, session_id, run_id)
        VALUES (?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(message.created_at)
    .bind(message.updated_at)
    .bind(&message.user_id)
    .bind(&message.version)
    .bind(&message.config)
    .bind(message.session_id)
    .bind(message.run_id)
    .execute(pool)
    .await?;
    Ok(result.last_insert_rowid())
}

/// Get a message by id.
pub async fn get_message(pool: &SqlitePool, id: i64) -> DbResult<Option<Message>> {
    let message = sqlx::query_as::<_, Message>(
        r#"
        SELECT id, created_at, updated_at, user_id, version, config, session_id, run_id
        FROM messages WHERE id = ?
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;
    Ok(message)
}

/// Get a session's messages in transcript order.
pub async fn list_messages_for_session(
    pool: &SqlitePool,
    session_id: i64,
) -> DbResult<Vec<Message>> {
    let messages = sqlx::query_as::<_, Message>(
        r#"
        SELECT id, created_at, updated_at, user_id, version, config, session_id, run_id
        FROM messages WHERE session_id = ? ORDER BY created_at ASC, id ASC
        "#,
    )
    .bind(session_id)
    .fetch_all(pool)
    .await?;
    Ok(messages)
}

/// Get a run's messages in transcript order.
pub async fn list_messages_for_run(pool: &SqlitePool, run_id: i64) -> DbResult<Vec<Message>> {
    let messages = sqlx::query_as::<_, Message>(
        r#"
        SELECT id, created_at, updated_at, user_id, version, config, session_id, run_id
        FROM messages WHERE run_id = ? ORDER BY created_at ASC, id ASC
        "#,
    )
    .bind(run_id)
    .fetch_all(pool)
    .await?;
    Ok(messages)
}

/// Delete a message. Its feedback cascades.
pub async fn delete_message(pool: &SqlitePool, id: i64) -> DbResult<bool> {
    let result = sqlx::query("DELETE FROM messages WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

/// Create feedback on a message, returning the assigned id.
///
/// The feedback text is required; an empty or whitespace-only text is
/// rejected before touching storage.
pub async fn create_feedback(pool: &SqlitePool, feedback: &Feedback) -> DbResult<i64> {
    if feedback.feedback_text.trim().is_empty() {
        return Err(DbError::invalid_data("feedback_text must not be empty"));
    }

    let result = sqlx::query(
        r#"
        INSERT INTO feedback (created_at, updated_at, user_id, version,
                              is_positive, feedback_text, issue_type, message_id)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(feedback.created_at)
    .bind(feedback.updated_at)
    .bind(&feedback.user_id)
    .bind(&feedback.version)
    .bind(feedback.is_positive)
    .bind(&feedback.feedback_text)
    .bind(&feedback.issue_type)
    .bind(feedback.message_id)
    .execute(pool)
    .await?;
    Ok(result.last_insert_rowid())
}

/// Get feedback by id.
pub async fn get_feedback(pool: &SqlitePool, id: i64) -> DbResult<Option<Feedback>> {
    let feedback = sqlx::query_as::<_, Feedback>(
        r#"
        SELECT id, created_at, updated_at, user_id, version,
               is_positive, feedback_text, issue_type, message_id
        FROM feedback WHERE id = ?
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;
    Ok(feedback)
}

/// Get all feedback on a message, oldest first.
pub async fn list_feedback_for_message(
    pool: &SqlitePool,
    message_id: i64,
) -> DbResult<Vec<Feedback>> {
    let feedback = sqlx::query_as::<_, Feedback>(
        r#"
        SELECT id, created_at, updated_at, user_id, version,
               is_positive, feedback_text, issue_type, message_id
        FROM feedback WHERE message_id = ? ORDER BY created_at ASC, id ASC
        "#,
    )
    .bind(message_id)
    .fetch_all(pool)
    .await?;
    Ok(feedback)
}

/// Delete a single feedback row.
pub async fn delete_feedback(pool: &SqlitePool, id: i64) -> DbResult<bool> {
    let result = sqlx::query("DELETE FROM feedback WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connection::StudioDb;
    use crate::models::Session;
    use serde_json::json;
    use troupe_core::{Clock, ManualClock};

    fn test_clock() -> ManualClock {
        ManualClock::new("2024-01-01T00:00:00Z".parse().unwrap())
    }

    async fn message_fixture(db: &StudioDb, clock: &ManualClock) -> i64 {
        let session = Session::new(None, None, clock.now());
        let session_id = crate::queries::create_session(db.pool(), &session)
            .await
            .unwrap();
        let message = Message::new(
            json!({"source": "assistant", "content": "hello"}),
            Some(session_id),
            None,
            clock.now(),
        )
        .unwrap();
        create_message(db.pool(), &message).await.unwrap()
    }

    #[tokio::test]
    async fn empty_feedback_text_fails_validation() {
        let db = StudioDb::open_in_memory().await.unwrap();
        let clock = test_clock();
        let message_id = message_fixture(&db, &clock).await;

        let feedback = Feedback::new(message_id, false, "   ", clock.now());
        let err = create_feedback(db.pool(), &feedback).await.unwrap_err();
        assert!(matches!(err, DbError::InvalidData { .. }));
    }

    #[tokio::test]
    async fn feedback_round_trips_with_issue_type() {
        let db = StudioDb::open_in_memory().await.unwrap();
        let clock = test_clock();
        let message_id = message_fixture(&db, &clock).await;

        let feedback = Feedback::new(message_id, false, "wrong citation", clock.now())
            .with_issue_type("hallucination");
        let id = create_feedback(db.pool(), &feedback).await.unwrap();

        let loaded = get_feedback(db.pool(), id).await.unwrap().unwrap();
        assert!(!loaded.is_positive);
        assert_eq!(loaded.feedback_text, "wrong citation");
        assert_eq!(loaded.issue_type.as_deref(), Some("hallucination"));
        assert_eq!(loaded.message_id, Some(message_id));
    }

    #[tokio::test]
    async fn deleting_message_cascades_feedback() {
        let db = StudioDb::open_in_memory().await.unwrap();
        let clock = test_clock();
        let message_id = message_fixture(&db, &clock).await;

        let feedback = Feedback::new(message_id, true, "good", clock.now());
        let feedback_id = create_feedback(db.pool(), &feedback).await.unwrap();

        assert!(delete_message(db.pool(), message_id).await.unwrap());
        assert!(get_feedback(db.pool(), feedback_id)
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn transcript_order_is_stable() {
        let db = StudioDb::open_in_memory().await.unwrap();
        let clock = test_clock();

        let session = Session::new(None, None, clock.now());
        let session_id = crate::queries::create_session(db.pool(), &session)
            .await
            .unwrap();

        // Same timestamp: id breaks the tie, preserving insert order.
        for content in ["first", "second", "third"] {
            let message = Message::new(
                json!({"source": "assistant", "content": content}),
                Some(session_id),
                None,
                clock.now(),
            )
            .unwrap();
            create_message(db.pool(), &message).await.unwrap();
        }

        let transcript = list_messages_for_session(db.pool(), session_id)
            .await
            .unwrap();
        let contents: Vec<_> = transcript
            .iter()
            .map(|m| m.config.0["content"].as_str().unwrap().to_string())
            .collect();
        assert_eq!(contents, ["first", "second", "third"]);
    }
}
