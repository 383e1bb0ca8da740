//! Message and feedback models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;

use super::SCHEMA_VERSION;
use crate::error::DbResult;

/// A single transcript message.
///
/// The `config` column stores the full message payload as JSON so every
/// engine message variant survives without data loss. A message belongs
/// to a session and/or a run: deleting the run cascades its messages,
/// while the session reference is NO ACTION - sessions cannot be deleted
/// out from under their transcripts.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Message {
    /// Unique identifier, assigned on first persist
    pub id: Option<i64>,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,

    /// Last update timestamp
    pub updated_at: DateTime<Utc>,

    /// Owning principal
    pub user_id: Option<String>,

    /// Payload schema version
    pub version: Option<String>,

    /// Message payload as JSON
    pub config: Json<serde_json::Value>,

    /// Session this message was produced in
    pub session_id: Option<i64>,

    /// Run this message was produced by
    pub run_id: Option<i64>,
}

impl Message {
    /// Create a message from any payload-shaped value - typed config or
    /// an equivalent generic mapping.
    pub fn new(
        config: impl Serialize,
        session_id: Option<i64>,
        run_id: Option<i64>,
        now: DateTime<Utc>,
    ) -> DbResult<Self> {
        Ok(Self {
            id: None,
            created_at: now,
            updated_at: now,
            user_id: None,
            version: Some(SCHEMA_VERSION.to_string()),
            config: Json(serde_json::to_value(config)?),
            session_id,
            run_id,
        })
    }

    /// Attach an owning user.
    pub fn with_user(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = Some(user_id.into());
        self
    }

    /// Refresh `updated_at`; never moves it backwards.
    pub fn touch(&mut self, now: DateTime<Utc>) {
        self.updated_at = self.updated_at.max(now);
    }
}

/// Human judgment on a single message.
///
/// Cascade-deleted with the message it annotates. `feedback_text` is
/// required and must be non-empty; `issue_type` categorizes negative
/// feedback.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Feedback {
    /// Unique identifier, assigned on first persist
    pub id: Option<i64>,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,

    /// Last update timestamp
    pub updated_at: DateTime<Utc>,

    /// Owning principal
    pub user_id: Option<String>,

    /// Payload schema version
    pub version: Option<String>,

    /// Whether the feedback is positive or negative
    pub is_positive: bool,

    /// The feedback text provided by the user
    pub feedback_text: String,

    /// Category of issue for negative feedback
    pub issue_type: Option<String>,

    /// Message this feedback is about
    pub message_id: Option<i64>,
}

impl Feedback {
    pub fn new(
        message_id: i64,
        is_positive: bool,
        feedback_text: impl Into<String>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: None,
            created_at: now,
            updated_at: now,
            user_id: None,
            version: Some(SCHEMA_VERSION.to_string()),
            is_positive,
            feedback_text: feedback_text.into(),
            issue_type: None,
            message_id: Some(message_id),
        }
    }

    /// Categorize the issue (for negative feedback).
    pub fn with_issue_type(mut self, issue_type: impl Into<String>) -> Self {
        self.issue_type = Some(issue_type.into());
        self
    }

    /// Attach an owning user.
    pub fn with_user(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = Some(user_id.into());
        self
    }

    /// Refresh `updated_at`; never moves it backwards.
    pub fn touch(&mut self, now: DateTime<Utc>) {
        self.updated_at = self.updated_at.max(now);
    }
}
