//! Run models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;

use troupe_core::MessageConfig;

use super::SCHEMA_VERSION;
use crate::error::DbResult;

/// A single execution of a team within a session.
///
/// The execution engine drives the status through
/// created -> active -> {complete, error, stopped}; the schema only
/// constrains the field to that closed value set. `task` stores the
/// original user request, `team_result` the engine's final report, and
/// `messages` a JSON snapshot of the transcript as the engine emitted it
/// (distinct from the normalized `messages` table rows).
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Run {
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

    /// Owning session (required)
    pub session_id: i64,

    /// Lifecycle status
    pub status: RunStatus,

    /// The original user task as JSON
    pub task: Json<serde_json::Value>,

    /// Final team result as JSON, filled when the run finishes
    pub team_result: Option<Json<serde_json::Value>>,

    /// Error description when status is `error`
    pub error_message: Option<String>,

    /// Transcript snapshot as a JSON array
    pub messages: Json<Vec<serde_json::Value>>,
}

impl Run {
    /// Create a run in the `created` state. `task` accepts the typed
    /// [`MessageConfig`] or an equivalent generic mapping.
    pub fn new(session_id: i64, task: impl Serialize, now: DateTime<Utc>) -> DbResult<Self> {
        Ok(Self {
            id: None,
            created_at: now,
            updated_at: now,
            user_id: None,
            version: Some(SCHEMA_VERSION.to_string()),
            session_id,
            status: RunStatus::Created,
            task: Json(serde_json::to_value(task)?),
            team_result: None,
            error_message: None,
            messages: Json(Vec::new()),
        })
    }

    /// Create a run whose task will be filled in later, matching the
    /// engine's convention of an empty-source, empty-content task.
    pub fn with_empty_task(session_id: i64, now: DateTime<Utc>) -> DbResult<Self> {
        Self::new(session_id, MessageConfig::default(), now)
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

/// Run lifecycle states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "TEXT", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum RunStatus {
    /// Run exists but the engine hasn't picked it up
    Created,
    /// Engine is executing the run
    Active,
    /// Terminal: finished normally
    Complete,
    /// Terminal: engine reported a failure
    Error,
    /// Terminal: cancelled by the user
    Stopped,
}

impl RunStatus {
    /// Whether this status ends the run lifecycle.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Complete | Self::Error | Self::Stopped)
    }
}

impl Default for RunStatus {
    fn default() -> Self {
        Self::Created
    }
}

impl std::fmt::Display for RunStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Created => write!(f, "created"),
            Self::Active => write!(f, "active"),
            Self::Complete => write!(f, "complete"),
            Self::Error => write!(f, "error"),
            Self::Stopped => write!(f, "stopped"),
        }
    }
}
