//! Evaluation subsystem models.
//!
//! Tasks and criteria are reusable definitions; an [`EvalRunRecord`]
//! tracks one evaluation execution from pending through its terminal
//! state, accumulating runner output and judge scores as they arrive.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;

use super::SCHEMA_VERSION;
use crate::error::DbResult;

/// A reusable evaluation task definition.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct EvalTaskRecord {
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

    /// Short display name
    pub name: String,

    /// What this task checks for
    pub description: String,

    /// Typed `EvalTask` payload as JSON
    pub config: Json<serde_json::Value>,
}

impl EvalTaskRecord {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        config: impl Serialize,
        now: DateTime<Utc>,
    ) -> DbResult<Self> {
        Ok(Self {
            id: None,
            created_at: now,
            updated_at: now,
            user_id: None,
            version: Some(SCHEMA_VERSION.to_string()),
            name: name.into(),
            description: description.into(),
            config: Json(serde_json::to_value(config)?),
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

/// A reusable scoring criterion definition.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct EvalCriteriaRecord {
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

    /// Short display name
    pub name: String,

    /// What this criterion measures
    pub description: String,

    /// Typed `EvalJudgeCriteria` payload as JSON
    pub config: Json<serde_json::Value>,
}

impl EvalCriteriaRecord {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        config: impl Serialize,
        now: DateTime<Utc>,
    ) -> DbResult<Self> {
        Ok(Self {
            id: None,
            created_at: now,
            updated_at: now,
            user_id: None,
            version: Some(SCHEMA_VERSION.to_string()),
            name: name.into(),
            description: description.into(),
            config: Json(serde_json::to_value(config)?),
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

/// One evaluation execution.
///
/// References its task definition softly: deleting the task detaches the
/// run (`task_id` set to NULL) rather than destroying its history.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct EvalRunRecord {
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

    /// Short display name
    pub name: String,

    /// Free-form description
    pub description: String,

    /// Task definition this run executes, if still present
    pub task_id: Option<i64>,

    /// Runner component descriptor as JSON
    pub runner_config: Json<serde_json::Value>,

    /// Judge component descriptor as JSON
    pub judge_config: Json<serde_json::Value>,

    /// Embedded criteria payloads as a JSON array
    pub criteria_configs: Json<Vec<serde_json::Value>>,

    /// Lifecycle status
    pub status: EvalRunStatus,

    /// When the runner started
    pub start_time: Option<DateTime<Utc>>,

    /// When the run reached a terminal state
    pub end_time: Option<DateTime<Utc>>,

    /// Runner output as JSON, filled as it becomes available
    pub run_result: Option<Json<serde_json::Value>>,

    /// Judge scores as JSON, filled as they become available
    pub score_result: Option<Json<serde_json::Value>>,

    /// Error description when status is `failed`
    pub error_message: Option<String>,
}

impl EvalRunRecord {
    /// Create a pending evaluation run. Configs accept typed descriptors
    /// or equivalent generic mappings.
    pub fn new(
        name: impl Into<String>,
        task_id: Option<i64>,
        runner_config: impl Serialize,
        judge_config: impl Serialize,
        now: DateTime<Utc>,
    ) -> DbResult<Self> {
        Ok(Self {
            id: None,
            created_at: now,
            updated_at: now,
            user_id: None,
            version: Some(SCHEMA_VERSION.to_string()),
            name: name.into(),
            description: String::new(),
            task_id,
            runner_config: Json(serde_json::to_value(runner_config)?),
            judge_config: Json(serde_json::to_value(judge_config)?),
            criteria_configs: Json(Vec::new()),
            status: EvalRunStatus::Pending,
            start_time: None,
            end_time: None,
            run_result: None,
            score_result: None,
            error_message: None,
        })
    }

    /// Embed the criteria this run judges against.
    pub fn with_criteria(mut self, criteria: &[impl Serialize]) -> DbResult<Self> {
        let mut configs = Vec::with_capacity(criteria.len());
        for criterion in criteria {
            configs.push(serde_json::to_value(criterion)?);
        }
        self.criteria_configs = Json(configs);
        Ok(self)
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

/// Evaluation run lifecycle states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "TEXT", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum EvalRunStatus {
    /// Queued, not started
    Pending,
    /// Runner or judge in progress
    Running,
    /// Terminal: scored successfully
    Completed,
    /// Terminal: runner or judge failed
    Failed,
}

impl EvalRunStatus {
    /// Whether this status ends the run lifecycle.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }
}

impl Default for EvalRunStatus {
    fn default() -> Self {
        Self::Pending
    }
}

impl std::fmt::Display for EvalRunStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::Running => write!(f, "running"),
            Self::Completed => write!(f, "completed"),
            Self::Failed => write!(f, "failed"),
        }
    }
}
