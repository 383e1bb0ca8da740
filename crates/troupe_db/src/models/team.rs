//! Team model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;

use super::SCHEMA_VERSION;
use crate::error::DbResult;

/// Root configuration object for an agent team.
///
/// The `component` column holds the full team descriptor (agents, model
/// clients, termination conditions) as JSON. Sessions hang off teams and
/// are cascade-deleted with them.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Team {
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

    /// Team component descriptor as JSON
    pub component: Json<serde_json::Value>,
}

impl Team {
    /// Create a new team record from any component-shaped value - a typed
    /// descriptor or an equivalent generic mapping.
    pub fn new(component: impl Serialize, now: DateTime<Utc>) -> DbResult<Self> {
        Ok(Self {
            id: None,
            created_at: now,
            updated_at: now,
            user_id: None,
            version: Some(SCHEMA_VERSION.to_string()),
            component: Json(serde_json::to_value(component)?),
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
