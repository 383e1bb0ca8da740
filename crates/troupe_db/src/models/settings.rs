//! Settings model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;

use super::SCHEMA_VERSION;
use crate::error::DbResult;

/// Singleton-per-user configuration blob.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Settings {
    /// Unique identifier, assigned on first persist
    pub id: Option<i64>,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,

    /// Last update timestamp
    pub updated_at: DateTime<Utc>,

    /// Owning principal (one settings row per user)
    pub user_id: Option<String>,

    /// Payload schema version
    pub version: Option<String>,

    /// Settings blob as JSON
    pub config: Json<serde_json::Value>,
}

impl Settings {
    pub fn new(
        user_id: impl Into<String>,
        config: impl Serialize,
        now: DateTime<Utc>,
    ) -> DbResult<Self> {
        Ok(Self {
            id: None,
            created_at: now,
            updated_at: now,
            user_id: Some(user_id.into()),
            version: Some(SCHEMA_VERSION.to_string()),
            config: Json(serde_json::to_value(config)?),
        })
    }

    /// Refresh `updated_at`; never moves it backwards.
    pub fn touch(&mut self, now: DateTime<Utc>) {
        self.updated_at = self.updated_at.max(now);
    }
}
