//! Tool and tool-server models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;

use super::SCHEMA_VERSION;
use crate::error::DbResult;

/// A single tool an agent can call.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Tool {
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

    /// Tool component descriptor as JSON
    pub component: Json<serde_json::Value>,

    /// Server this tool was discovered on, if any
    pub server_id: Option<i64>,
}

impl Tool {
    pub fn new(
        component: impl Serialize,
        server_id: Option<i64>,
        now: DateTime<Utc>,
    ) -> DbResult<Self> {
        Ok(Self {
            id: None,
            created_at: now,
            updated_at: now,
            user_id: None,
            version: Some(SCHEMA_VERSION.to_string()),
            component: Json(serde_json::to_value(component)?),
            server_id,
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

/// A remote provider of tools.
///
/// `last_connected` tracks reachability; it only moves forward when the
/// server is successfully contacted.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct ToolServer {
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

    /// When the server was last successfully contacted
    pub last_connected: Option<DateTime<Utc>>,

    /// Server component descriptor as JSON
    pub component: Json<serde_json::Value>,
}

impl ToolServer {
    pub fn new(component: impl Serialize, now: DateTime<Utc>) -> DbResult<Self> {
        Ok(Self {
            id: None,
            created_at: now,
            updated_at: now,
            user_id: None,
            version: Some(SCHEMA_VERSION.to_string()),
            last_connected: None,
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
