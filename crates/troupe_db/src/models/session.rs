//! Session model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::SCHEMA_VERSION;

/// A named conversation under a team.
///
/// Sessions are cascade-deleted with their team and cascade their own
/// runs. Transcript messages reference sessions with NO ACTION, so a
/// session with surviving messages cannot be deleted.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Session {
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

    /// Display name
    pub name: Option<String>,

    /// Team this session runs against
    pub team_id: Option<i64>,
}

impl Session {
    pub fn new(team_id: Option<i64>, name: Option<String>, now: DateTime<Utc>) -> Self {
        Self {
            id: None,
            created_at: now,
            updated_at: now,
            user_id: None,
            version: Some(SCHEMA_VERSION.to_string()),
            name,
            team_id,
        }
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
