//! Troupe Database Layer
//!
//! SQLite-based storage backend for the Troupe agent studio.
//!
//! # Architecture
//!
//! - **One database per studio** - teams, sessions, runs, transcripts,
//!   tools, settings, and evaluation records live together
//! - **Flat relational schema** - one table per entity, autoincrement
//!   integer identity everywhere
//! - **JSON payload columns** - polymorphic component descriptors and
//!   result payloads are stored as JSON text, so new component variants
//!   never require a schema migration
//! - **Declarative integrity** - cascade / no-action / set-null rules
//!   are enforced by SQLite foreign keys, in the same transaction as the
//!   triggering delete
//!
//! # Usage
//!
//! ```rust,ignore
//! use troupe_db::StudioDb;
//!
//! let db = StudioDb::open("path/to/studio.db").await?;
//! ```

pub mod connection;
pub mod error;
pub mod models;
pub mod queries;
pub mod timestamp;

pub use connection::{DbStats, StudioDb};
pub use error::{DbError, DbResult};
pub use timestamp::parse_timestamp;

// Re-export key model types for convenience
pub use models::{
    // Evaluation models
    EvalCriteriaRecord,
    EvalRunRecord,
    EvalRunStatus,
    EvalTaskRecord,
    // Message models
    Feedback,
    Message,
    // Run models
    Run,
    RunStatus,
    // Core conversation models
    Session,
    // Settings model
    Settings,
    Team,
    // Tool models
    Tool,
    ToolServer,
    SCHEMA_VERSION,
};
