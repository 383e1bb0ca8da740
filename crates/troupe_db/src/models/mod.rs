//! Database models.
//!
//! These structs map directly to database tables via sqlx. They all share
//! the same base shape: autoincrement `id` (`None` until first persist),
//! `created_at`/`updated_at` stamped from an explicit clock reading,
//! owning `user_id`, and a payload schema `version`.

mod eval;
mod message;
mod run;
mod session;
mod settings;
mod team;
mod tool;

pub use eval::{EvalCriteriaRecord, EvalRunRecord, EvalRunStatus, EvalTaskRecord};
pub use message::{Feedback, Message};
pub use run::{Run, RunStatus};
pub use session::Session;
pub use settings::Settings;
pub use team::Team;
pub use tool::{Tool, ToolServer};

/// Version stamped on newly created records, bumped when the shape of a
/// JSON payload changes incompatibly.
pub const SCHEMA_VERSION: &str = "0.0.1";
