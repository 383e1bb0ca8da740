//! Database query functions.
//!
//! Organized by domain:
//! - `team`: Team CRUD
//! - `session`: Session CRUD
//! - `run`: Run lifecycle and results
//! - `message`: Transcript messages and feedback
//! - `tool`: Tools and tool servers
//! - `settings`: Per-user settings blobs
//! - `eval`: Evaluation tasks, criteria, and runs

mod eval;
mod message;
mod run;
mod session;
mod settings;
mod team;
mod tool;

pub use eval::*;
pub use message::*;
pub use run::*;
pub use session::*;
pub use settings::*;
pub use team::*;
pub use tool::*;
