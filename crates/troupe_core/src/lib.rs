//! Troupe Core - Shared Domain Types
//!
//! This crate provides the configuration and result types that the rest
//! of the Troupe stack passes around and persists: polymorphic component
//! descriptors for teams/agents/tools, task and result payloads, user
//! settings, and the evaluation vocabulary.
//!
//! Everything here is plain data - `serde`-serializable, schema-friendly,
//! and free of any storage or runtime concerns.

pub mod clock;
pub mod component;
pub mod eval;
pub mod types;

pub use clock::{Clock, ManualClock, SystemClock};
pub use component::{ComponentModel, ComponentType};
pub use eval::{EvalDimensionScore, EvalJudgeCriteria, EvalRunResult, EvalScore, EvalTask};
pub use types::{
    EnvironmentVariable, MessageConfig, SettingsConfig, TaskResult, TeamResult, UiSettings,
};
