//! Conversation and settings payload types.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::component::ComponentModel;

/// The user task that kicks off a run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct MessageConfig {
    /// Who produced the message ("user", an agent name, ...)
    pub source: String,

    /// Message body
    pub content: String,

    /// Content kind hint for renderers
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message_type: Option<String>,
}

impl MessageConfig {
    pub fn new(source: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            content: content.into(),
            message_type: None,
        }
    }
}

/// Outcome of a team run as reported by the execution engine.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct TeamResult {
    /// The inner task result with the full message transcript
    pub task_result: TaskResult,

    /// Aggregate model usage, engine-defined shape
    #[serde(skip_serializing_if = "Option::is_none")]
    pub usage: Option<String>,

    /// Wall-clock duration in seconds
    #[serde(default)]
    pub duration: f64,
}

/// Messages produced while solving a task, plus why the run ended.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct TaskResult {
    /// Transcript in engine order
    #[serde(default)]
    pub messages: Vec<MessageConfig>,

    /// Engine-reported stop reason, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stop_reason: Option<String>,
}

/// A single environment variable exposed to agent runs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct EnvironmentVariable {
    pub name: String,
    pub value: String,
}

/// UI preferences stored alongside the rest of the settings blob.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct UiSettings {
    /// Show internal agent-to-agent messages in the transcript view
    #[serde(default)]
    pub show_internal_messages: bool,

    /// Expand JSON payloads by default
    #[serde(default)]
    pub expand_json: bool,
}

/// Per-user configuration blob.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct SettingsConfig {
    /// Environment variables injected into runs
    #[serde(default)]
    pub environment: Vec<EnvironmentVariable>,

    /// Default model client used when a team doesn't specify one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_model_client: Option<ComponentModel>,

    /// UI preferences
    #[serde(default)]
    pub ui: UiSettings,
}
