//! Evaluation vocabulary.
//!
//! These types describe what gets evaluated (tasks), how it is judged
//! (criteria), and what came out of an evaluation (results and scores).
//! The persistence layer stores them as JSON payloads; the evaluation
//! runner and judge consume the typed forms.

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::types::TaskResult;

/// A reusable evaluation task definition.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct EvalTask {
    /// Short task name
    pub name: String,

    /// What the task is checking for
    #[serde(default)]
    pub description: String,

    /// The prompt(s) handed to the runner. A single-element vector is
    /// the common case; multi-element inputs are presented in order.
    #[serde(default)]
    pub input: Vec<String>,

    /// Optional expected output for reference-based judging
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expected_output: Option<String>,
}

/// One scoring dimension a judge applies to a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct EvalJudgeCriteria {
    /// Dimension name ("correctness", "helpfulness", ...)
    pub dimension: String,

    /// Judge prompt describing how to score this dimension
    pub prompt: String,

    /// Lowest possible score
    #[serde(default)]
    pub min_value: f64,

    /// Highest possible score
    #[serde(default = "default_max_value")]
    pub max_value: f64,
}

fn default_max_value() -> f64 {
    10.0
}

/// What the runner produced for a task.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct EvalRunResult {
    /// Whether the runner completed without an engine error
    #[serde(default)]
    pub status: bool,

    /// The transcript and stop reason, when the runner got that far
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<TaskResult>,

    /// Engine error, when `status` is false
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_time: Option<DateTime<Utc>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_time: Option<DateTime<Utc>>,
}

/// Score for a single dimension.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct EvalDimensionScore {
    /// Dimension this score applies to
    pub dimension: String,

    /// Raw score in `[min_value, max_value]` of the criteria
    pub score: f64,

    /// Judge's reasoning
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,

    /// Maximum the judge could have given
    pub max_value: f64,
}

/// Aggregate judgment over all dimensions.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct EvalScore {
    /// Combined score, normalized by the judge
    #[serde(skip_serializing_if = "Option::is_none")]
    pub overall_score: Option<f64>,

    /// Per-dimension breakdown
    #[serde(default)]
    pub dimension_scores: Vec<EvalDimensionScore>,

    /// Maximum possible overall score
    #[serde(default = "default_max_value")]
    pub max_value: f64,
}
