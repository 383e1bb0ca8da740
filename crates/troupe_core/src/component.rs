//! Polymorphic component descriptors.
//!
//! A [`ComponentModel`] describes any pluggable piece of an agent team -
//! the team itself, individual agents, model clients, tools, termination
//! conditions. The `provider` string is the discriminator; the `config`
//! map carries the variant-specific payload. Per-provider validation
//! happens at the application boundary, not here, so new variants never
//! require a schema change.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Broad categories of components.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ComponentType {
    /// A full agent team
    Team,
    /// A single agent
    Agent,
    /// A model client
    Model,
    /// A tool an agent can call
    Tool,
    /// A termination condition for a team run
    Termination,
    /// A workbench bundling several tools
    Workbench,
}

impl std::fmt::Display for ComponentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Team => write!(f, "team"),
            Self::Agent => write!(f, "agent"),
            Self::Model => write!(f, "model"),
            Self::Tool => write!(f, "tool"),
            Self::Termination => write!(f, "termination"),
            Self::Workbench => write!(f, "workbench"),
        }
    }
}

/// A serialized component descriptor.
///
/// Open-world tagged union: `provider` names the concrete implementation
/// and `config` holds whatever that implementation needs. Descriptors
/// round-trip losslessly through JSON storage columns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ComponentModel {
    /// Fully qualified name of the implementation this descriptor targets
    pub provider: String,

    /// Category of the component, when known
    #[serde(skip_serializing_if = "Option::is_none")]
    pub component_type: Option<ComponentType>,

    /// Schema version of the descriptor envelope
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<u32>,

    /// Version of the provider-specific config shape
    #[serde(skip_serializing_if = "Option::is_none")]
    pub component_version: Option<u32>,

    /// Human-readable description
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Display label
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,

    /// Provider-specific configuration payload
    #[serde(default)]
    pub config: Map<String, Value>,
}

impl ComponentModel {
    /// Create a descriptor with just a provider and empty config.
    pub fn new(provider: impl Into<String>) -> Self {
        Self {
            provider: provider.into(),
            component_type: None,
            version: None,
            component_version: None,
            description: None,
            label: None,
            config: Map::new(),
        }
    }

    /// Set the component category.
    pub fn with_type(mut self, component_type: ComponentType) -> Self {
        self.component_type = Some(component_type);
        self
    }

    /// Set the display label.
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Insert a single config entry.
    pub fn with_config_entry(mut self, key: impl Into<String>, value: Value) -> Self {
        self.config.insert(key.into(), value);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn descriptor_round_trips_through_generic_value() {
        let model = ComponentModel::new("troupe.teams.RoundRobinTeam")
            .with_type(ComponentType::Team)
            .with_label("support team")
            .with_config_entry("max_turns", json!(10));

        let value = serde_json::to_value(&model).unwrap();
        assert_eq!(value["provider"], "troupe.teams.RoundRobinTeam");
        assert_eq!(value["component_type"], "team");

        let back: ComponentModel = serde_json::from_value(value).unwrap();
        assert_eq!(back, model);
    }

    #[test]
    fn unknown_payload_keys_survive_in_config() {
        let value = json!({
            "provider": "ext.CustomAgent",
            "config": {"nested": {"a": [1, 2, 3]}, "flag": true}
        });
        let model: ComponentModel = serde_json::from_value(value.clone()).unwrap();
        assert_eq!(serde_json::to_value(&model).unwrap(), value);
    }
}
