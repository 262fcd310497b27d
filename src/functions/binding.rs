//! Binding descriptors as declared in `function.json` or recovered from source

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::fmt;

pub const ORCHESTRATION_TRIGGER: &str = "orchestrationTrigger";
pub const ACTIVITY_TRIGGER: &str = "activityTrigger";
pub const ENTITY_TRIGGER: &str = "entityTrigger";

/// Data flow direction of a binding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    #[default]
    In,
    Out,
    Inout,
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::In => "in",
            Direction::Out => "out",
            Direction::Inout => "inout",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// Generated manifests are inconsistent about casing ("InOut", "inOut") and some omit
// the field entirely, so anything unrecognised reads as `in`.
impl<'de> Deserialize<'de> for Direction {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = Option::<String>::deserialize(deserializer)?;
        Ok(match raw.as_deref().map(str::to_ascii_lowercase).as_deref() {
            Some("out") => Direction::Out,
            Some("inout") => Direction::Inout,
            _ => Direction::In,
        })
    }
}

/// A single binding: `{ type, direction, ...type-specific fields }`
///
/// Type-specific fields (`path`, `queueName`, `methods`, ...) are kept verbatim in
/// `properties` so that nothing a manifest declares is lost on a JSON round trip.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BindingDescriptor {
    #[serde(rename = "type")]
    pub binding_type: String,

    #[serde(default)]
    pub direction: Direction,

    #[serde(flatten)]
    pub properties: Map<String, Value>,
}

impl BindingDescriptor {
    pub fn new(binding_type: impl Into<String>, direction: Direction) -> Self {
        Self {
            binding_type: binding_type.into(),
            direction,
            properties: Map::new(),
        }
    }

    pub fn with_field(mut self, key: &str, value: impl Into<String>) -> Self {
        self.properties
            .insert(key.to_string(), Value::String(value.into()));
        self
    }

    pub fn field(&self, key: &str) -> Option<&str> {
        self.properties.get(key).and_then(Value::as_str)
    }

    /// HTTP methods of an `httpTrigger`, empty when unrestricted
    pub fn methods(&self) -> Vec<&str> {
        self.properties
            .get("methods")
            .and_then(Value::as_array)
            .map(|methods| methods.iter().filter_map(Value::as_str).collect())
            .unwrap_or_default()
    }

    pub fn is_type(&self, binding_type: &str) -> bool {
        self.binding_type.eq_ignore_ascii_case(binding_type)
    }

    /// Any `*Trigger` binding, durable ones included
    pub fn is_trigger(&self) -> bool {
        self.binding_type.to_ascii_lowercase().ends_with("trigger")
    }

    pub fn is_durable_trigger(&self) -> bool {
        self.is_type(ORCHESTRATION_TRIGGER)
            || self.is_type(ACTIVITY_TRIGGER)
            || self.is_type(ENTITY_TRIGGER)
    }

    /// A trigger fired from outside the Durable Task framework (HTTP, queue, timer, ...)
    pub fn is_external_trigger(&self) -> bool {
        self.is_trigger() && !self.is_durable_trigger()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parses_manifest_binding_with_extra_fields() {
        let binding: BindingDescriptor = serde_json::from_str(
            r#"{"type":"blobTrigger","direction":"in","name":"myBlob","path":"samples/{name}"}"#,
        )
        .unwrap();

        assert_eq!(binding.binding_type, "blobTrigger");
        assert_eq!(binding.direction, Direction::In);
        assert_eq!(binding.field("path"), Some("samples/{name}"));
        assert_eq!(binding.field("name"), Some("myBlob"));
    }

    #[test]
    fn test_direction_is_case_insensitive_and_optional() {
        let binding: BindingDescriptor =
            serde_json::from_str(r#"{"type":"table","direction":"InOut"}"#).unwrap();
        assert_eq!(binding.direction, Direction::Inout);

        let binding: BindingDescriptor =
            serde_json::from_str(r#"{"type":"httpTrigger","methods":["get","post"]}"#).unwrap();
        assert_eq!(binding.direction, Direction::In);
        assert_eq!(binding.methods(), vec!["get", "post"]);
    }

    #[test]
    fn test_serializes_flat() {
        let binding = BindingDescriptor::new("blob", Direction::Out).with_field("path", "out/x");
        let json = serde_json::to_value(&binding).unwrap();

        assert_eq!(
            json,
            serde_json::json!({"type": "blob", "direction": "out", "path": "out/x"})
        );
    }

    #[test]
    fn test_trigger_classification() {
        let http = BindingDescriptor::new("httpTrigger", Direction::In);
        let orch = BindingDescriptor::new("orchestrationTrigger", Direction::In);
        let queue = BindingDescriptor::new("queue", Direction::Out);

        assert!(http.is_external_trigger());
        assert!(orch.is_trigger());
        assert!(orch.is_durable_trigger());
        assert!(!orch.is_external_trigger());
        assert!(!queue.is_trigger());
    }
}
