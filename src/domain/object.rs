//! Generic configuration object envelope

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::tree;

/// A named, namespaced configuration resource.
///
/// Only `metadata` and `spec` survive deserialization. Server-side fields the
/// API returns next to them (`system_metadata`, `create_form`,
/// `referring_objects`, ...) are dropped on the way in.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConfigObject {
    #[serde(default)]
    pub metadata: Map<String, Value>,
    #[serde(default = "empty_spec")]
    pub spec: Value,
}

fn empty_spec() -> Value {
    Value::Object(Map::new())
}

impl ConfigObject {
    /// Build an object from a name, namespace and spec tree
    pub fn new(name: impl Into<String>, namespace: impl Into<String>, spec: Value) -> Self {
        let mut metadata = Map::new();
        metadata.insert("name".to_string(), Value::String(name.into()));
        metadata.insert("namespace".to_string(), Value::String(namespace.into()));
        Self { metadata, spec }
    }

    /// `metadata.name`, if present
    pub fn name(&self) -> Option<&str> {
        tree::str_field(&self.metadata, "name")
    }

    /// `metadata.namespace`, if present
    pub fn namespace(&self) -> Option<&str> {
        tree::str_field(&self.metadata, "namespace")
    }

    pub fn set_namespace(&mut self, namespace: &str) {
        self.metadata.insert("namespace".to_string(), Value::String(namespace.to_string()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_deserialize_keeps_only_metadata_and_spec() {
        let raw = json!({
            "metadata": {"name": "lb1", "namespace": "ns-a"},
            "spec": {"domains": ["a.example.com"]},
            "system_metadata": {"uid": "1234"},
            "create_form": {},
            "referring_objects": []
        });

        let object: ConfigObject = serde_json::from_value(raw).unwrap();
        assert_eq!(object.name(), Some("lb1"));
        assert_eq!(object.namespace(), Some("ns-a"));

        let back = serde_json::to_value(&object).unwrap();
        let keys: Vec<&String> = back.as_object().unwrap().keys().collect();
        assert_eq!(keys, vec!["metadata", "spec"]);
    }

    #[test]
    fn test_missing_spec_defaults_to_empty_map() {
        let object: ConfigObject = serde_json::from_value(json!({"metadata": {}})).unwrap();
        assert_eq!(object.spec, json!({}));
        assert!(object.name().is_none());
    }

    #[test]
    fn test_set_namespace() {
        let mut object = ConfigObject::new("fw1", "ns-a", json!({}));
        object.set_namespace("ns-b");
        assert_eq!(object.namespace(), Some("ns-b"));
    }
}
