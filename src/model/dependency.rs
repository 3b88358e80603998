use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A service dependency of the stage. Lives beside the execution tree and is
/// addressed by identifier only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DependencyNode {
    pub identifier: String,
    #[serde(default)]
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub spec: Value,
}

impl DependencyNode {
    pub fn new(identifier: impl Into<String>, kind: impl Into<String>) -> Self {
        let identifier = identifier.into();
        Self {
            name: identifier.clone(),
            identifier,
            kind: kind.into(),
            spec: Value::Null,
        }
    }
}
