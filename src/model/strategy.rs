use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Looping configuration attached to a step group.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Strategy {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repeat: Option<RepeatStrategy>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub matrix: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parallelism: Option<Value>,
}

impl Strategy {
    pub fn repeat(repeat: RepeatStrategy) -> Self {
        Self {
            repeat: Some(repeat),
            ..Self::default()
        }
    }

    /// True when no looping block is configured.
    pub fn is_empty(&self) -> bool {
        self.repeat.is_none() && self.matrix.is_none() && self.parallelism.is_none()
    }
}

/// Repeats the group over a list of items.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RepeatStrategy {
    pub items: String,
    pub max_concurrency: u32,
    pub start: u32,
    pub end: u32,
    pub unit: RepeatUnit,
}

impl RepeatStrategy {
    /// One item at a time over `items`, counting the first item only.
    pub fn sequential(items: impl Into<String>) -> Self {
        Self {
            items: items.into(),
            max_concurrency: 1,
            start: 0,
            end: 1,
            unit: RepeatUnit::Count,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RepeatUnit {
    Count,
    Percentage,
}

/// Marks a step group as running on its own infrastructure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepGroupInfra {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub spec: Value,
}

impl StepGroupInfra {
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            spec: Value::Null,
        }
    }
}
