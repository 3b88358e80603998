use crate::path::NodePath;
use serde::{Deserialize, Serialize};

/// Default kind of the steps that make a step group loop over hosts.
pub const DEFAULT_LOOPING_STEP_KIND: &str = "Command";
/// Default item source of the derived repeat strategy.
pub const DEFAULT_REPEAT_ITEMS: &str = "<+stage.output.hosts>";

/// Tunables of an editing session. Every field has a default, so partial JSON
/// documents are accepted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EditorConfig {
    /// Step kind that triggers the derived repeat strategy on its group.
    pub looping_step_kind: String,
    /// Item source of the derived repeat strategy.
    pub repeat_items: String,
    /// Stage prefix of absolute paths, e.g.
    /// `pipeline.stages.0.stage.spec.execution`.
    pub path_prefix: NodePath,
    /// Whether derived strategies are applied at all.
    pub auto_strategy: bool,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            looping_step_kind: DEFAULT_LOOPING_STEP_KIND.to_string(),
            repeat_items: DEFAULT_REPEAT_ITEMS.to_string(),
            path_prefix: NodePath::default(),
            auto_strategy: true,
        }
    }
}

impl EditorConfig {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}
