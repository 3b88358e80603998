use crate::model::{DependencyNode, ExecutionNode, ExecutionTree};
use ahash::AHashMap;
use serde::{Deserialize, Serialize};
use tracing::trace;

/// Identifier of the always-present entry standing for the dependency list.
pub const STATIC_SERVICE_GROUP_NAME: &str = "static_service_group";

/// What kind of diagram node an entry describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum StepType {
    #[default]
    Step,
    StepGroup,
    Service,
    ServiceGroup,
}

/// Ephemeral editor state of one node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeState {
    pub is_saved: bool,
    pub is_rollback: bool,
    pub is_step_group: bool,
    pub is_step_group_collapsed: bool,
    pub step_type: StepType,
}

impl NodeState {
    fn for_node(node: &ExecutionNode, is_rollback: bool) -> Self {
        let is_step_group = matches!(node, ExecutionNode::StepGroup(_));
        Self {
            is_rollback,
            is_step_group,
            step_type: if is_step_group {
                StepType::StepGroup
            } else {
                StepType::Step
            },
            ..Self::default()
        }
    }

    fn service() -> Self {
        Self {
            step_type: StepType::Service,
            ..Self::default()
        }
    }

    fn service_group() -> Self {
        Self {
            is_step_group: true,
            step_type: StepType::ServiceGroup,
            ..Self::default()
        }
    }
}

/// Per-identifier editor bookkeeping for a tree and its dependency list.
///
/// The map is derived data: it is rebuilt from the tree whenever the structure
/// changes and merged with the previous map so user-facing flags survive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeStateMap {
    states: AHashMap<String, NodeState>,
}

impl Default for NodeStateMap {
    fn default() -> Self {
        let mut states = AHashMap::new();
        states.insert(
            STATIC_SERVICE_GROUP_NAME.to_string(),
            NodeState::service_group(),
        );
        Self { states }
    }
}

impl NodeStateMap {
    /// Creates a default entry for every step, step group and dependency, plus
    /// the dependency-list sentinel. Nodes under any `rollbackSteps` are
    /// flagged as rollback.
    pub fn rebuild(tree: &ExecutionTree, dependencies: &[DependencyNode]) -> Self {
        let mut map = Self::default();
        tree.visit_nodes(&mut |node, is_rollback| {
            if let Some(identifier) = node.identifier() {
                map.states
                    .insert(identifier.to_string(), NodeState::for_node(node, is_rollback));
            }
        });
        for dependency in dependencies {
            map.states
                .insert(dependency.identifier.clone(), NodeState::service());
        }
        trace!(entries = map.states.len(), "rebuilt node states");
        map
    }

    /// Carries collapse state over from `previous` for identifiers present in
    /// both maps. Carried entries are marked unsaved since the tree was edited.
    pub fn apply_existing(&mut self, previous: &NodeStateMap) {
        for (identifier, state) in self.states.iter_mut() {
            if let Some(old) = previous.states.get(identifier) {
                state.is_step_group_collapsed = old.is_step_group_collapsed;
                state.is_saved = false;
            }
        }
    }

    /// Flags every node of the tree and every dependency as saved.
    pub fn mark_saved(&mut self, tree: &ExecutionTree, dependencies: &[DependencyNode]) {
        tree.visit_nodes(&mut |node, is_rollback| {
            if let Some(identifier) = node.identifier() {
                self.states
                    .entry(identifier.to_string())
                    .or_insert_with(|| NodeState::for_node(node, is_rollback))
                    .is_saved = true;
            }
        });
        for dependency in dependencies {
            self.states
                .entry(dependency.identifier.clone())
                .or_insert_with(NodeState::service)
                .is_saved = true;
        }
        if let Some(sentinel) = self.states.get_mut(STATIC_SERVICE_GROUP_NAME) {
            sentinel.is_saved = true;
        }
    }

    /// The state of `identifier`; unknown identifiers read as a default,
    /// unsaved step.
    pub fn get(&self, identifier: &str) -> NodeState {
        self.states.get(identifier).copied().unwrap_or_default()
    }

    pub fn entry(&self, identifier: &str) -> Option<&NodeState> {
        self.states.get(identifier)
    }

    /// Expands or collapses a step group. Returns false for unknown identifiers.
    pub fn set_collapsed(&mut self, identifier: &str, collapsed: bool) -> bool {
        match self.states.get_mut(identifier) {
            Some(state) if state.is_step_group => {
                state.is_step_group_collapsed = collapsed;
                true
            }
            _ => false,
        }
    }

    pub fn contains(&self, identifier: &str) -> bool {
        self.states.contains_key(identifier)
    }

    pub fn identifiers(&self) -> impl Iterator<Item = &str> {
        self.states.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &NodeState)> {
        self.states.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }
}
