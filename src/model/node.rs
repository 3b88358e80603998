use super::strategy::{StepGroupInfra, Strategy};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One element of an execution sequence.
///
/// Serialized externally tagged, so a node has the same shape as the wrapper
/// objects of the pipeline document: `{"step": {..}}`, `{"parallel": [..]}`
/// or `{"stepGroup": {..}}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ExecutionNode {
    Step(StepNode),
    Parallel(Vec<ExecutionNode>),
    StepGroup(StepGroupNode),
}

/// A leaf execution unit. The `spec` payload is owned by the step's form schema
/// and is carried through untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepNode {
    pub identifier: String,
    #[serde(default)]
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub spec: Value,
}

/// A named container of steps with optional rollback steps, looping strategy
/// and dedicated infrastructure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StepGroupNode {
    pub identifier: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub steps: Vec<ExecutionNode>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rollback_steps: Option<Vec<ExecutionNode>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub strategy: Option<Strategy>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub step_group_infra: Option<StepGroupInfra>,
}

/// The root of a stage's execution: the main sequence and the rollback sequence.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionTree {
    #[serde(default)]
    pub steps: Vec<ExecutionNode>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub rollback_steps: Vec<ExecutionNode>,
}

impl StepNode {
    pub fn new(identifier: impl Into<String>, kind: impl Into<String>) -> Self {
        let identifier = identifier.into();
        Self {
            name: identifier.clone(),
            identifier,
            kind: kind.into(),
            spec: Value::Null,
        }
    }

    pub fn with_spec(mut self, spec: Value) -> Self {
        self.spec = spec;
        self
    }
}

impl StepGroupNode {
    pub fn new(identifier: impl Into<String>) -> Self {
        let identifier = identifier.into();
        Self {
            name: identifier.clone(),
            identifier,
            steps: Vec::new(),
            rollback_steps: None,
            strategy: None,
            step_group_infra: None,
        }
    }

    pub fn with_steps(mut self, steps: Vec<ExecutionNode>) -> Self {
        self.steps = steps;
        self
    }

    pub fn with_rollback_steps(mut self, steps: Vec<ExecutionNode>) -> Self {
        self.rollback_steps = Some(steps);
        self
    }

    pub fn is_containerized(&self) -> bool {
        self.step_group_infra.is_some()
    }

    /// Flattens every step reachable through `steps`, descending into parallel
    /// wrappers and nested groups. Rollback steps are not included.
    pub fn leaf_steps(&self) -> Vec<&StepNode> {
        let mut leaves = Vec::new();
        collect_leaf_steps(&self.steps, &mut leaves);
        leaves
    }
}

fn collect_leaf_steps<'a>(nodes: &'a [ExecutionNode], leaves: &mut Vec<&'a StepNode>) {
    for node in nodes {
        match node {
            ExecutionNode::Step(step) => leaves.push(step),
            ExecutionNode::Parallel(children) => collect_leaf_steps(children, leaves),
            ExecutionNode::StepGroup(group) => collect_leaf_steps(&group.steps, leaves),
        }
    }
}

impl ExecutionNode {
    pub fn step(identifier: impl Into<String>, kind: impl Into<String>) -> Self {
        ExecutionNode::Step(StepNode::new(identifier, kind))
    }

    pub fn step_group(group: StepGroupNode) -> Self {
        ExecutionNode::StepGroup(group)
    }

    pub fn parallel(children: Vec<ExecutionNode>) -> Self {
        ExecutionNode::Parallel(children)
    }

    /// The identifier of a step or step group. Parallel wrappers have none.
    pub fn identifier(&self) -> Option<&str> {
        match self {
            ExecutionNode::Step(step) => Some(&step.identifier),
            ExecutionNode::StepGroup(group) => Some(&group.identifier),
            ExecutionNode::Parallel(_) => None,
        }
    }

    /// The document key the node is stored under inside its wrapper object.
    pub fn keyword(&self) -> &'static str {
        match self {
            ExecutionNode::Step(_) => crate::path::STEP,
            ExecutionNode::Parallel(_) => crate::path::PARALLEL,
            ExecutionNode::StepGroup(_) => crate::path::STEP_GROUP,
        }
    }

    pub fn is_parallel(&self) -> bool {
        matches!(self, ExecutionNode::Parallel(_))
    }

    pub fn as_step(&self) -> Option<&StepNode> {
        match self {
            ExecutionNode::Step(step) => Some(step),
            _ => None,
        }
    }

    pub fn as_step_group(&self) -> Option<&StepGroupNode> {
        match self {
            ExecutionNode::StepGroup(group) => Some(group),
            _ => None,
        }
    }

    pub fn as_step_group_mut(&mut self) -> Option<&mut StepGroupNode> {
        match self {
            ExecutionNode::StepGroup(group) => Some(group),
            _ => None,
        }
    }
}

impl ExecutionTree {
    pub fn new(steps: Vec<ExecutionNode>) -> Self {
        Self {
            steps,
            rollback_steps: Vec::new(),
        }
    }

    pub fn with_rollback_steps(mut self, rollback_steps: Vec<ExecutionNode>) -> Self {
        self.rollback_steps = rollback_steps;
        self
    }

    /// Parses an execution document (`{"steps": [..], "rollbackSteps": [..]}`).
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn sequence(&self, rollback: bool) -> &Vec<ExecutionNode> {
        if rollback {
            &self.rollback_steps
        } else {
            &self.steps
        }
    }

    pub fn sequence_mut(&mut self, rollback: bool) -> &mut Vec<ExecutionNode> {
        if rollback {
            &mut self.rollback_steps
        } else {
            &mut self.steps
        }
    }

    /// Depth-first visit of every step and step group, main sequence first.
    /// The flag passed along is true for nodes living under any `rollbackSteps`.
    pub fn visit_nodes<'a>(&'a self, visit: &mut impl FnMut(&'a ExecutionNode, bool)) {
        visit_sequence(&self.steps, false, visit);
        visit_sequence(&self.rollback_steps, true, visit);
    }
}

fn visit_sequence<'a>(
    nodes: &'a [ExecutionNode],
    rollback: bool,
    visit: &mut impl FnMut(&'a ExecutionNode, bool),
) {
    for node in nodes {
        match node {
            ExecutionNode::Step(_) => visit(node, rollback),
            ExecutionNode::Parallel(children) => visit_sequence(children, rollback, visit),
            ExecutionNode::StepGroup(group) => {
                visit(node, rollback);
                visit_sequence(&group.steps, rollback, visit);
                if let Some(rollback_steps) = &group.rollback_steps {
                    visit_sequence(rollback_steps, true, visit);
                }
            }
        }
    }
}
