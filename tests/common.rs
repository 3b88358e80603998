//! Common test utilities for building execution trees and paths.
use serde_json::json;
use stepgraph::prelude::*;

/// A shell script step.
#[allow(dead_code)]
pub fn step(identifier: &str) -> ExecutionNode {
    ExecutionNode::step(identifier, "ShellScript")
}

/// A step of the default looping kind.
#[allow(dead_code)]
pub fn command_step(identifier: &str) -> ExecutionNode {
    ExecutionNode::step(identifier, "Command")
}

#[allow(dead_code)]
pub fn group(identifier: &str, steps: Vec<ExecutionNode>) -> ExecutionNode {
    ExecutionNode::step_group(StepGroupNode::new(identifier).with_steps(steps))
}

#[allow(dead_code)]
pub fn parallel(children: Vec<ExecutionNode>) -> ExecutionNode {
    ExecutionNode::parallel(children)
}

#[allow(dead_code)]
pub fn tree(steps: Vec<ExecutionNode>) -> ExecutionTree {
    ExecutionTree::new(steps)
}

/// Parses a path, panicking on malformed input.
#[allow(dead_code)]
pub fn path(input: &str) -> NodePath {
    NodePath::parse(input).expect("test path should parse")
}

/// The absolute prefix used by stage-level fixtures.
#[allow(dead_code)]
pub const STAGE_PREFIX: &str = "pipeline.stages.0.stage.spec.execution";

/// A realistic deployment stage execution:
///
/// ```text
/// steps
/// ├── fetch
/// ├── parallel [lint, unit]
/// └── deploy (group)
///     ├── steps [apply, verify]
///     └── rollbackSteps [undo]
/// rollbackSteps
/// └── notify
/// ```
#[allow(dead_code)]
pub fn deployment_tree() -> ExecutionTree {
    ExecutionTree::from_json(DEPLOYMENT_JSON).expect("fixture should parse")
}

#[allow(dead_code)]
pub const DEPLOYMENT_JSON: &str = r#"{
    "steps": [
        { "step": { "identifier": "fetch", "name": "Fetch", "type": "ShellScript" } },
        { "parallel": [
            { "step": { "identifier": "lint", "name": "Lint", "type": "ShellScript" } },
            { "step": { "identifier": "unit", "name": "Unit", "type": "ShellScript" } }
        ] },
        { "stepGroup": {
            "identifier": "deploy",
            "name": "Deploy",
            "steps": [
                { "step": { "identifier": "apply", "name": "Apply", "type": "K8sApply",
                            "spec": { "filePaths": ["manifests/"] } } },
                { "step": { "identifier": "verify", "name": "Verify", "type": "Http" } }
            ],
            "rollbackSteps": [
                { "step": { "identifier": "undo", "name": "Undo", "type": "K8sRollingRollback" } }
            ]
        } }
    ],
    "rollbackSteps": [
        { "step": { "identifier": "notify", "name": "Notify", "type": "Email" } }
    ]
}"#;

/// Serializes a tree into a JSON value for shape assertions.
#[allow(dead_code)]
pub fn to_value(tree: &ExecutionTree) -> serde_json::Value {
    serde_json::to_value(tree).expect("tree should serialize")
}

/// The identifiers of a tree in depth-first order.
#[allow(dead_code)]
pub fn identifiers(tree: &ExecutionTree) -> Vec<String> {
    let mut out = Vec::new();
    tree.visit_nodes(&mut |node, _| {
        if let Some(identifier) = node.identifier() {
            out.push(identifier.to_string());
        }
    });
    out
}

/// A bare step wrapper as it appears in a document.
#[allow(dead_code)]
pub fn step_json(identifier: &str) -> serde_json::Value {
    json!({ "step": { "identifier": identifier, "name": identifier, "type": "ShellScript" } })
}
