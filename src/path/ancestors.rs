use super::codec::{NodePath, PARALLEL, STEP_GROUP};
use super::resolver::{ResolveMode, resolve};
use crate::error::PathError;
use crate::model::{ExecutionNode, ExecutionTree};

/// The prefix of `path` up to and including its last `stepGroup` token, or the
/// empty path when the node is not inside a step group.
pub fn nearest_enclosing_step_group_path(path: &NodePath) -> NodePath {
    nearest_enclosing(path, STEP_GROUP)
}

/// The prefix of `path` up to and including its last `parallel` token, or the
/// empty path when the node is not inside a parallel wrapper.
pub fn nearest_enclosing_parallel_path(path: &NodePath) -> NodePath {
    nearest_enclosing(path, PARALLEL)
}

fn nearest_enclosing(path: &NodePath, keyword: &str) -> NodePath {
    path.tokens()
        .iter()
        .rposition(|token| token.is_key(keyword))
        .map(|position| path.prefix(position + 1))
        .unwrap_or_default()
}

/// True if any step group in the subtree declares its own infrastructure.
pub fn is_any_descendant_containerized(nodes: &[ExecutionNode]) -> bool {
    nodes.iter().any(|node| match node {
        ExecutionNode::Step(_) => false,
        ExecutionNode::Parallel(children) => is_any_descendant_containerized(children),
        ExecutionNode::StepGroup(group) => {
            group.is_containerized()
                || is_any_descendant_containerized(&group.steps)
                || group
                    .rollback_steps
                    .as_deref()
                    .is_some_and(is_any_descendant_containerized)
        }
    })
}

/// Identifiers of the step groups enclosing `path`, outermost first.
pub fn step_group_breadcrumbs(
    tree: &ExecutionTree,
    path: &NodePath,
) -> Result<Vec<String>, PathError> {
    let relative = path.relative();
    let mut crumbs = Vec::new();
    for (position, token) in relative.tokens().iter().enumerate() {
        if !token.is_key(STEP_GROUP) {
            continue;
        }
        let group_path = relative.prefix(position + 1);
        if let Some(group) = resolve(tree, &group_path, ResolveMode::Node)?
            .and_then(|resolved| resolved.node())
            .and_then(ExecutionNode::as_step_group)
        {
            crumbs.push(group.identifier.clone());
        }
    }
    Ok(crumbs)
}
