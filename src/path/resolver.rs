use super::codec::{KEYWORDS, NodePath, PARALLEL, PathToken, ROLLBACK_STEPS, STEP, STEP_GROUP, STEPS};
use crate::error::PathError;
use crate::model::{ExecutionNode, ExecutionTree, StepGroupNode};

/// How a path is interpreted by `resolve`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolveMode {
    /// Resolve exactly the addressed node or container.
    Node,
    /// Resolve the slot of the nearest enclosing `steps` / `rollbackSteps`
    /// array. Used when a caller needs to splice next to a node rather than
    /// replace it.
    DestinationDrop,
}

/// The kind of structure owning a sequence of nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParentContainer {
    /// The root `steps` / `rollbackSteps` of the execution.
    Sequence { rollback: bool },
    /// The `steps` / `rollbackSteps` of a step group.
    StepGroup { rollback: bool },
    /// The children of a parallel wrapper.
    Parallel,
}

/// The position of a node: its owning array and the index inside it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location {
    pub container: NodePath,
    pub index: usize,
    pub parent: ParentContainer,
}

impl Location {
    /// The path of the wrapper slot, e.g. `steps.2`.
    pub fn slot_path(&self) -> NodePath {
        self.container.clone().index(self.index)
    }
}

/// The outcome of a successful resolution.
#[derive(Debug, Clone, PartialEq)]
pub enum Resolved<'a> {
    Node {
        node: &'a ExecutionNode,
        location: Location,
    },
    Container {
        nodes: &'a [ExecutionNode],
        path: NodePath,
        kind: ParentContainer,
    },
}

impl<'a> Resolved<'a> {
    pub fn node(&self) -> Option<&'a ExecutionNode> {
        match self {
            Resolved::Node { node, .. } => Some(node),
            Resolved::Container { .. } => None,
        }
    }

    pub fn location(&self) -> Option<&Location> {
        match self {
            Resolved::Node { location, .. } => Some(location),
            Resolved::Container { .. } => None,
        }
    }
}

/// Resolves a path against a tree.
///
/// Absolute paths are made relative first. A token that is neither numeric
/// nor a known keyword is an error; every other mismatch (out-of-range index,
/// keyword naming a different node kind, missing rollback steps) resolves to
/// `None` so the caller can decide how to react.
pub fn resolve<'a>(
    tree: &'a ExecutionTree,
    path: &NodePath,
    mode: ResolveMode,
) -> Result<Option<Resolved<'a>>, PathError> {
    let relative = path.relative();
    validate_tokens(&relative)?;

    let target = match mode {
        ResolveMode::Node => relative,
        ResolveMode::DestinationDrop => match drop_slot_path(&relative) {
            Some(slot) => slot,
            None => return Ok(None),
        },
    };
    Ok(walk(tree, &target))
}

fn validate_tokens(path: &NodePath) -> Result<(), PathError> {
    for token in path.tokens() {
        if let PathToken::Key(key) = token {
            if !KEYWORDS.contains(&key.as_str()) {
                return Err(PathError::UnknownToken {
                    path: path.to_string(),
                    token: key.clone(),
                });
            }
        }
    }
    Ok(())
}

/// Truncates a path right after the index following its last sequence key.
fn drop_slot_path(path: &NodePath) -> Option<NodePath> {
    let tokens = path.tokens();
    let position = tokens.iter().rposition(PathToken::is_sequence_key)?;
    match tokens.get(position + 1) {
        Some(PathToken::Index(_)) => Some(path.prefix(position + 2)),
        _ => Some(path.prefix(position + 1)),
    }
}

fn sequence_of(token: &PathToken) -> Option<bool> {
    match token.as_key()? {
        STEPS => Some(false),
        ROLLBACK_STEPS => Some(true),
        _ => None,
    }
}

fn group_sequence(group: &StepGroupNode, rollback: bool) -> Option<&[ExecutionNode]> {
    if rollback {
        group.rollback_steps.as_deref()
    } else {
        Some(&group.steps)
    }
}

fn walk<'a>(tree: &'a ExecutionTree, path: &NodePath) -> Option<Resolved<'a>> {
    let tokens = path.tokens();
    let rollback = sequence_of(tokens.first()?)?;
    let mut nodes: &'a [ExecutionNode] = tree.sequence(rollback);
    let mut kind = ParentContainer::Sequence { rollback };
    let mut consumed = 1;

    loop {
        let Some(token) = tokens.get(consumed) else {
            return Some(Resolved::Container {
                nodes,
                path: path.prefix(consumed),
                kind,
            });
        };
        let index = token.as_index()?;
        let node = nodes.get(index)?;
        let location = Location {
            container: path.prefix(consumed),
            index,
            parent: kind,
        };
        consumed += 1;

        let Some(token) = tokens.get(consumed) else {
            return Some(Resolved::Node { node, location });
        };
        consumed += 1;
        let at_end = consumed == tokens.len();

        match (token.as_key()?, node) {
            (STEP, ExecutionNode::Step(_)) if at_end => {
                return Some(Resolved::Node { node, location });
            }
            (PARALLEL, ExecutionNode::Parallel(children)) => {
                if at_end {
                    return Some(Resolved::Node { node, location });
                }
                nodes = children;
                kind = ParentContainer::Parallel;
            }
            (STEP_GROUP, ExecutionNode::StepGroup(group)) => {
                if at_end {
                    return Some(Resolved::Node { node, location });
                }
                let rollback = sequence_of(&tokens[consumed])?;
                consumed += 1;
                nodes = group_sequence(group, rollback)?;
                kind = ParentContainer::StepGroup { rollback };
            }
            _ => return None,
        }
    }
}

/// Mutable access to the array addressed by a container path such as
/// `steps.1.stepGroup.rollbackSteps` or `steps.0.parallel`.
pub fn container_mut<'a>(
    tree: &'a mut ExecutionTree,
    path: &NodePath,
) -> Option<&'a mut Vec<ExecutionNode>> {
    let mut tokens = path.relative().tokens().to_vec().into_iter();
    let mut nodes = tree.sequence_mut(sequence_of(&tokens.next()?)?);

    while let Some(token) = tokens.next() {
        let current = nodes;
        let node = current.get_mut(token.as_index()?)?;
        let keyword = tokens.next()?;
        nodes = match node {
            ExecutionNode::Parallel(children) if keyword.is_key(PARALLEL) => children,
            ExecutionNode::StepGroup(group) if keyword.is_key(STEP_GROUP) => {
                if sequence_of(&tokens.next()?)? {
                    group.rollback_steps.as_mut()?
                } else {
                    &mut group.steps
                }
            }
            _ => return None,
        };
    }
    Some(nodes)
}

/// Mutable access to the node at a location.
pub fn node_mut<'a>(
    tree: &'a mut ExecutionTree,
    location: &Location,
) -> Option<&'a mut ExecutionNode> {
    container_mut(tree, &location.container)?.get_mut(location.index)
}
