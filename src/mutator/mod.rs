use crate::editor::EditorConfig;
use crate::error::PathError;
use crate::model::{ExecutionNode, ExecutionTree, StepGroupNode, StepNode};
use crate::path::{
    Location, NodePath, PARALLEL, ParentContainer, PathIndex, ROLLBACK_STEPS, ResolveMode,
    Resolved, STEP, STEP_GROUP, STEPS, container_mut, nearest_enclosing_step_group_path, node_mut,
    resolve,
};
use tracing::{debug, trace, warn};

pub mod dependency;
pub mod request;
pub mod strategy;

pub use dependency::DependencyList;
pub use request::*;
pub use strategy::derive_strategy;

/// Applies structural edits to execution trees.
///
/// Every public operation takes the current tree by reference and returns a
/// new one; the input is never modified. Incoming nodes are normalized before
/// insertion and parallel wrappers left with fewer than two children are
/// unwrapped before a removal returns, so no wrapper ever holds fewer than two
/// children or another wrapper.
#[derive(Debug, Clone, Default)]
pub struct TreeMutator {
    config: EditorConfig,
}

impl TreeMutator {
    pub fn new(config: EditorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    /// Inserts `node` where `request` says. `TargetNotFound` and
    /// `NothingToInsert` outcomes come with an unchanged copy of the tree.
    pub fn insert(
        &self,
        tree: &ExecutionTree,
        node: ExecutionNode,
        request: &InsertRequest,
    ) -> Result<Insertion, PathError> {
        let Some(node) = normalize_incoming(node) else {
            debug!(request = request.kind(), "empty parallel wrapper, nothing to insert");
            return Ok(Insertion {
                outcome: InsertOutcome::NothingToInsert,
                tree: tree.clone(),
            });
        };

        let mut working = tree.clone();
        let outcome = match request {
            InsertRequest::Link { source, target } => {
                self.insert_at_link(&mut working, node, source.as_ref(), target.as_ref())?
            }
            InsertRequest::ContainerAppend {
                destination,
                rollback,
            } => self.append_to_container(&mut working, node, destination.as_ref(), *rollback)?,
            InsertRequest::Parallel { destination } => {
                self.insert_parallel(&mut working, node, destination)?
            }
            InsertRequest::Append { rollback } => append_to_root(&mut working, node, *rollback),
        };

        match &outcome {
            InsertOutcome::Inserted { path } => {
                debug!(request = request.kind(), path = %path, "inserted node");
                self.apply_derived_strategy(&mut working, path)?;
            }
            InsertOutcome::TargetNotFound => {
                warn!(request = request.kind(), "insertion target could not be resolved");
            }
            InsertOutcome::NothingToInsert => {}
        }
        Ok(Insertion {
            outcome,
            tree: working,
        })
    }

    /// Removes the node or container addressed by `path`.
    ///
    /// Node paths (`steps.1` or `steps.1.step`) delete the array element.
    /// `…stepGroup.rollbackSteps` deletes the group's rollback key; any other
    /// container path is cleared.
    pub fn remove(&self, tree: &ExecutionTree, path: &NodePath) -> Result<Removal, PathError> {
        let mut working = tree.clone();
        let is_removed = remove_at(&mut working, path)?;
        if !is_removed {
            debug!(path = %path, "nothing to remove");
            return Ok(Removal {
                is_removed,
                tree: working,
            });
        }

        collapse_parallels(&mut working.steps);
        collapse_parallels(&mut working.rollback_steps);
        debug!(path = %path, "removed node");
        Ok(Removal {
            is_removed,
            tree: working,
        })
    }

    /// Removes the step or step group carrying `identifier`, wherever it is.
    pub fn remove_by_identifier(
        &self,
        tree: &ExecutionTree,
        identifier: &str,
    ) -> Result<Removal, PathError> {
        let path = PathIndex::build(tree, &self.config.path_prefix)
            .by_identifier(identifier)
            .map(|entry| entry.relative.clone());
        match path {
            Some(path) => self.remove(tree, &path),
            None => Ok(Removal {
                is_removed: false,
                tree: tree.clone(),
            }),
        }
    }

    /// Replaces the step at `path` with `step`, e.g. after a form is applied.
    pub fn update_step(
        &self,
        tree: &ExecutionTree,
        path: &NodePath,
        step: StepNode,
    ) -> Result<Update, PathError> {
        let mut working = tree.clone();
        let location = match resolve(&working, path, ResolveMode::Node)? {
            Some(Resolved::Node {
                node: ExecutionNode::Step(_),
                location,
            }) => location,
            _ => {
                debug!(path = %path, "no step to update");
                return Ok(Update {
                    is_updated: false,
                    tree: working,
                });
            }
        };

        if let Some(slot) = node_mut(&mut working, &location) {
            *slot = ExecutionNode::Step(step);
        }
        let step_path = location.slot_path().key(STEP);
        self.apply_derived_strategy(&mut working, &step_path)?;
        Ok(Update {
            is_updated: true,
            tree: working,
        })
    }

    /// Where a referenced node lives in `tree` right now.
    fn locate(&self, tree: &ExecutionTree, node_ref: &NodeRef) -> Option<NodePath> {
        match &node_ref.identifier {
            Some(identifier) => {
                let index = PathIndex::build(tree, &self.config.path_prefix);
                index
                    .reresolve(
                        identifier,
                        node_ref.relative_path.as_ref(),
                        node_ref.absolute_path.as_ref(),
                    )
                    .map(|entry| entry.relative.clone())
            }
            None => node_ref
                .relative_path
                .clone()
                .or_else(|| node_ref.absolute_path.as_ref().map(NodePath::relative)),
        }
    }

    fn insert_at_link(
        &self,
        tree: &mut ExecutionTree,
        node: ExecutionNode,
        source: Option<&NodeRef>,
        target: Option<&NodeRef>,
    ) -> Result<InsertOutcome, PathError> {
        let snapshot: &ExecutionTree = tree;
        let source_path = source.and_then(|r| self.locate(snapshot, r));
        let target_path = target.and_then(|r| self.locate(snapshot, r));

        if let Some(path) = source_path {
            if let Some(location) = drop_location(tree, &path)? {
                trace!(path = %path, "splicing after link source");
                return Ok(splice(tree, &location, location.index + 1, node));
            }
        }
        if let Some(path) = target_path {
            if let Some(location) = drop_location(tree, &path)? {
                trace!(path = %path, "splicing before link target");
                return Ok(splice(tree, &location, location.index, node));
            }
        }
        Ok(InsertOutcome::TargetNotFound)
    }

    fn append_to_container(
        &self,
        tree: &mut ExecutionTree,
        node: ExecutionNode,
        destination: Option<&NodeRef>,
        rollback: bool,
    ) -> Result<InsertOutcome, PathError> {
        let Some(destination) = destination else {
            return Ok(append_to_root(tree, node, rollback));
        };
        let Some(path) = self.locate(tree, destination) else {
            return Ok(InsertOutcome::TargetNotFound);
        };

        // A container path appends straight into that array.
        let (location, container) = match resolve(tree, &path, ResolveMode::Node)? {
            Some(Resolved::Node {
                node: ExecutionNode::StepGroup(_),
                location,
            }) => (Some(location), None),
            Some(Resolved::Container { path, .. }) => (None, Some(path)),
            _ => return Ok(InsertOutcome::TargetNotFound),
        };

        if let Some(container) = container {
            let Some(nodes) = container_mut(tree, &container) else {
                return Ok(InsertOutcome::TargetNotFound);
            };
            let keyword = node.keyword();
            nodes.push(node);
            return Ok(InsertOutcome::Inserted {
                path: container.index(nodes.len() - 1).key(keyword),
            });
        }
        let Some(location) = location else {
            return Ok(InsertOutcome::TargetNotFound);
        };

        let Some(group) = node_mut(tree, &location).and_then(ExecutionNode::as_step_group_mut)
        else {
            return Ok(InsertOutcome::TargetNotFound);
        };
        let (key, nodes) = group_sequence_mut(group, rollback);
        let keyword = node.keyword();
        nodes.push(node);
        Ok(InsertOutcome::Inserted {
            path: location
                .slot_path()
                .key(STEP_GROUP)
                .key(key)
                .index(nodes.len() - 1)
                .key(keyword),
        })
    }

    fn insert_parallel(
        &self,
        tree: &mut ExecutionTree,
        node: ExecutionNode,
        destination: &NodeRef,
    ) -> Result<InsertOutcome, PathError> {
        let Some(path) = self.locate(tree, destination) else {
            return Ok(InsertOutcome::TargetNotFound);
        };
        let Some(location) = resolve(tree, &path, ResolveMode::Node)?
            .and_then(|resolved| resolved.location().cloned())
        else {
            return Ok(InsertOutcome::TargetNotFound);
        };
        let Some(nodes) = container_mut(tree, &location.container) else {
            return Ok(InsertOutcome::TargetNotFound);
        };

        let incoming = flatten_parallel(node);
        let first_new = incoming
            .first()
            .map(ExecutionNode::keyword)
            .unwrap_or(STEP);

        if let ExecutionNode::Parallel(children) = &mut nodes[location.index] {
            let position = children.len();
            children.extend(incoming);
            return Ok(InsertOutcome::Inserted {
                path: location.slot_path().key(PARALLEL).index(position).key(first_new),
            });
        }

        if location.parent == ParentContainer::Parallel {
            let position = nodes.len();
            nodes.extend(incoming);
            return Ok(InsertOutcome::Inserted {
                path: location.container.index(position).key(first_new),
            });
        }

        let existing = std::mem::replace(
            &mut nodes[location.index],
            ExecutionNode::Parallel(Vec::new()),
        );
        let mut children = vec![existing];
        children.extend(incoming);
        nodes[location.index] = ExecutionNode::Parallel(children);
        Ok(InsertOutcome::Inserted {
            path: location.slot_path().key(PARALLEL).index(1).key(first_new),
        })
    }

    /// Attaches the default looping strategy to the step group enclosing
    /// `step_path` when all of its steps are looping steps. Rollback steps
    /// never drive the group's strategy.
    fn apply_derived_strategy(
        &self,
        tree: &mut ExecutionTree,
        step_path: &NodePath,
    ) -> Result<(), PathError> {
        let group_path = nearest_enclosing_step_group_path(step_path);
        if group_path.is_empty() {
            return Ok(());
        }
        if step_path
            .tokens()
            .get(group_path.len())
            .is_some_and(|token| token.is_key(ROLLBACK_STEPS))
        {
            trace!(path = %step_path, "rollback step, strategy left as is");
            return Ok(());
        }

        let (location, strategy) = {
            let Some(Resolved::Node {
                node: ExecutionNode::StepGroup(group),
                location,
            }) = resolve(tree, &group_path, ResolveMode::Node)?
            else {
                return Ok(());
            };
            let Some(new_step) = resolve(tree, step_path, ResolveMode::Node)?
                .and_then(|resolved| resolved.node())
                .and_then(ExecutionNode::as_step)
            else {
                return Ok(());
            };
            let leaves = group.leaf_steps();
            (location, derive_strategy(group, &leaves, new_step, &self.config))
        };

        if let Some(strategy) = strategy {
            if let Some(group) = node_mut(tree, &location).and_then(ExecutionNode::as_step_group_mut)
            {
                debug!(group = %group.identifier, "applying derived looping strategy");
                group.strategy = Some(strategy);
            }
        }
        Ok(())
    }
}

fn group_sequence_mut(
    group: &mut StepGroupNode,
    rollback: bool,
) -> (&'static str, &mut Vec<ExecutionNode>) {
    if rollback {
        (ROLLBACK_STEPS, group.rollback_steps.get_or_insert_with(Vec::new))
    } else {
        (STEPS, &mut group.steps)
    }
}

fn append_to_root(tree: &mut ExecutionTree, node: ExecutionNode, rollback: bool) -> InsertOutcome {
    let key = if rollback { ROLLBACK_STEPS } else { STEPS };
    let keyword = node.keyword();
    let nodes = tree.sequence_mut(rollback);
    nodes.push(node);
    InsertOutcome::Inserted {
        path: NodePath::default()
            .key(key)
            .index(nodes.len() - 1)
            .key(keyword),
    }
}

/// The slot of the nearest `steps` / `rollbackSteps` array holding `path`.
fn drop_location(tree: &ExecutionTree, path: &NodePath) -> Result<Option<Location>, PathError> {
    Ok(resolve(tree, path, ResolveMode::DestinationDrop)?
        .and_then(|resolved| resolved.location().cloned()))
}

fn splice(
    tree: &mut ExecutionTree,
    location: &Location,
    position: usize,
    node: ExecutionNode,
) -> InsertOutcome {
    let Some(nodes) = container_mut(tree, &location.container) else {
        return InsertOutcome::TargetNotFound;
    };
    let position = position.min(nodes.len());
    let keyword = node.keyword();
    nodes.insert(position, node);
    InsertOutcome::Inserted {
        path: location.container.clone().index(position).key(keyword),
    }
}

/// Collapses parallel wrappers inside an incoming node. A single-child wrapper
/// becomes its child; an empty one yields `None`.
fn normalize_incoming(node: ExecutionNode) -> Option<ExecutionNode> {
    let mut nodes = vec![node];
    collapse_parallels(&mut nodes);
    nodes.pop()
}

/// Children to add to a parallel wrapper. A parallel node contributes its own
/// children so wrappers never nest directly.
fn flatten_parallel(node: ExecutionNode) -> Vec<ExecutionNode> {
    match node {
        ExecutionNode::Parallel(children) => children,
        other => vec![other],
    }
}

fn remove_at(tree: &mut ExecutionTree, path: &NodePath) -> Result<bool, PathError> {
    let (location, container) = match resolve(tree, path, ResolveMode::Node)? {
        None => return Ok(false),
        Some(Resolved::Node { location, .. }) => (Some(location), None),
        Some(Resolved::Container { path, kind, .. }) => (None, Some((path, kind))),
    };

    if let Some(location) = location {
        return Ok(match container_mut(tree, &location.container) {
            Some(nodes) => {
                nodes.remove(location.index);
                true
            }
            None => false,
        });
    }

    let Some((path, kind)) = container else {
        return Ok(false);
    };
    if kind == (ParentContainer::StepGroup { rollback: true }) {
        // `<slot>.stepGroup.rollbackSteps`: drop the key from the group
        let group_location = Location {
            container: path.prefix(path.len().saturating_sub(3)),
            index: path.tokens()[path.len().saturating_sub(3)]
                .as_index()
                .unwrap_or_default(),
            parent: ParentContainer::Sequence { rollback: false },
        };
        if let Some(group) =
            node_mut(tree, &group_location).and_then(ExecutionNode::as_step_group_mut)
        {
            group.rollback_steps = None;
            return Ok(true);
        }
        return Ok(false);
    }

    Ok(match container_mut(tree, &path) {
        Some(nodes) => {
            nodes.clear();
            true
        }
        None => false,
    })
}

/// Unwraps parallel wrappers with a single child, drops empty ones and lifts
/// the children of a wrapper nested directly in another, recursively.
pub(crate) fn collapse_parallels(nodes: &mut Vec<ExecutionNode>) {
    for node in nodes.iter_mut() {
        match node {
            ExecutionNode::Parallel(children) => {
                collapse_parallels(children);
                if children.iter().any(ExecutionNode::is_parallel) {
                    trace!("lifting nested parallel children");
                    *children = std::mem::take(children)
                        .into_iter()
                        .flat_map(flatten_parallel)
                        .collect();
                }
            }
            ExecutionNode::StepGroup(group) => {
                collapse_parallels(&mut group.steps);
                if let Some(rollback_steps) = group.rollback_steps.as_mut() {
                    collapse_parallels(rollback_steps);
                }
            }
            ExecutionNode::Step(_) => {}
        }

        if let ExecutionNode::Parallel(children) = node {
            if children.len() == 1 {
                if let Some(only) = children.pop() {
                    trace!("unwrapping single-child parallel");
                    *node = only;
                }
            }
        }
    }
    nodes.retain(|node| !matches!(node, ExecutionNode::Parallel(children) if children.is_empty()));
}
