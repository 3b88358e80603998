use super::codec::{NodePath, PARALLEL, ROLLBACK_STEPS, STEPS};
use crate::model::{ExecutionNode, ExecutionTree};
use ahash::AHashMap;

/// A node together with the paths addressing it at the time the index was built.
#[derive(Debug, Clone)]
pub struct PathEntry<'a> {
    pub absolute: NodePath,
    pub relative: NodePath,
    pub node: &'a ExecutionNode,
}

impl<'a> PathEntry<'a> {
    pub fn identifier(&self) -> &'a str {
        self.node.identifier().unwrap_or_default()
    }
}

/// A snapshot of every step and step group of a tree and where it lives.
///
/// Paths captured by the rendering layer go stale after any structural edit.
/// Instead of patching them, callers build a fresh index and re-resolve.
#[derive(Debug, Clone, Default)]
pub struct PathIndex<'a> {
    entries: Vec<PathEntry<'a>>,
    by_identifier: AHashMap<&'a str, usize>,
}

impl<'a> PathIndex<'a> {
    /// Walks the tree once. `prefix` is prepended to every relative path to
    /// form the absolute one (e.g. `pipeline.stages.0.stage.spec.execution`).
    pub fn build(tree: &'a ExecutionTree, prefix: &NodePath) -> Self {
        let mut index = Self::default();
        index.visit(&tree.steps, NodePath::default().key(STEPS), prefix);
        index.visit(&tree.rollback_steps, NodePath::default().key(ROLLBACK_STEPS), prefix);
        index
    }

    fn visit(&mut self, nodes: &'a [ExecutionNode], container: NodePath, prefix: &NodePath) {
        for (position, node) in nodes.iter().enumerate() {
            let slot = container.clone().index(position);
            let relative = slot.clone().key(node.keyword());
            match node {
                ExecutionNode::Parallel(children) => {
                    self.visit(children, slot.key(PARALLEL), prefix);
                }
                ExecutionNode::Step(_) => self.push(node, relative, prefix),
                ExecutionNode::StepGroup(group) => {
                    self.push(node, relative.clone(), prefix);
                    self.visit(&group.steps, relative.clone().key(STEPS), prefix);
                    if let Some(rollback_steps) = &group.rollback_steps {
                        self.visit(rollback_steps, relative.key(ROLLBACK_STEPS), prefix);
                    }
                }
            }
        }
    }

    fn push(&mut self, node: &'a ExecutionNode, relative: NodePath, prefix: &NodePath) {
        if let Some(identifier) = node.identifier() {
            self.by_identifier
                .entry(identifier)
                .or_insert(self.entries.len());
        }
        self.entries.push(PathEntry {
            absolute: prefix.join(&relative),
            relative,
            node,
        });
    }

    pub fn entries(&self) -> &[PathEntry<'a>] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The first entry (in depth-first order) carrying `identifier`.
    pub fn by_identifier(&self, identifier: &str) -> Option<&PathEntry<'a>> {
        self.by_identifier
            .get(identifier)
            .map(|position| &self.entries[*position])
    }

    /// Finds where a node lives now, given paths that may be stale.
    ///
    /// An exact absolute match wins, then a relative match; either only counts
    /// while the entry there still carries `identifier`. Failing both, the
    /// entry currently holding the identifier is returned.
    pub fn reresolve(
        &self,
        identifier: &str,
        stale_relative: Option<&NodePath>,
        stale_absolute: Option<&NodePath>,
    ) -> Option<&PathEntry<'a>> {
        let holds = |entry: &&PathEntry<'a>| entry.identifier() == identifier;
        stale_absolute
            .and_then(|path| self.entries.iter().filter(holds).find(|e| &e.absolute == path))
            .or_else(|| {
                stale_relative
                    .map(NodePath::relative)
                    .and_then(|path| self.entries.iter().filter(holds).find(|e| e.relative == path))
            })
            .or_else(|| self.by_identifier(identifier))
    }
}
