use crate::error::EditorError;
use crate::model::{DependencyNode, ExecutionNode, ExecutionTree, StepNode};
use crate::mutator::{DependencyList, InsertOutcome, InsertRequest, TreeMutator};
use crate::path::{NodePath, PathIndex};
use crate::state::NodeStateMap;
use tracing::{debug, info};

#[cfg(feature = "debug-tools")]
use {crate::display::DisplayTree, tracing::trace};

mod config;

pub use config::*;

/// What an editor hands to the document model after a successful edit.
#[derive(Debug, Clone, Copy)]
pub enum Commit<'a> {
    Tree(&'a ExecutionTree),
    Dependencies(&'a [DependencyNode]),
}

/// Receives edited structures for persistence. Implemented for any
/// `FnMut(Commit<'_>)` closure.
pub trait CommitHandler {
    fn commit(&mut self, commit: Commit<'_>);
}

impl<F> CommitHandler for F
where
    F: FnMut(Commit<'_>),
{
    fn commit(&mut self, commit: Commit<'_>) {
        self(commit)
    }
}

/// An editing session over one stage's execution tree and dependency list.
///
/// Each operation is a single transaction: the mutator works on a copy of the
/// current tree, and only a successful edit replaces it, refreshes the node
/// states and reaches the commit handler.
pub struct StageEditor {
    tree: ExecutionTree,
    dependencies: DependencyList,
    states: NodeStateMap,
    mutator: TreeMutator,
    handler: Option<Box<dyn CommitHandler>>,
}

pub struct StageEditorBuilder {
    tree: ExecutionTree,
    dependencies: DependencyList,
    config: EditorConfig,
    handler: Option<Box<dyn CommitHandler>>,
}

impl StageEditorBuilder {
    pub fn new(tree: ExecutionTree) -> Self {
        Self {
            tree,
            dependencies: DependencyList::default(),
            config: EditorConfig::default(),
            handler: None,
        }
    }

    pub fn with_config(mut self, config: EditorConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_looping_step_kind(mut self, kind: &str) -> Self {
        self.config.looping_step_kind = kind.to_string();
        self
    }

    pub fn with_path_prefix(mut self, prefix: NodePath) -> Self {
        self.config.path_prefix = prefix;
        self
    }

    pub fn with_dependencies(mut self, dependencies: Vec<DependencyNode>) -> Self {
        self.dependencies = DependencyList::new(dependencies);
        self
    }

    pub fn with_commit_handler(mut self, handler: impl CommitHandler + 'static) -> Self {
        self.handler = Some(Box::new(handler));
        self
    }

    pub fn build(self) -> StageEditor {
        let states = NodeStateMap::rebuild(&self.tree, self.dependencies.as_slice());
        StageEditor {
            tree: self.tree,
            dependencies: self.dependencies,
            states,
            mutator: TreeMutator::new(self.config),
            handler: self.handler,
        }
    }
}

impl StageEditor {
    pub fn builder(tree: ExecutionTree) -> StageEditorBuilder {
        StageEditorBuilder::new(tree)
    }

    /// Opens an editor over an execution document with default settings.
    pub fn from_json(json: &str) -> Result<Self, EditorError> {
        Ok(Self::builder(ExecutionTree::from_json(json)?).build())
    }

    pub fn tree(&self) -> &ExecutionTree {
        &self.tree
    }

    pub fn dependencies(&self) -> &DependencyList {
        &self.dependencies
    }

    pub fn states(&self) -> &NodeStateMap {
        &self.states
    }

    pub fn config(&self) -> &EditorConfig {
        self.mutator.config()
    }

    /// A path snapshot of the current tree.
    pub fn index(&self) -> PathIndex<'_> {
        PathIndex::build(&self.tree, &self.config().path_prefix)
    }

    pub fn insert(
        &mut self,
        node: ExecutionNode,
        request: InsertRequest,
    ) -> Result<InsertOutcome, EditorError> {
        let insertion = self.mutator.insert(&self.tree, node, &request)?;
        if insertion.outcome.is_inserted() {
            self.replace_tree(insertion.tree);
        }
        Ok(insertion.outcome)
    }

    pub fn remove(&mut self, path: &NodePath) -> Result<bool, EditorError> {
        let removal = self.mutator.remove(&self.tree, path)?;
        if removal.is_removed {
            self.replace_tree(removal.tree);
        }
        Ok(removal.is_removed)
    }

    /// Removes a step, step group or dependency by identifier. Identifiers
    /// found in neither structure are a no-op.
    pub fn remove_by_identifier(&mut self, identifier: &str) -> Result<bool, EditorError> {
        let removal = self.mutator.remove_by_identifier(&self.tree, identifier)?;
        if removal.is_removed {
            self.replace_tree(removal.tree);
            return Ok(true);
        }
        Ok(self.remove_dependency(identifier))
    }

    pub fn update_step(&mut self, path: &NodePath, step: StepNode) -> Result<bool, EditorError> {
        let update = self.mutator.update_step(&self.tree, path, step)?;
        if update.is_updated {
            self.replace_tree(update.tree);
        }
        Ok(update.is_updated)
    }

    pub fn add_dependency(&mut self, dependency: DependencyNode) {
        self.dependencies.add(dependency);
        self.dependencies_changed();
    }

    pub fn remove_dependency(&mut self, identifier: &str) -> bool {
        let removed = self.dependencies.remove(identifier);
        if removed {
            self.dependencies_changed();
        }
        removed
    }

    /// Called once the surrounding document confirmed persistence.
    pub fn mark_saved(&mut self) {
        self.states
            .mark_saved(&self.tree, self.dependencies.as_slice());
    }

    /// Replaces the tree with one loaded from outside. Node states start over.
    pub fn reload(&mut self, tree: ExecutionTree) {
        info!("reloading execution tree");
        self.states = NodeStateMap::rebuild(&tree, self.dependencies.as_slice());
        self.tree = tree;
    }

    pub fn set_collapsed(&mut self, identifier: &str, collapsed: bool) -> bool {
        self.states.set_collapsed(identifier, collapsed)
    }

    fn replace_tree(&mut self, tree: ExecutionTree) {
        if let Some(handler) = self.handler.as_mut() {
            handler.commit(Commit::Tree(&tree));
        }
        self.tree = tree;
        self.refresh_states();

        #[cfg(feature = "debug-tools")]
        trace!(tree = %DisplayTree { tree: &self.tree }, "committed tree");
    }

    fn dependencies_changed(&mut self) {
        if let Some(handler) = self.handler.as_mut() {
            handler.commit(Commit::Dependencies(self.dependencies.as_slice()));
        }
        self.refresh_states();
    }

    fn refresh_states(&mut self) {
        let mut states = NodeStateMap::rebuild(&self.tree, self.dependencies.as_slice());
        states.apply_existing(&self.states);
        debug!(entries = states.len(), "refreshed node states");
        self.states = states;
    }
}
