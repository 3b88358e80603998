use crate::model::ExecutionTree;
use crate::path::NodePath;

/// A reference to a node as captured by the rendering layer.
///
/// The captured paths may be stale; when an identifier is present the node is
/// re-resolved through a fresh `PathIndex` before use. Parallel wrappers carry
/// no identifier and are addressed by path alone.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NodeRef {
    pub identifier: Option<String>,
    pub relative_path: Option<NodePath>,
    pub absolute_path: Option<NodePath>,
}

impl NodeRef {
    pub fn new(identifier: impl Into<String>) -> Self {
        Self {
            identifier: Some(identifier.into()),
            ..Self::default()
        }
    }

    /// A reference by path only.
    pub fn at(path: NodePath) -> Self {
        Self {
            relative_path: Some(path),
            ..Self::default()
        }
    }

    pub fn with_relative_path(mut self, path: NodePath) -> Self {
        self.relative_path = Some(path);
        self
    }

    pub fn with_absolute_path(mut self, path: NodePath) -> Self {
        self.absolute_path = Some(path);
        self
    }
}

/// Where a dropped or submitted node goes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InsertRequest {
    /// Dropped on the connector between `source` and `target`.
    Link {
        source: Option<NodeRef>,
        target: Option<NodeRef>,
    },
    /// "Add step" inside a step group; `None` targets the tree root.
    ContainerAppend {
        destination: Option<NodeRef>,
        rollback: bool,
    },
    /// Dropped onto an existing node to run beside it.
    Parallel { destination: NodeRef },
    /// No explicit target, e.g. a palette drop on an empty canvas.
    Append { rollback: bool },
}

impl InsertRequest {
    pub fn kind(&self) -> &'static str {
        match self {
            InsertRequest::Link { .. } => "link",
            InsertRequest::ContainerAppend { .. } => "container-append",
            InsertRequest::Parallel { .. } => "parallel",
            InsertRequest::Append { .. } => "append",
        }
    }
}

/// The result of an insertion attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InsertOutcome {
    /// The node was inserted; `path` addresses it in the new tree.
    Inserted { path: NodePath },
    /// Neither the requested target nor any fallback could be resolved. The
    /// tree is unchanged.
    TargetNotFound,
    /// The node was an empty parallel wrapper. The tree is unchanged.
    NothingToInsert,
}

impl InsertOutcome {
    pub fn is_inserted(&self) -> bool {
        matches!(self, InsertOutcome::Inserted { .. })
    }

    pub fn path(&self) -> Option<&NodePath> {
        match self {
            InsertOutcome::Inserted { path } => Some(path),
            InsertOutcome::TargetNotFound | InsertOutcome::NothingToInsert => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Insertion {
    pub outcome: InsertOutcome,
    pub tree: ExecutionTree,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Removal {
    pub is_removed: bool,
    pub tree: ExecutionTree,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Update {
    pub is_updated: bool,
    pub tree: ExecutionTree,
}
