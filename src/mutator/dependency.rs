use crate::model::DependencyNode;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// The flat list of service dependencies of a stage.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DependencyList {
    nodes: Vec<DependencyNode>,
}

impl DependencyList {
    pub fn new(nodes: Vec<DependencyNode>) -> Self {
        Self { nodes }
    }

    pub fn add(&mut self, node: DependencyNode) {
        debug!(identifier = %node.identifier, "adding dependency");
        self.nodes.push(node);
    }

    /// Removes the first dependency with `identifier`. Unknown identifiers are
    /// a no-op.
    pub fn remove(&mut self, identifier: &str) -> bool {
        match self.nodes.iter().position(|n| n.identifier == identifier) {
            Some(position) => {
                self.nodes.remove(position);
                debug!(identifier, "removed dependency");
                true
            }
            None => false,
        }
    }

    pub fn get(&self, identifier: &str) -> Option<&DependencyNode> {
        self.nodes.iter().find(|n| n.identifier == identifier)
    }

    pub fn contains(&self, identifier: &str) -> bool {
        self.get(identifier).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = &DependencyNode> {
        self.nodes.iter()
    }

    pub fn as_slice(&self) -> &[DependencyNode] {
        &self.nodes
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

impl From<Vec<DependencyNode>> for DependencyList {
    fn from(nodes: Vec<DependencyNode>) -> Self {
        Self::new(nodes)
    }
}
