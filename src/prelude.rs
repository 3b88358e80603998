//! Prelude module for convenient imports
//!
//! This module re-exports the most commonly used types of the stepgraph crate.
//!
//! # Example
//!
//! ```rust,no_run
//! use stepgraph::prelude::*;
//!
//! # fn run_example() -> Result<()> {
//! let json = std::fs::read_to_string("path/to/execution.json")?;
//! let mut editor = StageEditor::from_json(&json)?;
//!
//! let removed = editor.remove_by_identifier("cleanup")?;
//! println!("removed: {}", removed);
//! # Ok(())
//! # }
//! ```

// Tree model
pub use crate::model::{
    DependencyNode, ExecutionNode, ExecutionTree, RepeatStrategy, StepGroupNode, StepNode,
    Strategy,
};

// Paths
pub use crate::path::{NodePath, PathIndex, ResolveMode, Resolved, resolve};

// Editing
pub use crate::editor::{Commit, CommitHandler, EditorConfig, StageEditor};
pub use crate::mutator::{InsertOutcome, InsertRequest, NodeRef, TreeMutator};
pub use crate::state::{NodeState, NodeStateMap, StepType};

// Error types
pub use crate::error::{EditorError, PathError};

// Debug rendering
pub use crate::display::DisplayTree;

// Result type alias for convenience
pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error>>;
