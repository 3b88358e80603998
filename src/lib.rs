//! # stepgraph - Execution Step Tree Editing Engine
//!
//! **stepgraph** is the structural core of a visual pipeline editor. A stage's
//! execution is a tree of steps, parallel wrappers and step groups; the diagram
//! layer addresses nodes by positional paths such as
//! `steps.1.stepGroup.steps.0.step`. This crate parses and resolves those paths,
//! applies drag-and-drop edits, keeps the tree well-formed and tracks per-node
//! editor state.
//!
//! ## Core Workflow
//!
//! 1.  **Load the tree**: Deserialize an `ExecutionTree` from the stage document
//!     (`{"steps": [..], "rollbackSteps": [..]}`).
//! 2.  **Open an editor**: Use `StageEditor::builder` to attach configuration,
//!     dependencies and a commit handler.
//! 3.  **Edit**: Insert, remove and update nodes. Stale paths from the rendering
//!     layer are re-resolved by identifier before every edit.
//! 4.  **Persist**: The commit handler receives every new tree; call
//!     `mark_saved` once the surrounding document confirmed the write.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use stepgraph::prelude::*;
//!
//! fn main() -> Result<()> {
//!     let tree = ExecutionTree::new(vec![
//!         ExecutionNode::step("A", "ShellScript"),
//!         ExecutionNode::step("B", "ShellScript"),
//!     ]);
//!
//!     let mut editor = StageEditor::builder(tree)
//!         .with_commit_handler(|commit: Commit<'_>| {
//!             if let Commit::Tree(tree) = commit {
//!                 println!("{}", serde_json::to_string(tree).unwrap_or_default());
//!             }
//!         })
//!         .build();
//!
//!     // Drop "C" onto "B" so they run side by side.
//!     let outcome = editor.insert(
//!         ExecutionNode::step("C", "ShellScript"),
//!         InsertRequest::Parallel {
//!             destination: NodeRef::new("B"),
//!         },
//!     )?;
//!     println!("inserted at {:?}", outcome.path());
//!
//!     // Remove "A" by its stale path.
//!     editor.remove(&"steps[0].step".parse()?)?;
//!     println!("{}", DisplayTree { tree: editor.tree() });
//!
//!     Ok(())
//! }
//! ```

pub mod display;
pub mod editor;
pub mod error;
pub mod model;
pub mod mutator;
pub mod path;
pub mod prelude;
pub mod state;
