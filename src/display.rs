use crate::model::{ExecutionNode, ExecutionTree};
use crate::path::{ROLLBACK_STEPS, STEPS};
use std::fmt;

/// A wrapper struct for pretty-printing an `ExecutionTree` as an outline.
///
/// ```text
/// execution
/// ├── steps
/// │   ├── step: A (ShellScript)
/// │   └── parallel
/// │       ├── step: B (Command)
/// │       └── step: C (Command)
/// └── rollbackSteps
///     └── step: R (ShellScript)
/// ```
pub struct DisplayTree<'a> {
    pub tree: &'a ExecutionTree,
}

impl<'a> fmt::Display for DisplayTree<'a> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "execution")?;
        let has_rollback = !self.tree.rollback_steps.is_empty();
        self.fmt_sequence(f, STEPS, &self.tree.steps, "", !has_rollback)?;
        if has_rollback {
            self.fmt_sequence(f, ROLLBACK_STEPS, &self.tree.rollback_steps, "", true)?;
        }
        Ok(())
    }
}

impl<'a> DisplayTree<'a> {
    fn fmt_sequence(
        &self,
        f: &mut fmt::Formatter<'_>,
        name: &str,
        nodes: &[ExecutionNode],
        prefix: &str,
        is_last: bool,
    ) -> fmt::Result {
        let marker = if is_last { "└── " } else { "├── " };
        writeln!(f, "{}{}{}", prefix, marker, name)?;
        let child_prefix = format!("{}{}", prefix, if is_last { "    " } else { "│   " });
        self.fmt_children(f, nodes, &child_prefix)
    }

    fn fmt_children(
        &self,
        f: &mut fmt::Formatter<'_>,
        nodes: &[ExecutionNode],
        prefix: &str,
    ) -> fmt::Result {
        for (position, node) in nodes.iter().enumerate() {
            self.fmt_node(f, node, prefix, position + 1 == nodes.len())?;
        }
        Ok(())
    }

    fn fmt_node(
        &self,
        f: &mut fmt::Formatter<'_>,
        node: &ExecutionNode,
        prefix: &str,
        is_last: bool,
    ) -> fmt::Result {
        let marker = if is_last { "└── " } else { "├── " };
        write!(f, "{}{}", prefix, marker)?;
        let child_prefix = format!("{}{}", prefix, if is_last { "    " } else { "│   " });

        match node {
            ExecutionNode::Step(step) => writeln!(f, "step: {} ({})", step.identifier, step.kind)?,
            ExecutionNode::Parallel(children) => {
                writeln!(f, "parallel")?;
                self.fmt_children(f, children, &child_prefix)?;
            }
            ExecutionNode::StepGroup(group) => {
                write!(f, "stepGroup: {}", group.identifier)?;
                if group.is_containerized() {
                    write!(f, " [containerized]")?;
                }
                if group.strategy.as_ref().is_some_and(|s| !s.is_empty()) {
                    write!(f, " [looping]")?;
                }
                writeln!(f)?;
                match &group.rollback_steps {
                    Some(rollback_steps) => {
                        self.fmt_sequence(f, STEPS, &group.steps, &child_prefix, false)?;
                        self.fmt_sequence(f, ROLLBACK_STEPS, rollback_steps, &child_prefix, true)?;
                    }
                    None => self.fmt_sequence(f, STEPS, &group.steps, &child_prefix, true)?,
                }
            }
        }
        Ok(())
    }
}
