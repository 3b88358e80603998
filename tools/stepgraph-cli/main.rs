use clap::{Parser, Subcommand};
use std::fs;
use stepgraph::path::{strip_stage_prefix, to_dot_notation};
use stepgraph::prelude::*;
use tracing::info;

/// Inspect and edit pipeline execution-step trees from the command line
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the tree as an outline
    Show {
        /// Path to the execution JSON file
        tree_path: String,
    },
    /// List every step and step group with its relative and absolute path
    Index {
        tree_path: String,
        /// Absolute prefix, e.g. `pipeline.stages.0.stage.spec.execution`
        #[arg(short, long, default_value = "")]
        prefix: String,
    },
    /// Print the node state map as JSON
    States {
        tree_path: String,
        /// Optional JSON file holding the stage's service dependencies
        #[arg(short, long)]
        dependencies: Option<String>,
    },
    /// Convert a bracket-indexed path to dot notation
    Dot { path: String },
    /// Strip the stage prefix of a dot path
    Strip { path: String },
    /// Remove a node by path or identifier
    Remove {
        tree_path: String,
        /// Path of the node or container to remove
        #[arg(long, conflicts_with = "id")]
        path: Option<String>,
        /// Identifier of the step or step group to remove
        #[arg(long)]
        id: Option<String>,
        /// Where to write the edited tree (defaults to stdout)
        #[arg(short, long)]
        output: Option<String>,
    },
    /// Append a new step to the root or into a step group
    Append {
        tree_path: String,
        /// Identifier of the new step
        #[arg(long)]
        id: String,
        /// Type of the new step
        #[arg(long, default_value = "ShellScript")]
        kind: String,
        /// Identifier of the step group to append into
        #[arg(long)]
        into: Option<String>,
        /// Append to the rollback sequence instead
        #[arg(long)]
        rollback: bool,
        #[arg(short, long)]
        output: Option<String>,
    },
    /// Add a new step running in parallel with an existing node
    Parallel {
        tree_path: String,
        #[arg(long)]
        id: String,
        #[arg(long, default_value = "ShellScript")]
        kind: String,
        /// Identifier of the node to run beside
        #[arg(long)]
        beside: String,
        #[arg(short, long)]
        output: Option<String>,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Command::Show { tree_path } => {
            let tree = load_tree(&tree_path)?;
            print!("{}", DisplayTree { tree: &tree });
        }
        Command::Index { tree_path, prefix } => {
            let tree = load_tree(&tree_path)?;
            let prefix = NodePath::parse(&prefix)?;
            let index = PathIndex::build(&tree, &prefix);
            for entry in index.entries() {
                println!(
                    "{:<24} {:<40} {}",
                    entry.identifier(),
                    entry.relative,
                    entry.absolute
                );
            }
        }
        Command::States {
            tree_path,
            dependencies,
        } => {
            let tree = load_tree(&tree_path)?;
            let dependencies: Vec<DependencyNode> = match dependencies {
                Some(path) => serde_json::from_str(&fs::read_to_string(path)?)?,
                None => Vec::new(),
            };
            let states = NodeStateMap::rebuild(&tree, &dependencies);
            println!("{}", serde_json::to_string_pretty(&states)?);
        }
        Command::Dot { path } => println!("{}", to_dot_notation(&path)),
        Command::Strip { path } => println!("{}", strip_stage_prefix(&path)),
        Command::Remove {
            tree_path,
            path,
            id,
            output,
        } => {
            let mut editor = StageEditor::builder(load_tree(&tree_path)?).build();
            let removed = match (path, id) {
                (Some(path), _) => editor.remove(&NodePath::parse(&path)?)?,
                (None, Some(id)) => editor.remove_by_identifier(&id)?,
                (None, None) => {
                    eprintln!("Error: either --path or --id is required");
                    std::process::exit(1);
                }
            };
            if !removed {
                eprintln!("Nothing was removed.");
            }
            write_tree(editor.tree(), output.as_deref())?;
        }
        Command::Append {
            tree_path,
            id,
            kind,
            into,
            rollback,
            output,
        } => {
            let mut editor = StageEditor::builder(load_tree(&tree_path)?).build();
            let request = InsertRequest::ContainerAppend {
                destination: into.map(NodeRef::new),
                rollback,
            };
            let outcome = editor.insert(ExecutionNode::step(id, kind), request)?;
            report(&outcome);
            write_tree(editor.tree(), output.as_deref())?;
        }
        Command::Parallel {
            tree_path,
            id,
            kind,
            beside,
            output,
        } => {
            let mut editor = StageEditor::builder(load_tree(&tree_path)?).build();
            let request = InsertRequest::Parallel {
                destination: NodeRef::new(beside),
            };
            let outcome = editor.insert(ExecutionNode::step(id, kind), request)?;
            report(&outcome);
            write_tree(editor.tree(), output.as_deref())?;
        }
    }
    Ok(())
}

fn load_tree(path: &str) -> Result<ExecutionTree> {
    let json = fs::read_to_string(path)?;
    let tree = ExecutionTree::from_json(&json)?;
    info!(path, steps = tree.steps.len(), "loaded execution tree");
    Ok(tree)
}

fn write_tree(tree: &ExecutionTree, output: Option<&str>) -> Result<()> {
    let json = serde_json::to_string_pretty(tree)?;
    match output {
        Some(path) => {
            fs::write(path, json)?;
            println!("Saved edited tree to '{}'", path);
        }
        None => println!("{}", json),
    }
    Ok(())
}

fn report(outcome: &InsertOutcome) {
    match outcome {
        InsertOutcome::Inserted { path } => eprintln!("Inserted at {}", path),
        InsertOutcome::TargetNotFound => eprintln!("Target not found; tree unchanged."),
        InsertOutcome::NothingToInsert => eprintln!("Nothing to insert; tree unchanged."),
    }
}
