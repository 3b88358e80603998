use clap::Parser;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::fs;
use stepgraph::model::{ExecutionNode, ExecutionTree, StepGroupInfra, StepGroupNode};

const STEP_KINDS: [&str; 4] = ["ShellScript", "Command", "Http", "K8sRollingDeploy"];

/// A CLI tool to generate random, well-formed execution trees
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    /// The path to write the generated JSON file to
    #[arg(short, long, default_value = "generated_tree.json")]
    output: String,

    /// Number of nodes in the root sequence
    #[arg(long, default_value_t = 6)]
    width: usize,

    /// Maximum nesting depth of step groups and parallel wrappers
    #[arg(long, default_value_t = 3)]
    depth: usize,

    /// Seed for reproducible output
    #[arg(long)]
    seed: Option<u64>,
}

struct Generator {
    rng: StdRng,
    next_id: usize,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    if cli.width == 0 {
        eprintln!("Error: --width must be at least 1");
        std::process::exit(1);
    }

    let rng = match cli.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_rng(&mut rand::rng()),
    };
    let mut generator = Generator { rng, next_id: 0 };

    println!(
        "Generating execution tree (width {}, depth {})...",
        cli.width, cli.depth
    );
    let steps = generator.sequence(cli.width, cli.depth);
    let rollback_len = generator.rng.random_range(0..=2);
    let rollback_steps = generator.sequence(rollback_len, 0);
    let tree = ExecutionTree::new(steps).with_rollback_steps(rollback_steps);

    let json_output = serde_json::to_string_pretty(&tree)?;
    fs::write(&cli.output, json_output)?;

    println!(
        "Successfully generated {} nodes and saved them to '{}'",
        generator.next_id, cli.output
    );
    Ok(())
}

impl Generator {
    fn identifier(&mut self, prefix: &str) -> String {
        self.next_id += 1;
        format!("{}_{}", prefix, self.next_id)
    }

    fn sequence(&mut self, len: usize, depth: usize) -> Vec<ExecutionNode> {
        (0..len).map(|_| self.node(depth)).collect()
    }

    fn node(&mut self, depth: usize) -> ExecutionNode {
        let roll = if depth == 0 {
            0
        } else {
            self.rng.random_range(0..10)
        };
        match roll {
            // parallel wrappers always get at least two children
            7..=8 => {
                let len = self.rng.random_range(2..=3);
                let children = (0..len).map(|_| self.leaf_or_group(depth - 1)).collect();
                ExecutionNode::parallel(children)
            }
            9 => self.group(depth - 1),
            _ => self.step(),
        }
    }

    fn leaf_or_group(&mut self, depth: usize) -> ExecutionNode {
        if depth > 0 && self.rng.random_bool(0.25) {
            self.group(depth - 1)
        } else {
            self.step()
        }
    }

    fn step(&mut self) -> ExecutionNode {
        let kind = STEP_KINDS[self.rng.random_range(0..STEP_KINDS.len())];
        let identifier = self.identifier("step");
        ExecutionNode::step(identifier, kind)
    }

    fn group(&mut self, depth: usize) -> ExecutionNode {
        let identifier = self.identifier("group");
        let len = self.rng.random_range(0..=3);
        let mut group = StepGroupNode::new(identifier).with_steps(self.sequence(len, depth));
        if self.rng.random_bool(0.3) {
            let rollback_len = self.rng.random_range(1..=2);
            group = group.with_rollback_steps(self.sequence(rollback_len, 0));
        }
        if self.rng.random_bool(0.2) {
            group.step_group_infra = Some(StepGroupInfra::new("KubernetesDirect"));
        }
        ExecutionNode::step_group(group)
    }
}
