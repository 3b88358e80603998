use crate::error::PathError;
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub const STEPS: &str = "steps";
pub const ROLLBACK_STEPS: &str = "rollbackSteps";
pub const PARALLEL: &str = "parallel";
pub const STEP: &str = "step";
pub const STEP_GROUP: &str = "stepGroup";

/// Keywords that may appear in a stage-relative path.
pub const KEYWORDS: [&str; 5] = [STEPS, ROLLBACK_STEPS, PARALLEL, STEP, STEP_GROUP];

const PROVISIONER_MARKER: &str = ".provisioner.";
const EXECUTION_MARKER: &str = ".execution.";

/// Rewrites every `[n]` index segment of a bracket-indexed path to `.n`.
///
/// Anything that is not a numeric bracket is copied through unchanged.
pub fn to_dot_notation(bracket_path: &str) -> String {
    let mut out = String::with_capacity(bracket_path.len());
    let mut rest = bracket_path;
    while let Some(open) = rest.find('[') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        match after.find(']') {
            Some(close) if close > 0 && after[..close].bytes().all(|b| b.is_ascii_digit()) => {
                out.push('.');
                out.push_str(&after[..close]);
                rest = &after[close + 1..];
            }
            _ => {
                out.push('[');
                rest = after;
            }
        }
    }
    out.push_str(rest);
    out
}

/// Drops the stage-level prefix of a dot path so it starts at the execution
/// (or provisioner) root. A provisioner marker wins over an execution marker.
pub fn strip_stage_prefix(path: &str) -> String {
    if let Some((_, relative)) = path.split_once(PROVISIONER_MARKER) {
        return relative.to_string();
    }
    if let Some((_, relative)) = path.split_once(EXECUTION_MARKER) {
        return relative.to_string();
    }
    path.to_string()
}

/// A single path segment.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PathToken {
    Key(String),
    Index(usize),
}

impl PathToken {
    pub fn as_key(&self) -> Option<&str> {
        match self {
            PathToken::Key(key) => Some(key),
            PathToken::Index(_) => None,
        }
    }

    pub fn as_index(&self) -> Option<usize> {
        match self {
            PathToken::Index(index) => Some(*index),
            PathToken::Key(_) => None,
        }
    }

    pub fn is_key(&self, keyword: &str) -> bool {
        self.as_key() == Some(keyword)
    }

    /// `steps` or `rollbackSteps`.
    pub fn is_sequence_key(&self) -> bool {
        self.is_key(STEPS) || self.is_key(ROLLBACK_STEPS)
    }
}

impl fmt::Display for PathToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathToken::Key(key) => write!(f, "{}", key),
            PathToken::Index(index) => write!(f, "{}", index),
        }
    }
}

/// An address of a node or container inside a stage document.
///
/// Paths are positional and go stale as soon as siblings before the addressed
/// node are inserted or removed. Use `PathIndex` to re-resolve them.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct NodePath {
    tokens: Vec<PathToken>,
}

impl NodePath {
    pub fn new(tokens: Vec<PathToken>) -> Self {
        Self { tokens }
    }

    /// Parses a dot-joined or bracket-indexed path. The empty string is the
    /// empty path.
    pub fn parse(input: &str) -> Result<Self, PathError> {
        let dotted = to_dot_notation(input.trim());
        if dotted.is_empty() {
            return Ok(Self::default());
        }
        if dotted.contains('[') || dotted.contains(']') {
            return Err(PathError::Malformed {
                path: input.to_string(),
                message: "brackets must enclose a numeric index".to_string(),
            });
        }

        let tokens = dotted
            .split('.')
            .map(|segment| {
                if segment.is_empty() {
                    Err(PathError::Malformed {
                        path: input.to_string(),
                        message: "empty segment".to_string(),
                    })
                } else if segment.bytes().all(|b| b.is_ascii_digit()) {
                    segment
                        .parse()
                        .map(PathToken::Index)
                        .map_err(|e| PathError::Malformed {
                            path: input.to_string(),
                            message: format!("index '{}' out of range: {}", segment, e),
                        })
                } else {
                    Ok(PathToken::Key(segment.to_string()))
                }
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { tokens })
    }

    pub fn tokens(&self) -> &[PathToken] {
        &self.tokens
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// The first `len` tokens.
    pub fn prefix(&self, len: usize) -> NodePath {
        NodePath {
            tokens: self.tokens[..len.min(self.tokens.len())].to_vec(),
        }
    }

    pub fn key(mut self, key: &str) -> Self {
        self.tokens.push(PathToken::Key(key.to_string()));
        self
    }

    pub fn index(mut self, index: usize) -> Self {
        self.tokens.push(PathToken::Index(index));
        self
    }

    pub fn join(&self, other: &NodePath) -> NodePath {
        let mut tokens = self.tokens.clone();
        tokens.extend(other.tokens.iter().cloned());
        NodePath { tokens }
    }

    /// The token-level counterpart of `strip_stage_prefix`.
    pub fn relative(&self) -> NodePath {
        let marker = |keyword: &str| {
            self.tokens
                .iter()
                .enumerate()
                .position(|(i, t)| i > 0 && i + 1 < self.tokens.len() && t.is_key(keyword))
        };
        match marker("provisioner").or_else(|| marker("execution")) {
            Some(position) => NodePath {
                tokens: self.tokens[position + 1..].to_vec(),
            },
            None => self.clone(),
        }
    }

    pub fn to_dot_string(&self) -> String {
        self.tokens.iter().join(".")
    }

    pub fn to_bracket_string(&self) -> String {
        let mut out = String::new();
        for token in &self.tokens {
            match token {
                PathToken::Key(key) => {
                    if !out.is_empty() {
                        out.push('.');
                    }
                    out.push_str(key);
                }
                PathToken::Index(index) => out.push_str(&format!("[{}]", index)),
            }
        }
        out
    }
}

impl fmt::Display for NodePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(&self.to_dot_string())
    }
}

impl FromStr for NodePath {
    type Err = PathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        NodePath::parse(s)
    }
}

impl TryFrom<String> for NodePath {
    type Error = PathError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        NodePath::parse(&value)
    }
}

impl From<NodePath> for String {
    fn from(path: NodePath) -> Self {
        path.to_dot_string()
    }
}
