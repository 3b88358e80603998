use thiserror::Error;

/// Errors raised while parsing or walking a node path.
///
/// Paths that are well-formed but do not exist in the current tree are not
/// errors; resolvers report them as `None`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PathError {
    #[error("Path '{path}' contains unknown token '{token}'")]
    UnknownToken { path: String, token: String },

    #[error("Malformed path '{path}': {message}")]
    Malformed { path: String, message: String },
}

/// Errors surfaced by a `StageEditor`.
#[derive(Error, Debug)]
pub enum EditorError {
    #[error(transparent)]
    Path(#[from] PathError),

    #[error("Failed to parse execution document: {0}")]
    Json(#[from] serde_json::Error),
}
