use std::path::PathBuf;

use crossboro_core::model::partition::Superborough;

#[derive(thiserror::Error, Debug)]
pub enum ModelError {
    #[error("failure reading model file '{path}': {message}")]
    Read { path: PathBuf, message: String },
    #[error("failed to parse model file '{path}': {message}")]
    Parse { path: PathBuf, message: String },
    #[error("unsupported model: {0}")]
    Unsupported(String),
    #[error("tree {tree} is malformed: {message}")]
    InvalidTree { tree: usize, message: String },
    #[error("no model path configured for superborough {0}")]
    MissingPath(Superborough),
}
