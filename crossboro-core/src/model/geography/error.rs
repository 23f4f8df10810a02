use std::path::PathBuf;

#[derive(thiserror::Error, Debug)]
pub enum GeographyError {
    #[error("failure reading '{path}': {message}")]
    Read { path: PathBuf, message: String },
    #[error("failed to deserialize row {row} of '{path}': {message}")]
    Deserialize {
        path: PathBuf,
        row: usize,
        message: String,
    },
    #[error("geography store query failed: {0}")]
    Query(String),
    #[error("invalid geography data: {0}")]
    InvalidData(String),
}
