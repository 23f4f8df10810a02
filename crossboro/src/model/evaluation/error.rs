use std::path::PathBuf;

use crossboro_core::model::{geography::GeographyError, leg::LegError};

#[derive(thiserror::Error, Debug)]
pub enum EvaluationError {
    #[error("dataset has no trips to evaluate")]
    EmptyDataset,
    #[error("trip {index} could not be evaluated: {source}")]
    Leg { index: usize, source: LegError },
    #[error(transparent)]
    Geography(#[from] GeographyError),
    #[error("failure writing evaluation log '{path}': {message}")]
    ObserverIo { path: PathBuf, message: String },
    #[error("failed to build evaluation thread pool: {0}")]
    ThreadPool(String),
    #[error("{0}")]
    InternalError(String),
}
