use crossboro_core::model::geography::GeographyError;

use crate::{
    app::dataset::DatasetError,
    model::{duration::ModelError, evaluation::EvaluationError},
};

#[derive(thiserror::Error, Debug)]
pub enum CrossboroAppError {
    #[error("Invalid input: {0}")]
    InvalidUserInput(String),
    #[error(transparent)]
    Geography(#[from] GeographyError),
    #[error(transparent)]
    Model(#[from] ModelError),
    #[error(transparent)]
    Dataset(#[from] DatasetError),
    #[error(transparent)]
    Evaluation(#[from] EvaluationError),
    #[error("Error writing output: {0}")]
    WriteError(String),
}
