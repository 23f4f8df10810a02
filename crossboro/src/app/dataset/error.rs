use std::path::PathBuf;

use crossboro_core::model::{feature::FeatureError, layout::LayoutTag};

#[derive(thiserror::Error, Debug)]
pub enum DatasetError {
    #[error("failure reading '{path}': {message}")]
    Read { path: PathBuf, message: String },
    #[error("failure writing '{path}': {message}")]
    Write { path: PathBuf, message: String },
    #[error("line {line} of '{path}' is malformed: {message}")]
    Parse {
        path: PathBuf,
        line: usize,
        message: String,
    },
    #[error("dataset was written with layout {found}, but layout {expected} was requested")]
    LayoutMismatch { expected: LayoutTag, found: LayoutTag },
    #[error("test size must be in (0, 1], found {0}")]
    InvalidTestSize(f64),
    #[error(transparent)]
    Feature(#[from] FeatureError),
}
