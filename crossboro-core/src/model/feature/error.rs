#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum FeatureError {
    #[error("feature index {index} is out of bounds for a vector of length {len}")]
    IndexOutOfBounds { index: usize, len: usize },
    #[error("layout expects {expected} covariates, found {found}")]
    CovariateCount { expected: usize, found: usize },
}
