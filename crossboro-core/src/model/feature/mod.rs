mod error;
mod feature_vector;

pub use error::FeatureError;
pub use feature_vector::{FeatureVector, SparseFeatures};
