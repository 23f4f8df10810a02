mod dataset;
mod dataset_manifest;
mod error;

pub use dataset::{Dataset, DEFAULT_SUBSAMPLE_SEED};
pub use dataset_manifest::{DatasetFormat, DatasetManifest};
pub use error::DatasetError;
