mod duration_model;
mod error;
mod model_ensemble;
mod xgboost_json;
mod xgboost_model;

pub use duration_model::DurationModel;
pub use error::ModelError;
pub use model_ensemble::{ModelEnsemble, ModelPaths};
pub use xgboost_model::{XgboostModel, IDENTITY_OBJECTIVES};
