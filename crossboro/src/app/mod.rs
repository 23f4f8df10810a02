mod crossboro_app;
mod crossboro_config;
pub mod dataset;
mod error;

pub use crossboro_app::{
    run_evaluation, write_bridges, CrossboroApp, CrossboroOperation, EvaluateArgs,
};
pub use crossboro_config::CrossboroConfig;
pub use error::CrossboroAppError;
