mod error;
mod evaluation_config;
mod evaluation_summary;
mod evaluator;
mod labeled_trip;
mod observer;
mod trip_outcome;
mod unroutable_policy;

pub use error::EvaluationError;
pub use evaluation_config::{EvaluationConfig, DEFAULT_CHECKPOINT_INTERVAL};
pub use evaluation_summary::{fmt_rmse, Checkpoint, EvaluationAccumulator, EvaluationSummary};
pub use evaluator::Evaluator;
pub use labeled_trip::LabeledTrip;
pub use observer::{EvaluationObserver, FileLogObserver, LogObserver, ProgressObserver};
pub use trip_outcome::TripOutcome;
pub use unroutable_policy::UnroutablePolicy;
