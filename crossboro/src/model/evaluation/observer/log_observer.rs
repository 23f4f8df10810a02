use crate::model::evaluation::{
    fmt_rmse, Checkpoint, EvaluationError, EvaluationSummary, TripOutcome,
};

use super::EvaluationObserver;

/// reports checkpoints at info level and individual trips at debug level
#[derive(Clone, Copy, Debug, Default)]
pub struct LogObserver;

impl EvaluationObserver for LogObserver {
    fn on_start(&mut self, total: usize) -> Result<(), EvaluationError> {
        log::info!("evaluating {total} crossing trips");
        Ok(())
    }

    fn on_trip(
        &mut self,
        index: usize,
        truth: f64,
        outcome: &TripOutcome,
    ) -> Result<(), EvaluationError> {
        match outcome {
            TripOutcome::Routed(estimate) => log::debug!(
                "[{:8}] min: {:15.3}, max: {:15.3}, target: {truth}",
                index + 1,
                estimate.duration,
                estimate.slowest
            ),
            TripOutcome::Unroutable { pair, fallback } => log::debug!(
                "[{:8}] no bridge between superboroughs {pair}, scored with {fallback:?}, target: {truth}",
                index + 1
            ),
            TripOutcome::Skipped { reason } => {
                log::debug!("[{:8}] skipped: {reason}", index + 1)
            }
        }
        Ok(())
    }

    fn on_checkpoint(&mut self, checkpoint: &Checkpoint) -> Result<(), EvaluationError> {
        log::info!(
            ">>> Running test point {}, current loss {}",
            checkpoint.index,
            fmt_rmse(checkpoint.rmse)
        );
        Ok(())
    }

    fn on_complete(&mut self, summary: &EvaluationSummary) -> Result<(), EvaluationError> {
        log::info!("{summary}");
        Ok(())
    }
}
