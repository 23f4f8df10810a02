use crate::model::evaluation::{Checkpoint, EvaluationError, EvaluationSummary, TripOutcome};

/// receives evaluation progress in dataset order. every method has a no-op default.
pub trait EvaluationObserver {
    fn on_start(&mut self, _total: usize) -> Result<(), EvaluationError> {
        Ok(())
    }

    /// called once per trip with its 0-based position in the dataset
    fn on_trip(
        &mut self,
        _index: usize,
        _truth: f64,
        _outcome: &TripOutcome,
    ) -> Result<(), EvaluationError> {
        Ok(())
    }

    fn on_checkpoint(&mut self, _checkpoint: &Checkpoint) -> Result<(), EvaluationError> {
        Ok(())
    }

    fn on_complete(&mut self, _summary: &EvaluationSummary) -> Result<(), EvaluationError> {
        Ok(())
    }
}
