use kdam::{Bar, BarExt};

use crate::model::evaluation::{EvaluationError, EvaluationSummary, TripOutcome};

use super::EvaluationObserver;

/// shows a progress bar over the trips of the dataset
#[derive(Default)]
pub struct ProgressObserver {
    bar: Option<Bar>,
}

impl ProgressObserver {
    pub fn new() -> ProgressObserver {
        ProgressObserver::default()
    }
}

impl EvaluationObserver for ProgressObserver {
    fn on_start(&mut self, total: usize) -> Result<(), EvaluationError> {
        let bar = Bar::builder()
            .total(total)
            .desc("evaluate crossing trips")
            .build()
            .map_err(EvaluationError::InternalError)?;
        self.bar = Some(bar);
        Ok(())
    }

    fn on_trip(
        &mut self,
        _index: usize,
        _truth: f64,
        _outcome: &TripOutcome,
    ) -> Result<(), EvaluationError> {
        if let Some(bar) = self.bar.as_mut() {
            let _ = bar.update(1);
        }
        Ok(())
    }

    fn on_complete(&mut self, _summary: &EvaluationSummary) -> Result<(), EvaluationError> {
        if self.bar.take().is_some() {
            eprintln!();
        }
        Ok(())
    }
}
