use serde::{Deserialize, Serialize};

use super::TripOutcome;

/// running error after some number of trips
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq)]
pub struct Checkpoint {
    /// number of trips processed so far
    pub index: usize,
    /// RMSE over the trips scored so far, None if nothing was scored yet
    pub rmse: Option<f64>,
}

/// running sums of an evaluation. reset for every run.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Default)]
pub struct EvaluationAccumulator {
    pub n_trips: usize,
    pub routed: usize,
    pub unroutable: usize,
    pub skipped: usize,
    pub fallback_scored: usize,
    pub sse: f64,
}

impl EvaluationAccumulator {
    pub fn record(&mut self, truth: f64, outcome: &TripOutcome) {
        self.n_trips += 1;
        match outcome {
            TripOutcome::Routed(_) => self.routed += 1,
            TripOutcome::Unroutable { fallback, .. } => {
                self.unroutable += 1;
                if fallback.is_some() {
                    self.fallback_scored += 1;
                }
            }
            TripOutcome::Skipped { .. } => self.skipped += 1,
        }
        if let Some(prediction) = outcome.prediction() {
            self.sse += (prediction - truth).powi(2);
        }
    }

    /// trips in the RMSE denominator
    pub fn scored(&self) -> usize {
        self.routed + self.fallback_scored
    }

    pub fn rmse(&self) -> Option<f64> {
        match self.scored() {
            0 => None,
            n => Some((self.sse / n as f64).sqrt()),
        }
    }

    pub fn checkpoint(&self) -> Checkpoint {
        Checkpoint {
            index: self.n_trips,
            rmse: self.rmse(),
        }
    }

    pub fn summary(&self) -> EvaluationSummary {
        EvaluationSummary {
            n_trips: self.n_trips,
            routed: self.routed,
            unroutable: self.unroutable,
            skipped: self.skipped,
            fallback_scored: self.fallback_scored,
            sse: self.sse,
            rmse: self.rmse(),
        }
    }
}

/// final result of an evaluation run
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq)]
pub struct EvaluationSummary {
    pub n_trips: usize,
    pub routed: usize,
    pub unroutable: usize,
    pub skipped: usize,
    pub fallback_scored: usize,
    pub sse: f64,
    pub rmse: Option<f64>,
}

impl std::fmt::Display for EvaluationSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let rmse = fmt_rmse(self.rmse);
        write!(
            f,
            "rmse {rmse} over {} trips ({} routed, {} unroutable, {} fallback-scored, {} skipped)",
            self.n_trips, self.routed, self.unroutable, self.fallback_scored, self.skipped
        )
    }
}

/// renders an RMSE with four decimals, or "n/a" if nothing was scored
pub fn fmt_rmse(rmse: Option<f64>) -> String {
    match rmse {
        Some(value) => format!("{value:.4}"),
        None => String::from("n/a"),
    }
}
