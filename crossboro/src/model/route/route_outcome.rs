use crossboro_core::model::{geography::Bridge, partition::SuperboroughPair};
use serde::{Deserialize, Serialize};

/// the fastest way across a partition boundary for one trip
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq)]
pub struct RouteEstimate {
    /// summed duration of both legs through the chosen bridge
    pub duration: f64,
    /// bridge with the smallest summed duration
    pub bridge: Bridge,
    /// summed duration through the slowest candidate bridge
    pub slowest: f64,
    /// number of bridges that were scored
    pub n_candidates: usize,
}

/// result of aggregating a crossing trip over its candidate bridges.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq)]
#[serde(rename_all = "snake_case", tag = "type")]
pub enum RouteOutcome {
    Routed(RouteEstimate),
    /// no bridge connects the trip's partitions
    Unroutable { pair: SuperboroughPair },
}

impl RouteOutcome {
    pub fn duration(&self) -> Option<f64> {
        match self {
            RouteOutcome::Routed(estimate) => Some(estimate.duration),
            RouteOutcome::Unroutable { .. } => None,
        }
    }

    pub fn is_routed(&self) -> bool {
        matches!(self, RouteOutcome::Routed(_))
    }
}
