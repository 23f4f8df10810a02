use crossboro_core::model::{
    leg::{LegError, TripLegs},
    partition::SuperboroughPair,
};
use serde::{Deserialize, Serialize};

use crate::model::route::{RouteAggregator, RouteEstimate, RouteOutcome};

use super::{EvaluationError, UnroutablePolicy};

/// how one trip of the dataset was handled
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "snake_case", tag = "type")]
pub enum TripOutcome {
    Routed(RouteEstimate),
    /// no bridge connects the trip's partitions. `fallback` is the duration
    /// it was scored with, if the policy scores unroutable trips at all.
    Unroutable {
        pair: SuperboroughPair,
        fallback: Option<f64>,
    },
    /// the trip could not be split into legs
    Skipped { reason: String },
}

impl TripOutcome {
    /// the duration that enters the error metric, if any
    pub fn prediction(&self) -> Option<f64> {
        match self {
            TripOutcome::Routed(estimate) => Some(estimate.duration),
            TripOutcome::Unroutable { fallback, .. } => *fallback,
            TripOutcome::Skipped { .. } => None,
        }
    }

    /// scores the legs of a trip, or classifies a synthesis failure. failures that
    /// concern only this trip become [`TripOutcome::Skipped`]; anything else is fatal.
    pub fn classify(
        index: usize,
        legs: Result<TripLegs, LegError>,
        aggregator: &RouteAggregator,
        policy: &UnroutablePolicy,
    ) -> Result<TripOutcome, EvaluationError> {
        match legs {
            Ok(legs) => match aggregator.aggregate(&legs) {
                RouteOutcome::Routed(estimate) => Ok(TripOutcome::Routed(estimate)),
                RouteOutcome::Unroutable { pair } => Ok(TripOutcome::Unroutable {
                    pair,
                    fallback: policy.fallback(),
                }),
            },
            Err(e) if e.is_recoverable() => {
                log::warn!("skipping trip {index}: {e}");
                Ok(TripOutcome::Skipped {
                    reason: e.to_string(),
                })
            }
            Err(source) => Err(EvaluationError::Leg { index, source }),
        }
    }
}
