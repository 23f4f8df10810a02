use crossboro_core::model::leg::TripLegs;
use itertools::Itertools;
use ordered_float::OrderedFloat;

use crate::model::duration::ModelEnsemble;

use super::{RouteEstimate, RouteOutcome};

/// scores every leg pair of a trip with the partition models and keeps the
/// fastest bridge.
#[derive(Clone, Debug)]
pub struct RouteAggregator {
    ensemble: ModelEnsemble,
}

impl RouteAggregator {
    pub fn new(ensemble: ModelEnsemble) -> RouteAggregator {
        RouteAggregator { ensemble }
    }

    pub fn ensemble(&self) -> &ModelEnsemble {
        &self.ensemble
    }

    /// summed leg durations per candidate bridge, in bridge order
    pub fn candidate_durations(&self, legs: &TripLegs) -> Vec<f64> {
        legs.pairs
            .iter()
            .map(|pair| {
                self.ensemble.predict(pair.start, &pair.leg1)
                    + self.ensemble.predict(pair.end, &pair.leg2)
            })
            .collect_vec()
    }

    /// minimum summed duration over all bridges. ties keep the earliest bridge.
    pub fn aggregate(&self, legs: &TripLegs) -> RouteOutcome {
        let durations = self.candidate_durations(legs);
        let fastest = durations
            .iter()
            .enumerate()
            .min_by_key(|(_, d)| OrderedFloat(**d));
        let slowest = durations.iter().copied().map(OrderedFloat).max();
        match (fastest, slowest) {
            (Some((idx, duration)), Some(slowest)) => RouteOutcome::Routed(RouteEstimate {
                duration: *duration,
                bridge: legs.pairs[idx].bridge,
                slowest: slowest.into_inner(),
                n_candidates: durations.len(),
            }),
            _ => RouteOutcome::Unroutable { pair: legs.pair() },
        }
    }
}
