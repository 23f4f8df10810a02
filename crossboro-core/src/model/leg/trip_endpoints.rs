use std::ops::Range;

use serde::{Deserialize, Serialize};

use crate::model::{
    feature::FeatureVector,
    layout::FeatureLayout,
    partition::{Borough, Superborough, SuperboroughPair},
};

use super::LegError;

/// the pickup and dropoff boroughs of a trip, read back from its feature vector.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub struct TripEndpoints {
    pub pickup: Borough,
    pub dropoff: Borough,
}

impl TripEndpoints {
    /// reads the borough one-hot segments of a feature vector. exactly one bit
    /// must be active in each segment.
    pub fn decode(
        features: &FeatureVector,
        layout: &FeatureLayout,
    ) -> Result<TripEndpoints, LegError> {
        if features.len() != layout.width {
            return Err(LegError::WidthMismatch {
                expected: layout.width,
                found: features.len(),
            });
        }
        let pu_index = single_active(features, &layout.pickup_borough, "pickup")?;
        let do_index = single_active(features, &layout.dropoff_borough, "dropoff")?;
        let pickup = layout
            .pickup_borough_at(pu_index)
            .ok_or(LegError::UnknownBoroughIndex(pu_index))?;
        let dropoff = layout
            .dropoff_borough_at(do_index)
            .ok_or(LegError::UnknownBoroughIndex(do_index))?;
        Ok(TripEndpoints { pickup, dropoff })
    }

    /// partition the trip starts in
    pub fn start(&self) -> Superborough {
        Superborough::of(self.pickup)
    }

    /// partition the trip ends in
    pub fn end(&self) -> Superborough {
        Superborough::of(self.dropoff)
    }

    pub fn pair(&self) -> SuperboroughPair {
        SuperboroughPair::new(self.start(), self.end())
    }

    pub fn is_crossing(&self) -> bool {
        self.start() != self.end()
    }
}

fn single_active(
    features: &FeatureVector,
    segment: &Range<usize>,
    name: &'static str,
) -> Result<usize, LegError> {
    match features.active_in(segment.clone()).as_slice() {
        [index] => Ok(*index),
        other => Err(LegError::AmbiguousBorough {
            segment: name,
            active: other.to_vec(),
        }),
    }
}
