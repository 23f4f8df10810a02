use crate::model::{
    feature::FeatureVector,
    geography::{Bridge, LocationId},
    partition::{Superborough, SuperboroughPair},
};

/// the two single-partition legs of a crossing trip through one bridge.
#[derive(Clone, Debug, PartialEq)]
pub struct LegPair {
    pub start: Superborough,
    pub end: Superborough,
    pub bridge: Bridge,
    /// bridge endpoint on the start side
    pub bridge_start: LocationId,
    /// bridge endpoint on the end side
    pub bridge_end: LocationId,
    /// pickup to bridge start, scored by the start partition's model
    pub leg1: FeatureVector,
    /// bridge end to dropoff, scored by the end partition's model
    pub leg2: FeatureVector,
}

/// every leg pair of one crossing trip. `pairs` is empty when no bridge connects
/// the start and end partitions.
#[derive(Clone, Debug, PartialEq)]
pub struct TripLegs {
    pub start: Superborough,
    pub end: Superborough,
    pub pairs: Vec<LegPair>,
}

impl TripLegs {
    pub fn pair(&self) -> SuperboroughPair {
        SuperboroughPair::new(self.start, self.end)
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }
}
