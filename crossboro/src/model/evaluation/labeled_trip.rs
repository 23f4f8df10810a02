use crossboro_core::model::feature::FeatureVector;
use serde::{Deserialize, Serialize};

/// a crossing trip with its observed duration in seconds
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct LabeledTrip {
    pub features: FeatureVector,
    pub duration: f64,
}

impl LabeledTrip {
    pub fn new(features: FeatureVector, duration: f64) -> LabeledTrip {
        LabeledTrip { features, duration }
    }
}
