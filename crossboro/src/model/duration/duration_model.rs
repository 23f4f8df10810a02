use crossboro_core::model::feature::FeatureVector;

/// a trained trip duration regressor for one partition. implementations are
/// read-only after loading and may be shared across threads.
pub trait DurationModel: Send + Sync {
    /// predicted trip duration in seconds
    fn predict(&self, features: &FeatureVector) -> f64;

    /// short description used in logs
    fn describe(&self) -> String;
}
