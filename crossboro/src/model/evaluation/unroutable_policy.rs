use serde::{Deserialize, Serialize};

/// how trips with no bridge between their partitions enter the error metric.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Default)]
#[serde(rename_all = "snake_case", tag = "type")]
pub enum UnroutablePolicy {
    /// count the trip as unroutable and leave it out of the RMSE
    #[default]
    Exclude,
    /// score the trip as if this duration had been predicted
    Fallback { duration: f64 },
}

impl UnroutablePolicy {
    /// the duration to score an unroutable trip with, if any
    pub fn fallback(&self) -> Option<f64> {
        match self {
            UnroutablePolicy::Exclude => None,
            UnroutablePolicy::Fallback { duration } => Some(*duration),
        }
    }
}

impl std::fmt::Display for UnroutablePolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UnroutablePolicy::Exclude => write!(f, "exclude"),
            UnroutablePolicy::Fallback { duration } => write!(f, "fallback({duration})"),
        }
    }
}
