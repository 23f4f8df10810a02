use crate::model::{
    feature::FeatureError,
    geography::{Bridge, GeographyError, LocationId},
    partition::{Superborough, SuperboroughPair},
};

#[derive(thiserror::Error, Debug)]
pub enum LegError {
    #[error("expected exactly one active {segment} borough bit, found {active:?}")]
    AmbiguousBorough {
        segment: &'static str,
        active: Vec<usize>,
    },
    #[error("feature index {0} does not name a borough")]
    UnknownBoroughIndex(usize),
    #[error("trip starts and ends in superborough {0}, legs only exist for crossing trips")]
    NotCrossPartition(Superborough),
    #[error("cannot resolve the borough of an endpoint of bridge {0}")]
    UnresolvedBridgeRegion(Bridge),
    #[error("location {0} has no coordinate")]
    MissingCoordinate(LocationId),
    #[error("feature vector has width {found}, layout expects {expected}")]
    WidthMismatch { expected: usize, found: usize },
    #[error("crossings for {0} were not prepared before read-only synthesis")]
    NotPrepared(SuperboroughPair),
    #[error(transparent)]
    Feature(#[from] FeatureError),
    #[error(transparent)]
    Geography(#[from] GeographyError),
}

impl LegError {
    /// true when the error concerns one trip only, so that the trip can be
    /// skipped and evaluation can continue. layout, cache and store failures
    /// affect every trip and are not recoverable.
    pub fn is_recoverable(&self) -> bool {
        match self {
            LegError::AmbiguousBorough { .. }
            | LegError::UnknownBoroughIndex(_)
            | LegError::NotCrossPartition(_)
            | LegError::UnresolvedBridgeRegion(_)
            | LegError::MissingCoordinate(_) => true,
            LegError::WidthMismatch { .. }
            | LegError::NotPrepared(_)
            | LegError::Feature(_)
            | LegError::Geography(_) => false,
        }
    }
}
