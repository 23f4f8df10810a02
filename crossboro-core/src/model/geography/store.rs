use std::collections::{HashMap, HashSet};

use geo::Coord;

use crate::model::partition::Borough;

use super::{Bridge, GeographyError, LocationId};

/// read-only query surface over the geography tables. implementations are
/// expected to hit their backing storage on every call; callers cache results
/// through [`super::CrossingGeography`].
pub trait GeographyStore: Send + Sync {
    /// all bridges with one endpoint in a zone of `boroughs_a` and the other in a zone of `boroughs_b`.
    fn bridges_between(
        &self,
        boroughs_a: &[Borough],
        boroughs_b: &[Borough],
    ) -> Result<Vec<Bridge>, GeographyError>;

    /// all zones belonging to a borough
    fn locations_in_borough(&self, borough: Borough) -> Result<HashSet<LocationId>, GeographyError>;

    /// the (longitude, latitude) coordinate of every zone that has one
    fn coordinates(&self) -> Result<HashMap<LocationId, Coord<f64>>, GeographyError>;
}
