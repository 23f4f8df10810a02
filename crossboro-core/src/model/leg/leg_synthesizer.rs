use crate::model::{
    feature::FeatureVector,
    geography::{Bridge, CrossingGeography, GeographyStore, LocationId, RegionMembershipIndex},
    layout::FeatureLayout,
    partition::{Superborough, SuperboroughPair},
};

use super::{LegError, LegPair, TripEndpoints, TripLegs};

/// splits crossing trips at bridges into pairs of single-partition legs.
///
/// for each bridge, leg1 keeps the trip's pickup and ends at the bridge start, while
/// leg2 starts at the bridge end and keeps the trip's dropoff. all other features,
/// including the location id bits, are copied unchanged.
#[derive(Clone, Debug)]
pub struct LegSynthesizer {
    layout: FeatureLayout,
}

impl LegSynthesizer {
    pub fn new(layout: FeatureLayout) -> LegSynthesizer {
        LegSynthesizer { layout }
    }

    pub fn layout(&self) -> &FeatureLayout {
        &self.layout
    }

    /// the trip's pickup and dropoff boroughs, failing unless the trip crosses partitions.
    pub fn decode(&self, features: &FeatureVector) -> Result<TripEndpoints, LegError> {
        let endpoints = TripEndpoints::decode(features, &self.layout)?;
        if !endpoints.is_crossing() {
            return Err(LegError::NotCrossPartition(endpoints.start()));
        }
        Ok(endpoints)
    }

    /// builds the legs of a trip, filling geography caches as needed.
    pub fn synthesize<S: GeographyStore>(
        &self,
        features: &FeatureVector,
        geography: &mut CrossingGeography<S>,
    ) -> Result<TripLegs, LegError> {
        let endpoints = self.decode(features)?;
        geography.prepare(endpoints.start(), endpoints.end())?;
        self.build(features, endpoints, geography)
    }

    /// builds the legs of a trip against caches that were filled earlier, see
    /// [`CrossingGeography::prepare_all`].
    pub fn synthesize_prepared<S: GeographyStore>(
        &self,
        features: &FeatureVector,
        geography: &CrossingGeography<S>,
    ) -> Result<TripLegs, LegError> {
        let endpoints = self.decode(features)?;
        self.build(features, endpoints, geography)
    }

    fn build<S: GeographyStore>(
        &self,
        features: &FeatureVector,
        endpoints: TripEndpoints,
        geography: &CrossingGeography<S>,
    ) -> Result<TripLegs, LegError> {
        let (start, end) = (endpoints.start(), endpoints.end());
        if !geography.is_prepared(start, end) {
            return Err(LegError::NotPrepared(SuperboroughPair::new(start, end)));
        }
        let bridges = geography
            .crossings(start, end)
            .ok_or(LegError::NotPrepared(SuperboroughPair::new(start, end)))?;

        let mut pairs = Vec::with_capacity(bridges.len());
        for bridge in bridges.iter() {
            match self.leg_pair(features, start, end, bridge, geography) {
                Ok(pair) => pairs.push(pair),
                Err(e) if e.is_recoverable() => {
                    log::debug!("bridge {bridge} is not a candidate: {e}")
                }
                Err(e) => return Err(e),
            }
        }
        Ok(TripLegs { start, end, pairs })
    }

    /// the legs through a single bridge. a bridge endpoint without a borough or a
    /// coordinate fails with a recoverable error, dropping only this candidate.
    fn leg_pair<S: GeographyStore>(
        &self,
        features: &FeatureVector,
        start: Superborough,
        end: Superborough,
        bridge: &Bridge,
        geography: &CrossingGeography<S>,
    ) -> Result<LegPair, LegError> {
        let regions = geography.regions();
        let (bridge_start, bridge_end) = orient(bridge, start, regions);
        let start_borough = regions
            .borough_of(bridge_start)
            .ok_or(LegError::UnresolvedBridgeRegion(*bridge))?;
        let end_borough = regions
            .borough_of(bridge_end)
            .ok_or(LegError::UnresolvedBridgeRegion(*bridge))?;
        let start_coord = geography
            .coordinate(bridge_start)
            .ok_or(LegError::MissingCoordinate(bridge_start))?;
        let end_coord = geography
            .coordinate(bridge_end)
            .ok_or(LegError::MissingCoordinate(bridge_end))?;

        let mut leg1 = features.clone();
        self.layout.set_dropoff_borough(&mut leg1, start_borough)?;
        self.layout.set_dropoff_coordinate(&mut leg1, start_coord)?;

        let mut leg2 = features.clone();
        self.layout.set_pickup_borough(&mut leg2, end_borough)?;
        self.layout.set_pickup_coordinate(&mut leg2, end_coord)?;

        Ok(LegPair {
            start,
            end,
            bridge: *bridge,
            bridge_start,
            bridge_end,
            leg1,
            leg2,
        })
    }
}

/// (bridge start, bridge end). the first endpoint is checked first: if it lies in
/// the start partition it is the bridge start, otherwise the roles swap.
fn orient(
    bridge: &Bridge,
    start: Superborough,
    regions: &RegionMembershipIndex,
) -> (LocationId, LocationId) {
    if regions.superborough_of(bridge.first) == Some(start) {
        (bridge.first, bridge.second)
    } else {
        (bridge.second, bridge.first)
    }
}
