use std::collections::{HashMap, HashSet};

use geo::Coord;

use crate::model::partition::{Superborough, SuperboroughPair};

use super::{Bridge, BridgeGraph, GeographyError, GeographyStore, LocationId, RegionMembershipIndex};

/// run-scoped view of the geography: the store plus the region and bridge caches
/// built on top of it, and the coordinate table loaded once at construction.
///
/// lookups through `&mut self` fill caches on demand. after [`CrossingGeography::prepare_all`]
/// every lookup can be answered through `&self`, which is what parallel evaluation relies on.
pub struct CrossingGeography<S: GeographyStore> {
    store: S,
    regions: RegionMembershipIndex,
    bridges: BridgeGraph,
    coordinates: HashMap<LocationId, Coord<f64>>,
}

impl<S: GeographyStore> CrossingGeography<S> {
    pub fn new(store: S) -> Result<CrossingGeography<S>, GeographyError> {
        let coordinates = store.coordinates()?;
        log::debug!("loaded {} zone coordinates", coordinates.len());
        Ok(CrossingGeography {
            store,
            regions: RegionMembershipIndex::new(),
            bridges: BridgeGraph::new(),
            coordinates,
        })
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn regions(&self) -> &RegionMembershipIndex {
        &self.regions
    }

    /// fills membership and bridge caches for one pair of superboroughs. bridges
    /// that cannot be used for leg synthesis are reported once, when first cached.
    pub fn prepare(&mut self, a: Superborough, b: Superborough) -> Result<(), GeographyError> {
        if self.is_prepared(a, b) {
            return Ok(());
        }
        self.regions.prepare_superborough(&self.store, a)?;
        self.regions.prepare_superborough(&self.store, b)?;
        self.bridges.prepare(&self.store, &mut self.regions, a, b)?;
        for bridge in self.unusable_bridges(a, b) {
            log::warn!(
                "bridge {bridge} between {a} and {b} lacks a borough or coordinate, trips will not cross it"
            );
        }
        Ok(())
    }

    /// cached bridges between two superboroughs with an endpoint missing a borough
    /// or a coordinate
    pub fn unusable_bridges(&self, a: Superborough, b: Superborough) -> Vec<Bridge> {
        self.crossings(a, b)
            .unwrap_or_default()
            .iter()
            .filter(|bridge| {
                [bridge.first, bridge.second].iter().any(|location| {
                    self.regions.borough_of(*location).is_none()
                        || self.coordinate(*location).is_none()
                })
            })
            .copied()
            .collect()
    }

    /// fills every cache so that the geography can be shared read-only.
    pub fn prepare_all(&mut self) -> Result<(), GeographyError> {
        for pair in SuperboroughPair::all_crossings() {
            self.prepare(pair.first(), pair.second())?;
        }
        Ok(())
    }

    pub fn is_prepared(&self, a: Superborough, b: Superborough) -> bool {
        self.regions.is_prepared(a)
            && self.regions.is_prepared(b)
            && self.bridges.cached(a, b).is_some()
    }

    /// bridges between two superboroughs, loading them on first use.
    pub fn bridges_between(
        &mut self,
        a: Superborough,
        b: Superborough,
    ) -> Result<&[Bridge], GeographyError> {
        self.prepare(a, b)?;
        self.bridges
            .bridges_between(&self.store, &mut self.regions, a, b)
    }

    /// cached bridges between two superboroughs, or None if the pair was never prepared.
    pub fn crossings(&self, a: Superborough, b: Superborough) -> Option<&[Bridge]> {
        self.bridges.cached(a, b)
    }

    /// zones of a superborough, loading them on first use.
    pub fn locations_in_superborough(
        &mut self,
        superborough: Superborough,
    ) -> Result<HashSet<LocationId>, GeographyError> {
        self.regions
            .locations_in_superborough(&self.store, superborough)
    }

    pub fn coordinate(&self, location: LocationId) -> Option<Coord<f64>> {
        self.coordinates.get(&location).copied()
    }
}
