use std::collections::{HashMap, HashSet};

use crate::model::partition::{Borough, Superborough};

use super::{GeographyError, GeographyStore, LocationId};

/// lazily-filled cache of which zones belong to which borough. every borough is
/// queried from the store at most once per run.
#[derive(Clone, Debug, Default)]
pub struct RegionMembershipIndex {
    boroughs: HashMap<Borough, HashSet<LocationId>>,
    locations: HashMap<LocationId, Borough>,
}

impl RegionMembershipIndex {
    pub fn new() -> RegionMembershipIndex {
        RegionMembershipIndex::default()
    }

    /// loads the zones of a borough if they are not cached yet.
    pub fn prepare_borough<S: GeographyStore + ?Sized>(
        &mut self,
        store: &S,
        borough: Borough,
    ) -> Result<(), GeographyError> {
        if self.boroughs.contains_key(&borough) {
            return Ok(());
        }
        let members = store.locations_in_borough(borough)?;
        for location in members.iter() {
            if let Some(prev) = self.locations.insert(*location, borough) {
                if prev != borough {
                    return Err(GeographyError::InvalidData(format!(
                        "location {location} is listed in both {prev} and {borough}"
                    )));
                }
            }
        }
        log::debug!("cached {} locations for borough {borough}", members.len());
        self.boroughs.insert(borough, members);
        Ok(())
    }

    /// loads the zones of every borough of a superborough.
    pub fn prepare_superborough<S: GeographyStore + ?Sized>(
        &mut self,
        store: &S,
        superborough: Superborough,
    ) -> Result<(), GeographyError> {
        for borough in superborough.boroughs() {
            self.prepare_borough(store, *borough)?;
        }
        Ok(())
    }

    pub fn locations_in_borough<S: GeographyStore + ?Sized>(
        &mut self,
        store: &S,
        borough: Borough,
    ) -> Result<&HashSet<LocationId>, GeographyError> {
        self.prepare_borough(store, borough)?;
        self.boroughs
            .get(&borough)
            .ok_or_else(|| GeographyError::Query(format!("borough {borough} was not cached")))
    }

    /// all zones of a superborough, loading its boroughs on first use.
    pub fn locations_in_superborough<S: GeographyStore + ?Sized>(
        &mut self,
        store: &S,
        superborough: Superborough,
    ) -> Result<HashSet<LocationId>, GeographyError> {
        self.prepare_superborough(store, superborough)?;
        Ok(self.superborough_locations(superborough))
    }

    /// the zones of a superborough known so far. boroughs that were never
    /// prepared contribute nothing.
    pub fn superborough_locations(&self, superborough: Superborough) -> HashSet<LocationId> {
        superborough
            .boroughs()
            .iter()
            .filter_map(|b| self.boroughs.get(b))
            .flat_map(|members| members.iter().copied())
            .collect()
    }

    pub fn borough_of(&self, location: LocationId) -> Option<Borough> {
        self.locations.get(&location).copied()
    }

    /// partition of a zone among the boroughs loaded so far, or None (the
    /// sentinel) if the zone is not in any loaded borough.
    pub fn superborough_of(&self, location: LocationId) -> Option<Superborough> {
        self.borough_of(location).map(Superborough::of)
    }

    /// like [`RegionMembershipIndex::superborough_of`] but loads every borough first,
    /// so None means the zone truly belongs to no partition.
    pub fn partition_of<S: GeographyStore + ?Sized>(
        &mut self,
        store: &S,
        location: LocationId,
    ) -> Result<Option<Superborough>, GeographyError> {
        for borough in Borough::ALL {
            self.prepare_borough(store, borough)?;
        }
        Ok(self.superborough_of(location))
    }

    pub fn is_prepared(&self, superborough: Superborough) -> bool {
        superborough
            .boroughs()
            .iter()
            .all(|b| self.boroughs.contains_key(b))
    }
}
