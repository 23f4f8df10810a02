use std::collections::{HashMap, HashSet};

use itertools::Itertools;

use crate::model::partition::{Superborough, SuperboroughPair};

use super::{Bridge, GeographyError, GeographyStore, RegionMembershipIndex};

/// memoized bridge crossings between pairs of superboroughs, keyed by the
/// canonical (sorted) pair so that both directions share one entry.
#[derive(Clone, Debug, Default)]
pub struct BridgeGraph {
    crossings: HashMap<SuperboroughPair, Vec<Bridge>>,
}

impl BridgeGraph {
    pub fn new() -> BridgeGraph {
        BridgeGraph::default()
    }

    /// fills the cache entry for a pair of superboroughs. the store is queried
    /// once per pair, and never for a pair of identical superboroughs.
    pub fn prepare<S: GeographyStore + ?Sized>(
        &mut self,
        store: &S,
        regions: &mut RegionMembershipIndex,
        a: Superborough,
        b: Superborough,
    ) -> Result<(), GeographyError> {
        let pair = SuperboroughPair::new(a, b);
        if self.crossings.contains_key(&pair) {
            return Ok(());
        }
        if !pair.is_crossing() {
            self.crossings.insert(pair, vec![]);
            return Ok(());
        }
        let (first, second) = (pair.first(), pair.second());
        regions.prepare_superborough(store, first)?;
        regions.prepare_superborough(store, second)?;
        let members_first = regions.superborough_locations(first);
        let members_second = regions.superborough_locations(second);

        let candidates = store.bridges_between(first.boroughs(), second.boroughs())?;
        let n_candidates = candidates.len();
        let mut seen = HashSet::new();
        let bridges = candidates
            .into_iter()
            .filter(|b| {
                let forward =
                    members_first.contains(&b.first) && members_second.contains(&b.second);
                let backward =
                    members_first.contains(&b.second) && members_second.contains(&b.first);
                forward || backward
            })
            .filter(|b| seen.insert(b.key()))
            .collect_vec();

        log::debug!(
            "superborough pair {pair} has {} bridges ({} returned by store)",
            bridges.len(),
            n_candidates
        );
        self.crossings.insert(pair, bridges);
        Ok(())
    }

    /// cached crossings between two superboroughs in either order, or None if the pair
    /// was never prepared.
    pub fn cached(&self, a: Superborough, b: Superborough) -> Option<&[Bridge]> {
        self.crossings
            .get(&SuperboroughPair::new(a, b))
            .map(|v| v.as_slice())
    }

    /// crossings between two superboroughs, querying the store on a cache miss.
    /// an empty slice means nothing connects the pair.
    pub fn bridges_between<S: GeographyStore + ?Sized>(
        &mut self,
        store: &S,
        regions: &mut RegionMembershipIndex,
        a: Superborough,
        b: Superborough,
    ) -> Result<&[Bridge], GeographyError> {
        self.prepare(store, regions, a, b)?;
        let pair = SuperboroughPair::new(a, b);
        self.crossings
            .get(&pair)
            .map(|v| v.as_slice())
            .ok_or_else(|| GeographyError::Query(format!("crossings for {pair} were not cached")))
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::model::{
        geography::{LocationId, TableGeographyStore},
        partition::Borough,
    };
    use geo::Coord;
    use std::{
        collections::HashMap,
        sync::atomic::{AtomicUsize, Ordering},
    };

    /// wraps a store and counts bridge queries
    struct CountingStore {
        inner: TableGeographyStore,
        bridge_queries: AtomicUsize,
    }

    impl GeographyStore for CountingStore {
        fn bridges_between(
            &self,
            boroughs_a: &[Borough],
            boroughs_b: &[Borough],
        ) -> Result<Vec<Bridge>, GeographyError> {
            self.bridge_queries.fetch_add(1, Ordering::SeqCst);
            self.inner.bridges_between(boroughs_a, boroughs_b)
        }

        fn locations_in_borough(
            &self,
            borough: Borough,
        ) -> Result<HashSet<LocationId>, GeographyError> {
            self.inner.locations_in_borough(borough)
        }

        fn coordinates(&self) -> Result<HashMap<LocationId, Coord<f64>>, GeographyError> {
            self.inner.coordinates()
        }
    }

    fn counting_store() -> CountingStore {
        let inner = TableGeographyStore::new(
            vec![
                (4, Borough::Manhattan),
                (168, Borough::Bronx),
                (194, Borough::Manhattan),
                (7, Borough::Queens),
                (66, Borough::Brooklyn),
                (6, Borough::StatenIsland),
            ],
            vec![],
            vec![
                Bridge::new(4, 66),
                Bridge::new(7, 194),
                // both endpoints in superborough 1
                Bridge::new(194, 168),
                // same crossing listed twice, reversed
                Bridge::new(66, 4),
            ],
        );
        CountingStore {
            inner,
            bridge_queries: AtomicUsize::new(0),
        }
    }

    #[test]
    fn test_bridges_are_symmetric_and_queried_once() {
        let store = counting_store();
        let mut regions = RegionMembershipIndex::new();
        let mut graph = BridgeGraph::new();
        let sb1 = Superborough::ManhattanEwrBronx;
        let sb2 = Superborough::BrooklynQueens;
        let forward = graph
            .bridges_between(&store, &mut regions, sb1, sb2)
            .unwrap()
            .to_vec();
        let backward = graph
            .bridges_between(&store, &mut regions, sb2, sb1)
            .unwrap()
            .to_vec();
        assert_eq!(forward, backward);
        assert_eq!(forward, vec![Bridge::new(4, 66), Bridge::new(7, 194)]);
        assert_eq!(store.bridge_queries.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_unconnected_pair_is_empty() {
        let store = counting_store();
        let mut regions = RegionMembershipIndex::new();
        let mut graph = BridgeGraph::new();
        let bridges = graph
            .bridges_between(
                &store,
                &mut regions,
                Superborough::ManhattanEwrBronx,
                Superborough::StatenIsland,
            )
            .unwrap();
        assert!(bridges.is_empty());
    }

    #[test]
    fn test_same_partition_skips_store() {
        let store = counting_store();
        let mut regions = RegionMembershipIndex::new();
        let mut graph = BridgeGraph::new();
        let sb = Superborough::BrooklynQueens;
        assert!(graph
            .bridges_between(&store, &mut regions, sb, sb)
            .unwrap()
            .is_empty());
        assert_eq!(store.bridge_queries.load(Ordering::SeqCst), 0);
        assert!(graph.cached(sb, sb).is_some());
        assert!(graph.cached(sb, Superborough::StatenIsland).is_none());
    }
}
