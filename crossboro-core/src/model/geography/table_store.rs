use std::{
    collections::{HashMap, HashSet},
    path::Path,
};

use geo::Coord;
use itertools::Itertools;
use kdam::tqdm;
use serde::{de::DeserializeOwned, Deserialize, Serialize};

use crate::model::partition::Borough;

use super::{Bridge, GeographyError, GeographyStore, LocationId};

/// file locations of the geography tables
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct TableStoreConfig {
    /// CSV with columns `LocationID,Borough` (further columns are ignored)
    pub locations_file: String,
    /// CSV with columns `LocationID,x,y`
    pub coordinates_file: String,
    /// CSV with columns `LocationID1,LocationID2`
    pub bridges_file: String,
}

/// geography store backed by in-memory copies of the location, coordinate and
/// bridge tables. queries scan the tables, so repeated calls repeat the work.
#[derive(Clone, Debug, Default)]
pub struct TableGeographyStore {
    boroughs: HashMap<LocationId, Borough>,
    coordinates: HashMap<LocationId, Coord<f64>>,
    bridges: Vec<Bridge>,
}

#[derive(Deserialize)]
struct LocationRecord {
    #[serde(rename = "LocationID")]
    location_id: LocationId,
    #[serde(rename = "Borough")]
    borough: String,
}

#[derive(Deserialize)]
struct CoordinateRecord {
    #[serde(rename = "LocationID")]
    location_id: LocationId,
    x: f64,
    y: f64,
}

#[derive(Deserialize)]
struct BridgeRecord {
    #[serde(rename = "LocationID1")]
    first: LocationId,
    #[serde(rename = "LocationID2")]
    second: LocationId,
}

impl TableGeographyStore {
    pub fn new<L, C>(locations: L, coordinates: C, bridges: Vec<Bridge>) -> TableGeographyStore
    where
        L: IntoIterator<Item = (LocationId, Borough)>,
        C: IntoIterator<Item = (LocationId, Coord<f64>)>,
    {
        TableGeographyStore {
            boroughs: locations.into_iter().collect(),
            coordinates: coordinates.into_iter().collect(),
            bridges,
        }
    }

    pub fn n_locations(&self) -> usize {
        self.boroughs.len()
    }

    pub fn n_bridges(&self) -> usize {
        self.bridges.len()
    }

    fn borough_in(&self, location: LocationId, boroughs: &[Borough]) -> bool {
        self.boroughs
            .get(&location)
            .map(|b| boroughs.contains(b))
            .unwrap_or(false)
    }
}

impl GeographyStore for TableGeographyStore {
    fn bridges_between(
        &self,
        boroughs_a: &[Borough],
        boroughs_b: &[Borough],
    ) -> Result<Vec<Bridge>, GeographyError> {
        let result = self
            .bridges
            .iter()
            .filter(|b| {
                (self.borough_in(b.first, boroughs_a) && self.borough_in(b.second, boroughs_b))
                    || (self.borough_in(b.second, boroughs_a)
                        && self.borough_in(b.first, boroughs_b))
            })
            .copied()
            .collect_vec();
        Ok(result)
    }

    fn locations_in_borough(&self, borough: Borough) -> Result<HashSet<LocationId>, GeographyError> {
        let result = self
            .boroughs
            .iter()
            .filter(|(_, b)| **b == borough)
            .map(|(id, _)| *id)
            .collect();
        Ok(result)
    }

    fn coordinates(&self) -> Result<HashMap<LocationId, Coord<f64>>, GeographyError> {
        Ok(self.coordinates.clone())
    }
}

impl TryFrom<&TableStoreConfig> for TableGeographyStore {
    type Error = GeographyError;

    fn try_from(config: &TableStoreConfig) -> Result<Self, Self::Error> {
        let location_rows: Vec<LocationRecord> =
            read_records(Path::new(&config.locations_file), "read locations")?;
        let mut boroughs = HashMap::with_capacity(location_rows.len());
        for row in location_rows.into_iter() {
            match Borough::from_name(&row.borough) {
                Some(borough) => {
                    if let Some(prev) = boroughs.insert(row.location_id, borough) {
                        let msg = format!(
                            "location {} is listed in both {prev} and {borough}",
                            row.location_id
                        );
                        return Err(GeographyError::InvalidData(msg));
                    }
                }
                None => log::debug!(
                    "location {} with borough '{}' is outside of every partition",
                    row.location_id,
                    row.borough
                ),
            }
        }

        let coordinate_rows: Vec<CoordinateRecord> =
            read_records(Path::new(&config.coordinates_file), "read coordinates")?;
        let coordinates = coordinate_rows
            .into_iter()
            .map(|r| (r.location_id, Coord { x: r.x, y: r.y }))
            .collect_vec();

        let bridge_rows: Vec<BridgeRecord> =
            read_records(Path::new(&config.bridges_file), "read bridges")?;
        let bridges = bridge_rows
            .into_iter()
            .map(|r| Bridge::new(r.first, r.second))
            .collect_vec();

        let store = TableGeographyStore::new(boroughs, coordinates, bridges);
        log::info!(
            "loaded geography tables with {} locations and {} bridges",
            store.n_locations(),
            store.n_bridges()
        );
        Ok(store)
    }
}

/// reads every row of a CSV file with headers into records of type T
fn read_records<T: DeserializeOwned>(path: &Path, desc: &str) -> Result<Vec<T>, GeographyError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_path(path)
        .map_err(|e| GeographyError::Read {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
    let mut rows = vec![];
    let row_iter = tqdm!(reader.deserialize::<T>().enumerate(), desc = desc);
    for (idx, row) in row_iter {
        let record = row.map_err(|e| GeographyError::Deserialize {
            path: path.to_path_buf(),
            row: idx,
            message: e.to_string(),
        })?;
        rows.push(record);
    }
    eprintln!();
    Ok(rows)
}

#[cfg(test)]
mod test {
    use super::*;
    use std::path::PathBuf;

    fn test_config() -> TableStoreConfig {
        let dir = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("test");
        let path = |f: &str| dir.join(f).to_string_lossy().to_string();
        TableStoreConfig {
            locations_file: path("locations.csv"),
            coordinates_file: path("coordinates.csv"),
            bridges_file: path("bridges.csv"),
        }
    }

    #[test]
    fn test_read_tables() {
        let store = TableGeographyStore::try_from(&test_config()).expect("test tables should load");
        // the "Unknown" zone is not assigned a borough
        assert_eq!(store.n_locations(), 11);
        assert_eq!(store.n_bridges(), 5);
        let manhattan = store.locations_in_borough(Borough::Manhattan).unwrap();
        assert_eq!(manhattan, HashSet::from([4, 87, 140, 194]));
        let coords = store.coordinates().unwrap();
        assert!((coords[&66].x - -73.9860).abs() < 1e-9);
    }

    #[test]
    fn test_bridges_between_boroughs_matches_either_direction() {
        let store = TableGeographyStore::try_from(&test_config()).unwrap();
        let manhattan = [Borough::Manhattan, Borough::Ewr, Borough::Bronx];
        let bkq = [Borough::Brooklyn, Borough::Queens];
        let forward = store.bridges_between(&manhattan, &bkq).unwrap();
        let backward = store.bridges_between(&bkq, &manhattan).unwrap();
        assert_eq!(forward, backward);
        assert_eq!(
            forward,
            vec![Bridge::new(87, 66), Bridge::new(140, 193), Bridge::new(194, 7)]
        );
    }

    #[test]
    fn test_missing_file_is_read_error() {
        let mut config = test_config();
        config.bridges_file = String::from("does/not/exist.csv");
        match TableGeographyStore::try_from(&config) {
            Err(GeographyError::Read { path, .. }) => {
                assert!(path.ends_with("exist.csv"))
            }
            other => panic!("expected read error, found {other:?}"),
        }
    }
}
