mod bridge;
mod bridge_graph;
mod crossing_geography;
mod error;
mod region_index;
mod store;
mod table_store;

pub use bridge::{Bridge, LocationId};
pub use bridge_graph::BridgeGraph;
pub use crossing_geography::CrossingGeography;
pub use error::GeographyError;
pub use region_index::RegionMembershipIndex;
pub use store::GeographyStore;
pub use table_store::{TableGeographyStore, TableStoreConfig};
