mod error;
mod leg_pair;
mod leg_synthesizer;
mod trip_endpoints;

pub use error::LegError;
pub use leg_pair::{LegPair, TripLegs};
pub use leg_synthesizer::LegSynthesizer;
pub use trip_endpoints::TripEndpoints;
