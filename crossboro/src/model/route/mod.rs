mod route_aggregator;
mod route_outcome;

pub use route_aggregator::RouteAggregator;
pub use route_outcome::{RouteEstimate, RouteOutcome};
