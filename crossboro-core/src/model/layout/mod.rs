mod feature_layout;
mod layout_flags;
mod trip_features;

pub use feature_layout::{
    FeatureLayout, BASE_COVARIATES, DATETIME_ONE_HOT_WIDTH, LOCATION_ID_SLOTS,
    WEEKDAY_ONE_HOT_WIDTH,
};
pub use layout_flags::{LayoutFlags, LayoutTag, LAYOUT_VERSION};
pub use trip_features::{TripEndpoint, TripFeatures};
