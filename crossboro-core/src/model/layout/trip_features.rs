use geo::Coord;
use serde::{Deserialize, Serialize};

use crate::model::{
    feature::{FeatureError, FeatureVector},
    partition::Borough,
};

use super::FeatureLayout;

/// one end of a trip in semantic form
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq)]
pub struct TripEndpoint {
    pub location_id: u32,
    pub borough: Borough,
    pub coordinate: Coord<f64>,
}

/// a trip in semantic form. encoding it through a [`FeatureLayout`] writes the
/// same positions that the leg synthesizer later reads back.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct TripFeatures {
    /// leading covariates, already encoded for the layout's flags
    pub covariates: Vec<f32>,
    pub pickup: TripEndpoint,
    pub dropoff: TripEndpoint,
}

impl TripFeatures {
    pub fn encode(&self, layout: &FeatureLayout) -> Result<FeatureVector, FeatureError> {
        if self.covariates.len() != layout.covariates.len() {
            return Err(FeatureError::CovariateCount {
                expected: layout.covariates.len(),
                found: self.covariates.len(),
            });
        }
        let mut features = layout.empty_vector();
        for (offset, value) in self.covariates.iter().enumerate() {
            if *value != 0.0 || !features.is_sparse() {
                features.set(layout.covariates.start + offset, *value)?;
            }
        }
        layout.set_pickup_coordinate(&mut features, self.pickup.coordinate)?;
        layout.set_dropoff_coordinate(&mut features, self.dropoff.coordinate)?;
        layout.set_pickup_borough(&mut features, self.pickup.borough)?;
        layout.set_dropoff_borough(&mut features, self.dropoff.borough)?;
        layout.set_location_ids(
            &mut features,
            self.pickup.location_id,
            self.dropoff.location_id,
        )?;
        Ok(features)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::model::layout::LayoutFlags;

    fn trip(n_covariates: usize) -> TripFeatures {
        TripFeatures {
            covariates: vec![1.0; n_covariates],
            pickup: TripEndpoint {
                location_id: 43,
                borough: Borough::Manhattan,
                coordinate: Coord { x: -73.96, y: 40.78 },
            },
            dropoff: TripEndpoint {
                location_id: 181,
                borough: Borough::Brooklyn,
                coordinate: Coord { x: -73.98, y: 40.67 },
            },
        }
    }

    #[test]
    fn test_encode_writes_layout_positions() {
        for flags in LayoutFlags::all() {
            let layout = FeatureLayout::new(flags);
            let fv = trip(layout.covariates.len()).encode(&layout).unwrap();
            assert_eq!(fv.len(), layout.width);
            assert_eq!(fv.is_sparse(), flags.is_sparse());
            assert_eq!(
                fv.active_in(layout.pickup_borough.clone()),
                vec![layout.pickup_borough_index(Borough::Manhattan)]
            );
            assert_eq!(
                fv.active_in(layout.dropoff_borough.clone()),
                vec![layout.dropoff_borough_index(Borough::Brooklyn)]
            );
            let pu = layout.coordinate_at(&fv, layout.pickup_coordinate).unwrap();
            assert!((pu.y - 40.78).abs() < 1e-4);
        }
    }

    #[test]
    fn test_covariate_count_must_match() {
        let layout = FeatureLayout::new(LayoutFlags::default());
        let result = trip(3).encode(&layout);
        assert_eq!(
            result,
            Err(FeatureError::CovariateCount {
                expected: 6,
                found: 3
            })
        );
    }
}
