use std::ops::Range;

use geo::Coord;

use crate::model::{
    feature::{FeatureError, FeatureVector},
    partition::{Borough, BOROUGH_SLOTS},
};

use super::LayoutFlags;

/// covariates that precede the coordinates when nothing is one-hot encoded
pub const BASE_COVARIATES: usize = 6;
/// extra covariate columns added by one-hot encoding the weekday
pub const WEEKDAY_ONE_HOT_WIDTH: usize = 6;
/// extra covariate columns added by one-hot encoding date and time of day
pub const DATETIME_ONE_HOT_WIDTH: usize = 182;
/// slots in each location id one-hot segment. taxi zone ids run from 1 to 265.
pub const LOCATION_ID_SLOTS: usize = 265;

/// positional schema of a trip feature vector for one [`LayoutFlags`] combination.
///
/// the vector is laid out as:
///
/// ```text
/// [ covariates | pu lon, pu lat | do lon, do lat | pu borough x6 | do borough x6 | pu location x265 | do location x265 ]
/// ```
///
/// where the location segments only exist when location ids are encoded. since they
/// trail the borough segments, the borough bits are the 4th and 3rd active entries
/// from the end of a vector with location ids and the last two without.
///
/// this is the only place offsets are computed. it is built once per run and shared
/// by everything that reads or writes vectors.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FeatureLayout {
    pub flags: LayoutFlags,
    pub covariates: Range<usize>,
    /// index of the pickup longitude. the latitude follows it.
    pub pickup_coordinate: usize,
    /// index of the dropoff longitude. the latitude follows it.
    pub dropoff_coordinate: usize,
    pub pickup_borough: Range<usize>,
    pub dropoff_borough: Range<usize>,
    pub pickup_location: Option<Range<usize>>,
    pub dropoff_location: Option<Range<usize>>,
    /// total dimension of the vector
    pub width: usize,
}

impl FeatureLayout {
    pub fn new(flags: LayoutFlags) -> FeatureLayout {
        let mut n_covariates = BASE_COVARIATES;
        if flags.weekdays_one_hot {
            n_covariates += WEEKDAY_ONE_HOT_WIDTH;
        }
        if flags.datetime_one_hot {
            n_covariates += DATETIME_ONE_HOT_WIDTH;
        }
        let pickup_coordinate = n_covariates;
        let dropoff_coordinate = pickup_coordinate + 2;
        let pickup_borough = segment(dropoff_coordinate + 2, BOROUGH_SLOTS);
        let dropoff_borough = segment(pickup_borough.end, BOROUGH_SLOTS);
        let (pickup_location, dropoff_location, width) = if flags.location_ids {
            let pu = segment(dropoff_borough.end, LOCATION_ID_SLOTS);
            let dou = segment(pu.end, LOCATION_ID_SLOTS);
            let width = dou.end;
            (Some(pu), Some(dou), width)
        } else {
            (None, None, dropoff_borough.end)
        };
        FeatureLayout {
            flags,
            covariates: 0..n_covariates,
            pickup_coordinate,
            dropoff_coordinate,
            pickup_borough,
            dropoff_borough,
            pickup_location,
            dropoff_location,
            width,
        }
    }

    /// position of a borough's bit within the pickup borough segment
    pub fn pickup_borough_index(&self, borough: Borough) -> usize {
        self.pickup_borough.start + borough.label() - 1
    }

    /// position of a borough's bit within the dropoff borough segment
    pub fn dropoff_borough_index(&self, borough: Borough) -> usize {
        self.dropoff_borough.start + borough.label() - 1
    }

    /// inverse of [`FeatureLayout::pickup_borough_index`]
    pub fn pickup_borough_at(&self, index: usize) -> Option<Borough> {
        borough_at(&self.pickup_borough, index)
    }

    /// inverse of [`FeatureLayout::dropoff_borough_index`]
    pub fn dropoff_borough_at(&self, index: usize) -> Option<Borough> {
        borough_at(&self.dropoff_borough, index)
    }

    /// activates exactly one pickup borough bit, clearing the rest of the segment.
    pub fn set_pickup_borough(
        &self,
        features: &mut FeatureVector,
        borough: Borough,
    ) -> Result<(), FeatureError> {
        set_one_hot(features, &self.pickup_borough, self.pickup_borough_index(borough))
    }

    /// activates exactly one dropoff borough bit, clearing the rest of the segment.
    pub fn set_dropoff_borough(
        &self,
        features: &mut FeatureVector,
        borough: Borough,
    ) -> Result<(), FeatureError> {
        set_one_hot(features, &self.dropoff_borough, self.dropoff_borough_index(borough))
    }

    pub fn set_pickup_coordinate(
        &self,
        features: &mut FeatureVector,
        coord: Coord<f64>,
    ) -> Result<(), FeatureError> {
        features.set(self.pickup_coordinate, coord.x as f32)?;
        features.set(self.pickup_coordinate + 1, coord.y as f32)
    }

    pub fn set_dropoff_coordinate(
        &self,
        features: &mut FeatureVector,
        coord: Coord<f64>,
    ) -> Result<(), FeatureError> {
        features.set(self.dropoff_coordinate, coord.x as f32)?;
        features.set(self.dropoff_coordinate + 1, coord.y as f32)
    }

    /// activates the pickup and dropoff location id bits. a no-op when the layout
    /// does not include location ids. ids outside of [1, 265] are out of bounds.
    pub fn set_location_ids(
        &self,
        features: &mut FeatureVector,
        pickup: u32,
        dropoff: u32,
    ) -> Result<(), FeatureError> {
        if let (Some(pu), Some(dou)) = (&self.pickup_location, &self.dropoff_location) {
            set_one_hot(features, pu, location_index(pu, pickup)?)?;
            set_one_hot(features, dou, location_index(dou, dropoff)?)?;
        }
        Ok(())
    }

    /// reads back a coordinate pair starting at some index
    pub fn coordinate_at(&self, features: &FeatureVector, index: usize) -> Option<Coord<f64>> {
        let x = features.get(index)?;
        let y = features.get(index + 1)?;
        Some(Coord {
            x: x as f64,
            y: y as f64,
        })
    }

    /// an empty vector of the right width, dense or sparse following the flags.
    pub fn empty_vector(&self) -> FeatureVector {
        if self.flags.is_sparse() {
            FeatureVector::Sparse(crate::model::feature::SparseFeatures::new(self.width))
        } else {
            FeatureVector::Dense(vec![0.0; self.width])
        }
    }
}

impl From<LayoutFlags> for FeatureLayout {
    fn from(flags: LayoutFlags) -> Self {
        FeatureLayout::new(flags)
    }
}

fn segment(start: usize, width: usize) -> Range<usize> {
    start..start + width
}

fn borough_at(segment: &Range<usize>, index: usize) -> Option<Borough> {
    if segment.contains(&index) {
        Borough::from_label(index - segment.start + 1)
    } else {
        None
    }
}

fn location_index(segment: &Range<usize>, location_id: u32) -> Result<usize, FeatureError> {
    let offset = (location_id as usize)
        .checked_sub(1)
        .filter(|o| *o < segment.len())
        .ok_or(FeatureError::IndexOutOfBounds {
            index: segment.start + location_id as usize,
            len: segment.end,
        })?;
    Ok(segment.start + offset)
}

fn set_one_hot(
    features: &mut FeatureVector,
    segment: &Range<usize>,
    index: usize,
) -> Result<(), FeatureError> {
    for active in features.active_in(segment.clone()) {
        features.clear(active)?;
    }
    features.set(index, 1.0)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_offsets_without_one_hot() {
        let layout = FeatureLayout::new(LayoutFlags::new(false, false, false));
        assert_eq!(layout.covariates, 0..6);
        assert_eq!(layout.pickup_coordinate, 6);
        assert_eq!(layout.dropoff_coordinate, 8);
        assert_eq!(layout.pickup_borough, 10..16);
        assert_eq!(layout.dropoff_borough, 16..22);
        assert_eq!(layout.width, 22);
        assert!(layout.pickup_location.is_none());
    }

    #[test]
    fn test_offsets_shift_with_one_hot_blocks() {
        let layout = FeatureLayout::new(LayoutFlags::new(true, true, true));
        let extra = WEEKDAY_ONE_HOT_WIDTH + DATETIME_ONE_HOT_WIDTH;
        assert_eq!(layout.pickup_coordinate, 6 + extra);
        assert_eq!(layout.pickup_borough.start, 10 + extra);
        assert_eq!(layout.dropoff_borough.start, 16 + extra);
        assert_eq!(layout.pickup_location, Some(22 + extra..22 + extra + LOCATION_ID_SLOTS));
        assert_eq!(layout.width, 22 + extra + 2 * LOCATION_ID_SLOTS);
    }

    #[test]
    fn test_borough_index_inverse() {
        for flags in LayoutFlags::all() {
            let layout = FeatureLayout::new(flags);
            for borough in Borough::ALL {
                let pu = layout.pickup_borough_index(borough);
                let dou = layout.dropoff_borough_index(borough);
                assert_eq!(layout.pickup_borough_at(pu), Some(borough));
                assert_eq!(layout.dropoff_borough_at(dou), Some(borough));
                assert_eq!(layout.pickup_borough_at(dou), None);
            }
        }
    }

    #[test]
    fn test_borough_bits_trail_from_end() {
        let layout = FeatureLayout::new(LayoutFlags::new(false, true, true));
        let mut fv = layout.empty_vector();
        layout
            .set_pickup_coordinate(&mut fv, Coord { x: -73.9, y: 40.7 })
            .unwrap();
        layout
            .set_dropoff_coordinate(&mut fv, Coord { x: -73.8, y: 40.6 })
            .unwrap();
        layout.set_pickup_borough(&mut fv, Borough::Manhattan).unwrap();
        layout.set_dropoff_borough(&mut fv, Borough::Queens).unwrap();
        layout.set_location_ids(&mut fv, 230, 132).unwrap();
        let active = fv.active_indices();
        let n = active.len();
        assert_eq!(active[n - 4], layout.pickup_borough_index(Borough::Manhattan));
        assert_eq!(active[n - 3], layout.dropoff_borough_index(Borough::Queens));
    }

    #[test]
    fn test_set_one_hot_replaces_previous_bit() {
        let layout = FeatureLayout::new(LayoutFlags::default());
        let mut fv = layout.empty_vector();
        layout.set_dropoff_borough(&mut fv, Borough::Bronx).unwrap();
        layout.set_dropoff_borough(&mut fv, Borough::Brooklyn).unwrap();
        assert_eq!(
            fv.active_in(layout.dropoff_borough.clone()),
            vec![layout.dropoff_borough_index(Borough::Brooklyn)]
        );
    }

    #[test]
    fn test_location_id_bounds() {
        let layout = FeatureLayout::new(LayoutFlags::new(false, false, true));
        let mut fv = layout.empty_vector();
        assert!(layout.set_location_ids(&mut fv, 0, 1).is_err());
        assert!(layout.set_location_ids(&mut fv, 1, 266).is_err());
        assert!(layout.set_location_ids(&mut fv, 1, 265).is_ok());
    }
}
