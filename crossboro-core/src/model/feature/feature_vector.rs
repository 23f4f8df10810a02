use std::{collections::BTreeMap, ops::Range};

use itertools::Itertools;
use serde::{Deserialize, Serialize};

use super::FeatureError;

/// a single trip encoded as a fixed-layout numeric vector. positions are
/// described by a [`crate::model::layout::FeatureLayout`].
///
/// a value may be missing: `NaN` in a dense vector, or an absent entry in a
/// sparse vector. missing values follow the default direction of tree splits,
/// which matches how sparse training matrices were handed to the models.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "snake_case", tag = "type", content = "values")]
pub enum FeatureVector {
    Dense(Vec<f32>),
    Sparse(SparseFeatures),
}

/// sparse storage with a fixed dimension. only stored entries are present.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct SparseFeatures {
    dim: usize,
    entries: BTreeMap<usize, f32>,
}

impl SparseFeatures {
    pub fn new(dim: usize) -> SparseFeatures {
        SparseFeatures {
            dim,
            entries: BTreeMap::new(),
        }
    }

    /// builds a sparse vector from (index, value) entries. later duplicates overwrite earlier ones.
    pub fn from_entries<I>(dim: usize, entries: I) -> Result<SparseFeatures, FeatureError>
    where
        I: IntoIterator<Item = (usize, f32)>,
    {
        let mut result = SparseFeatures::new(dim);
        for (index, value) in entries {
            if index >= dim {
                return Err(FeatureError::IndexOutOfBounds { index, len: dim });
            }
            result.entries.insert(index, value);
        }
        Ok(result)
    }

    pub fn dim(&self) -> usize {
        self.dim
    }

    /// number of stored entries
    pub fn nnz(&self) -> usize {
        self.entries.len()
    }

    pub fn entries(&self) -> impl Iterator<Item = (usize, f32)> + '_ {
        self.entries.iter().map(|(i, v)| (*i, *v))
    }
}

impl FeatureVector {
    /// dimension of the vector
    pub fn len(&self) -> usize {
        match self {
            FeatureVector::Dense(values) => values.len(),
            FeatureVector::Sparse(sparse) => sparse.dim,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_sparse(&self) -> bool {
        matches!(self, FeatureVector::Sparse(_))
    }

    /// the value at some position, or None if the value is missing.
    pub fn get(&self, index: usize) -> Option<f32> {
        match self {
            FeatureVector::Dense(values) => values.get(index).copied().filter(|v| !v.is_nan()),
            FeatureVector::Sparse(sparse) => sparse.entries.get(&index).copied(),
        }
    }

    /// stores a present value at some position. an explicit zero is still present.
    pub fn set(&mut self, index: usize, value: f32) -> Result<(), FeatureError> {
        let len = self.len();
        if index >= len {
            return Err(FeatureError::IndexOutOfBounds { index, len });
        }
        match self {
            FeatureVector::Dense(values) => values[index] = value,
            FeatureVector::Sparse(sparse) => {
                sparse.entries.insert(index, value);
            }
        }
        Ok(())
    }

    /// deactivates a one-hot position. dense vectors store a zero; sparse vectors
    /// drop the entry, since zeros were never stored in sparse training data.
    /// the python pipeline assigned into its scipy matrix instead, keeping an explicit
    /// stored zero that xgboost reads as a present 0 rather than a missing value.
    pub fn clear(&mut self, index: usize) -> Result<(), FeatureError> {
        let len = self.len();
        if index >= len {
            return Err(FeatureError::IndexOutOfBounds { index, len });
        }
        match self {
            FeatureVector::Dense(values) => values[index] = 0.0,
            FeatureVector::Sparse(sparse) => {
                sparse.entries.remove(&index);
            }
        }
        Ok(())
    }

    /// positions within a range holding an active (present, non-zero) value, in ascending order.
    pub fn active_in(&self, range: Range<usize>) -> Vec<usize> {
        match self {
            FeatureVector::Dense(values) => {
                let end = range.end.min(values.len());
                (range.start..end)
                    .filter(|i| is_active(values[*i]))
                    .collect_vec()
            }
            FeatureVector::Sparse(sparse) => sparse
                .entries
                .range(range)
                .filter(|(_, v)| is_active(**v))
                .map(|(i, _)| *i)
                .collect_vec(),
        }
    }

    /// all active positions in ascending order
    pub fn active_indices(&self) -> Vec<usize> {
        self.active_in(0..self.len())
    }

    /// expands into a dense vector where missing sparse entries become `NaN`.
    pub fn to_dense(&self) -> Vec<f32> {
        match self {
            FeatureVector::Dense(values) => values.clone(),
            FeatureVector::Sparse(sparse) => {
                let mut values = vec![f32::NAN; sparse.dim];
                for (i, v) in sparse.entries.iter() {
                    values[*i] = *v;
                }
                values
            }
        }
    }
}

fn is_active(value: f32) -> bool {
    value != 0.0 && !value.is_nan()
}
