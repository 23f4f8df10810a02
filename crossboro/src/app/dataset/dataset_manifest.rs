use std::{fs::File, io::BufReader, path::Path};

use crossboro_core::model::layout::LayoutTag;
use serde::{Deserialize, Serialize};

use super::DatasetError;

/// encoding of a features file
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum DatasetFormat {
    /// sparse rows `label idx:value ...` with 0-based indices
    Libsvm,
    /// dense rows `label,value,...` without a header
    Csv,
}

/// describes a saved dataset. `features_file` is relative to the manifest's directory
/// unless it is absolute.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct DatasetManifest {
    pub layout: LayoutTag,
    pub format: DatasetFormat,
    pub features_file: String,
}

impl TryFrom<&Path> for DatasetManifest {
    type Error = DatasetError;

    fn try_from(path: &Path) -> Result<Self, Self::Error> {
        let file = File::open(path).map_err(|e| DatasetError::Read {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        serde_json::from_reader(BufReader::new(file)).map_err(|e| DatasetError::Read {
            path: path.to_path_buf(),
            message: format!("invalid manifest: {e}"),
        })
    }
}
