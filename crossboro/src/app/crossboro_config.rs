use std::{collections::HashMap, path::Path};

use config::{Config, ConfigError, File};
use crossboro_core::model::{geography::TableStoreConfig, layout::LayoutFlags};
use serde::{de::DeserializeOwned, Deserialize, Serialize};

use crate::model::{duration::ModelPaths, evaluation::EvaluationConfig};

use super::CrossboroAppError;

/// run configuration read from a TOML file. relative paths are resolved
/// against the directory of the configuration file.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct CrossboroConfig {
    pub geography: TableStoreConfig,
    /// model files per layout key such as "111"
    #[serde(default)]
    pub models: HashMap<String, ModelPaths>,
    #[serde(default)]
    pub evaluation: EvaluationConfig,
}

impl CrossboroConfig {
    /// configured model paths for a layout
    pub fn model_paths(&self, flags: &LayoutFlags) -> Option<&ModelPaths> {
        self.models.get(&flags.key())
    }

    fn resolve_paths(&mut self, base: &Path) {
        let resolve = |p: &mut String| {
            if !p.is_empty() && Path::new(p.as_str()).is_relative() {
                *p = base.join(p.as_str()).to_string_lossy().to_string();
            }
        };
        resolve(&mut self.geography.locations_file);
        resolve(&mut self.geography.coordinates_file);
        resolve(&mut self.geography.bridges_file);
        for paths in self.models.values_mut() {
            resolve(&mut paths.sb1);
            resolve(&mut paths.sb2);
            resolve(&mut paths.sb3);
        }
        resolve(&mut self.evaluation.log_directory);
    }
}

impl TryFrom<&Path> for CrossboroConfig {
    type Error = CrossboroAppError;

    fn try_from(filepath: &Path) -> Result<Self, Self::Error> {
        let configuration_file = filepath.display();
        let config = Config::builder()
            .add_source(File::from(filepath))
            .build()
            .map_err(|e| {
                let msg = format!("file '{configuration_file}' produced error: {e}");
                CrossboroAppError::InvalidUserInput(msg)
            })?;
        let geography = config.get::<TableStoreConfig>("geography").map_err(|e| {
            let msg = format!("error reading 'geography' key in '{configuration_file}': {e}");
            CrossboroAppError::InvalidUserInput(msg)
        })?;
        let models = optional_key::<HashMap<String, ModelPaths>>(&config, "models", filepath)?
            .unwrap_or_default();
        let evaluation = optional_key::<EvaluationConfig>(&config, "evaluation", filepath)?
            .unwrap_or_default();

        let mut result = CrossboroConfig {
            geography,
            models,
            evaluation,
        };
        if let Some(base) = filepath.parent() {
            result.resolve_paths(base);
        }
        Ok(result)
    }
}

/// reads a key that may be absent from the configuration file
fn optional_key<T: DeserializeOwned>(
    config: &Config,
    key: &str,
    filepath: &Path,
) -> Result<Option<T>, CrossboroAppError> {
    match config.get::<T>(key) {
        Ok(value) => Ok(Some(value)),
        Err(ConfigError::NotFound(_)) => Ok(None),
        Err(e) => {
            let msg = format!(
                "error reading '{key}' key in '{}': {e}",
                filepath.display()
            );
            Err(CrossboroAppError::InvalidUserInput(msg))
        }
    }
}
