use std::{path::Path, sync::Arc};

use crossboro_core::model::{
    feature::FeatureVector,
    partition::{Superborough, N_SUPERBOROUGHS},
};
use serde::{Deserialize, Serialize};

use super::{DurationModel, ModelError, XgboostModel};

/// model file locations, one per superborough
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct ModelPaths {
    pub sb1: String,
    pub sb2: String,
    pub sb3: String,
}

impl ModelPaths {
    pub fn get(&self, superborough: Superborough) -> &str {
        match superborough {
            Superborough::ManhattanEwrBronx => &self.sb1,
            Superborough::BrooklynQueens => &self.sb2,
            Superborough::StatenIsland => &self.sb3,
        }
    }
}

/// the per-partition duration models, indexed by superborough.
#[derive(Clone)]
pub struct ModelEnsemble {
    models: [Arc<dyn DurationModel>; N_SUPERBOROUGHS],
}

impl ModelEnsemble {
    /// models ordered as [`Superborough::ALL`]
    pub fn new(models: [Arc<dyn DurationModel>; N_SUPERBOROUGHS]) -> ModelEnsemble {
        ModelEnsemble { models }
    }

    /// duration estimate for a leg lying entirely within a superborough.
    pub fn predict(&self, superborough: Superborough, leg: &FeatureVector) -> f64 {
        self.models[superborough.index()].predict(leg)
    }

    pub fn model(&self, superborough: Superborough) -> &Arc<dyn DurationModel> {
        &self.models[superborough.index()]
    }
}

impl std::fmt::Debug for ModelEnsemble {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut list = f.debug_map();
        for sb in Superborough::ALL {
            list.entry(&sb.code(), &self.model(sb).describe());
        }
        list.finish()
    }
}

impl TryFrom<&ModelPaths> for ModelEnsemble {
    type Error = ModelError;

    /// loads all three models, failing on the first missing or corrupt file.
    fn try_from(paths: &ModelPaths) -> Result<Self, Self::Error> {
        let load = |sb: Superborough| -> Result<Arc<dyn DurationModel>, ModelError> {
            let path = paths.get(sb);
            if path.is_empty() {
                return Err(ModelError::MissingPath(sb));
            }
            let model = XgboostModel::try_from(Path::new(path))?;
            Ok(Arc::new(model))
        };
        Ok(ModelEnsemble::new([
            load(Superborough::ManhattanEwrBronx)?,
            load(Superborough::BrooklynQueens)?,
            load(Superborough::StatenIsland)?,
        ]))
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use std::path::PathBuf;

    fn fixture(name: &str) -> String {
        PathBuf::from(env!("CARGO_MANIFEST_DIR"))
            .join("test")
            .join("models")
            .join(name)
            .to_string_lossy()
            .to_string()
    }

    #[test]
    fn test_dispatch_by_superborough() {
        let paths = ModelPaths {
            sb1: fixture("sb1.json"),
            sb2: fixture("sb2.json"),
            sb3: fixture("sb3.json"),
        };
        let ensemble = ModelEnsemble::try_from(&paths).unwrap();
        let mut leg = vec![0.0; 22];
        leg[8] = -74.0;
        let leg = FeatureVector::Dense(leg);
        assert_eq!(ensemble.predict(Superborough::ManhattanEwrBronx, &leg), 290.0);
        assert_eq!(ensemble.predict(Superborough::BrooklynQueens, &leg), 380.0);
        assert_eq!(ensemble.predict(Superborough::StatenIsland, &leg), 470.0);
    }

    #[test]
    fn test_missing_model_fails_before_use() {
        let paths = ModelPaths {
            sb1: fixture("sb1.json"),
            sb2: fixture("missing.json"),
            sb3: fixture("sb3.json"),
        };
        assert!(matches!(
            ModelEnsemble::try_from(&paths),
            Err(ModelError::Read { .. })
        ));
        let empty = ModelPaths {
            sb3: String::new(),
            ..paths
        };
        assert!(ModelEnsemble::try_from(&empty).is_err());
    }
}
