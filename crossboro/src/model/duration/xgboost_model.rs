use std::{fs::File, io::BufReader, path::Path};

use crossboro_core::model::feature::FeatureVector;
use itertools::Itertools;

use super::{
    xgboost_json::{TreeArrays, XgboostDocument},
    DurationModel, ModelError,
};

/// objectives whose prediction is the raw margin, so that summing leaf values
/// onto the base score yields a duration without a link function.
pub const IDENTITY_OBJECTIVES: [&str; 4] = [
    "reg:squarederror",
    "reg:absoluteerror",
    "reg:pseudohubererror",
    "reg:linear",
];

#[derive(Clone, Debug, PartialEq)]
enum Node {
    Leaf(f32),
    Split {
        feature: usize,
        threshold: f32,
        left: usize,
        right: usize,
        default_left: bool,
    },
}

#[derive(Clone, Debug)]
struct RegressionTree {
    nodes: Vec<Node>,
}

impl RegressionTree {
    fn leaf_value(&self, features: &FeatureVector) -> f32 {
        let mut idx = 0;
        loop {
            match &self.nodes[idx] {
                Node::Leaf(value) => return *value,
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                    default_left,
                } => {
                    idx = match features.get(*feature) {
                        Some(value) if value < *threshold => *left,
                        Some(_) => *right,
                        None if *default_left => *left,
                        None => *right,
                    };
                }
            }
        }
    }
}

impl TryFrom<(usize, &TreeArrays)> for RegressionTree {
    type Error = ModelError;

    fn try_from((tree, arrays): (usize, &TreeArrays)) -> Result<Self, Self::Error> {
        let invalid = |message: String| ModelError::InvalidTree { tree, message };
        let n = arrays.left_children.len();
        if n == 0 {
            return Err(invalid(String::from("tree has no nodes")));
        }
        let lengths = [
            arrays.right_children.len(),
            arrays.split_indices.len(),
            arrays.split_conditions.len(),
            arrays.default_left.len(),
        ];
        if lengths.iter().any(|len| *len != n) {
            return Err(invalid(format!(
                "node arrays have inconsistent lengths {n} and {lengths:?}"
            )));
        }
        if arrays.split_type.iter().any(|t| *t != 0) {
            return Err(ModelError::Unsupported(format!(
                "tree {tree} uses categorical splits"
            )));
        }

        let mut nodes = Vec::with_capacity(n);
        for idx in 0..n {
            let (left, right) = (arrays.left_children[idx], arrays.right_children[idx]);
            let node = match (left, right) {
                (-1, -1) => Node::Leaf(arrays.split_conditions[idx]),
                (l, r) => {
                    let child = |c: i32| -> Result<usize, ModelError> {
                        let c = usize::try_from(c).map_err(|_| {
                            invalid(format!("node {idx} has invalid child index {c}"))
                        })?;
                        if c <= idx || c >= n {
                            return Err(invalid(format!(
                                "node {idx} has child {c} outside of ({idx}, {n})"
                            )));
                        }
                        Ok(c)
                    };
                    let feature = usize::try_from(arrays.split_indices[idx]).map_err(|_| {
                        invalid(format!(
                            "node {idx} splits on invalid feature {}",
                            arrays.split_indices[idx]
                        ))
                    })?;
                    Node::Split {
                        feature,
                        threshold: arrays.split_conditions[idx],
                        left: child(l)?,
                        right: child(r)?,
                        default_left: arrays.default_left[idx].is_left(),
                    }
                }
            };
            nodes.push(node);
        }
        Ok(RegressionTree { nodes })
    }
}

/// a gradient boosted tree regressor loaded from an XGBoost JSON model file.
#[derive(Clone, Debug)]
pub struct XgboostModel {
    objective: String,
    base_score: f64,
    num_feature: Option<usize>,
    trees: Vec<RegressionTree>,
}

impl XgboostModel {
    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }

    pub fn base_score(&self) -> f64 {
        self.base_score
    }

    pub fn num_feature(&self) -> Option<usize> {
        self.num_feature
    }
}

impl DurationModel for XgboostModel {
    fn predict(&self, features: &FeatureVector) -> f64 {
        let margin: f64 = self
            .trees
            .iter()
            .map(|t| t.leaf_value(features) as f64)
            .sum();
        self.base_score + margin
    }

    fn describe(&self) -> String {
        format!(
            "xgboost {} with {} trees, base score {}",
            self.objective,
            self.trees.len(),
            self.base_score
        )
    }
}

impl TryFrom<XgboostDocument> for XgboostModel {
    type Error = ModelError;

    fn try_from(document: XgboostDocument) -> Result<Self, Self::Error> {
        let learner = document.learner;
        let objective = learner.objective.name;
        if !IDENTITY_OBJECTIVES.contains(&objective.as_str()) {
            return Err(ModelError::Unsupported(format!(
                "objective '{objective}' is not one of {}",
                IDENTITY_OBJECTIVES.iter().join(", ")
            )));
        }
        let booster = learner.gradient_booster;
        let ensemble = match (booster.name.as_str(), booster.model) {
            ("gbtree", Some(model)) => model,
            ("gbtree", None) => {
                return Err(ModelError::Unsupported(String::from(
                    "gbtree booster has no model",
                )))
            }
            (other, _) => {
                return Err(ModelError::Unsupported(format!(
                    "booster '{other}' is not supported, expected 'gbtree'"
                )))
            }
        };
        let trees = ensemble
            .trees
            .iter()
            .enumerate()
            .map(RegressionTree::try_from)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(XgboostModel {
            objective,
            base_score: learner.learner_model_param.base_score,
            num_feature: learner.learner_model_param.num_feature,
            trees,
        })
    }
}

impl TryFrom<&Path> for XgboostModel {
    type Error = ModelError;

    fn try_from(path: &Path) -> Result<Self, Self::Error> {
        let file = File::open(path).map_err(|e| ModelError::Read {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        let document: XgboostDocument = serde_json::from_reader(BufReader::new(file))
            .map_err(|e| ModelError::Parse {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?;
        let model = XgboostModel::try_from(document)?;
        log::info!("loaded {} from '{}'", model.describe(), path.display());
        Ok(model)
    }
}
