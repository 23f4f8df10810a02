//! serde types for the subset of the XGBoost JSON model document needed to
//! evaluate gradient boosted regression trees.
use serde::{de::Error as _, Deserialize, Deserializer};
use serde_json::Value;
use serde_with::{serde_as, DisplayFromStr};

#[derive(Deserialize, Debug, Clone)]
pub struct XgboostDocument {
    pub learner: Learner,
}

#[derive(Deserialize, Debug, Clone)]
pub struct Learner {
    pub learner_model_param: LearnerModelParam,
    pub objective: ObjectiveName,
    pub gradient_booster: GradientBooster,
}

#[serde_as]
#[derive(Deserialize, Debug, Clone)]
pub struct LearnerModelParam {
    #[serde(deserialize_with = "deserialize_base_score")]
    pub base_score: f64,
    #[serde_as(as = "Option<DisplayFromStr>")]
    #[serde(default)]
    pub num_feature: Option<usize>,
}

#[derive(Deserialize, Debug, Clone)]
pub struct ObjectiveName {
    pub name: String,
}

#[derive(Deserialize, Debug, Clone)]
pub struct GradientBooster {
    pub name: String,
    #[serde(default)]
    pub model: Option<TreeEnsemble>,
}

#[derive(Deserialize, Debug, Clone)]
pub struct TreeEnsemble {
    pub trees: Vec<TreeArrays>,
}

/// a tree stored as parallel arrays indexed by node id. node 0 is the root.
#[derive(Deserialize, Debug, Clone)]
pub struct TreeArrays {
    pub left_children: Vec<i32>,
    pub right_children: Vec<i32>,
    pub split_indices: Vec<i64>,
    pub split_conditions: Vec<f32>,
    pub default_left: Vec<DefaultLeft>,
    #[serde(default)]
    pub split_type: Vec<i32>,
}

/// XGBoost writes `default_left` as 0/1 integers, older versions as booleans
#[derive(Deserialize, Debug, Clone, Copy)]
#[serde(untagged)]
pub enum DefaultLeft {
    Flag(bool),
    Int(i64),
}

impl DefaultLeft {
    pub fn is_left(&self) -> bool {
        match self {
            DefaultLeft::Flag(b) => *b,
            DefaultLeft::Int(i) => *i != 0,
        }
    }
}

/// base_score appears as a number, a numeric string such as "5E-1", a bracketed
/// string such as "[5E-1]", or an array holding one of those.
fn deserialize_base_score<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    parse_base_score(&value).map_err(D::Error::custom)
}

pub fn parse_base_score(value: &Value) -> Result<f64, String> {
    match value {
        Value::Number(n) => n
            .as_f64()
            .ok_or_else(|| format!("base_score {n} is not a finite number")),
        Value::String(s) => {
            let trimmed = s.trim();
            let inner = trimmed
                .strip_prefix('[')
                .and_then(|t| t.strip_suffix(']'))
                .unwrap_or(trimmed);
            inner
                .split(',')
                .next()
                .map(|t| t.trim())
                .filter(|t| !t.is_empty())
                .ok_or_else(|| format!("base_score '{s}' is empty"))?
                .parse::<f64>()
                .map_err(|e| format!("base_score '{s}' is not a number: {e}"))
        }
        Value::Array(values) => match values.first() {
            Some(first) => parse_base_score(first),
            None => Err(String::from("base_score array is empty")),
        },
        other => Err(format!("base_score must be a number, string or array, found {other}")),
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_base_score_variants() {
        assert_eq!(parse_base_score(&json!(0.5)), Ok(0.5));
        assert_eq!(parse_base_score(&json!("5E-1")), Ok(0.5));
        assert_eq!(parse_base_score(&json!("[7.25E2]")), Ok(725.0));
        assert_eq!(parse_base_score(&json!(["1.5"])), Ok(1.5));
        assert!(parse_base_score(&json!([])).is_err());
        assert!(parse_base_score(&json!("[]")).is_err());
        assert!(parse_base_score(&json!(null)).is_err());
    }
}
