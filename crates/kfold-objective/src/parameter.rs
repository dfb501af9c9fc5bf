//! Sampled hyperparameter values and how they land on a configuration.

use kfold_types::{EvalConfig, KfResult};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A concrete parameter value produced by a search driver.
///
/// `Int` precedes `Float` so integral JSON numbers deserialize as `Int`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParameterValue {
    Int(i64),
    Float(f64),
    Json(serde_json::Value),
}

impl ParameterValue {
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Self::Int(v) => serde_json::Value::from(*v),
            Self::Float(v) => serde_json::Value::from(*v),
            Self::Json(v) => v.clone(),
        }
    }
}

impl std::fmt::Display for ParameterValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Int(v) => write!(f, "{v}"),
            Self::Float(v) => write!(f, "{v}"),
            Self::Json(v) => write!(f, "{v}"),
        }
    }
}

impl From<f64> for ParameterValue {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<i64> for ParameterValue {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<bool> for ParameterValue {
    fn from(v: bool) -> Self {
        Self::Json(serde_json::Value::Bool(v))
    }
}

/// Merge sampled parameters onto a copy of `base`.
///
/// Keys are applied in sorted order so a failure always names the same key.
pub fn apply_parameters(
    base: &EvalConfig,
    params: &HashMap<String, ParameterValue>,
) -> KfResult<EvalConfig> {
    let mut keys: Vec<&String> = params.keys().collect();
    keys.sort();

    let mut config = base.clone();
    for key in keys {
        config.apply_value(key, params[key].to_json())?;
    }
    Ok(config)
}
