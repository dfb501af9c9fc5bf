//! Resolved evaluation configuration.
//!
//! An [`EvalConfig`] merges the static experiment settings with the sampled
//! hyperparameter. It is loaded from JSON, optionally patched with
//! `key=value` overrides, validated once and then treated as read-only by
//! every pipeline stage.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::path::Path;

use crate::errors::{EvalError, EvalResult, KfError, KfResult};

/// Resolved configuration for one evaluation call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EvalConfig {
    /// Number of synthetic samples to generate.
    pub n_samples: usize,
    /// Number of features per sample.
    pub n_features: usize,
    /// Standard deviation of the Gaussian noise added to the targets.
    pub noise: f64,
    /// Seed for the data generator.
    pub data_seed: u64,
    /// Number of cross-validation folds.
    pub n_splits: usize,
    /// Permute indices before partitioning.
    pub shuffle: bool,
    /// Seed for the fold permutation (ignored unless `shuffle`).
    pub cv_seed: u64,
    /// Ridge regularization strength.
    pub alpha: f64,
    /// Fit an unpenalized intercept from the training rows.
    pub fit_intercept: bool,
    /// Constant offset added to every generated target.
    pub bias: f64,
    /// Score folds on the rayon pool instead of the calling thread.
    pub parallel: bool,
}

impl Default for EvalConfig {
    fn default() -> Self {
        Self {
            n_samples: 100,
            n_features: 5,
            noise: 0.0,
            data_seed: 0,
            n_splits: 5,
            shuffle: false,
            cv_seed: 0,
            alpha: 1.0,
            fit_intercept: true,
            bias: 0.0,
            parallel: false,
        }
    }
}

impl EvalConfig {
    pub fn new(n_samples: usize, n_features: usize, n_splits: usize, alpha: f64) -> Self {
        Self {
            n_samples,
            n_features,
            n_splits,
            alpha,
            ..Self::default()
        }
    }

    pub fn with_noise(mut self, noise: f64) -> Self {
        self.noise = noise;
        self
    }

    pub fn with_data_seed(mut self, seed: u64) -> Self {
        self.data_seed = seed;
        self
    }

    pub fn with_shuffle(mut self, shuffle: bool, cv_seed: u64) -> Self {
        self.shuffle = shuffle;
        self.cv_seed = cv_seed;
        self
    }

    pub fn with_alpha(mut self, alpha: f64) -> Self {
        self.alpha = alpha;
        self
    }

    pub fn with_intercept(mut self, fit_intercept: bool) -> Self {
        self.fit_intercept = fit_intercept;
        self
    }

    pub fn with_bias(mut self, bias: f64) -> Self {
        self.bias = bias;
        self
    }

    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Check every field constraint, reporting the first violation.
    pub fn validate(&self) -> EvalResult<()> {
        if self.n_samples == 0 {
            return Err(EvalError::invalid("n_samples", "must be positive"));
        }
        if self.n_features == 0 {
            return Err(EvalError::invalid("n_features", "must be positive"));
        }
        if !self.noise.is_finite() || self.noise < 0.0 {
            return Err(EvalError::invalid(
                "noise",
                format!("must be finite and non-negative, got {}", self.noise),
            ));
        }
        if self.n_splits < 2 {
            return Err(EvalError::invalid(
                "n_splits",
                format!("must be at least 2, got {}", self.n_splits),
            ));
        }
        if self.n_splits > self.n_samples {
            return Err(EvalError::invalid(
                "n_splits",
                format!(
                    "cannot exceed n_samples ({} > {})",
                    self.n_splits, self.n_samples
                ),
            ));
        }
        if !self.alpha.is_finite() || self.alpha < 0.0 {
            return Err(EvalError::invalid(
                "alpha",
                format!("must be finite and non-negative, got {}", self.alpha),
            ));
        }
        if !self.bias.is_finite() {
            return Err(EvalError::invalid("bias", "must be finite"));
        }
        Ok(())
    }

    pub fn from_json_str(json: &str) -> KfResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> KfResult<Self> {
        let raw = std::fs::read_to_string(path.as_ref())?;
        Self::from_json_str(&raw)
    }

    /// Apply a single `key=value` override.
    ///
    /// The value is parsed against the type the field already has, so
    /// `n_splits=2.5` or `shuffle=yes` are rejected rather than coerced.
    pub fn apply_override(&mut self, assignment: &str) -> KfResult<()> {
        let (key, raw) = assignment
            .split_once('=')
            .ok_or_else(|| crate::config_error!("override must be key=value, got '{assignment}'"))?;
        let key = key.trim();
        let raw = raw.trim();

        let fields = self.as_object()?;
        let current = fields
            .get(key)
            .ok_or_else(|| crate::config_error!("unknown configuration key '{key}'"))?;

        let value = match current {
            Value::Bool(_) => raw
                .parse::<bool>()
                .map(Value::Bool)
                .map_err(|_| crate::config_error!("'{key}' expects true or false, got '{raw}'"))?,
            Value::Number(n) if n.is_u64() => raw
                .parse::<u64>()
                .map(Value::from)
                .map_err(|_| crate::config_error!("'{key}' expects an unsigned integer, got '{raw}'"))?,
            _ => raw
                .parse::<f64>()
                .map(Value::from)
                .map_err(|_| crate::config_error!("'{key}' expects a number, got '{raw}'"))?,
        };

        self.apply_value(key, value)
    }

    pub fn apply_overrides<I, S>(&mut self, assignments: I) -> KfResult<()>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for assignment in assignments {
            self.apply_override(assignment.as_ref())?;
        }
        Ok(())
    }

    /// Set one field from an already-typed JSON value.
    pub fn apply_value(&mut self, key: &str, value: Value) -> KfResult<()> {
        let mut fields = self.as_object()?;
        if !fields.contains_key(key) {
            return Err(crate::config_error!("unknown configuration key '{key}'"));
        }
        fields.insert(key.to_string(), value);

        *self = serde_json::from_value(Value::Object(fields))
            .map_err(|e| crate::config_error!("invalid value for '{key}': {e}"))?;
        Ok(())
    }

    fn as_object(&self) -> KfResult<Map<String, Value>> {
        match serde_json::to_value(self)? {
            Value::Object(fields) => Ok(fields),
            other => Err(KfError::Config(format!(
                "configuration serialized to a non-object: {other}"
            ))),
        }
    }
}
