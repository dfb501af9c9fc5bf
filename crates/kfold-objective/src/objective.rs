//! The capability contract a search driver evaluates against.
//!
//! Any driver (grid, random, Bayesian, evolutionary) holds a
//! `Box<dyn Objective>` and calls [`Objective::evaluate`] with the sampled
//! parameters. The objective never retries; a failed trial comes back as an
//! error and the driver decides whether to penalize or discard it.

use chrono::Utc;
use kfold_engine::evaluate_detailed;
use kfold_types::{EvalConfig, KfResult};
use std::collections::HashMap;
use std::time::Instant;
use tracing::{info, warn};
use uuid::Uuid;

use crate::parameter::{apply_parameters, ParameterValue};
use crate::trial::{ObjectiveDirection, TrialResult};

/// Scalar objective over a parameter combination.
pub trait Objective: Send + Sync {
    fn evaluate(&self, params: &HashMap<String, ParameterValue>) -> KfResult<TrialResult>;

    fn direction(&self) -> ObjectiveDirection;

    fn name(&self) -> &str;
}

/// Cross-validated ridge MSE of a base configuration with sampled overrides.
#[derive(Debug, Clone)]
pub struct CrossValidationObjective {
    base: EvalConfig,
}

impl CrossValidationObjective {
    pub fn new(base: EvalConfig) -> Self {
        Self { base }
    }

    pub fn base(&self) -> &EvalConfig {
        &self.base
    }
}

impl Objective for CrossValidationObjective {
    fn evaluate(&self, params: &HashMap<String, ParameterValue>) -> KfResult<TrialResult> {
        let config = apply_parameters(&self.base, params)?;
        let started = Instant::now();

        let report = evaluate_detailed(&config).map_err(|e| {
            warn!("Trial failed for {:?}: {}", params, e);
            e
        })?;

        let mut metrics = HashMap::with_capacity(report.folds.len() + 2);
        metrics.insert("mean_mse".to_string(), report.score);
        metrics.insert("std_mse".to_string(), report.std_dev);
        for fold in &report.folds {
            metrics.insert(format!("fold_{}_mse", fold.fold), fold.mse);
        }

        info!("Trial objective {:.6} for {} parameters", report.score, params.len());

        Ok(TrialResult {
            trial_id: Uuid::new_v4(),
            objective: report.score,
            metrics,
            parameters: params.clone(),
            duration_seconds: started.elapsed().as_secs_f64(),
            evaluated_at: Utc::now(),
        })
    }

    fn direction(&self) -> ObjectiveDirection {
        ObjectiveDirection::Minimize
    }

    fn name(&self) -> &str {
        "kfold_ridge_mse"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kfold_types::{EvalError, KfError};

    fn alpha(value: f64) -> HashMap<String, ParameterValue> {
        let mut params = HashMap::new();
        params.insert("alpha".to_string(), ParameterValue::Float(value));
        params
    }

    #[test]
    fn objective_reports_fold_metrics() {
        let objective = CrossValidationObjective::new(EvalConfig::new(60, 3, 3, 1.0).with_noise(0.5));
        let trial = objective.evaluate(&alpha(0.2)).unwrap();

        assert!(trial.objective.is_finite());
        assert_eq!(trial.metrics["mean_mse"], trial.objective);
        assert!(trial.metrics.contains_key("fold_2_mse"));
        assert!(!trial.metrics.contains_key("fold_3_mse"));
        assert_eq!(trial.parameters, alpha(0.2));
        assert_eq!(objective.direction(), ObjectiveDirection::Minimize);
    }

    #[test]
    fn same_parameters_give_same_objective() {
        let objective = CrossValidationObjective::new(
            EvalConfig::new(50, 4, 5, 1.0).with_noise(1.0).with_shuffle(true, 3),
        );
        let a = objective.evaluate(&alpha(0.7)).unwrap();
        let b = objective.evaluate(&alpha(0.7)).unwrap();
        assert_eq!(a.objective.to_bits(), b.objective.to_bits());
        assert_ne!(a.trial_id, b.trial_id);
    }

    #[test]
    fn invalid_sample_surfaces_as_eval_error() {
        let objective = CrossValidationObjective::new(EvalConfig::default());
        match objective.evaluate(&alpha(-1.0)) {
            Err(KfError::Eval(EvalError::InvalidParameter { parameter, .. })) => {
                assert_eq!(parameter, "alpha")
            }
            other => panic!("expected InvalidParameter, got {other:?}"),
        }
    }

    #[test]
    fn usable_as_trait_object() {
        let objective: Box<dyn Objective> =
            Box::new(CrossValidationObjective::new(EvalConfig::default()));
        assert_eq!(objective.name(), "kfold_ridge_mse");

        let candidates = [0.01, 1.0, 100.0];
        let best = candidates
            .iter()
            .map(|&a| objective.evaluate(&alpha(a)).unwrap())
            .reduce(|best, next| {
                if next.improves_on(&best, objective.direction()) {
                    next
                } else {
                    best
                }
            })
            .unwrap();
        assert!(best.objective.is_finite());
    }
}
