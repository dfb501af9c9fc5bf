//! Objective evaluation: generate, partition, score each fold, aggregate.
//!
//! One call runs `Validating -> Generating -> Partitioning -> Scoring ->
//! Aggregating` and stops at the first error. Nothing is retried and no partial score is
//! returned. With `parallel` set, folds are scored on the rayon pool; results
//! are collected in fold order so the score is bit-identical to a sequential
//! run.

use kfold_data::DataGenerator;
use kfold_types::{CvReport, Dataset, EvalConfig, EvalResult, FoldResult, FoldSplit};
use rayon::prelude::*;
use std::fmt;
use tracing::{debug, info, warn};

use crate::aggregate::summarize;
use crate::partition::KFold;
use crate::ridge::FoldEvaluator;

/// Pipeline stage, used for tracing and failure reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EvalStage {
    Validating,
    Generating,
    Partitioning,
    Scoring,
    Aggregating,
    Done,
    Failed,
}

impl fmt::Display for EvalStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Validating => "validating",
            Self::Generating => "generating",
            Self::Partitioning => "partitioning",
            Self::Scoring => "scoring",
            Self::Aggregating => "aggregating",
            Self::Done => "done",
            Self::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// Runs the evaluation pipeline for one resolved configuration.
#[derive(Debug)]
pub struct Evaluator<'a> {
    config: &'a EvalConfig,
    stage: EvalStage,
    failed_in: Option<EvalStage>,
}

impl<'a> Evaluator<'a> {
    pub fn new(config: &'a EvalConfig) -> Self {
        Self {
            config,
            stage: EvalStage::Validating,
            failed_in: None,
        }
    }

    pub fn stage(&self) -> EvalStage {
        self.stage
    }

    /// Stage that was running when the call failed.
    pub fn failed_in(&self) -> Option<EvalStage> {
        self.failed_in
    }

    /// Run every stage and return the report, or the first error.
    pub fn run(&mut self) -> EvalResult<CvReport> {
        match self.run_stages() {
            Ok(report) => {
                self.stage = EvalStage::Done;
                info!(
                    "Cross-validated MSE {:.6} over {} folds (std {:.6})",
                    report.score,
                    report.folds.len(),
                    report.std_dev
                );
                Ok(report)
            }
            Err(e) => {
                warn!("Evaluation failed while {}: {}", self.stage, e);
                self.failed_in = Some(self.stage);
                self.stage = EvalStage::Failed;
                Err(e)
            }
        }
    }

    fn run_stages(&mut self) -> EvalResult<CvReport> {
        let config = self.config;
        self.stage = EvalStage::Validating;
        config.validate()?;

        self.stage = EvalStage::Generating;
        let dataset = DataGenerator::new(config.n_samples, config.n_features)
            .with_noise(config.noise)
            .with_bias(config.bias)
            .with_seed(config.data_seed)
            .generate()?;

        self.stage = EvalStage::Partitioning;
        let kfold = if config.shuffle {
            KFold::new(config.n_splits).shuffled(config.cv_seed)
        } else {
            KFold::new(config.n_splits)
        };
        let folds = kfold.split(config.n_samples)?;

        self.stage = EvalStage::Scoring;
        let evaluator = FoldEvaluator::new(config.alpha).with_intercept(config.fit_intercept);
        let results = if config.parallel {
            score_parallel(&dataset, folds.collect(), &evaluator)?
        } else {
            score_sequential(&dataset, folds, &evaluator)?
        };

        self.stage = EvalStage::Aggregating;
        summarize(results)
    }
}

fn score_sequential(
    dataset: &Dataset,
    folds: impl Iterator<Item = FoldSplit>,
    evaluator: &FoldEvaluator,
) -> EvalResult<Vec<FoldResult>> {
    folds
        .map(|split| evaluator.evaluate(dataset, &split))
        .collect()
}

fn score_parallel(
    dataset: &Dataset,
    splits: Vec<FoldSplit>,
    evaluator: &FoldEvaluator,
) -> EvalResult<Vec<FoldResult>> {
    debug!("Scoring {} folds on the rayon pool", splits.len());
    splits
        .par_iter()
        .map(|split| evaluator.evaluate(dataset, split))
        .collect()
}

/// Cross-validated MSE for `config`. Lower is better.
pub fn evaluate(config: &EvalConfig) -> EvalResult<f64> {
    Evaluator::new(config).run().map(|report| report.score)
}

/// Like [`evaluate`], keeping the per-fold detail.
pub fn evaluate_detailed(config: &EvalConfig) -> EvalResult<CvReport> {
    Evaluator::new(config).run()
}

#[cfg(test)]
mod tests {
    use super::*;
    use kfold_types::EvalError;

    #[test]
    fn evaluator_reaches_done() {
        let config = EvalConfig::default();
        let mut evaluator = Evaluator::new(&config);
        let report = evaluator.run().unwrap();
        assert_eq!(evaluator.stage(), EvalStage::Done);
        assert_eq!(report.folds.len(), 5);
    }

    #[test]
    fn evaluator_marks_failure() {
        let config = EvalConfig::new(10, 20, 2, 0.0);
        let mut evaluator = Evaluator::new(&config);
        let err = evaluator.run().unwrap_err();
        assert!(matches!(err, EvalError::NumericalFailure { fold: 0, .. }));
        assert_eq!(evaluator.stage(), EvalStage::Failed);
        assert_eq!(evaluator.failed_in(), Some(EvalStage::Scoring));
    }

    #[test]
    fn parallel_fold_failure_aborts_the_call() {
        let config = EvalConfig::new(12, 30, 3, 0.0).with_parallel(true);
        let mut evaluator = Evaluator::new(&config);
        let err = evaluator.run().unwrap_err();
        assert!(err.is_numerical_failure(), "got {err:?}");
        assert_eq!(evaluator.stage(), EvalStage::Failed);
        assert_eq!(evaluator.failed_in(), Some(EvalStage::Scoring));
    }

    #[test]
    fn invalid_config_fails_while_validating() {
        let config = EvalConfig::new(100, 5, 1, 1.0);
        let mut evaluator = Evaluator::new(&config);
        assert_eq!(evaluator.stage(), EvalStage::Validating);

        let err = evaluator.run().unwrap_err();
        assert!(err.is_invalid_parameter());
        assert_eq!(evaluator.stage(), EvalStage::Failed);
        assert_eq!(evaluator.failed_in(), Some(EvalStage::Validating));
    }

    #[test]
    fn folds_are_reported_in_order() {
        let config = EvalConfig::new(30, 3, 6, 0.5).with_parallel(true);
        let report = evaluate_detailed(&config).unwrap();
        let order: Vec<usize> = report.folds.iter().map(|f| f.fold).collect();
        assert_eq!(order, vec![0, 1, 2, 3, 4, 5]);
    }

    #[test]
    fn stage_names() {
        assert_eq!(EvalStage::Validating.to_string(), "validating");
        assert_eq!(EvalStage::Partitioning.to_string(), "partitioning");
        assert_eq!(EvalStage::Failed.to_string(), "failed");
    }
}
