//! # kfold-engine
//!
//! Cross-validated ridge regression scoring: the objective function an outer
//! hyperparameter search minimizes.
//!
//! [`evaluate`] takes a resolved [`EvalConfig`](kfold_types::EvalConfig),
//! generates the synthetic dataset, partitions it with [`KFold`], fits one
//! [`RidgeModel`] per fold and returns the mean validation MSE.

pub mod aggregate;
pub mod evaluate;
pub mod partition;
pub mod ridge;

pub use aggregate::{aggregate, summarize};
pub use evaluate::{evaluate, evaluate_detailed, EvalStage, Evaluator};
pub use partition::{fold_size, partition, Folds, KFold};
pub use ridge::{evaluate_fold, FoldEvaluator, RidgeModel};
