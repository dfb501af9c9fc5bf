//! # kfold-objective
//!
//! Optimizer-facing side of the k-fold evaluator: sampled parameter values,
//! the [`Objective`] trait that search drivers call, and the trial results
//! they get back. The search algorithms themselves live with the driver.

mod objective;
mod parameter;
mod trial;

pub use objective::{CrossValidationObjective, Objective};
pub use parameter::{apply_parameters, ParameterValue};
pub use trial::{ObjectiveDirection, TrialResult};
