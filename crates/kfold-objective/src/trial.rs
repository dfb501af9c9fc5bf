//! Results handed back to the search driver.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

use crate::parameter::ParameterValue;

/// Whether the driver should maximize or minimize the objective.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ObjectiveDirection {
    Maximize,
    #[default]
    Minimize,
}

/// Outcome of evaluating one parameter combination.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrialResult {
    pub trial_id: Uuid,
    pub objective: f64,
    pub metrics: HashMap<String, f64>,
    pub parameters: HashMap<String, ParameterValue>,
    pub duration_seconds: f64,
    pub evaluated_at: DateTime<Utc>,
}

impl TrialResult {
    /// True if `self` beats `other` in the given direction.
    pub fn improves_on(&self, other: &TrialResult, direction: ObjectiveDirection) -> bool {
        match direction {
            ObjectiveDirection::Maximize => self.objective > other.objective,
            ObjectiveDirection::Minimize => self.objective < other.objective,
        }
    }
}
