use serde::{Deserialize, Serialize};

use crate::errors::{EvalError, EvalResult};

/// Immutable regression dataset: a row-major feature matrix and its targets.
///
/// Produced once per evaluation call and shared read-only with every fold.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    n_samples: usize,
    n_features: usize,
    features: Vec<f64>,
    targets: Vec<f64>,
    coefficients: Vec<f64>,
    bias: f64,
}

impl Dataset {
    /// Assemble a dataset from raw parts, checking the buffer lengths
    /// against the declared shape.
    pub fn from_parts(
        n_samples: usize,
        n_features: usize,
        features: Vec<f64>,
        targets: Vec<f64>,
        coefficients: Vec<f64>,
        bias: f64,
    ) -> EvalResult<Self> {
        if features.len() != n_samples * n_features {
            return Err(EvalError::invalid(
                "features",
                format!(
                    "expected {} values for a {n_samples}x{n_features} matrix, got {}",
                    n_samples * n_features,
                    features.len()
                ),
            ));
        }
        if targets.len() != n_samples {
            return Err(EvalError::invalid(
                "targets",
                format!("expected {n_samples} values, got {}", targets.len()),
            ));
        }
        if coefficients.len() != n_features {
            return Err(EvalError::invalid(
                "coefficients",
                format!("expected {n_features} values, got {}", coefficients.len()),
            ));
        }
        Ok(Self {
            n_samples,
            n_features,
            features,
            targets,
            coefficients,
            bias,
        })
    }

    pub fn n_samples(&self) -> usize {
        self.n_samples
    }

    pub fn n_features(&self) -> usize {
        self.n_features
    }

    /// Feature row for sample `index`.
    pub fn row(&self, index: usize) -> &[f64] {
        let start = index * self.n_features;
        &self.features[start..start + self.n_features]
    }

    pub fn target(&self, index: usize) -> f64 {
        self.targets[index]
    }

    pub fn features(&self) -> &[f64] {
        &self.features
    }

    pub fn targets(&self) -> &[f64] {
        &self.targets
    }

    /// Ground-truth coefficients used to generate the targets.
    pub fn coefficients(&self) -> &[f64] {
        &self.coefficients
    }

    pub fn bias(&self) -> f64 {
        self.bias
    }
}

/// One train/validation partition of the sample indices.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FoldSplit {
    /// Fold ordinal (0-indexed).
    pub fold: usize,
    /// Training indices, ascending.
    pub train: Vec<usize>,
    /// Held-out indices, in partition order.
    pub validation: Vec<usize>,
}

/// Validation error of one fold.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FoldResult {
    pub fold: usize,
    /// Mean squared error on the validation rows.
    pub mse: f64,
    pub n_train: usize,
    pub n_validation: usize,
}

/// Aggregate cross-validation score with per-fold detail.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CvReport {
    /// Arithmetic mean of the fold errors. This is the objective value.
    pub score: f64,
    /// Sample standard deviation of the fold errors.
    pub std_dev: f64,
    pub min_error: f64,
    pub max_error: f64,
    pub folds: Vec<FoldResult>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tiny() -> Dataset {
        Dataset::from_parts(
            3,
            2,
            vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0],
            vec![10.0, 20.0, 30.0],
            vec![0.5, 1.5],
            0.0,
        )
        .unwrap()
    }

    #[test]
    fn rows_are_row_major() {
        let data = tiny();
        assert_eq!(data.row(0), &[1.0, 2.0]);
        assert_eq!(data.row(2), &[5.0, 6.0]);
        assert_eq!(data.target(1), 20.0);
        assert_eq!(data.n_samples(), 3);
        assert_eq!(data.n_features(), 2);
    }

    #[test]
    fn mismatched_shape_is_rejected() {
        let err = Dataset::from_parts(2, 2, vec![1.0; 3], vec![0.0; 2], vec![0.0; 2], 0.0)
            .unwrap_err();
        assert!(matches!(err, EvalError::InvalidParameter { ref parameter, .. } if parameter == "features"));

        let err = Dataset::from_parts(2, 1, vec![1.0; 2], vec![0.0; 3], vec![0.0], 0.0)
            .unwrap_err();
        assert!(err.is_invalid_parameter());
    }

    #[test]
    fn fold_result_serializes() {
        let result = FoldResult {
            fold: 1,
            mse: 0.25,
            n_train: 8,
            n_validation: 2,
        };
        let json = serde_json::to_string(&result).unwrap();
        let back: FoldResult = serde_json::from_str(&json).unwrap();
        assert_eq!(result, back);
    }
}
