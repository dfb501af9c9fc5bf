//! Ridge regression fit and per-fold scoring.
//!
//! The model solves `(X'X + alpha I) w = X'y` over the training rows with a
//! Cholesky decomposition. With `fit_intercept` the columns and target are
//! centered on their training means first, so the intercept is not penalized
//! and no validation row influences the fit.

use kfold_types::{Dataset, EvalError, EvalResult, FoldResult, FoldSplit};
use tracing::{debug, warn};

/// Smallest admissible Cholesky pivot, relative to the largest diagonal entry.
const PIVOT_TOLERANCE: f64 = 1e-10;

/// A fitted linear model.
#[derive(Debug, Clone, PartialEq)]
pub struct RidgeModel {
    pub coefficients: Vec<f64>,
    pub intercept: f64,
}

impl RidgeModel {
    /// Fit on the rows of `dataset` named by `indices`.
    ///
    /// `fold` only tags a [`EvalError::NumericalFailure`].
    pub fn fit(
        dataset: &Dataset,
        indices: &[usize],
        alpha: f64,
        fit_intercept: bool,
        fold: usize,
    ) -> EvalResult<Self> {
        check_alpha(alpha)?;
        if indices.is_empty() {
            return Err(EvalError::EmptyInput {
                message: format!("fold {fold} has no training rows"),
            });
        }
        check_indices(dataset, indices, "train")?;

        let p = dataset.n_features();
        let n = indices.len() as f64;

        let mut x_mean = vec![0.0; p];
        let mut y_mean = 0.0;
        if fit_intercept {
            for &i in indices {
                for (m, x) in x_mean.iter_mut().zip(dataset.row(i)) {
                    *m += x;
                }
                y_mean += dataset.target(i);
            }
            x_mean.iter_mut().for_each(|m| *m /= n);
            y_mean /= n;
        }

        // Normal equations, lower triangle only.
        let mut gram = vec![0.0; p * p];
        let mut rhs = vec![0.0; p];
        let mut centered = vec![0.0; p];
        for &i in indices {
            for (c, (x, m)) in centered.iter_mut().zip(dataset.row(i).iter().zip(&x_mean)) {
                *c = x - m;
            }
            let yc = dataset.target(i) - y_mean;
            for r in 0..p {
                rhs[r] += centered[r] * yc;
                for c in 0..=r {
                    gram[r * p + c] += centered[r] * centered[c];
                }
            }
        }
        for d in 0..p {
            gram[d * p + d] += alpha;
        }

        let coefficients = cholesky_solve(&mut gram, &mut rhs, p)
            .map_err(|message| EvalError::numerical(fold, message))?;

        let intercept = if fit_intercept {
            y_mean - x_mean.iter().zip(&coefficients).map(|(m, w)| m * w).sum::<f64>()
        } else {
            0.0
        };

        Ok(Self {
            coefficients,
            intercept,
        })
    }

    pub fn predict(&self, row: &[f64]) -> f64 {
        self.intercept
            + row
                .iter()
                .zip(&self.coefficients)
                .map(|(x, w)| x * w)
                .sum::<f64>()
    }

    /// Mean squared error over the rows named by `indices`.
    pub fn mse(&self, dataset: &Dataset, indices: &[usize]) -> EvalResult<f64> {
        if indices.is_empty() {
            return Err(EvalError::EmptyInput {
                message: "no rows to score".to_string(),
            });
        }
        check_indices(dataset, indices, "validation")?;

        let sse: f64 = indices
            .iter()
            .map(|&i| {
                let residual = self.predict(dataset.row(i)) - dataset.target(i);
                residual * residual
            })
            .sum();
        Ok(sse / indices.len() as f64)
    }
}

/// Scores one fold: fit on its training rows, measure MSE on its validation rows.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FoldEvaluator {
    pub alpha: f64,
    pub fit_intercept: bool,
}

impl FoldEvaluator {
    pub fn new(alpha: f64) -> Self {
        Self {
            alpha,
            fit_intercept: true,
        }
    }

    pub fn with_intercept(mut self, fit_intercept: bool) -> Self {
        self.fit_intercept = fit_intercept;
        self
    }

    pub fn evaluate(&self, dataset: &Dataset, split: &FoldSplit) -> EvalResult<FoldResult> {
        check_alpha(self.alpha)?;
        check_split(dataset, split)?;

        let model = RidgeModel::fit(
            dataset,
            &split.train,
            self.alpha,
            self.fit_intercept,
            split.fold,
        )
        .map_err(|e| {
            warn!("Fold {} fit failed: {}", split.fold, e);
            e
        })?;

        let mse = model.mse(dataset, &split.validation)?;
        if !mse.is_finite() {
            warn!("Fold {} produced a non-finite validation error", split.fold);
            return Err(EvalError::numerical(
                split.fold,
                format!("validation error is not finite ({mse})"),
            ));
        }

        debug!(
            "Fold {}: mse {:.6} ({} train / {} validation)",
            split.fold,
            mse,
            split.train.len(),
            split.validation.len()
        );

        Ok(FoldResult {
            fold: split.fold,
            mse,
            n_train: split.train.len(),
            n_validation: split.validation.len(),
        })
    }
}

/// Fit with an intercept on the train rows of `split` and score its validation rows.
pub fn evaluate_fold(dataset: &Dataset, split: &FoldSplit, alpha: f64) -> EvalResult<FoldResult> {
    FoldEvaluator::new(alpha).evaluate(dataset, split)
}

fn check_alpha(alpha: f64) -> EvalResult<()> {
    if !alpha.is_finite() || alpha < 0.0 {
        return Err(EvalError::invalid(
            "alpha",
            format!("must be finite and non-negative, got {alpha}"),
        ));
    }
    Ok(())
}

fn check_indices(dataset: &Dataset, indices: &[usize], role: &str) -> EvalResult<()> {
    let n = dataset.n_samples();
    match indices.iter().find(|&&i| i >= n) {
        Some(i) => Err(EvalError::invalid(
            "split",
            format!("{role} index {i} out of range for {n} samples"),
        )),
        None => Ok(()),
    }
}

/// Reject splits that reference rows outside the dataset or share rows
/// between train and validation.
fn check_split(dataset: &Dataset, split: &FoldSplit) -> EvalResult<()> {
    let n = dataset.n_samples();
    if split.validation.is_empty() {
        return Err(EvalError::EmptyInput {
            message: format!("fold {} has no validation rows", split.fold),
        });
    }

    let mut in_train = vec![false; n];
    for &i in &split.train {
        if i >= n {
            return Err(EvalError::invalid(
                "split",
                format!("train index {i} out of range for {n} samples"),
            ));
        }
        in_train[i] = true;
    }
    for &i in &split.validation {
        if i >= n {
            return Err(EvalError::invalid(
                "split",
                format!("validation index {i} out of range for {n} samples"),
            ));
        }
        if in_train[i] {
            return Err(EvalError::invalid(
                "split",
                format!("index {i} is in both train and validation of fold {}", split.fold),
            ));
        }
    }
    Ok(())
}

/// Solve `A x = b` for symmetric positive definite `A` (lower triangle of a
/// row-major `p x p` buffer). `a` is overwritten with the Cholesky factor and
/// `b` with intermediate values.
fn cholesky_solve(a: &mut [f64], b: &mut [f64], p: usize) -> Result<Vec<f64>, String> {
    let max_diag = (0..p).map(|d| a[d * p + d]).fold(0.0_f64, f64::max);
    if !(max_diag > 0.0) || !max_diag.is_finite() {
        return Err("normal matrix has no positive diagonal".to_string());
    }
    let tolerance = PIVOT_TOLERANCE * max_diag;

    for j in 0..p {
        let mut pivot = a[j * p + j];
        for k in 0..j {
            pivot -= a[j * p + k] * a[j * p + k];
        }
        if !(pivot > tolerance) {
            return Err(format!(
                "normal matrix is singular or not positive definite (pivot {pivot:e} at column {j})"
            ));
        }
        let l_jj = pivot.sqrt();
        a[j * p + j] = l_jj;

        for i in (j + 1)..p {
            let mut sum = a[i * p + j];
            for k in 0..j {
                sum -= a[i * p + k] * a[j * p + k];
            }
            a[i * p + j] = sum / l_jj;
        }
    }

    // L z = b
    for i in 0..p {
        let mut sum = b[i];
        for k in 0..i {
            sum -= a[i * p + k] * b[k];
        }
        b[i] = sum / a[i * p + i];
    }

    // L' x = z
    let mut x = vec![0.0; p];
    for i in (0..p).rev() {
        let mut sum = b[i];
        for k in (i + 1)..p {
            sum -= a[k * p + i] * x[k];
        }
        x[i] = sum / a[i * p + i];
    }

    if x.iter().any(|v| !v.is_finite()) {
        return Err("solution contains non-finite coefficients".to_string());
    }
    Ok(x)
}
