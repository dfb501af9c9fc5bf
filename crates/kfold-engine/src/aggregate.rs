//! Fold error aggregation.

use kfold_types::{CvReport, EvalError, EvalResult, FoldResult};

/// Arithmetic mean of the fold errors, summed in input order.
pub fn aggregate(folds: &[FoldResult]) -> EvalResult<f64> {
    if folds.is_empty() {
        return Err(EvalError::EmptyInput {
            message: "no fold results to aggregate".to_string(),
        });
    }
    let total: f64 = folds.iter().map(|f| f.mse).sum();
    Ok(total / folds.len() as f64)
}

/// Mean score plus spread and the per-fold detail.
pub fn summarize(folds: Vec<FoldResult>) -> EvalResult<CvReport> {
    let score = aggregate(&folds)?;

    let std_dev = if folds.len() > 1 {
        let ss: f64 = folds.iter().map(|f| (f.mse - score).powi(2)).sum();
        (ss / (folds.len() - 1) as f64).sqrt()
    } else {
        0.0
    };
    let min_error = folds.iter().map(|f| f.mse).fold(f64::INFINITY, f64::min);
    let max_error = folds.iter().map(|f| f.mse).fold(f64::NEG_INFINITY, f64::max);

    Ok(CvReport {
        score,
        std_dev,
        min_error,
        max_error,
        folds,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn results(errors: &[f64]) -> Vec<FoldResult> {
        errors
            .iter()
            .enumerate()
            .map(|(fold, &mse)| FoldResult {
                fold,
                mse,
                n_train: 8,
                n_validation: 2,
            })
            .collect()
    }

    #[test]
    fn mean_of_errors() {
        let score = aggregate(&results(&[1.0, 2.0, 3.0, 6.0])).unwrap();
        assert_eq!(score, 3.0);
    }

    #[test]
    fn order_does_not_matter() {
        let forward = aggregate(&results(&[0.5, 1.5, 4.0])).unwrap();
        let backward = aggregate(&results(&[4.0, 1.5, 0.5])).unwrap();
        assert!((forward - backward).abs() < 1e-15);
        assert!((forward - 2.0).abs() < 1e-15);
    }

    #[test]
    fn empty_input_is_an_error() {
        assert!(matches!(
            aggregate(&[]),
            Err(EvalError::EmptyInput { .. })
        ));
        assert!(summarize(Vec::new()).is_err());
    }

    #[test]
    fn summary_carries_spread() {
        let report = summarize(results(&[2.0, 4.0, 6.0])).unwrap();
        assert_eq!(report.score, 4.0);
        assert_eq!(report.std_dev, 2.0);
        assert_eq!(report.min_error, 2.0);
        assert_eq!(report.max_error, 6.0);
        assert_eq!(report.folds.len(), 3);
    }
}
