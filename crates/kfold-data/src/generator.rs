//! Deterministic synthetic regression data.
//!
//! [`DataGenerator`] draws everything from one `ChaCha8Rng` seeded with the
//! caller's seed, in a fixed order:
//!
//! 1. the feature matrix, row-major, each entry ~ N(0, 1);
//! 2. the ground-truth coefficients, each ~ U[0, 100);
//! 3. one N(0, 1) noise draw per sample, scaled by `noise`.
//!
//! Noise draws happen even when `noise == 0`, so the features and
//! coefficients for a seed do not depend on the noise level.

use kfold_types::{Dataset, EvalError, EvalResult};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::f64::consts::TAU;
use tracing::debug;

const COEFFICIENT_SCALE: f64 = 100.0;

/// Synthetic linear-regression data generator.
#[derive(Debug, Clone, PartialEq)]
pub struct DataGenerator {
    n_samples: usize,
    n_features: usize,
    noise: f64,
    bias: f64,
    seed: u64,
}

impl DataGenerator {
    pub fn new(n_samples: usize, n_features: usize) -> Self {
        Self {
            n_samples,
            n_features,
            noise: 0.0,
            bias: 0.0,
            seed: 0,
        }
    }

    pub fn with_noise(mut self, noise: f64) -> Self {
        self.noise = noise;
        self
    }

    pub fn with_bias(mut self, bias: f64) -> Self {
        self.bias = bias;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    fn validate(&self) -> EvalResult<()> {
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
        if !self.bias.is_finite() {
            return Err(EvalError::invalid("bias", "must be finite"));
        }
        Ok(())
    }

    /// Materialize the dataset. Identical generators yield bit-identical data.
    pub fn generate(&self) -> EvalResult<Dataset> {
        self.validate()?;

        let mut rng = ChaCha8Rng::seed_from_u64(self.seed);

        let features: Vec<f64> = (0..self.n_samples * self.n_features)
            .map(|_| standard_normal(&mut rng))
            .collect();

        let coefficients: Vec<f64> = (0..self.n_features)
            .map(|_| COEFFICIENT_SCALE * rng.gen::<f64>())
            .collect();

        let targets: Vec<f64> = features
            .chunks_exact(self.n_features)
            .map(|row| {
                let signal: f64 = row.iter().zip(&coefficients).map(|(x, w)| x * w).sum();
                self.bias + signal + self.noise * standard_normal(&mut rng)
            })
            .collect();

        debug!(
            "Generated {} samples x {} features (noise {}, seed {})",
            self.n_samples, self.n_features, self.noise, self.seed
        );

        Dataset::from_parts(
            self.n_samples,
            self.n_features,
            features,
            targets,
            coefficients,
            self.bias,
        )
    }
}

/// Generate a dataset from the four declared inputs.
pub fn generate(n_samples: usize, n_features: usize, noise: f64, seed: u64) -> EvalResult<Dataset> {
    DataGenerator::new(n_samples, n_features)
        .with_noise(noise)
        .with_seed(seed)
        .generate()
}

/// Box-Muller draw from N(0, 1). Consumes exactly two uniforms.
fn standard_normal<R: Rng + ?Sized>(rng: &mut R) -> f64 {
    // 1 - U[0, 1) keeps the log argument in (0, 1]
    let u1 = 1.0 - rng.gen::<f64>();
    let u2 = rng.gen::<f64>();
    (-2.0 * u1.ln()).sqrt() * (TAU * u2).cos()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_seed_is_bit_identical() {
        let a = generate(50, 4, 0.3, 7).unwrap();
        let b = generate(50, 4, 0.3, 7).unwrap();

        let bits = |v: &[f64]| v.iter().map(|x| x.to_bits()).collect::<Vec<_>>();
        assert_eq!(bits(a.features()), bits(b.features()));
        assert_eq!(bits(a.targets()), bits(b.targets()));
        assert_eq!(bits(a.coefficients()), bits(b.coefficients()));
    }

    #[test]
    fn different_seeds_differ() {
        let a = generate(20, 3, 0.0, 1).unwrap();
        let b = generate(20, 3, 0.0, 2).unwrap();
        assert_ne!(a.features(), b.features());
    }

    #[test]
    fn shape_matches_request() {
        let data = generate(12, 3, 1.0, 0).unwrap();
        assert_eq!(data.n_samples(), 12);
        assert_eq!(data.n_features(), 3);
        assert_eq!(data.features().len(), 36);
        assert_eq!(data.targets().len(), 12);
        assert_eq!(data.coefficients().len(), 3);
    }

    #[test]
    fn noiseless_targets_are_exact_linear_combination() {
        let data = DataGenerator::new(30, 4)
            .with_bias(2.5)
            .with_seed(11)
            .generate()
            .unwrap();

        for i in 0..data.n_samples() {
            let expected: f64 = 2.5
                + data
                    .row(i)
                    .iter()
                    .zip(data.coefficients())
                    .map(|(x, w)| x * w)
                    .sum::<f64>();
            assert!((data.target(i) - expected).abs() < 1e-9);
        }
    }

    #[test]
    fn noise_level_does_not_change_features() {
        let clean = generate(25, 2, 0.0, 5).unwrap();
        let noisy = generate(25, 2, 3.0, 5).unwrap();
        assert_eq!(clean.features(), noisy.features());
        assert_eq!(clean.coefficients(), noisy.coefficients());
        assert_ne!(clean.targets(), noisy.targets());
    }

    #[test]
    fn coefficients_in_range() {
        let data = generate(5, 20, 0.0, 3).unwrap();
        assert!(data
            .coefficients()
            .iter()
            .all(|w| (0.0..COEFFICIENT_SCALE).contains(w)));
        assert!(data.features().iter().all(|x| x.is_finite()));
    }

    #[test]
    fn invalid_inputs_are_rejected() {
        assert!(generate(0, 3, 0.0, 0).unwrap_err().is_invalid_parameter());
        assert!(generate(10, 0, 0.0, 0).unwrap_err().is_invalid_parameter());
        assert!(generate(10, 3, -1.0, 0).unwrap_err().is_invalid_parameter());
        assert!(generate(10, 3, f64::NAN, 0).unwrap_err().is_invalid_parameter());
    }
}
