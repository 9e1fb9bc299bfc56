use log::debug;
use ndarray::{Array1, Array2, Axis};
use rand::Rng;
use rand_distr::{Distribution, Normal, StandardNormal};
use serde::Deserialize;

use crate::{MlErr, Result, dataset::Dataset};

/// Describes a linear dataset, `y = X·w + b + ε` with `ε ~ N(0, noise_std)`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct SyntheticSpec {
    pub true_weights: Vec<f32>,
    pub true_bias: f32,
    pub num_examples: usize,
    pub noise_std: f32,
    /// Seeds the generated samples, `None` draws one from the OS.
    pub seed: Option<u64>,
}

impl Default for SyntheticSpec {
    fn default() -> Self {
        Self {
            true_weights: vec![2.0, -3.4],
            true_bias: 4.2,
            num_examples: 1000,
            noise_std: 0.01,
            seed: None,
        }
    }
}

/// Generates a linear dataset with standard normal features.
///
/// # Arguments
/// * `spec` - The shape of the dataset and the line it follows.
/// * `rng` - The random number generator for the features and the noise.
///
/// # Returns
/// The dataset or an error if the noise's standard deviation is negative or not finite.
pub fn linear_dataset<R: Rng>(spec: &SyntheticSpec, rng: &mut R) -> Result<Dataset> {
    if !spec.noise_std.is_finite() || spec.noise_std < 0.0 {
        return Err(MlErr::Distribution(format!(
            "noise standard deviation must be non negative and finite, got {}",
            spec.noise_std
        )));
    }

    let noise = Normal::new(0.0, spec.noise_std)?;
    let num_inputs = spec.true_weights.len();
    let weights = Array1::from_vec(spec.true_weights.clone());

    let x: Array2<f32> = Array2::from_shape_simple_fn((spec.num_examples, num_inputs), || {
        StandardNormal.sample(rng)
    });

    let mut y = x.dot(&weights) + spec.true_bias;
    y.mapv_inplace(|v| v + noise.sample(rng));

    debug!(
        "generated {} samples with {} features",
        spec.num_examples, num_inputs
    );

    Dataset::new(x, y.insert_axis(Axis(1)))
}

#[cfg(test)]
mod tests {
    use rand::{SeedableRng, rngs::StdRng};

    use super::*;

    #[test]
    fn default_matches_demo() {
        let spec = SyntheticSpec::default();

        assert_eq!(spec.true_weights, [2.0, -3.4]);
        assert_eq!(spec.true_bias, 4.2);
        assert_eq!(spec.num_examples, 1000);
        assert_eq!(spec.noise_std, 0.01);
    }

    #[test]
    fn shapes_follow_spec() {
        let spec = SyntheticSpec {
            num_examples: 37,
            ..Default::default()
        };
        let dataset = linear_dataset(&spec, &mut StdRng::seed_from_u64(0)).unwrap();

        assert_eq!(dataset.len(), 37);
        assert_eq!(dataset.x_size(), 2);
        assert_eq!(dataset.y_size(), 1);
    }

    #[test]
    fn noise_free_labels_are_exact() {
        let spec = SyntheticSpec {
            noise_std: 0.0,
            num_examples: 50,
            ..Default::default()
        };
        let dataset = linear_dataset(&spec, &mut StdRng::seed_from_u64(1)).unwrap();

        for (x, y) in dataset.x().rows().into_iter().zip(dataset.y().rows()) {
            let expected = 2.0 * x[0] - 3.4 * x[1] + 4.2;
            assert!((y[0] - expected).abs() < 1e-4);
        }
    }

    #[test]
    fn noise_stays_small() {
        let spec = SyntheticSpec::default();
        let dataset = linear_dataset(&spec, &mut StdRng::seed_from_u64(2)).unwrap();

        for (x, y) in dataset.x().rows().into_iter().zip(dataset.y().rows()) {
            let expected = 2.0 * x[0] - 3.4 * x[1] + 4.2;
            assert!((y[0] - expected).abs() < 0.1);
        }
    }

    #[test]
    fn same_seed_same_data() {
        let spec = SyntheticSpec::default();
        let a = linear_dataset(&spec, &mut StdRng::seed_from_u64(3)).unwrap();
        let b = linear_dataset(&spec, &mut StdRng::seed_from_u64(3)).unwrap();

        assert_eq!(a.x(), b.x());
        assert_eq!(a.y(), b.y());
    }

    #[test]
    fn rejects_bad_noise() {
        for noise_std in [-1.0, f32::NAN, f32::INFINITY] {
            let spec = SyntheticSpec {
                noise_std,
                ..Default::default()
            };

            let generated = linear_dataset(&spec, &mut StdRng::seed_from_u64(0));
            assert!(matches!(generated, Err(MlErr::Distribution(_))));
        }
    }
}
