use log::debug;
use rand::{SeedableRng, rngs::StdRng};

use super::{Trainer, TrainerConfig};
use crate::{
    Result,
    arch::{Sequential, loss::Mse},
    optimization::GradientDescent,
};

/// The trainer for a linear regression model.
pub type LinearTrainer = Trainer<Sequential, GradientDescent, Mse, StdRng>;

/// Builds `Trainer`s given a config.
#[derive(Default)]
pub struct TrainerBuilder;

impl TrainerBuilder {
    /// Creates a new `TrainerBuilder`.
    pub fn new() -> Self {
        Self
    }

    /// Builds a linear regression trainer: a single dense layer fitted with mini-batch
    /// gradient descent over the mean squared error.
    ///
    /// # Arguments
    /// * `num_inputs` - The amount of features of each sample.
    /// * `config` - The hyperparameters of the training run.
    ///
    /// # Returns
    /// The trainer or an error if the config is invalid.
    pub fn build_linear(&self, num_inputs: usize, config: &TrainerConfig) -> Result<LinearTrainer> {
        config.validate()?;
        debug!("building linear trainer for {num_inputs} inputs with {config:?}");

        let trainer = Trainer::new(
            Sequential::linear(num_inputs),
            GradientDescent::new(config.learning_rate),
            Mse::new(),
            config.batch_size,
            config.epochs,
            config.init_std_dev,
            generate_rng(config.seed),
        );

        Ok(trainer)
    }
}

/// Returns a seeded generator, or one seeded from the OS when `seed` is `None`.
pub fn generate_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    }
}

#[cfg(test)]
mod tests {
    use rand::Rng;

    use super::*;
    use crate::{MlErr, arch::Model};

    #[test]
    fn same_seed_same_stream() {
        let a: Vec<u32> = generate_rng(Some(3)).random_iter().take(4).collect();
        let b: Vec<u32> = generate_rng(Some(3)).random_iter().take(4).collect();

        assert_eq!(a, b);
    }

    #[test]
    fn builds_linear_model() {
        let trainer = TrainerBuilder::new()
            .build_linear(2, &TrainerConfig::default())
            .unwrap();

        assert_eq!(trainer.model().size(), 3);
    }

    #[test]
    fn invalid_config_is_rejected() {
        let config = TrainerConfig {
            init_std_dev: -1.0,
            ..Default::default()
        };

        let built = TrainerBuilder::new().build_linear(2, &config);
        assert!(matches!(built, Err(MlErr::InvalidConfig(_))));
    }
}
