use std::num::NonZeroUsize;

use serde::Deserialize;

use crate::{MlErr, Result};

const DEFAULT_BATCH_SIZE: NonZeroUsize = NonZeroUsize::new(10).unwrap();
const DEFAULT_EPOCHS: NonZeroUsize = NonZeroUsize::new(5).unwrap();

/// The hyperparameters of a training run.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct TrainerConfig {
    pub batch_size: NonZeroUsize,
    pub learning_rate: f32,
    pub epochs: NonZeroUsize,
    /// Standard deviation of the initial weights.
    pub init_std_dev: f32,
    /// Seeds both the initialization and the shuffling, `None` draws one from the OS.
    pub seed: Option<u64>,
}

impl Default for TrainerConfig {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
            learning_rate: 0.02,
            epochs: DEFAULT_EPOCHS,
            init_std_dev: 0.01,
            seed: None,
        }
    }
}

impl TrainerConfig {
    /// Checks the values no type can rule out.
    ///
    /// # Returns
    /// An error if the learning rate is not a positive finite number or the standard deviation
    /// is negative or not finite.
    pub fn validate(&self) -> Result<()> {
        if !self.learning_rate.is_finite() || self.learning_rate <= 0.0 {
            return Err(MlErr::InvalidConfig(format!(
                "learning rate must be positive and finite, got {}",
                self.learning_rate
            )));
        }

        if !self.init_std_dev.is_finite() || self.init_std_dev < 0.0 {
            return Err(MlErr::InvalidConfig(format!(
                "initial standard deviation must be non negative and finite, got {}",
                self.init_std_dev
            )));
        }

        Ok(())
    }
}
