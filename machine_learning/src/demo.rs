use std::{fs, path::Path};

use serde::Deserialize;

use crate::{MlErr, Result, synthetic::SyntheticSpec, training::TrainerConfig};

/// Everything the trainer binary runs with: the dataset to generate and how to fit it.
///
/// Every field is optional in JSON, missing ones keep the demo values.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct DemoConfig {
    pub data: SyntheticSpec,
    pub trainer: TrainerConfig,
}

impl DemoConfig {
    /// Parses a `DemoConfig` from JSON.
    ///
    /// # Errors
    /// An `InvalidConfig` if the JSON is malformed or the trainer config is invalid.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| MlErr::InvalidConfig(format!("invalid JSON: {e}")))?;

        config.trainer.validate()?;
        Ok(config)
    }

    /// Loads a `DemoConfig` from a JSON file.
    ///
    /// # Errors
    /// An `InvalidConfig` if the file cannot be read or parsed.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            MlErr::InvalidConfig(format!("cannot read '{}': {e}", path.display()))
        })?;

        Self::from_json_str(&content)
    }
}
