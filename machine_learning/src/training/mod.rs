mod builder;
mod config;
mod trainer;

pub use builder::{LinearTrainer, TrainerBuilder, generate_rng};
pub use config::TrainerConfig;
pub use trainer::{Fitted, Trainer};
