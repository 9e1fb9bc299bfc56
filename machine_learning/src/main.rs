use std::env;

use anyhow::Context;
use log::debug;
use machine_learning::{
    demo::DemoConfig,
    synthetic::linear_dataset,
    training::{TrainerBuilder, generate_rng},
};

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let config = match env::args().nth(1) {
        Some(path) => DemoConfig::from_path(&path)
            .with_context(|| format!("failed to load demo config from '{path}'"))?,
        None => DemoConfig::default(),
    };
    debug!("running with {config:?}");

    let dataset = linear_dataset(&config.data, &mut generate_rng(config.data.seed))
        .context("failed to generate the dataset")?;

    let mut trainer = TrainerBuilder::new().build_linear(dataset.x_size(), &config.trainer)?;
    let fitted = trainer.fit_with(&dataset, |epoch, loss| {
        println!("epoch {epoch}: loss {loss}");
    })?;

    let weights: Vec<f32> = fitted.weights()?.iter().copied().collect();
    let bias = fitted.bias()?[0];

    println!("w, true_w: {weights:?}, {:?}", config.data.true_weights);
    println!("b, true_b: {bias}, {}", config.data.true_bias);

    Ok(())
}
