use std::time::Instant;

use log::debug;
use ndarray::array;
use similarity::{correlation_coeff, cosine_similarity};

fn main() {
    env_logger::init();

    let x = array![1.0, 2.0, 3.0];
    let y = array![2.0, 1.5, 0.5];
    debug!("x = {x}, y = {y}");

    let start = Instant::now();
    println!("Correlation coeff: {}", correlation_coeff(x.view(), y.view()));
    println!("Time: {}", start.elapsed().as_secs_f64());

    let start = Instant::now();
    println!("Cosine similarity: {}", cosine_similarity(x.view(), y.view()));
    println!("Time: {}", start.elapsed().as_secs_f64());
}
