//! Statistics over pairs of equal-length vectors.

pub mod metrics;

pub use metrics::{correlation_coeff, cosine_similarity, inner_product};
