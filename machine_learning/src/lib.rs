pub mod arch;
pub mod dataset;
pub mod demo;
pub mod error;
pub mod initialization;
pub mod optimization;
pub mod synthetic;
pub mod training;

pub use error::{MlErr, Result};
