//! Numeric helpers shared by the analysis components.

pub mod ols;
pub mod stats;

pub use ols::{ols_fit, OLSResult};
pub use stats::{is_constant, mean, normal_cdf, normal_quantile, std_dev, variance};
