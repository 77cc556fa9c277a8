//! Serial correlation structure of a series.
//!
//! # Example
//!
//! ```
//! use anofox_tsa::features::correlate;
//!
//! let series: Vec<f64> = (0..48).map(|i| (i as f64 * 0.5).sin() + 0.1 * i as f64).collect();
//! let result = correlate(&series, Some(12)).unwrap();
//! assert_eq!(result.acf[0], 1.0);
//! assert_eq!(result.pacf.len(), 13);
//! ```

pub mod autocorrelation;

pub use autocorrelation::{
    acf, correlate, default_max_lag, pacf, pacf_from_acf, CorrelationResult,
    DEFAULT_MAX_LAG_CAP,
};
