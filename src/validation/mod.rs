//! Stationarity testing.
//!
//! # Example
//!
//! ```
//! use anofox_tsa::validation::{adf_test, AdfConfig, LagSelection};
//!
//! let series: Vec<f64> = (0..120).map(|i| ((i * 7919) % 101) as f64 / 10.0).collect();
//! let config = AdfConfig::new().with_lag_selection(LagSelection::Bic);
//! let result = adf_test(&series, &config).unwrap();
//! println!("ADF = {:.3}, p = {:.4}", result.statistic, result.p_value);
//! ```

pub mod stationarity;

pub use stationarity::{
    adf_critical_values, adf_p_value, adf_test, default_max_lag, test_stationarity, AdfConfig,
    CriticalValues, LagSelection, StationarityResult,
};
