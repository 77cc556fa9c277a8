//! Derived series used by the diagnostic heuristics.

pub mod window;

pub use window::{pct_change, rolling_mean};
