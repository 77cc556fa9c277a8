//! # anofox-tsa
//!
//! Time series analysis engine for evenly spaced univariate series.
//!
//! Validates a tabular input into a [`core::TimeSeries`], then computes a
//! classical decomposition, an augmented Dickey-Fuller test, ACF/PACF
//! estimates and a set of heuristic verdicts on top of them.

#![allow(clippy::upper_case_acronyms)]
#![allow(clippy::needless_range_loop)]

pub mod analysis;
pub mod config;
pub mod core;
pub mod diagnostics;
pub mod error;
pub mod features;
pub mod seasonality;
pub mod transform;
pub mod utils;
pub mod validation;

pub use error::{AnalysisError, Result};

pub mod prelude {
    pub use crate::analysis::{AnalysisReport, Analyzer, CancellationToken};
    pub use crate::config::AnalysisConfig;
    pub use crate::core::{MissingValuePolicy, RawTable, SeriesValidator, TimeSeries};
    pub use crate::diagnostics::{DiagnosticVerdicts, HeuristicConfig};
    pub use crate::error::{AnalysisError, Result};
    pub use crate::features::CorrelationResult;
    pub use crate::seasonality::{ClassicalDecomposer, DecompositionModel, DecompositionResult};
    pub use crate::validation::{AdfConfig, LagSelection, StationarityResult};
}
