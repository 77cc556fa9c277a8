//! End-to-end analysis of one series.
//!
//! The decomposition, the stationarity test and the correlation estimates do not
//! depend on each other and run concurrently on the rayon pool; the heuristic
//! verdicts are computed once all three have finished.
//!
//! # Example
//!
//! ```
//! use anofox_tsa::prelude::*;
//! use chrono::{TimeZone, Utc};
//!
//! let timestamps: Vec<_> = (0..48)
//!     .map(|i| Utc.with_ymd_and_hms(2020 + i / 12, (i % 12) as u32 + 1, 1, 0, 0, 0).unwrap())
//!     .collect();
//! let values: Vec<f64> = (0..48)
//!     .map(|i| 100.0 + 2.0 * i as f64 + 15.0 * ((i % 12) as f64 - 5.5).abs() + ((i * 37) % 11) as f64)
//!     .collect();
//! let series = TimeSeries::univariate(timestamps, values).unwrap();
//!
//! let report = Analyzer::new(AnalysisConfig::default()).analyze(&series).unwrap();
//! assert_eq!(report.correlation.acf[0], 1.0);
//! assert_eq!(report.decomposition.period, 12);
//! ```

use crate::config::AnalysisConfig;
use crate::core::TimeSeries;
use crate::diagnostics::{DiagnosticVerdicts, HeuristicAnalyzer};
use crate::error::{AnalysisError, Result};
use crate::features::{correlate, CorrelationResult};
use crate::seasonality::{ClassicalDecomposer, DecompositionResult};
use crate::validation::{adf_test, StationarityResult};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, debug_span};

/// Cooperative cancellation flag shared between a caller and running analyses.
///
/// Clones share the same flag.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation. Analyses stop at their next stage boundary.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    fn check(&self) -> Result<()> {
        if self.is_cancelled() {
            Err(AnalysisError::Cancelled)
        } else {
            Ok(())
        }
    }
}

/// Everything one analysis produces.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisReport {
    /// Label of the analyzed series, if it had one.
    pub label: Option<String>,
    /// Observations after the missing-value policy was applied.
    pub n_obs: usize,
    pub decomposition: DecompositionResult,
    pub stationarity: StationarityResult,
    pub correlation: CorrelationResult,
    pub verdicts: DiagnosticVerdicts,
}

impl AnalysisReport {
    /// Encode as JSON. Floats survive a round trip bit for bit.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Runs the full set of components with one configuration.
#[derive(Debug, Clone, Default)]
pub struct Analyzer {
    config: AnalysisConfig,
}

impl Analyzer {
    pub fn new(config: AnalysisConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// Analyze a validated series.
    ///
    /// The first failing component aborts the analysis with its error.
    pub fn analyze(&self, series: &TimeSeries) -> Result<AnalysisReport> {
        self.analyze_with_cancel(series, &CancellationToken::new())
    }

    /// Analyze a validated series, stopping with `Cancelled` once `token` is set.
    pub fn analyze_with_cancel(
        &self,
        series: &TimeSeries,
        token: &CancellationToken,
    ) -> Result<AnalysisReport> {
        self.config.validate()?;
        token.check()?;

        let series = series.sanitized(self.config.missing_values)?;
        let values = series.values();

        let span = debug_span!(
            "analysis",
            label = series.label().unwrap_or("unnamed"),
            n = values.len(),
            period = self.config.period,
        );
        let _guard = span.enter();

        let decomposer =
            ClassicalDecomposer::new(self.config.period).with_model(self.config.model);

        let run_decomposition = || -> Result<DecompositionResult> {
            token.check()?;
            decomposer.decompose(values)
        };
        let run_stationarity = || -> Result<StationarityResult> {
            token.check()?;
            adf_test(values, &self.config.adf)
        };
        let run_correlation = || -> Result<CorrelationResult> {
            token.check()?;
            correlate(values, self.config.max_lag)
        };

        let (decomposition, (stationarity, correlation)) = if self.config.parallel {
            rayon::join(run_decomposition, || {
                rayon::join(run_stationarity, run_correlation)
            })
        } else {
            (
                run_decomposition(),
                (run_stationarity(), run_correlation()),
            )
        };

        token.check()?;
        let decomposition = decomposition?;
        let stationarity = stationarity?;
        let correlation = correlation?;

        let verdicts =
            HeuristicAnalyzer::new(self.config.heuristics.clone()).analyze(values, &decomposition)?;

        debug!(
            adf_p_value = stationarity.p_value,
            is_stationary = stationarity.is_stationary,
            max_lag = correlation.max_lag(),
            "analysis complete"
        );

        Ok(AnalysisReport {
            label: series.label().map(str::to_string),
            n_obs: values.len(),
            decomposition,
            stationarity,
            correlation,
            verdicts,
        })
    }
}
