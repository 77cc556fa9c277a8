//! Rule-based verdicts on the structure of a series.
//!
//! Each rule is a pure function of the raw series or of a decomposition. The
//! thresholds are in the units of the input series.

use crate::error::{AnalysisError, Result};
use crate::seasonality::DecompositionResult;
use crate::transform::{pct_change, rolling_mean};
use crate::utils::stats::{mean, std_dev};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Thresholds and window sizes for the heuristic rules.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HeuristicConfig {
    /// Residual standard deviation above which the series is irregular.
    pub irregularity_threshold: f64,
    /// Rolling-mean standard deviation above which the series is mean reverting.
    pub mean_reversion_threshold: f64,
    /// Window of the trailing rolling mean.
    pub rolling_window: usize,
}

impl Default for HeuristicConfig {
    fn default() -> Self {
        Self {
            irregularity_threshold: 10.0,
            mean_reversion_threshold: 10.0,
            rolling_window: 12,
        }
    }
}

impl HeuristicConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_irregularity_threshold(mut self, threshold: f64) -> Self {
        self.irregularity_threshold = threshold;
        self
    }

    pub fn with_mean_reversion_threshold(mut self, threshold: f64) -> Self {
        self.mean_reversion_threshold = threshold;
        self
    }

    pub fn with_rolling_window(mut self, window: usize) -> Self {
        self.rolling_window = window;
        self
    }

    pub fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("irregularity_threshold", self.irregularity_threshold),
            ("mean_reversion_threshold", self.mean_reversion_threshold),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(AnalysisError::InvalidParameter(format!(
                    "{} must be finite and non-negative, got {}",
                    name, value
                )));
            }
        }
        if self.rolling_window == 0 {
            return Err(AnalysisError::InvalidParameter(
                "rolling_window must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

/// The five diagnostic verdicts.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DiagnosticVerdicts {
    pub trend: bool,
    pub seasonality: bool,
    pub irregularity: bool,
    pub mean_reversion: bool,
    /// Standard deviation of period-over-period relative changes.
    pub volatility_value: f64,
}

/// Trend present: the mean of the defined trend values is non-zero.
///
/// This is an exact comparison, so almost every real series reports a trend.
pub fn has_trend(decomposition: &DecompositionResult) -> bool {
    let trend = decomposition.defined_trend();
    !trend.is_empty() && mean(&trend) != 0.0
}

/// Seasonality present: the mean of the seasonal component is non-zero.
pub fn has_seasonality(decomposition: &DecompositionResult) -> bool {
    !decomposition.seasonal.is_empty() && mean(&decomposition.seasonal) != 0.0
}

/// Irregularity present: the residual standard deviation exceeds `threshold`.
pub fn has_irregularity(decomposition: &DecompositionResult, threshold: f64) -> bool {
    std_dev(&decomposition.defined_residual()) > threshold
}

/// Mean reversion present: the standard deviation of the trailing rolling mean
/// exceeds `threshold`.
///
/// # Errors
/// `InsufficientData` if the series yields fewer than two rolling means.
pub fn has_mean_reversion(series: &[f64], window: usize, threshold: f64) -> Result<bool> {
    let means: Vec<f64> = rolling_mean(series, window)?
        .into_iter()
        .filter(|m| !m.is_nan())
        .collect();

    if means.len() < 2 {
        return Err(AnalysisError::InsufficientData {
            needed: window + 1,
            got: series.len(),
        });
    }

    Ok(std_dev(&means) > threshold)
}

/// Standard deviation of the period-over-period percentage changes.
///
/// Changes from a value that is zero relative to the series (or with a
/// non-finite ratio) are excluded.
///
/// # Errors
/// * `InsufficientData` - fewer than two usable changes (series shorter than 3)
/// * `NumericInstability` - every change divides by zero
pub fn volatility(series: &[f64]) -> Result<f64> {
    if series.len() < 3 {
        return Err(AnalysisError::InsufficientData {
            needed: 3,
            got: series.len(),
        });
    }

    let changes: Vec<f64> = pct_change(series)
        .into_iter()
        .skip(1)
        .filter(|c| c.is_finite())
        .collect();

    if changes.is_empty() {
        return Err(AnalysisError::NumericInstability(
            "every percentage change divides by zero".to_string(),
        ));
    }
    if changes.len() < 2 {
        return Err(AnalysisError::InsufficientData {
            needed: 2,
            got: changes.len(),
        });
    }

    Ok(std_dev(&changes))
}

/// Applies all heuristic rules with one configuration.
#[derive(Debug, Clone, Default)]
pub struct HeuristicAnalyzer {
    config: HeuristicConfig,
}

impl HeuristicAnalyzer {
    pub fn new(config: HeuristicConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &HeuristicConfig {
        &self.config
    }

    /// Evaluate every rule on the series and its decomposition.
    pub fn analyze(
        &self,
        series: &[f64],
        decomposition: &DecompositionResult,
    ) -> Result<DiagnosticVerdicts> {
        self.config.validate()?;

        let verdicts = DiagnosticVerdicts {
            trend: has_trend(decomposition),
            seasonality: has_seasonality(decomposition),
            irregularity: has_irregularity(decomposition, self.config.irregularity_threshold),
            mean_reversion: has_mean_reversion(
                series,
                self.config.rolling_window,
                self.config.mean_reversion_threshold,
            )?,
            volatility_value: volatility(series)?,
        };

        debug!(?verdicts, "heuristic verdicts");
        Ok(verdicts)
    }
}
