//! Classical decomposition by centered moving averages.
//!
//! Splits a series into three components:
//! - Trend: centered moving average over one seasonal cycle
//! - Seasonal: per-phase average of the detrended series, normalized over one cycle
//! - Residual: what remains after removing trend and seasonal
//!
//! The trend is undefined for the first and last `period / 2` observations, and so is
//! the residual.

use crate::error::{AnalysisError, Result};
use crate::utils::stats::variance;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// How the components combine into the observed series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecompositionModel {
    /// observed = trend + seasonal + residual
    #[default]
    Additive,
    /// observed = trend * seasonal * residual
    Multiplicative,
}

/// Result of classical decomposition.
///
/// All four sequences are aligned with the input and have its length.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecompositionResult {
    /// Copy of the input series.
    pub observed: Vec<f64>,
    /// Trend component, `None` within `period / 2` of either boundary.
    pub trend: Vec<Option<f64>>,
    /// Seasonal component, defined everywhere.
    pub seasonal: Vec<f64>,
    /// Residual component, defined wherever the trend is.
    pub residual: Vec<Option<f64>>,
    /// Seasonal period used.
    pub period: usize,
    /// Combination model used.
    pub model: DecompositionModel,
}

impl DecompositionResult {
    pub fn len(&self) -> usize {
        self.observed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observed.is_empty()
    }

    /// Trend values where defined.
    pub fn defined_trend(&self) -> Vec<f64> {
        self.trend.iter().flatten().copied().collect()
    }

    /// Residual values where defined.
    pub fn defined_residual(&self) -> Vec<f64> {
        self.residual.iter().flatten().copied().collect()
    }

    /// The normalized seasonal index for each phase of one cycle.
    pub fn seasonal_indices(&self) -> &[f64] {
        &self.seasonal[..self.period.min(self.seasonal.len())]
    }

    /// Get the trend strength (0 to 1).
    /// Values close to 1 indicate strong trend.
    pub fn trend_strength(&self) -> f64 {
        let (trend, _, remainder) = self.additive_parts();
        let trend_plus_remainder: Vec<f64> = trend
            .iter()
            .zip(remainder.iter())
            .map(|(t, r)| t + r)
            .collect();
        strength(&remainder, &trend_plus_remainder)
    }

    /// Get the seasonal strength (0 to 1).
    /// Values close to 1 indicate strong seasonality.
    pub fn seasonal_strength(&self) -> f64 {
        let (_, seasonal, remainder) = self.additive_parts();
        let seasonal_plus_remainder: Vec<f64> = seasonal
            .iter()
            .zip(remainder.iter())
            .map(|(s, r)| s + r)
            .collect();
        strength(&remainder, &seasonal_plus_remainder)
    }

    /// Components at defined indices, on the log scale for the multiplicative model.
    fn additive_parts(&self) -> (Vec<f64>, Vec<f64>, Vec<f64>) {
        let to_scale = |v: f64| match self.model {
            DecompositionModel::Additive => v,
            DecompositionModel::Multiplicative => v.ln(),
        };

        let mut trend = Vec::new();
        let mut seasonal = Vec::new();
        let mut remainder = Vec::new();
        for i in 0..self.len() {
            if let (Some(t), Some(r)) = (self.trend[i], self.residual[i]) {
                trend.push(to_scale(t));
                seasonal.push(to_scale(self.seasonal[i]));
                remainder.push(to_scale(r));
            }
        }
        (trend, seasonal, remainder)
    }
}

fn strength(remainder: &[f64], component_plus_remainder: &[f64]) -> f64 {
    let var_cr = variance(component_plus_remainder);
    if var_cr.is_nan() || var_cr < 1e-10 {
        return 0.0;
    }
    (1.0 - variance(remainder) / var_cr).clamp(0.0, 1.0)
}

/// Classical decomposition configuration and algorithm.
#[derive(Debug, Clone)]
pub struct ClassicalDecomposer {
    /// Seasonal period.
    period: usize,
    /// Combination model.
    model: DecompositionModel,
}

impl ClassicalDecomposer {
    /// Create an additive decomposer with the given seasonal period.
    pub fn new(period: usize) -> Self {
        Self {
            period,
            model: DecompositionModel::Additive,
        }
    }

    /// Set the combination model.
    pub fn with_model(mut self, model: DecompositionModel) -> Self {
        self.model = model;
        self
    }

    pub fn period(&self) -> usize {
        self.period
    }

    pub fn model(&self) -> DecompositionModel {
        self.model
    }

    /// Decompose the series.
    ///
    /// # Errors
    /// * `InvalidParameter` - period below 2, or non-positive data for the multiplicative model
    /// * `MissingValues` - the series contains NaN or infinite values
    /// * `InsufficientData` - fewer than two full cycles of data
    pub fn decompose(&self, series: &[f64]) -> Result<DecompositionResult> {
        let period = self.period;
        let n = series.len();

        if period < 2 {
            return Err(AnalysisError::InvalidParameter(format!(
                "seasonal period must be at least 2, got {}",
                period
            )));
        }
        if series.iter().any(|v| !v.is_finite()) {
            return Err(AnalysisError::MissingValues);
        }
        if n < 2 * period {
            return Err(AnalysisError::InsufficientData {
                needed: 2 * period,
                got: n,
            });
        }
        if self.model == DecompositionModel::Multiplicative && series.iter().any(|&v| v <= 0.0) {
            return Err(AnalysisError::InvalidParameter(
                "multiplicative decomposition requires strictly positive values".to_string(),
            ));
        }

        debug!(n, period, model = ?self.model, "classical decomposition");

        let trend = centered_moving_average(series, period);

        let detrended: Vec<Option<f64>> = series
            .iter()
            .zip(trend.iter())
            .map(|(&y, t)| t.map(|t| self.remove(y, t)))
            .collect();

        let indices = self.seasonal_indices(&detrended);

        let seasonal: Vec<f64> = (0..n).map(|i| indices[i % period]).collect();

        let residual: Vec<Option<f64>> = (0..n)
            .map(|i| trend[i].map(|t| self.remove(self.remove(series[i], t), seasonal[i])))
            .collect();

        Ok(DecompositionResult {
            observed: series.to_vec(),
            trend,
            seasonal,
            residual,
            period,
            model: self.model,
        })
    }

    /// Per-phase averages of the detrended series, normalized over one cycle.
    fn seasonal_indices(&self, detrended: &[Option<f64>]) -> Vec<f64> {
        let period = self.period;
        let mut sums = vec![0.0; period];
        let mut counts = vec![0usize; period];

        for (i, value) in detrended.iter().enumerate() {
            if let Some(v) = value {
                sums[i % period] += v;
                counts[i % period] += 1;
            }
        }

        // Two full cycles guarantee every phase has at least one detrended value
        let raw: Vec<f64> = sums
            .iter()
            .zip(counts.iter())
            .map(|(s, &c)| s / c as f64)
            .collect();
        let center = raw.iter().sum::<f64>() / period as f64;

        match self.model {
            DecompositionModel::Additive => raw.iter().map(|r| r - center).collect(),
            DecompositionModel::Multiplicative => raw.iter().map(|r| r / center).collect(),
        }
    }

    fn remove(&self, value: f64, component: f64) -> f64 {
        match self.model {
            DecompositionModel::Additive => value - component,
            DecompositionModel::Multiplicative => value / component,
        }
    }
}

/// Additive classical decomposition of `series` with the given seasonal period.
pub fn decompose(series: &[f64], period: usize) -> Result<DecompositionResult> {
    ClassicalDecomposer::new(period).decompose(series)
}

/// Centered moving average over one cycle.
///
/// Odd periods use a plain window of `period` points. Even periods use the 2×`period`
/// average: a window of `period + 1` points with half weight on both ends, which keeps
/// the window centered. The first and last `period / 2` entries are `None`.
pub fn centered_moving_average(series: &[f64], period: usize) -> Vec<Option<f64>> {
    let n = series.len();
    let half = period / 2;
    let mut result = vec![None; n];

    if period == 0 || n < 2 * half + 1 {
        return result;
    }

    for i in half..(n - half) {
        let window = &series[i - half..=i + half];
        let sum = if period % 2 == 0 {
            let inner: f64 = window[1..window.len() - 1].iter().sum();
            inner + 0.5 * (window[0] + window[window.len() - 1])
        } else {
            window.iter().sum()
        };
        result[i] = Some(sum / period as f64);
    }

    result
}
