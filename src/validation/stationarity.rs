//! Augmented Dickey-Fuller test for a unit root.
//!
//! Tests the null hypothesis that the series has a unit root (non-stationary)
//! against the alternative of stationarity around a constant mean. The regression
//!
//! ```text
//! Δy[t] = α + β·y[t-1] + Σ_{j=1..k} γ_j·Δy[t-j] + ε[t]
//! ```
//!
//! is fitted by OLS and the t-statistic of `β` is mapped to a p-value with the
//! MacKinnon (1994) response surface.

use crate::error::{AnalysisError, Result};
use crate::utils::ols::{ols_fit, OLSResult};
use crate::utils::stats::{is_constant, normal_cdf};
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

/// |t| above which the last lag is kept by general-to-specific selection (5% one-sided).
const TSTAT_STOP: f64 = 1.644_853_626_951_472_2;

/// Residual sum of squares, relative to the sum of squared differences, at or
/// below which the regression has no noise left to test against.
const NOISE_FREE_RSS: f64 = 1e-6;

// MacKinnon (1994), constant only, one series.
const TAU_MAX: f64 = 2.74;
const TAU_MIN: f64 = -18.83;
const TAU_STAR: f64 = -1.61;
const TAU_SMALL_P: [f64; 3] = [2.1659, 1.4412, 0.038269];
const TAU_LARGE_P: [f64; 4] = [1.7339, 0.93202, -0.12745, -0.010368];

// MacKinnon (2010) finite-sample critical values, constant only, one series.
const CV_1PCT: [f64; 4] = [-3.43035, -6.5393, -16.786, -79.433];
const CV_5PCT: [f64; 4] = [-2.86154, -2.8903, -4.234, -40.040];
const CV_10PCT: [f64; 4] = [-2.56677, -1.5384, -2.809, 0.0];

/// Rule for choosing the number of lagged differences.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LagSelection {
    /// Minimize the Akaike information criterion over `0..=max_lag`.
    #[default]
    Aic,
    /// Minimize the Bayesian information criterion over `0..=max_lag`.
    Bic,
    /// Start at `max_lag` and drop the last lag while it is insignificant.
    TStat,
    /// Use exactly `max_lag` lags.
    Fixed,
}

/// ADF test configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdfConfig {
    /// Maximum number of lagged differences (default: `ceil(12·(n/100)^¼)`).
    pub max_lag: Option<usize>,
    /// Lag selection rule.
    pub lag_selection: LagSelection,
    /// Significance level for the stationarity verdict.
    pub significance: f64,
}

impl Default for AdfConfig {
    fn default() -> Self {
        Self {
            max_lag: None,
            lag_selection: LagSelection::Aic,
            significance: 0.05,
        }
    }
}

impl AdfConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_lag(mut self, max_lag: usize) -> Self {
        self.max_lag = Some(max_lag);
        self
    }

    pub fn with_lag_selection(mut self, selection: LagSelection) -> Self {
        self.lag_selection = selection;
        self
    }

    pub fn with_significance(mut self, significance: f64) -> Self {
        self.significance = significance;
        self
    }

    /// Check parameter ranges.
    pub fn validate(&self) -> Result<()> {
        if !(self.significance > 0.0 && self.significance < 1.0) {
            return Err(AnalysisError::InvalidParameter(format!(
                "significance must lie in (0, 1), got {}",
                self.significance
            )));
        }
        Ok(())
    }
}

/// Result of a stationarity test.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StationarityResult {
    /// Test statistic (t-statistic of the lagged level).
    pub statistic: f64,
    /// MacKinnon approximate p-value.
    pub p_value: f64,
    /// Number of lagged differences used.
    pub lags: usize,
    /// Observations in the final regression.
    pub n_obs: usize,
    /// Whether the unit root is rejected at `significance`.
    pub is_stationary: bool,
    /// Significance level the verdict was taken at.
    pub significance: f64,
    /// Critical values at common significance levels.
    pub critical_values: CriticalValues,
    /// Best information criterion value, when one drove lag selection and is finite.
    pub ic_best: Option<f64>,
}

/// Critical values for stationarity tests.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct CriticalValues {
    /// Critical value at 1% significance
    pub cv_1pct: f64,
    /// Critical value at 5% significance
    pub cv_5pct: f64,
    /// Critical value at 10% significance
    pub cv_10pct: f64,
}

/// Default maximum lag, `ceil(12·(n/100)^¼)`, clamped so the regression stays estimable.
pub fn default_max_lag(n: usize) -> usize {
    let schwert = (12.0 * (n as f64 / 100.0).powf(0.25)).ceil() as usize;
    schwert.min((n / 2).saturating_sub(2))
}

/// Augmented Dickey-Fuller test with a constant and no trend.
///
/// Lag candidates whose design matrix is singular are skipped. A series the
/// regression explains without residual noise (a deterministic trend such as
/// `a + b·t`) cannot reject the unit root: its statistic is reported as 0.
///
/// # Errors
/// * `MissingValues` - the series contains NaN or infinite values
/// * `DegenerateSeries` - the series is constant, or every lag candidate is singular
/// * `InsufficientData` - fewer usable observations than regressors plus one
pub fn adf_test(series: &[f64], config: &AdfConfig) -> Result<StationarityResult> {
    config.validate()?;
    let n = series.len();

    if series.iter().any(|v| !v.is_finite()) {
        return Err(AnalysisError::MissingValues);
    }
    if n > 0 && is_constant(series) {
        return Err(AnalysisError::DegenerateSeries(
            "series is constant; the ADF regression is singular".to_string(),
        ));
    }

    let max_lag = config.max_lag.unwrap_or_else(|| default_max_lag(n));
    // n - 1 - max_lag observations against max_lag + 2 regressors
    let needed = 2 * max_lag + 4;
    if n < needed {
        return Err(AnalysisError::InsufficientData { needed, got: n });
    }

    let diff: Vec<f64> = series.windows(2).map(|w| w[1] - w[0]).collect();

    let (lags, ic_best) = select_lag(series, &diff, max_lag, config.lag_selection)?;

    let n_obs = diff.len() - lags;
    let dependent = &diff[diff.len() - n_obs..];
    let statistic = match fit_candidate(series, &diff, lags, n_obs)? {
        Some(fit) if !is_noise_free(&fit, dependent) => fit.t_value(1),
        _ => {
            debug!(lags, "ADF regression leaves no residual noise");
            0.0
        }
    };

    let p_value = adf_p_value(statistic);
    let critical_values = adf_critical_values(n_obs);
    let is_stationary = p_value < config.significance;

    debug!(
        statistic,
        p_value,
        lags,
        n_obs,
        is_stationary,
        "augmented Dickey-Fuller test"
    );

    Ok(StationarityResult {
        statistic,
        p_value,
        lags,
        n_obs,
        is_stationary,
        significance: config.significance,
        critical_values,
        ic_best: ic_best.filter(|ic| ic.is_finite()),
    })
}

/// ADF test with default settings and an optional maximum lag.
pub fn test_stationarity(series: &[f64], max_lag: Option<usize>) -> Result<StationarityResult> {
    let config = AdfConfig {
        max_lag,
        ..AdfConfig::default()
    };
    adf_test(series, &config)
}

/// Choose the lag order. All candidates share the sample trimmed by `max_lag`.
fn select_lag(
    series: &[f64],
    diff: &[f64],
    max_lag: usize,
    selection: LagSelection,
) -> Result<(usize, Option<f64>)> {
    let common_obs = diff.len() - max_lag;

    match selection {
        LagSelection::Fixed => Ok((max_lag, None)),
        LagSelection::Aic | LagSelection::Bic => {
            let mut best: Option<(usize, f64)> = None;

            for lag in 0..=max_lag {
                let Some(fit) = fit_candidate(series, diff, lag, common_obs)? else {
                    continue;
                };
                let ic = if selection == LagSelection::Aic {
                    fit.aic()
                } else {
                    fit.bic()
                };
                trace!(lag, ic, "ADF lag candidate");
                if best.is_none_or(|(_, best_ic)| ic < best_ic) {
                    best = Some((lag, ic));
                }
            }

            let (lag, ic) = best.ok_or_else(|| {
                AnalysisError::DegenerateSeries(
                    "every ADF lag candidate has a singular design matrix".to_string(),
                )
            })?;
            Ok((lag, Some(ic)))
        }
        LagSelection::TStat => {
            for lag in (1..=max_lag).rev() {
                let Some(fit) = fit_candidate(series, diff, lag, common_obs)? else {
                    continue;
                };
                let last = fit.num_params() - 1;
                if fit.t_value(last).abs() >= TSTAT_STOP {
                    return Ok((lag, None));
                }
            }
            Ok((0, None))
        }
    }
}

/// Fit one lag candidate; `None` when its design matrix is singular.
fn fit_candidate(
    series: &[f64],
    diff: &[f64],
    lag: usize,
    n_obs: usize,
) -> Result<Option<OLSResult>> {
    match fit_adf_regression(series, diff, lag, n_obs) {
        Ok(fit) => Ok(Some(fit)),
        Err(AnalysisError::DegenerateSeries(_)) => {
            trace!(lag, "ADF lag candidate is singular");
            Ok(None)
        }
        Err(e) => Err(e),
    }
}

fn is_noise_free(fit: &OLSResult, dependent: &[f64]) -> bool {
    let scale: f64 = dependent.iter().map(|d| d * d).sum();
    fit.ssr <= NOISE_FREE_RSS * scale
}

/// Fit the ADF regression with `lag` lagged differences on the last `n_obs` differences.
fn fit_adf_regression(series: &[f64], diff: &[f64], lag: usize, n_obs: usize) -> Result<OLSResult> {
    let start = diff.len() - n_obs;
    let rows = start..diff.len();

    let y: Vec<f64> = diff[rows.clone()].to_vec();

    let mut columns = Vec::with_capacity(lag + 2);
    columns.push(vec![1.0; n_obs]);
    columns.push(series[rows.clone()].to_vec());
    for j in 1..=lag {
        columns.push(rows.clone().map(|t| diff[t - j]).collect());
    }

    ols_fit(&y, &columns)
}

/// Approximate p-value for the ADF statistic (MacKinnon 1994, constant only).
///
/// Saturates at 1 above the tabulated maximum and at 0 below the tabulated minimum.
pub fn adf_p_value(statistic: f64) -> f64 {
    if statistic.is_nan() {
        return f64::NAN;
    }
    if statistic > TAU_MAX {
        return 1.0;
    }
    if statistic < TAU_MIN {
        return 0.0;
    }

    let coefficients: &[f64] = if statistic <= TAU_STAR {
        &TAU_SMALL_P
    } else {
        &TAU_LARGE_P
    };
    normal_cdf(polyval(coefficients, statistic))
}

/// Finite-sample critical values for a regression with `n_obs` observations.
pub fn adf_critical_values(n_obs: usize) -> CriticalValues {
    let inv = 1.0 / n_obs as f64;
    let surface = |b: &[f64; 4]| b[0] + b[1] * inv + b[2] * inv * inv + b[3] * inv * inv * inv;

    CriticalValues {
        cv_1pct: surface(&CV_1PCT),
        cv_5pct: surface(&CV_5PCT),
        cv_10pct: surface(&CV_10PCT),
    }
}

/// Evaluate a polynomial with coefficients in ascending order of power.
fn polyval(coefficients: &[f64], x: f64) -> f64 {
    coefficients.iter().rev().fold(0.0, |acc, &c| acc * x + c)
}
