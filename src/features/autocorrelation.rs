//! Sample autocorrelation and partial autocorrelation.

use crate::error::{AnalysisError, Result};
use crate::utils::stats::{is_constant, mean, normal_quantile};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Upper bound on the default number of lags.
pub const DEFAULT_MAX_LAG_CAP: usize = 40;

/// ACF and PACF of a series, indexed by lag `0..=max_lag`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorrelationResult {
    /// Autocorrelation per lag; `acf[0] == 1.0`.
    pub acf: Vec<f64>,
    /// Partial autocorrelation per lag; `pacf[0] == 1.0`.
    pub pacf: Vec<f64>,
    /// Number of observations the estimates are based on.
    pub n_obs: usize,
}

impl CorrelationResult {
    /// Largest lag computed.
    pub fn max_lag(&self) -> usize {
        self.acf.len().saturating_sub(1)
    }

    /// Half-width of the two-sided white-noise band, `z_{1-alpha/2} / sqrt(n)`.
    ///
    /// Autocorrelations outside `±band` are significant at level `alpha` under the
    /// null hypothesis of white noise.
    pub fn confidence_band(&self, alpha: f64) -> f64 {
        if self.n_obs == 0 || !(alpha > 0.0 && alpha < 1.0) {
            return f64::NAN;
        }
        normal_quantile(1.0 - alpha / 2.0) / (self.n_obs as f64).sqrt()
    }
}

/// Default number of lags for a series of length `n`: `min(n - 1, 40)`.
pub fn default_max_lag(n: usize) -> usize {
    n.saturating_sub(1).min(DEFAULT_MAX_LAG_CAP)
}

/// Sample autocorrelation for lags `0..=max_lag`.
///
/// Uses the biased autocovariance (divisor `n` at every lag) normalized by the
/// lag-0 autocovariance.
///
/// # Errors
/// * `InsufficientData` - `max_lag >= n`
/// * `MissingValues` - the series contains non-finite values
/// * `DegenerateSeries` - the series is constant
pub fn acf(series: &[f64], max_lag: usize) -> Result<Vec<f64>> {
    check_input(series, max_lag)?;

    let m = mean(series);
    let centered: Vec<f64> = series.iter().map(|&x| x - m).collect();
    let c0: f64 = centered.iter().map(|d| d * d).sum();

    let mut out = Vec::with_capacity(max_lag + 1);
    out.push(1.0);
    for lag in 1..=max_lag {
        let ck: f64 = centered[lag..]
            .iter()
            .zip(centered.iter())
            .map(|(a, b)| a * b)
            .sum();
        out.push((ck / c0).clamp(-1.0, 1.0));
    }

    Ok(out)
}

/// Sample partial autocorrelation for lags `0..=max_lag`.
///
/// # Errors
/// Same conditions as [`acf`], plus `NumericInstability` if the recursion breaks down.
pub fn pacf(series: &[f64], max_lag: usize) -> Result<Vec<f64>> {
    let rho = acf(series, max_lag)?;
    pacf_from_acf(&rho)
}

/// Durbin-Levinson recursion on an autocorrelation sequence.
///
/// Order `k` reuses the order `k - 1` predictor coefficients, so the whole
/// sequence costs O(max_lag²).
pub fn pacf_from_acf(rho: &[f64]) -> Result<Vec<f64>> {
    let max_lag = rho.len().saturating_sub(1);
    let mut out = Vec::with_capacity(max_lag + 1);
    out.push(1.0);
    if max_lag == 0 {
        return Ok(out);
    }

    let mut phi = vec![rho[1]];
    let mut v = 1.0 - rho[1] * rho[1];
    out.push(rho[1]);

    for k in 2..=max_lag {
        if v.is_nan() || v <= 0.0 {
            return Err(AnalysisError::NumericInstability(format!(
                "prediction error variance vanished at PACF lag {}",
                k
            )));
        }

        let num = rho[k]
            - phi
                .iter()
                .enumerate()
                .map(|(j, p)| p * rho[k - 1 - j])
                .sum::<f64>();
        let phi_kk = num / v;

        let previous = phi.clone();
        for j in 0..phi.len() {
            phi[j] = previous[j] - phi_kk * previous[k - 2 - j];
        }
        phi.push(phi_kk);

        v *= 1.0 - phi_kk * phi_kk;
        out.push(phi_kk);
    }

    Ok(out)
}

/// ACF and PACF up to `max_lag`, or up to [`default_max_lag`] when `None`.
pub fn correlate(series: &[f64], max_lag: Option<usize>) -> Result<CorrelationResult> {
    let max_lag = max_lag.unwrap_or_else(|| default_max_lag(series.len()));
    let acf = acf(series, max_lag)?;
    let pacf = pacf_from_acf(&acf)?;

    debug!(max_lag, n_obs = series.len(), "computed ACF and PACF");

    Ok(CorrelationResult {
        acf,
        pacf,
        n_obs: series.len(),
    })
}

fn check_input(series: &[f64], max_lag: usize) -> Result<()> {
    let n = series.len();
    if max_lag >= n {
        return Err(AnalysisError::InsufficientData {
            needed: max_lag + 1,
            got: n,
        });
    }
    if series.iter().any(|v| !v.is_finite()) {
        return Err(AnalysisError::MissingValues);
    }
    if is_constant(series) {
        return Err(AnalysisError::DegenerateSeries(
            "autocorrelation of a constant series is undefined".to_string(),
        ));
    }
    Ok(())
}
