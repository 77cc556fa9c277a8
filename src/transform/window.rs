//! Rolling window statistics and period-over-period changes.
//!
//! Undefined positions are `NaN`, aligned with the input.

use crate::error::{AnalysisError, Result};

/// Trailing rolling mean.
///
/// `result[i]` averages `series[i + 1 - window..=i]`; the first `window - 1`
/// positions are `NaN`.
pub fn rolling_mean(series: &[f64], window: usize) -> Result<Vec<f64>> {
    rolling_apply(series, window, |s| s.iter().sum::<f64>() / s.len() as f64)
}

/// Generic trailing window application.
fn rolling_apply<F>(series: &[f64], window: usize, f: F) -> Result<Vec<f64>>
where
    F: Fn(&[f64]) -> f64,
{
    if window == 0 {
        return Err(AnalysisError::InvalidParameter(
            "rolling window must be positive".to_string(),
        ));
    }

    let mut result = vec![f64::NAN; series.len()];
    for (i, out) in result.iter_mut().enumerate().skip(window - 1) {
        *out = f(&series[i + 1 - window..=i]);
    }

    Ok(result)
}

/// Relative change against the previous observation, `(x[t] - x[t-1]) / x[t-1]`.
///
/// Position 0 is `NaN`, as is any position whose previous value is zero relative
/// to the series, `|x[t-1]| <= ε·max|x|`.
pub fn pct_change(series: &[f64]) -> Vec<f64> {
    let mut changes = Vec::with_capacity(series.len());
    if series.is_empty() {
        return changes;
    }

    let scale = series.iter().fold(0.0_f64, |acc, v| acc.max(v.abs()));
    let min_denominator = scale * f64::EPSILON;

    changes.push(f64::NAN);
    for w in series.windows(2) {
        let (prev, current) = (w[0], w[1]);
        if prev.abs() > min_denominator {
            changes.push((current - prev) / prev);
        } else {
            changes.push(f64::NAN);
        }
    }

    changes
}
