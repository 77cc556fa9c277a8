//! Ordinary Least Squares (OLS) regression on an explicit design matrix.
//!
//! Used by the stationarity tests, which need coefficient standard errors and
//! information criteria in addition to the point estimates.

use crate::error::{AnalysisError, Result};
use std::f64::consts::PI;

/// Relative pivot size below which the normal equations are treated as singular.
const SINGULAR_TOLERANCE: f64 = 1e-12;

/// Fitted OLS regression.
#[derive(Debug, Clone)]
pub struct OLSResult {
    /// Regression coefficients, one per design column.
    pub coefficients: Vec<f64>,
    /// Standard errors of the coefficients.
    pub std_errors: Vec<f64>,
    /// Sum of squared residuals.
    pub ssr: f64,
    /// Number of observations used in the fit.
    pub n_obs: usize,
}

impl OLSResult {
    /// Number of estimated coefficients.
    pub fn num_params(&self) -> usize {
        self.coefficients.len()
    }

    /// t-statistic of coefficient `idx`.
    pub fn t_value(&self, idx: usize) -> f64 {
        self.coefficients[idx] / self.std_errors[idx]
    }

    /// Gaussian log-likelihood evaluated at the OLS estimate.
    pub fn log_likelihood(&self) -> f64 {
        let n = self.n_obs as f64;
        -n / 2.0 * ((2.0 * PI).ln() + (self.ssr / n).ln() + 1.0)
    }

    /// Akaike information criterion.
    pub fn aic(&self) -> f64 {
        -2.0 * self.log_likelihood() + 2.0 * self.num_params() as f64
    }

    /// Bayesian (Schwarz) information criterion.
    pub fn bic(&self) -> f64 {
        -2.0 * self.log_likelihood() + self.num_params() as f64 * (self.n_obs as f64).ln()
    }
}

/// Fit `y = X @ beta` where `columns` holds the design matrix column by column.
///
/// An intercept is not added implicitly; pass a column of ones if one is needed.
/// Solves the normal equations with a Cholesky decomposition.
///
/// # Errors
/// * `InsufficientData` - fewer observations than coefficients plus one
/// * `InvalidParameter` - a column length differs from `y`
/// * `DegenerateSeries` - the design matrix is (numerically) rank deficient
pub fn ols_fit(y: &[f64], columns: &[Vec<f64>]) -> Result<OLSResult> {
    let n = y.len();
    let k = columns.len();

    if k == 0 {
        return Err(AnalysisError::InvalidParameter(
            "design matrix has no columns".to_string(),
        ));
    }
    if n <= k {
        return Err(AnalysisError::InsufficientData {
            needed: k + 1,
            got: n,
        });
    }
    if let Some(col) = columns.iter().find(|c| c.len() != n) {
        return Err(AnalysisError::InvalidParameter(format!(
            "design column has {} rows, expected {}",
            col.len(),
            n
        )));
    }

    // X'X and X'y
    let mut xtx = vec![vec![0.0; k]; k];
    let mut xty = vec![0.0; k];
    for i in 0..k {
        for j in 0..=i {
            let s: f64 = columns[i]
                .iter()
                .zip(columns[j].iter())
                .map(|(a, b)| a * b)
                .sum();
            xtx[i][j] = s;
            xtx[j][i] = s;
        }
        xty[i] = columns[i].iter().zip(y.iter()).map(|(a, b)| a * b).sum();
    }

    let chol = cholesky(&xtx).ok_or_else(|| {
        AnalysisError::DegenerateSeries("regression design matrix is singular".to_string())
    })?;
    let coefficients = chol_solve(&chol, &xty);

    let ssr: f64 = (0..n)
        .map(|t| {
            let fitted: f64 = (0..k).map(|i| columns[i][t] * coefficients[i]).sum();
            (y[t] - fitted).powi(2)
        })
        .sum();

    let sigma_sq = ssr / (n - k) as f64;
    let std_errors = (0..k)
        .map(|i| {
            let mut unit = vec![0.0; k];
            unit[i] = 1.0;
            let inv_col = chol_solve(&chol, &unit);
            (sigma_sq * inv_col[i]).sqrt()
        })
        .collect();

    Ok(OLSResult {
        coefficients,
        std_errors,
        ssr,
        n_obs: n,
    })
}

/// Cholesky factor `L` of a symmetric positive definite matrix, `A = L @ L'`.
fn cholesky(a: &[Vec<f64>]) -> Option<Vec<Vec<f64>>> {
    let n = a.len();
    let mut l = vec![vec![0.0; n]; n];

    for i in 0..n {
        for j in 0..=i {
            let mut sum = a[i][j];
            for k in 0..j {
                sum -= l[i][k] * l[j][k];
            }

            if i == j {
                if sum <= a[i][i] * SINGULAR_TOLERANCE || sum <= 0.0 {
                    return None;
                }
                l[i][j] = sum.sqrt();
            } else {
                l[i][j] = sum / l[j][j];
            }
        }
    }

    Some(l)
}

/// Solve `L @ L' @ x = b` given the Cholesky factor.
fn chol_solve(l: &[Vec<f64>], b: &[f64]) -> Vec<f64> {
    let n = b.len();

    // Forward substitution: L @ y = b
    let mut y = vec![0.0; n];
    for i in 0..n {
        let mut sum = b[i];
        for j in 0..i {
            sum -= l[i][j] * y[j];
        }
        y[i] = sum / l[i][i];
    }

    // Backward substitution: L' @ x = y
    let mut x = vec![0.0; n];
    for i in (0..n).rev() {
        let mut sum = y[i];
        for j in (i + 1)..n {
            sum -= l[j][i] * x[j];
        }
        x[i] = sum / l[i][i];
    }

    x
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn ones(n: usize) -> Vec<f64> {
        vec![1.0; n]
    }

    #[test]
    fn ols_fit_simple_linear() {
        // y = 2 + 3*x
        let y = vec![5.0, 8.0, 11.0, 14.0, 17.0];
        let x = vec![1.0, 2.0, 3.0, 4.0, 5.0];

        let result = ols_fit(&y, &[ones(5), x]).unwrap();

        assert_relative_eq!(result.coefficients[0], 2.0, epsilon = 1e-9);
        assert_relative_eq!(result.coefficients[1], 3.0, epsilon = 1e-9);
        assert!(result.ssr < 1e-18);
    }

    #[test]
    fn ols_fit_multiple_regressors() {
        // y = 1 + 2*x1 + 3*x2
        let x1 = vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0];
        let x2 = vec![0.5, 2.5, 1.0, 3.0, 1.5, 3.5, 2.0, 4.0];
        let y: Vec<f64> = x1
            .iter()
            .zip(x2.iter())
            .map(|(a, b)| 1.0 + 2.0 * a + 3.0 * b)
            .collect();

        let result = ols_fit(&y, &[ones(8), x1, x2]).unwrap();

        assert_relative_eq!(result.coefficients[0], 1.0, epsilon = 1e-8);
        assert_relative_eq!(result.coefficients[1], 2.0, epsilon = 1e-8);
        assert_relative_eq!(result.coefficients[2], 3.0, epsilon = 1e-8);
    }

    #[test]
    fn ols_standard_error_matches_closed_form() {
        // Simple regression: SE(slope) = sqrt(s^2 / Sxx)
        let x = vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0];
        let y = vec![1.1, 1.9, 3.2, 3.8, 5.3, 5.9];
        let result = ols_fit(&y, &[ones(6), x.clone()]).unwrap();

        let x_mean = x.iter().sum::<f64>() / 6.0;
        let sxx: f64 = x.iter().map(|v| (v - x_mean).powi(2)).sum();
        let s2 = result.ssr / 4.0;
        assert_relative_eq!(result.std_errors[1], (s2 / sxx).sqrt(), epsilon = 1e-10);
        assert_relative_eq!(
            result.t_value(1),
            result.coefficients[1] / (s2 / sxx).sqrt(),
            epsilon = 1e-8
        );
    }

    #[test]
    fn information_criteria_penalize_parameters() {
        let y = vec![1.1, 1.9, 3.2, 3.8, 5.3, 5.9, 7.2, 7.8];
        let x: Vec<f64> = (1..=8).map(|v| v as f64).collect();
        let result = ols_fit(&y, &[ones(8), x]).unwrap();

        let llf = result.log_likelihood();
        assert_relative_eq!(result.aic(), -2.0 * llf + 4.0, epsilon = 1e-12);
        assert_relative_eq!(result.bic(), -2.0 * llf + 2.0 * 8f64.ln(), epsilon = 1e-12);
    }

    #[test]
    fn ols_fit_detects_collinearity() {
        let x = vec![1.0, 2.0, 3.0, 4.0, 5.0];
        let doubled: Vec<f64> = x.iter().map(|v| v * 2.0).collect();
        let y = vec![1.0, 3.0, 2.0, 5.0, 4.0];

        let result = ols_fit(&y, &[ones(5), x, doubled]);
        assert!(matches!(result, Err(AnalysisError::DegenerateSeries(_))));
    }

    #[test]
    fn ols_fit_dimension_errors() {
        let y = vec![1.0, 2.0, 3.0];
        assert!(matches!(
            ols_fit(&y, &[ones(3), vec![1.0, 2.0]]),
            Err(AnalysisError::InvalidParameter(_))
        ));
        assert_eq!(
            ols_fit(&y, &[ones(3), ones(3), ones(3)]).unwrap_err(),
            AnalysisError::InsufficientData { needed: 4, got: 3 }
        );
        assert!(ols_fit(&y, &[]).is_err());
    }
}
