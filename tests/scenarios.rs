//! Scenario tests on synthetic series.

use anofox_tsa::features::correlate;
use anofox_tsa::prelude::*;
use anofox_tsa::seasonality::decompose;
use anofox_tsa::validation::adf_test;
use chrono::{Months, TimeZone, Utc};
use std::io::Write;

fn monthly(values: Vec<f64>) -> TimeSeries {
    let start = Utc.with_ymd_and_hms(2000, 1, 1, 0, 0, 0).unwrap();
    let timestamps = (0..values.len())
        .map(|i| start + Months::new(i as u32))
        .collect();
    TimeSeries::univariate(timestamps, values).unwrap()
}

/// Uniform noise in [0, 1) from a fixed-seed linear congruential generator.
fn lcg_noise(n: usize) -> Vec<f64> {
    let mut state: u64 = 12345;
    (0..n)
        .map(|_| {
            state = state
                .wrapping_mul(6364136223846793005)
                .wrapping_add(1442695040888963407);
            (state >> 11) as f64 / (1u64 << 53) as f64
        })
        .collect()
}

/// Quadratic trend, 12-month sine and bounded deterministic noise.
fn trending_seasonal(n: usize) -> Vec<f64> {
    (0..n)
        .map(|i| {
            let t = i as f64;
            let noise = ((i * 7919) % 13) as f64 / 13.0 * 6.0 - 3.0;
            100.0 + t + 0.01 * t * t + 15.0 * (2.0 * std::f64::consts::PI * t / 12.0).sin() + noise
        })
        .collect()
}

#[test]
fn trending_seasonal_series() {
    let values = trending_seasonal(144);
    let report = Analyzer::default().analyze(&monthly(values.clone())).unwrap();

    let trend = report.decomposition.defined_trend();
    assert!(
        trend.windows(2).all(|w| w[1] > w[0]),
        "trend should increase over its defined range"
    );

    let seasonal = &report.decomposition.seasonal;
    for i in 12..seasonal.len() {
        assert_eq!(seasonal[i], seasonal[i - 12]);
    }

    assert!(report.stationarity.p_value > 0.05);
    assert!(!report.stationarity.is_stationary);

    let acf = &report.correlation.acf;
    assert!(acf[1] > 0.9);
    assert!(acf[1..=20].windows(2).all(|w| w[1] < w[0]));
    assert!(acf[20] > 0.5);

    assert!(report.verdicts.trend);
    assert!(report.verdicts.mean_reversion);
    assert!(!report.verdicts.irregularity);
}

#[test]
fn strictly_increasing_series_has_unit_root() {
    let noise = lcg_noise(150);
    let mut values = vec![10.0; 150];
    for i in 1..150 {
        values[i] = 1.02 * values[i - 1] + noise[i];
    }
    assert!(values.windows(2).all(|w| w[1] > w[0]));

    let result = adf_test(&values, &AdfConfig::default()).unwrap();

    assert!(result.p_value > 0.05);
    assert!(!result.is_stationary);
}

#[test]
fn deterministic_monotone_series_have_unit_root() {
    let shapes: [(&str, fn(f64) -> f64); 8] = [
        ("t", |t| t),
        ("100 + 2.5t", |t| 100.0 + 2.5 * t),
        ("t^2", |t| t * t),
        ("t^3", |t| t.powi(3)),
        ("t^1.5", |t| t.powf(1.5)),
        ("sqrt t", f64::sqrt),
        ("ln t", f64::ln),
        ("exp(0.03t)", |t| (0.03 * t).exp()),
    ];
    let selections = [LagSelection::Aic, LagSelection::Bic, LagSelection::TStat];

    for n in [60, 100, 144, 200] {
        for (name, shape) in shapes {
            let values: Vec<f64> = (1..=n).map(|t| shape(t as f64)).collect();
            assert!(values.windows(2).all(|w| w[1] > w[0]));

            for selection in selections {
                let config = AdfConfig::new().with_lag_selection(selection);
                let result = adf_test(&values, &config)
                    .unwrap_or_else(|e| panic!("{} (n = {}, {:?}): {}", name, n, selection, e));
                assert!(
                    result.p_value > 0.05,
                    "{} (n = {}, {:?}) p = {}",
                    name,
                    n,
                    selection,
                    result.p_value
                );
                assert!(!result.is_stationary);
            }
        }
    }
}

#[test]
fn constant_series() {
    let values = vec![42.0; 36];

    let decomposition = decompose(&values, 12).unwrap();
    for i in 0..values.len() {
        if decomposition.trend[i].is_some() {
            assert_eq!(decomposition.seasonal[i], 0.0);
            assert_eq!(decomposition.residual[i], Some(0.0));
        }
    }

    assert!(matches!(
        adf_test(&values, &AdfConfig::default()),
        Err(AnalysisError::DegenerateSeries(_))
    ));
    assert!(matches!(
        Analyzer::default().analyze(&monthly(values)),
        Err(AnalysisError::DegenerateSeries(_))
    ));
}

#[test]
fn series_shorter_than_two_periods() {
    let values: Vec<f64> = trending_seasonal(20);

    assert_eq!(
        decompose(&values, 12).unwrap_err(),
        AnalysisError::InsufficientData { needed: 24, got: 20 }
    );

    let correlation = correlate(&values, Some(10)).unwrap();
    assert_eq!(correlation.acf.len(), 11);
    assert!(correlate(&values, Some(19)).is_ok());
    assert!(matches!(
        correlate(&values, Some(20)),
        Err(AnalysisError::InsufficientData { .. })
    ));
}

#[test]
fn quarterly_configuration_from_file() {
    let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
    writeln!(
        file,
        "period = 4\nmax_lag = 8\nparallel = false\n\n[adf]\nlag_selection = \"t_stat\"\n\n[heuristics]\nrolling_window = 4"
    )
    .unwrap();
    let config = AnalysisConfig::from_file(file.path()).unwrap();

    let noise = lcg_noise(40);
    let values: Vec<f64> = (0..40)
        .map(|i| 50.0 + 0.8 * i as f64 + [6.0, -2.0, -7.0, 3.0][i % 4] + 4.0 * noise[i])
        .collect();
    let report = Analyzer::new(config).analyze(&monthly(values)).unwrap();

    assert_eq!(report.decomposition.period, 4);
    assert_eq!(report.correlation.max_lag(), 8);
    assert!(report.stationarity.ic_best.is_none());
}

#[test]
fn cancellation_before_start() {
    let token = CancellationToken::new();
    token.cancel();

    let result = Analyzer::default().analyze_with_cancel(&monthly(trending_seasonal(60)), &token);
    assert_eq!(result.unwrap_err(), AnalysisError::Cancelled);
}

#[test]
fn multiplicative_model_end_to_end() {
    let noise = lcg_noise(96);
    let values: Vec<f64> = (0..96)
        .map(|i| {
            let t = i as f64;
            (100.0 + 2.0 * t) * (1.0 + 0.2 * (2.0 * std::f64::consts::PI * t / 12.0).cos())
                + noise[i]
        })
        .collect();
    let config = AnalysisConfig::new().with_model(DecompositionModel::Multiplicative);
    let report = Analyzer::new(config).analyze(&monthly(values)).unwrap();

    let indices = report.decomposition.seasonal_indices();
    let mean = indices.iter().sum::<f64>() / indices.len() as f64;
    assert!((mean - 1.0).abs() < 1e-12);
    assert!(indices[0] > 1.1);
    assert!(indices[6] < 0.9);
}
