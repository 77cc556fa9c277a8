//! TimeSeries data structure for representing an evenly spaced univariate series.

use crate::error::{AnalysisError, Result};
use chrono::{DateTime, Datelike, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Policy for handling missing values (NaN/Inf).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissingValuePolicy {
    /// Return error if missing values found.
    #[default]
    Error,
    /// Drop observations with missing values.
    Drop,
    /// Fill with a specific value.
    Fill(f64),
    /// Forward fill (use previous valid value).
    ForwardFill,
    /// Linear interpolation between neighbours, edges filled with the nearest value.
    Interpolate,
}

/// Nominal sampling frequency of a series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Frequency {
    Daily,
    Weekly,
    Monthly,
    Quarterly,
    Yearly,
    /// Fixed spacing that does not match a calendar unit.
    Seconds(i64),
}

/// A univariate time series with strictly increasing timestamps.
///
/// Missing observations are stored as `NaN`.
#[derive(Debug, Clone)]
pub struct TimeSeries {
    timestamps: Vec<DateTime<Utc>>,
    values: Vec<f64>,
    label: Option<String>,
    frequency: Option<Frequency>,
}

/// Builder for constructing TimeSeries.
#[derive(Debug, Clone, Default)]
pub struct TimeSeriesBuilder {
    timestamps: Vec<DateTime<Utc>>,
    values: Vec<f64>,
    label: Option<String>,
    frequency: Option<Frequency>,
}

impl TimeSeriesBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn timestamps(mut self, timestamps: Vec<DateTime<Utc>>) -> Self {
        self.timestamps = timestamps;
        self
    }

    pub fn values(mut self, values: Vec<f64>) -> Self {
        self.values = values;
        self
    }

    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn frequency(mut self, freq: Frequency) -> Self {
        self.frequency = Some(freq);
        self
    }

    pub fn build(self) -> Result<TimeSeries> {
        let mut ts = TimeSeries::univariate(self.timestamps, self.values)?;
        ts.label = self.label;
        ts.frequency = self.frequency;
        Ok(ts)
    }
}

impl TimeSeries {
    /// Create a univariate time series.
    ///
    /// Fails with `EmptyInput` for zero observations and `NonMonotonicTime` when a
    /// timestamp does not strictly follow its predecessor.
    pub fn univariate(timestamps: Vec<DateTime<Utc>>, values: Vec<f64>) -> Result<Self> {
        if timestamps.is_empty() {
            return Err(AnalysisError::EmptyInput);
        }
        if values.len() != timestamps.len() {
            return Err(AnalysisError::InvalidParameter(format!(
                "expected {} values to match timestamps, got {}",
                timestamps.len(),
                values.len()
            )));
        }

        if let Some(index) = (1..timestamps.len()).find(|&i| timestamps[i] <= timestamps[i - 1]) {
            return Err(AnalysisError::NonMonotonicTime { index });
        }

        Ok(Self {
            timestamps,
            values,
            label: None,
            frequency: None,
        })
    }

    /// Get the number of observations.
    pub fn len(&self) -> usize {
        self.timestamps.len()
    }

    /// Check if the series is empty.
    pub fn is_empty(&self) -> bool {
        self.timestamps.is_empty()
    }

    /// Get timestamps.
    pub fn timestamps(&self) -> &[DateTime<Utc>] {
        &self.timestamps
    }

    /// Get values, with `NaN` marking missing observations.
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Values with missing observations removed.
    pub fn observed_values(&self) -> Vec<f64> {
        self.values.iter().copied().filter(|v| v.is_finite()).collect()
    }

    /// Name of the value column this series came from.
    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    pub fn set_label(&mut self, label: impl Into<String>) {
        self.label = Some(label.into());
    }

    /// Get frequency.
    pub fn frequency(&self) -> Option<Frequency> {
        self.frequency
    }

    pub fn set_frequency(&mut self, freq: Frequency) {
        self.frequency = Some(freq);
    }

    /// Check if series has missing values (NaN or Inf).
    pub fn has_missing_values(&self) -> bool {
        self.values.iter().any(|v| !v.is_finite())
    }

    /// Number of missing observations.
    pub fn missing_count(&self) -> usize {
        self.values.iter().filter(|v| !v.is_finite()).count()
    }

    /// Return a sanitized copy with missing values handled.
    pub fn sanitized(&self, policy: MissingValuePolicy) -> Result<TimeSeries> {
        if !self.has_missing_values() {
            return Ok(self.clone());
        }

        match policy {
            MissingValuePolicy::Error => Err(AnalysisError::MissingValues),
            MissingValuePolicy::Drop => {
                let (timestamps, values): (Vec<_>, Vec<_>) = self
                    .timestamps
                    .iter()
                    .zip(self.values.iter())
                    .filter(|(_, v)| v.is_finite())
                    .map(|(t, v)| (*t, *v))
                    .unzip();

                if timestamps.is_empty() {
                    return Err(AnalysisError::EmptyInput);
                }

                Ok(self.with_parts(timestamps, values))
            }
            MissingValuePolicy::Fill(fill_value) => {
                let values = self
                    .values
                    .iter()
                    .map(|&v| if v.is_finite() { v } else { fill_value })
                    .collect();
                Ok(self.with_parts(self.timestamps.clone(), values))
            }
            MissingValuePolicy::ForwardFill => {
                let mut values = Vec::with_capacity(self.values.len());
                let mut last_valid = None;
                for &v in &self.values {
                    if v.is_finite() {
                        last_valid = Some(v);
                        values.push(v);
                    } else {
                        values.push(last_valid.unwrap_or(f64::NAN));
                    }
                }
                // Leading gap has nothing to carry forward
                if values.iter().any(|v| !v.is_finite()) {
                    return Err(AnalysisError::MissingValues);
                }
                Ok(self.with_parts(self.timestamps.clone(), values))
            }
            MissingValuePolicy::Interpolate => {
                let values = interpolate_series(&self.values);
                if values.iter().any(|v| !v.is_finite()) {
                    return Err(AnalysisError::MissingValues);
                }
                Ok(self.with_parts(self.timestamps.clone(), values))
            }
        }
    }

    fn with_parts(&self, timestamps: Vec<DateTime<Utc>>, values: Vec<f64>) -> TimeSeries {
        TimeSeries {
            timestamps,
            values,
            label: self.label.clone(),
            frequency: self.frequency,
        }
    }

    /// Infer the nominal frequency from the modal spacing of the timestamps.
    ///
    /// `tolerance` is the minimum share of steps that must agree with the mode.
    /// Two spacings tied for the mode are ambiguous and rejected.
    pub fn infer_frequency(&self, tolerance: f64) -> Result<Frequency> {
        if self.len() < 2 {
            return Err(AnalysisError::InsufficientData {
                needed: 2,
                got: self.len(),
            });
        }

        let mut counts: HashMap<Frequency, usize> = HashMap::new();
        for w in self.timestamps.windows(2) {
            *counts.entry(classify_step(&w[0], &w[1])).or_insert(0) += 1;
        }

        let modal_count = counts.values().copied().max().unwrap_or(0);
        let modes: Vec<Frequency> = counts
            .iter()
            .filter(|&(_, &count)| count == modal_count)
            .map(|(freq, _)| *freq)
            .collect();

        let total_count = self.len() - 1;
        if modes.len() != 1 || (modal_count as f64 / total_count as f64) < tolerance {
            return Err(AnalysisError::Schema(
                "could not infer frequency: no unique modal spacing".to_string(),
            ));
        }

        Ok(modes[0])
    }
}

/// Classify the spacing between two consecutive timestamps.
fn classify_step(a: &DateTime<Utc>, b: &DateTime<Utc>) -> Frequency {
    let same_clock = a.time() == b.time();
    let aligned_day = a.day() == b.day() || (is_month_end(a) && is_month_end(b));

    if same_clock && aligned_day {
        let months = (b.year() - a.year()) * 12 + b.month() as i32 - a.month() as i32;
        match months {
            1 => return Frequency::Monthly,
            3 => return Frequency::Quarterly,
            12 => return Frequency::Yearly,
            _ => {}
        }
    }

    let step = *b - *a;
    if step == Duration::days(1) {
        Frequency::Daily
    } else if step == Duration::weeks(1) {
        Frequency::Weekly
    } else {
        Frequency::Seconds(step.num_seconds())
    }
}

fn is_month_end(t: &DateTime<Utc>) -> bool {
    let date = t.date_naive();
    date.succ_opt()
        .map(|next| next.month() != date.month())
        .unwrap_or(true)
}

/// Linear interpolation for a series with NaN values; edges take the nearest value.
fn interpolate_series(values: &[f64]) -> Vec<f64> {
    let mut result = values.to_vec();
    let n = result.len();

    let mut i = 0;
    while i < n {
        if result[i].is_finite() {
            i += 1;
            continue;
        }

        let start = i;
        while i < n && !result[i].is_finite() {
            i += 1;
        }
        let end = i;

        let left = if start > 0 { Some(result[start - 1]) } else { None };
        let right = if end < n { Some(result[end]) } else { None };

        match (left, right) {
            (Some(l), Some(r)) => {
                let segments = (end - start + 1) as f64;
                for (j, idx) in (start..end).enumerate() {
                    let t = (j + 1) as f64 / segments;
                    result[idx] = l + t * (r - l);
                }
            }
            (Some(l), None) => result[start..end].fill(l),
            (None, Some(r)) => result[start..end].fill(r),
            (None, None) => {}
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use chrono::TimeZone;

    fn monthly_timestamps(n: usize) -> Vec<DateTime<Utc>> {
        (0..n)
            .map(|i| {
                Utc.with_ymd_and_hms(1949 + (i / 12) as i32, (i % 12) as u32 + 1, 1, 0, 0, 0)
                    .unwrap()
            })
            .collect()
    }

    fn daily_timestamps(n: usize) -> Vec<DateTime<Utc>> {
        let base = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        (0..n).map(|i| base + Duration::days(i as i64)).collect()
    }

    #[test]
    fn time_series_constructs_univariate_data() {
        let timestamps = monthly_timestamps(5);
        let values = vec![1.0, 2.0, 3.0, 4.0, 5.0];

        let ts = TimeSeries::univariate(timestamps.clone(), values.clone()).unwrap();

        assert_eq!(ts.len(), 5);
        assert!(!ts.is_empty());
        assert_eq!(ts.values(), &values[..]);
        assert_eq!(ts.timestamps(), &timestamps[..]);
        assert!(ts.label().is_none());
    }

    #[test]
    fn builder_sets_label_and_frequency() {
        let ts = TimeSeriesBuilder::new()
            .timestamps(monthly_timestamps(3))
            .values(vec![1.0, 2.0, 3.0])
            .label("Passengers")
            .frequency(Frequency::Monthly)
            .build()
            .unwrap();

        assert_eq!(ts.label(), Some("Passengers"));
        assert_eq!(ts.frequency(), Some(Frequency::Monthly));
    }

    #[test]
    fn time_series_rejects_empty_and_mismatched_input() {
        assert_eq!(
            TimeSeries::univariate(vec![], vec![]).unwrap_err(),
            AnalysisError::EmptyInput
        );

        let result = TimeSeries::univariate(monthly_timestamps(3), vec![1.0, 2.0]);
        assert!(matches!(result, Err(AnalysisError::InvalidParameter(_))));
    }

    #[test]
    fn time_series_rejects_non_increasing_timestamps() {
        let mut timestamps = monthly_timestamps(4);
        timestamps[2] = timestamps[1];

        let result = TimeSeries::univariate(timestamps, vec![1.0, 2.0, 3.0, 4.0]);
        assert_eq!(result.unwrap_err(), AnalysisError::NonMonotonicTime { index: 2 });

        let mut timestamps = monthly_timestamps(4);
        timestamps.swap(0, 3);
        let result = TimeSeries::univariate(timestamps, vec![1.0, 2.0, 3.0, 4.0]);
        assert_eq!(result.unwrap_err(), AnalysisError::NonMonotonicTime { index: 1 });
    }

    #[test]
    fn time_series_sanitizes_missing_values() {
        let values = vec![1.0, f64::NAN, 3.0, f64::INFINITY, 5.0];
        let ts = TimeSeries::univariate(monthly_timestamps(5), values).unwrap();
        assert!(ts.has_missing_values());
        assert_eq!(ts.missing_count(), 2);
        assert_eq!(ts.observed_values(), vec![1.0, 3.0, 5.0]);

        let sanitized = ts.sanitized(MissingValuePolicy::Drop).unwrap();
        assert_eq!(sanitized.len(), 3);
        assert_eq!(sanitized.values(), &[1.0, 3.0, 5.0]);

        let sanitized = ts.sanitized(MissingValuePolicy::Fill(0.0)).unwrap();
        assert_eq!(sanitized.values(), &[1.0, 0.0, 3.0, 0.0, 5.0]);

        let sanitized = ts.sanitized(MissingValuePolicy::ForwardFill).unwrap();
        assert_eq!(sanitized.values(), &[1.0, 1.0, 3.0, 3.0, 5.0]);

        let sanitized = ts.sanitized(MissingValuePolicy::Interpolate).unwrap();
        assert_relative_eq!(sanitized.values()[1], 2.0, epsilon = 1e-12);
        assert_relative_eq!(sanitized.values()[3], 4.0, epsilon = 1e-12);

        let result = ts.sanitized(MissingValuePolicy::Error);
        assert_eq!(result.unwrap_err(), AnalysisError::MissingValues);
    }

    #[test]
    fn forward_fill_cannot_fill_leading_gap() {
        let ts = TimeSeries::univariate(monthly_timestamps(3), vec![f64::NAN, 2.0, 3.0]).unwrap();
        assert_eq!(
            ts.sanitized(MissingValuePolicy::ForwardFill).unwrap_err(),
            AnalysisError::MissingValues
        );
        let filled = ts.sanitized(MissingValuePolicy::Interpolate).unwrap();
        assert_eq!(filled.values(), &[2.0, 2.0, 3.0]);
    }

    #[test]
    fn sanitize_without_missing_values_is_identity() {
        let ts = TimeSeries::univariate(monthly_timestamps(3), vec![1.0, 2.0, 3.0]).unwrap();
        let clean = ts.sanitized(MissingValuePolicy::Error).unwrap();
        assert_eq!(clean.values(), ts.values());
    }

    #[test]
    fn time_series_infers_monthly_frequency() {
        let ts = TimeSeries::univariate(monthly_timestamps(30), vec![1.0; 30]).unwrap();
        assert_eq!(ts.infer_frequency(0.9).unwrap(), Frequency::Monthly);
    }

    #[test]
    fn time_series_infers_month_end_frequency() {
        let timestamps = vec![
            Utc.with_ymd_and_hms(2023, 1, 31, 0, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2023, 2, 28, 0, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2023, 3, 31, 0, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2023, 4, 30, 0, 0, 0).unwrap(),
        ];
        let ts = TimeSeries::univariate(timestamps, vec![1.0; 4]).unwrap();
        assert_eq!(ts.infer_frequency(0.9).unwrap(), Frequency::Monthly);
    }

    #[test]
    fn time_series_infers_daily_frequency() {
        let ts = TimeSeries::univariate(daily_timestamps(10), vec![1.0; 10]).unwrap();
        assert_eq!(ts.infer_frequency(0.5).unwrap(), Frequency::Daily);
    }

    #[test]
    fn frequency_inference_requires_unique_modal_spacing() {
        let base = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let timestamps = vec![
            base,
            base + Duration::hours(1),
            base + Duration::hours(3),
            base + Duration::hours(6),
            base + Duration::hours(10),
        ];
        let ts = TimeSeries::univariate(timestamps, vec![1.0; 5]).unwrap();
        assert!(matches!(ts.infer_frequency(0.6), Err(AnalysisError::Schema(_))));
    }

    #[test]
    fn frequency_inference_rejects_tied_spacings() {
        let base = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let timestamps = vec![
            base,
            base + Duration::days(1),
            base + Duration::days(2),
            base + Duration::days(9),
            base + Duration::days(16),
        ];
        let ts = TimeSeries::univariate(timestamps, vec![1.0; 5]).unwrap();
        for _ in 0..20 {
            assert!(matches!(ts.infer_frequency(0.5), Err(AnalysisError::Schema(_))));
        }
    }

    #[test]
    fn frequency_inference_needs_two_points() {
        let ts = TimeSeries::univariate(daily_timestamps(1), vec![1.0]).unwrap();
        assert_eq!(
            ts.infer_frequency(0.5).unwrap_err(),
            AnalysisError::InsufficientData { needed: 2, got: 1 }
        );
    }
}
