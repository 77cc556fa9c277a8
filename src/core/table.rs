//! Raw tabular input and validation into a [`TimeSeries`].
//!
//! The ingestion layer hands over a table of string cells; [`SeriesValidator`]
//! picks the timestamp and value columns out of it, parses them and enforces the
//! ordering invariants before any statistic is computed.

use super::time_series::TimeSeries;
use crate::error::{AnalysisError, Result};
use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use csv::ReaderBuilder;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::debug;

/// Column-named table of raw string cells.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawTable {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl RawTable {
    /// Create a table from headers and rows. Short rows are padded with empty cells.
    pub fn new(headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        let width = headers.len();
        let rows = rows
            .into_iter()
            .map(|mut row| {
                row.resize(width, String::new());
                row
            })
            .collect();
        Self { headers, rows }
    }

    /// Read a table from CSV with a header row.
    pub fn from_csv_reader<R: Read>(reader: R) -> Result<Self> {
        let mut rdr = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let headers: Vec<String> = rdr.headers()?.iter().map(|h| h.to_string()).collect();

        let mut rows = Vec::new();
        for record in rdr.records() {
            let record = record?;
            rows.push(record.iter().map(|c| c.to_string()).collect());
        }

        Ok(Self::new(headers, rows))
    }

    /// Read a table from a CSV file.
    pub fn from_csv_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path.as_ref())?;
        Self::from_csv_reader(file)
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Cells of a named column, if present.
    pub fn column(&self, name: &str) -> Option<Vec<&str>> {
        let idx = self.headers.iter().position(|h| h == name)?;
        Some(self.rows.iter().map(|row| row[idx].as_str()).collect())
    }
}

/// Validates a [`RawTable`] and converts it into a [`TimeSeries`].
#[derive(Debug, Clone)]
pub struct SeriesValidator {
    time_column: String,
    value_column: String,
}

impl Default for SeriesValidator {
    fn default() -> Self {
        Self {
            time_column: "Month".to_string(),
            value_column: "Passengers".to_string(),
        }
    }
}

impl SeriesValidator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the name of the timestamp column.
    pub fn with_time_column(mut self, name: impl Into<String>) -> Self {
        self.time_column = name.into();
        self
    }

    /// Set the name of the value column.
    pub fn with_value_column(mut self, name: impl Into<String>) -> Self {
        self.value_column = name.into();
        self
    }

    /// Validate the table and build a series.
    ///
    /// # Errors
    /// * `Schema` - a required column is missing or a cell cannot be parsed
    /// * `EmptyInput` - the table has no rows
    /// * `NonMonotonicTime` - timestamps are not strictly increasing
    pub fn validate(&self, table: &RawTable) -> Result<TimeSeries> {
        let times = table.column(&self.time_column).ok_or_else(|| {
            AnalysisError::Schema(format!("missing time column '{}'", self.time_column))
        })?;
        let cells = table.column(&self.value_column).ok_or_else(|| {
            AnalysisError::Schema(format!("missing value column '{}'", self.value_column))
        })?;

        if table.row_count() == 0 {
            return Err(AnalysisError::EmptyInput);
        }

        let timestamps = times
            .iter()
            .enumerate()
            .map(|(row, cell)| {
                parse_timestamp(cell).ok_or_else(|| {
                    AnalysisError::Schema(format!(
                        "unparseable timestamp '{}' in column '{}' at row {}",
                        cell, self.time_column, row
                    ))
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let values = cells
            .iter()
            .enumerate()
            .map(|(row, cell)| {
                parse_value(cell).ok_or_else(|| {
                    AnalysisError::Schema(format!(
                        "non-numeric value '{}' in column '{}' at row {}",
                        cell, self.value_column, row
                    ))
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let mut series = TimeSeries::univariate(timestamps, values)?;
        series.set_label(self.value_column.clone());
        if let Ok(freq) = series.infer_frequency(0.5) {
            series.set_frequency(freq);
        }

        debug!(
            rows = series.len(),
            missing = series.missing_count(),
            frequency = ?series.frequency(),
            "validated input table"
        );

        Ok(series)
    }
}

/// Parse a timestamp cell. Month-only dates resolve to the first of the month.
fn parse_timestamp(cell: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(cell) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(cell, "%Y-%m-%d %H:%M:%S") {
        return Some(Utc.from_utc_datetime(&naive));
    }
    let date = NaiveDate::parse_from_str(cell, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(&format!("{}-01", cell), "%Y-%m-%d"))
        .ok()?;
    Some(Utc.from_utc_datetime(&date.and_hms_opt(0, 0, 0)?))
}

/// Parse a value cell; recognised missing markers become `NaN`.
///
/// Any other cell must parse to a finite number, so `inf` or an overflowing
/// `1e400` is rejected instead of being counted as missing.
fn parse_value(cell: &str) -> Option<f64> {
    match cell {
        "" | "NaN" | "nan" | "NA" | "N/A" | "null" => Some(f64::NAN),
        _ => cell.parse::<f64>().ok().filter(|v| v.is_finite()),
    }
}
