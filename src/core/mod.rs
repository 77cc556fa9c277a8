//! Core data structures: validated time series and raw tabular input.

mod table;
mod time_series;

pub use table::{RawTable, SeriesValidator};
pub use time_series::{Frequency, MissingValuePolicy, TimeSeries, TimeSeriesBuilder};
