//! Error types for the anofox-tsa library.

use thiserror::Error;

/// Result type alias for analysis operations.
pub type Result<T> = std::result::Result<T, AnalysisError>;

/// Errors that can occur while validating or analyzing a series.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AnalysisError {
    /// Required column missing or a cell could not be interpreted.
    #[error("schema error: {0}")]
    Schema(String),

    /// Input table has no rows.
    #[error("empty input data")]
    EmptyInput,

    /// Timestamps are not strictly increasing after parsing.
    #[error("timestamps must be strictly increasing (violated at row {index})")]
    NonMonotonicTime { index: usize },

    /// Insufficient data points for the requested configuration.
    #[error("insufficient data: need at least {needed}, got {got}")]
    InsufficientData { needed: usize, got: usize },

    /// Series without variation, or a regression that cannot be identified.
    #[error("degenerate series: {0}")]
    DegenerateSeries(String),

    /// Division by a (near) zero value.
    #[error("numeric instability: {0}")]
    NumericInstability(String),

    /// Invalid parameter value.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// Missing values detected when not allowed.
    #[error("missing values detected in data")]
    MissingValues,

    /// Underlying I/O failure while reading input.
    #[error("io error: {0}")]
    Io(String),

    /// Configuration could not be loaded.
    #[error("configuration error: {0}")]
    Config(String),

    /// Report could not be encoded or decoded.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// The analysis request was cancelled.
    #[error("analysis cancelled")]
    Cancelled,
}

impl From<std::io::Error> for AnalysisError {
    fn from(err: std::io::Error) -> Self {
        AnalysisError::Io(err.to_string())
    }
}

impl From<csv::Error> for AnalysisError {
    fn from(err: csv::Error) -> Self {
        match err.kind() {
            csv::ErrorKind::Io(_) => AnalysisError::Io(err.to_string()),
            _ => AnalysisError::Schema(err.to_string()),
        }
    }
}

impl From<serde_json::Error> for AnalysisError {
    fn from(err: serde_json::Error) -> Self {
        AnalysisError::Serialization(err.to_string())
    }
}

impl From<::config::ConfigError> for AnalysisError {
    fn from(err: ::config::ConfigError) -> Self {
        AnalysisError::Config(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_messages_are_descriptive() {
        let err = AnalysisError::EmptyInput;
        assert_eq!(err.to_string(), "empty input data");

        let err = AnalysisError::InsufficientData { needed: 24, got: 5 };
        assert_eq!(
            err.to_string(),
            "insufficient data: need at least 24, got 5"
        );

        let err = AnalysisError::Schema("missing column 'Passengers'".to_string());
        assert_eq!(
            err.to_string(),
            "schema error: missing column 'Passengers'"
        );

        let err = AnalysisError::NonMonotonicTime { index: 3 };
        assert_eq!(
            err.to_string(),
            "timestamps must be strictly increasing (violated at row 3)"
        );

        let err = AnalysisError::Cancelled;
        assert_eq!(err.to_string(), "analysis cancelled");
    }

    #[test]
    fn errors_are_clonable_and_comparable() {
        let err1 = AnalysisError::DegenerateSeries("constant".to_string());
        let err2 = err1.clone();
        assert_eq!(err1, err2);
    }

    #[test]
    fn io_errors_convert_to_string_payload() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "no such file");
        let err: AnalysisError = io.into();
        assert!(matches!(err, AnalysisError::Io(ref msg) if msg.contains("no such file")));
    }
}
