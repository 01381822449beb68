//! Error types for the Malaga framework.
//!
//! Schema and emptiness violations abort the offending operation. Ratio
//! statistics that divide by zero are not errors: they surface as `NaN` in the
//! output tables so downstream aggregation can proceed over partial results.

use thiserror::Error;

/// The main error type for Malaga operations.
#[derive(Debug, Error)]
pub enum MalagaError {
    /// Raw input has the wrong shape: column count, column types, duplicate
    /// observations or colliding column names.
    #[error("Schema error: {0}")]
    Schema(String),

    /// A date partition holds fewer assets than the operation requires.
    #[error("Insufficient data: {0}")]
    InsufficientData(String),

    /// A join or pivot produced a table without rows.
    #[error("Empty table: {0}")]
    EmptyTable(String),

    /// Error when a required column is missing from the data.
    #[error("Missing required column: {0}")]
    MissingColumn(String),

    /// The trading calendar could not provide a required date.
    #[error("Calendar error: {0}")]
    Calendar(String),

    /// Error when a date is out of range or cannot be parsed.
    #[error("Invalid date: {0}")]
    InvalidDate(String),

    /// A configuration value is outside its valid range.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Error from Polars operations.
    #[error("Polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    /// Error reading or writing files.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic error for other cases.
    #[error("Error: {0}")]
    Other(String),
}

impl From<String> for MalagaError {
    fn from(s: String) -> Self {
        Self::Other(s)
    }
}

impl From<&str> for MalagaError {
    fn from(s: &str) -> Self {
        Self::Other(s.to_string())
    }
}

/// A specialized Result type for Malaga operations.
pub type Result<T> = std::result::Result<T, MalagaError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = MalagaError::Schema("expected 4 columns, got 5".to_string());
        assert_eq!(err.to_string(), "Schema error: expected 4 columns, got 5");

        let err = MalagaError::MissingColumn("date".to_string());
        assert_eq!(err.to_string(), "Missing required column: date");

        let err = MalagaError::EmptyTable("return table".to_string());
        assert_eq!(err.to_string(), "Empty table: return table");
    }

    #[test]
    fn test_error_from_string() {
        let err: MalagaError = "boom".into();
        assert!(matches!(err, MalagaError::Other(_)));

        let err: MalagaError = String::from("boom").into();
        assert_eq!(err.to_string(), "Error: boom");
    }

    #[test]
    fn test_result_type() {
        let ok_result: Result<i32> = Ok(42);
        assert!(ok_result.is_ok());

        let err_result: Result<i32> = Err(MalagaError::InsufficientData("x".to_string()));
        assert!(err_result.is_err());
    }
}
