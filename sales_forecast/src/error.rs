//! Error types for the sales_forecast crate

use polars::prelude::PolarsError;
use thiserror::Error;

/// Custom error types for the sales_forecast crate
#[derive(Debug, Error)]
pub enum ForecastError {
    /// Missing or unreadable columns and values
    #[error("Data error: {0}")]
    DataError(String),

    /// Input violates the daily series contract (order, gaps, duplicates)
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Too little history to fit a model
    #[error("Insufficient data: {0}")]
    InsufficientData(String),

    /// Error related to fitting or predicting
    #[error("Forecasting error: {0}")]
    ForecastingError(String),

    /// Error from invalid parameters
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// Error from the model math
    #[error("Math error: {0}")]
    MathError(#[from] forecast_math::MathError),

    /// Error from IO operations
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// Error from Polars operations
    #[error("Polars error: {0}")]
    PolarsError(String),

    /// Error writing CSV output
    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),

    /// Error from JSON (de)serialisation
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

/// Result type with our custom error
pub type Result<T> = std::result::Result<T, ForecastError>;

impl From<PolarsError> for ForecastError {
    fn from(err: PolarsError) -> Self {
        ForecastError::PolarsError(err.to_string())
    }
}
