//! # Forecast Math
//!
//! Numerical building blocks for decomposable time series models.
//! This crate provides the design matrices (changepoint hinges, Fourier
//! terms) and the penalised least squares solver the forecasting models
//! are fitted with.

use thiserror::Error;

pub mod fourier;
pub mod linalg;
pub mod trend;

pub use crate::fourier::{fourier_features, Seasonality};
pub use crate::linalg::{ridge_least_squares, DesignMatrix};
pub use crate::trend::{changepoint_matrix, piecewise_linear, select_changepoints};

/// Errors that can occur in model math
#[derive(Error, Debug)]
pub enum MathError {
    #[error("Insufficient data for calculation: {0}")]
    InsufficientData(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Calculation error: {0}")]
    CalculationError(String),
}

/// Result type for model math operations
pub type Result<T> = std::result::Result<T, MathError>;
