//! # Sales Forecast
//!
//! A Rust library for generating synthetic retail sales and forecasting
//! daily sales series with a decomposable trend + seasonality model.
//!
//! ## Features
//!
//! - Reproducible synthetic sales (trend, annual wave, weekend step, noise)
//! - `Date,Sales` CSV loading and writing
//! - A fit/predict model seam with a built-in decomposable model
//!   (piecewise-linear trend, Fourier seasonalities, additive or
//!   multiplicative)
//! - A forecast adapter that validates the input and returns history plus
//!   horizon with uncertainty bounds
//! - Chart-ready views and an interactive dashboard loop
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use sales_forecast::config::{GeneratorConfig, ModelConfig};
//! use sales_forecast::generator::SyntheticSalesGenerator;
//! use sales_forecast::models::decomposable::DecomposableModel;
//! use sales_forecast::adapter::ForecastAdapter;
//!
//! # fn main() -> sales_forecast::Result<()> {
//! // Generate five years of daily sales
//! let series = SyntheticSalesGenerator::new(GeneratorConfig::default())?.generate_series()?;
//!
//! // Fit the batch profile and forecast two years ahead
//! let model = DecomposableModel::new(ModelConfig::batch())?;
//! let frame = ForecastAdapter::new(model).run(&series, 730)?;
//!
//! for row in frame.tail(5) {
//!     println!("{} {:.0} [{:.0}, {:.0}]", row.ds, row.yhat, row.yhat_lower, row.yhat_upper);
//! }
//! # Ok(())
//! # }
//! ```

pub mod adapter;
pub mod config;
pub mod dashboard;
pub mod data;
pub mod error;
pub mod generator;
pub mod models;
pub mod utils;
pub mod views;

// Re-export commonly used types
pub use crate::adapter::{forecast_series, run_forecast, ForecastAdapter, ForecastFrame, ForecastRow};
pub use crate::config::{GeneratorConfig, ModelConfig, PipelineConfig, SeasonalityMode};
pub use crate::data::{DataLoader, SalesRecord, TimeSeriesData};
pub use crate::error::{ForecastError, Result};
pub use crate::generator::SyntheticSalesGenerator;
pub use crate::models::{ForecastModel, ModelInput, Prediction, TrainedForecastModel};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
