//! # Retail Forecast
//!
//! Entry point of the workspace. Re-exports the sales pipeline
//! (`sales_forecast`) and the model math it is built on (`forecast_math`).
//!
//! ## Example
//!
//! ```
//! use retail_forecast::{GeneratorConfig, SyntheticSalesGenerator};
//!
//! let start = "2020-01-01".parse().unwrap();
//! let end = "2020-01-10".parse().unwrap();
//! let generator = SyntheticSalesGenerator::new(GeneratorConfig::new(start, end, 42)).unwrap();
//! assert_eq!(generator.generate().unwrap().len(), 10);
//! ```

pub use forecast_math;
pub use sales_forecast::*;
