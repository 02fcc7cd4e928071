//! Forecasting models for daily sales series
//!
//! A model is fitted on a [`ModelInput`] (the `(ds, y)` schema) and the
//! trained result predicts point estimates, uncertainty bounds and
//! components for any list of dates. The adapter only talks to these two
//! traits, so tests can swap in a deterministic stub.

use crate::data::TimeSeriesData;
use crate::error::{ForecastError, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;

pub mod decomposable;

/// History in the column schema the models consume
#[derive(Debug, Clone, PartialEq)]
pub struct ModelInput {
    /// Observation dates
    pub ds: Vec<NaiveDate>,
    /// Observed values
    pub y: Vec<f64>,
}

impl ModelInput {
    pub fn new(ds: Vec<NaiveDate>, y: Vec<f64>) -> Result<Self> {
        if ds.len() != y.len() {
            return Err(ForecastError::DataError(format!(
                "Got {} dates but {} values",
                ds.len(),
                y.len()
            )));
        }
        Ok(Self { ds, y })
    }

    pub fn len(&self) -> usize {
        self.ds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ds.is_empty()
    }
}

impl From<&TimeSeriesData> for ModelInput {
    /// Rename `(date, value)` to `(ds, y)`
    fn from(series: &TimeSeriesData) -> Self {
        Self {
            ds: series.dates().to_vec(),
            y: series.values().to_vec(),
        }
    }
}

/// Per-date contribution of each model term
///
/// In multiplicative mode the seasonal terms are relative (a value of 0.1
/// lifts the trend by 10 %); in additive mode they are in sales units.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Components {
    pub trend: Vec<f64>,
    pub yearly: Option<Vec<f64>>,
    pub weekly: Option<Vec<f64>>,
    pub daily: Option<Vec<f64>>,
}

/// Output of a trained model for a list of dates
#[derive(Debug, Clone, PartialEq)]
pub struct Prediction {
    /// Point estimates
    pub yhat: Vec<f64>,
    /// Lower uncertainty bounds
    pub lower: Vec<f64>,
    /// Upper uncertainty bounds
    pub upper: Vec<f64>,
    /// Decomposed terms
    pub components: Components,
}

impl Prediction {
    /// Check that every vector has `len` entries
    pub fn check_len(&self, len: usize) -> Result<()> {
        let c = &self.components;
        let lens = [
            Some(self.yhat.len()),
            Some(self.lower.len()),
            Some(self.upper.len()),
            Some(c.trend.len()),
            c.yearly.as_ref().map(Vec::len),
            c.weekly.as_ref().map(Vec::len),
            c.daily.as_ref().map(Vec::len),
        ];
        if lens.iter().flatten().any(|&l| l != len) {
            return Err(ForecastError::ForecastingError(format!(
                "Prediction vectors do not all have {} entries",
                len
            )));
        }
        Ok(())
    }
}

/// Trained forecast model
pub trait TrainedForecastModel: Debug {
    /// Predict values, bounds and components for `dates`
    fn predict(&self, dates: &[NaiveDate]) -> Result<Prediction>;

    /// Last date seen during fitting
    fn last_history_date(&self) -> NaiveDate;

    /// Name of the model
    fn name(&self) -> &str;
}

/// Forecast model that can be fitted on a sales history
pub trait ForecastModel: Debug + Clone {
    /// The type of trained model produced
    type Trained: TrainedForecastModel;

    /// Fit the model on `(ds, y)` history
    fn fit(&self, history: &ModelInput) -> Result<Self::Trained>;

    /// Get the name of the model
    fn name(&self) -> &str;
}
