//! Forecast adapter
//!
//! Turns a `(date, value)` series into the model's `(ds, y)` schema, fits
//! the model, predicts over history plus horizon and returns the result as
//! a [`ForecastFrame`].

use crate::config::ModelConfig;
use crate::data::{DataLoader, TimeSeriesData};
use crate::error::{ForecastError, Result};
use crate::models::decomposable::DecomposableModel;
use crate::models::{Components, ForecastModel, ModelInput, TrainedForecastModel};
use crate::utils::{extend_daily_index, validate_daily_index};
use chrono::NaiveDate;
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

/// One row of forecast output
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ForecastRow {
    pub ds: NaiveDate,
    pub yhat: f64,
    pub yhat_lower: f64,
    pub yhat_upper: f64,
}

/// Forecast over the history and the horizon
#[derive(Debug, Clone, PartialEq)]
pub struct ForecastFrame {
    rows: Vec<ForecastRow>,
    /// Number of leading rows that cover the history
    history_len: usize,
    components: Components,
    model_name: String,
}

impl ForecastFrame {
    pub fn rows(&self) -> &[ForecastRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Rows covering the observed history
    pub fn history_rows(&self) -> &[ForecastRow] {
        &self.rows[..self.history_len]
    }

    /// Rows past the last observed date
    pub fn future_rows(&self) -> &[ForecastRow] {
        &self.rows[self.history_len..]
    }

    pub fn history_len(&self) -> usize {
        self.history_len
    }

    pub fn horizon(&self) -> usize {
        self.rows.len() - self.history_len
    }

    /// Last observed date, where the forecast starts
    pub fn forecast_start(&self) -> Option<NaiveDate> {
        self.history_len
            .checked_sub(1)
            .and_then(|i| self.rows.get(i))
            .map(|r| r.ds)
    }

    /// The last `n` rows
    pub fn tail(&self, n: usize) -> &[ForecastRow] {
        &self.rows[self.rows.len().saturating_sub(n)..]
    }

    pub fn components(&self) -> &Components {
        &self.components
    }

    pub fn model_name(&self) -> &str {
        &self.model_name
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(&self.rows)?)
    }

    /// Columns `ds, yhat, yhat_lower, yhat_upper, trend`
    pub fn to_dataframe(&self) -> Result<DataFrame> {
        let ds: Vec<String> = self.rows.iter().map(|r| r.ds.to_string()).collect();
        let column = |f: fn(&ForecastRow) -> f64| self.rows.iter().map(f).collect::<Vec<f64>>();

        let df = DataFrame::new(vec![
            Series::new("ds", ds),
            Series::new("yhat", column(|r| r.yhat)),
            Series::new("yhat_lower", column(|r| r.yhat_lower)),
            Series::new("yhat_upper", column(|r| r.yhat_upper)),
            Series::new("trend", self.components.trend.clone()),
        ])?;
        Ok(df)
    }

    pub fn write_csv<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let mut writer = csv::Writer::from_path(path)?;
        for row in &self.rows {
            writer.serialize(row)?;
        }
        writer.flush()?;
        Ok(())
    }
}

/// Runs a model over a daily series
#[derive(Debug, Clone)]
pub struct ForecastAdapter<M: ForecastModel> {
    model: M,
}

impl<M: ForecastModel> ForecastAdapter<M> {
    pub fn new(model: M) -> Self {
        Self { model }
    }

    pub fn model(&self) -> &M {
        &self.model
    }

    /// Validate the series and rename it to the model schema
    pub fn prepare(&self, series: &TimeSeriesData) -> Result<ModelInput> {
        if series.len() < 2 {
            return Err(ForecastError::InsufficientData(format!(
                "Need at least two distinct dates to fit a trend, got {} row(s)",
                series.len()
            )));
        }
        validate_daily_index(series.dates())?;
        if let Some((date, value)) = series.iter().find(|(_, v)| !v.is_finite()) {
            return Err(ForecastError::DataError(format!(
                "Value {} on {} is not a finite number",
                value, date
            )));
        }

        Ok(ModelInput::from(series))
    }

    /// Fit on `series` and forecast `horizon` days past its end
    pub fn run(&self, series: &TimeSeriesData, horizon: usize) -> Result<ForecastFrame> {
        let input = self.prepare(series)?;
        info!(rows = input.len(), "prepared dataset (ds, y)");

        let trained = self.model.fit(&input)?;
        info!(model = self.model.name(), "model training complete");

        let dates = extend_daily_index(&input.ds, horizon)?;
        let prediction = trained.predict(&dates)?;
        prediction.check_len(dates.len())?;
        info!(horizon, "forecast created");

        let rows: Vec<ForecastRow> = dates
            .iter()
            .enumerate()
            .map(|(i, &ds)| ForecastRow {
                ds,
                yhat: prediction.yhat[i],
                yhat_lower: prediction.lower[i],
                yhat_upper: prediction.upper[i],
            })
            .collect();

        if let Some(bad) = rows
            .iter()
            .find(|r| !(r.yhat_lower <= r.yhat && r.yhat <= r.yhat_upper))
        {
            return Err(ForecastError::ForecastingError(format!(
                "Model {} produced bounds [{}, {}] that do not contain {} on {}",
                trained.name(),
                bad.yhat_lower,
                bad.yhat_upper,
                bad.yhat,
                bad.ds
            )));
        }

        Ok(ForecastFrame {
            rows,
            history_len: input.len(),
            components: prediction.components,
            model_name: trained.name().to_string(),
        })
    }
}

/// Forecast a series with the decomposable model under `config`
pub fn forecast_series(
    series: &TimeSeriesData,
    config: &ModelConfig,
    horizon: usize,
) -> Result<ForecastFrame> {
    let model = DecomposableModel::new(config.clone())?;
    ForecastAdapter::new(model).run(series, horizon)
}

/// Load a `Date,Sales` CSV and forecast it with the batch profile
pub fn run_forecast<P: AsRef<Path>>(csv_path: P, horizon: usize) -> Result<ForecastFrame> {
    let series = DataLoader::from_csv(csv_path)?;
    forecast_series(&series, &ModelConfig::batch(), horizon)
}
