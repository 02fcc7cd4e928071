#![allow(dead_code)]

use chrono::{Datelike, Duration, NaiveDate};
use sales_forecast::models::{
    Components, ForecastModel, ModelInput, Prediction, TrainedForecastModel,
};
use sales_forecast::{ForecastError, Result, TimeSeriesData};

pub fn date(s: &str) -> NaiveDate {
    s.parse().unwrap()
}

/// Daily series starting at `start` with the given values
pub fn daily_series(start: &str, values: &[f64]) -> TimeSeriesData {
    let start = date(start);
    let dates = (0..values.len())
        .map(|i| start + Duration::days(i as i64))
        .collect();
    TimeSeriesData::new(dates, values.to_vec()).unwrap()
}

/// Deterministic model: predicts the history mean with a fixed band
///
/// The weekly component is the weekday number (Monday = 0) so views can
/// check how components are regrouped.
#[derive(Debug, Clone)]
pub struct MeanModel {
    pub half_width: f64,
}

#[derive(Debug, Clone)]
pub struct TrainedMeanModel {
    mean: f64,
    half_width: f64,
    last: NaiveDate,
}

impl ForecastModel for MeanModel {
    type Trained = TrainedMeanModel;

    fn fit(&self, history: &ModelInput) -> Result<Self::Trained> {
        let last = *history
            .ds
            .last()
            .ok_or_else(|| ForecastError::InsufficientData("empty".to_string()))?;
        Ok(TrainedMeanModel {
            mean: history.y.iter().sum::<f64>() / history.len() as f64,
            half_width: self.half_width,
            last,
        })
    }

    fn name(&self) -> &str {
        "mean"
    }
}

impl TrainedForecastModel for TrainedMeanModel {
    fn predict(&self, dates: &[NaiveDate]) -> Result<Prediction> {
        let n = dates.len();
        Ok(Prediction {
            yhat: vec![self.mean; n],
            lower: vec![self.mean - self.half_width; n],
            upper: vec![self.mean + self.half_width; n],
            components: Components {
                trend: vec![self.mean; n],
                yearly: None,
                weekly: Some(
                    dates
                        .iter()
                        .map(|d| d.weekday().num_days_from_monday() as f64)
                        .collect(),
                ),
                daily: None,
            },
        })
    }

    fn last_history_date(&self) -> NaiveDate {
        self.last
    }

    fn name(&self) -> &str {
        "mean"
    }
}
