//! Decomposable trend + seasonality model
//!
//! The series is modelled as a piecewise-linear trend with slope changes at
//! evenly spaced changepoints, plus Fourier seasonalities that are either
//! added to the trend or scale it:
//!
//! - additive: `y = trend + seasonal`
//! - multiplicative: `y = trend * (1 + seasonal)`
//!
//! Coefficients are the maximum a posteriori estimate under Gaussian priors,
//! which reduces to ridge least squares. The changepoint prior scale sets the
//! penalty on slope changes: a small scale keeps the trend stiff.

use crate::config::{ModelConfig, SeasonalityMode};
use crate::error::{ForecastError, Result};
use crate::models::{Components, ForecastModel, ModelInput, Prediction, TrainedForecastModel};
use chrono::NaiveDate;
use forecast_math::{
    changepoint_matrix, piecewise_linear, ridge_least_squares, select_changepoints, DesignMatrix,
    Seasonality,
};
use statrs::distribution::{ContinuousCDF, Normal};
use tracing::debug;

/// Reference noise level (in scaled units) the prior scales are measured against
const PRIOR_NOISE_SCALE: f64 = 0.05;

/// Decomposable forecasting model
#[derive(Debug, Clone)]
pub struct DecomposableModel {
    /// Name of the model
    name: String,
    config: ModelConfig,
}

/// Fitted decomposable model
#[derive(Debug, Clone)]
pub struct TrainedDecomposableModel {
    name: String,
    mode: SeasonalityMode,
    /// Origin of the scaled time axis
    start: NaiveDate,
    /// Last history date
    end: NaiveDate,
    /// History span in days
    span_days: f64,
    /// Divisor applied to y before fitting
    y_scale: f64,
    /// Base slope
    k: f64,
    /// Offset
    m: f64,
    deltas: Vec<f64>,
    changepoints: Vec<f64>,
    seasonalities: Vec<Seasonality>,
    /// Fourier coefficients, one block per seasonality
    betas: Vec<f64>,
    /// Residual standard deviation (scaled)
    sigma: f64,
    /// Normal quantile of the interval width
    z: f64,
}

impl DecomposableModel {
    /// Create a model from a validated configuration
    pub fn new(config: ModelConfig) -> Result<Self> {
        config.validate()?;

        Ok(Self {
            name: format!(
                "Decomposable ({}, changepoint_prior_scale={})",
                config.seasonality_mode, config.changepoint_prior_scale
            ),
            config,
        })
    }

    pub fn config(&self) -> &ModelConfig {
        &self.config
    }

    fn seasonalities(&self) -> Vec<Seasonality> {
        let mut out = Vec::new();
        if self.config.yearly_seasonality {
            out.push(Seasonality::yearly());
        }
        if self.config.weekly_seasonality {
            out.push(Seasonality::weekly());
        }
        if self.config.daily_seasonality {
            out.push(Seasonality::daily());
        }
        out
    }

    fn seasonal_penalty(&self) -> f64 {
        (PRIOR_NOISE_SCALE / self.config.seasonality_prior_scale).powi(2)
    }

    fn changepoint_penalty(&self) -> f64 {
        (PRIOR_NOISE_SCALE / self.config.changepoint_prior_scale).powi(2)
    }
}

impl ForecastModel for DecomposableModel {
    type Trained = TrainedDecomposableModel;

    fn fit(&self, history: &ModelInput) -> Result<Self::Trained> {
        if history.len() < 2 {
            return Err(ForecastError::InsufficientData(format!(
                "Need at least two observations to fit a trend, got {}",
                history.len()
            )));
        }
        if !history.ds.windows(2).all(|w| w[0] < w[1]) {
            return Err(ForecastError::ValidationError(
                "History dates must be strictly increasing".to_string(),
            ));
        }
        if let Some(bad) = history.y.iter().position(|v| !v.is_finite()) {
            return Err(ForecastError::DataError(format!(
                "Non-finite value at {}",
                history.ds[bad]
            )));
        }

        let start = history.ds[0];
        let end = history.ds[history.len() - 1];
        let span_days = (end - start).num_days() as f64;

        let y_max = history.y.iter().fold(0.0_f64, |acc, v| acc.max(v.abs()));
        let y_scale = if y_max > 0.0 { y_max } else { 1.0 };
        let y: Vec<f64> = history.y.iter().map(|v| v / y_scale).collect();

        let t = scaled_time(&history.ds, start, span_days);
        let changepoints =
            select_changepoints(&t, self.config.n_changepoints, self.config.changepoint_range);
        let seasonalities = self.seasonalities();

        let trend_x = trend_design(&t, &changepoints)?;
        let seasonal_x = seasonal_design(&history.ds, &seasonalities)?;
        let n_trend = trend_x.cols();

        let mut penalties = vec![0.0, 0.0];
        penalties.extend(std::iter::repeat(self.changepoint_penalty()).take(changepoints.len()));
        let seasonal_penalties = vec![self.seasonal_penalty(); seasonal_x.cols()];

        debug!(
            rows = history.len(),
            changepoints = changepoints.len(),
            seasonal_columns = seasonal_x.cols(),
            mode = %self.config.seasonality_mode,
            "fitting decomposable model"
        );

        // Joint additive fit; in multiplicative mode it only supplies the trend.
        let x = DesignMatrix::hstack(&[&trend_x, &seasonal_x])?;
        let mut all_penalties = penalties.clone();
        all_penalties.extend_from_slice(&seasonal_penalties);
        let joint = ridge_least_squares(&x, &y, &all_penalties)?;

        let trend_coef = &joint[..n_trend];
        let betas = match self.config.seasonality_mode {
            SeasonalityMode::Additive => joint[n_trend..].to_vec(),
            SeasonalityMode::Multiplicative if seasonal_x.cols() > 0 => {
                // y - trend = trend * X b, i.e. least squares on trend-weighted rows
                let trend = trend_x.mul_vec(trend_coef)?;
                let weighted = seasonal_x.scale_rows(&trend)?;
                let deviation: Vec<f64> = y.iter().zip(&trend).map(|(v, tr)| v - tr).collect();
                ridge_least_squares(&weighted, &deviation, &seasonal_penalties)?
            }
            SeasonalityMode::Multiplicative => Vec::new(),
        };

        let z = Normal::new(0.0, 1.0)
            .map_err(|e| ForecastError::ForecastingError(e.to_string()))?
            .inverse_cdf(0.5 + self.config.interval_width / 2.0);

        let mut trained = TrainedDecomposableModel {
            name: self.name.clone(),
            mode: self.config.seasonality_mode,
            start,
            end,
            span_days,
            y_scale,
            m: trend_coef[0],
            k: trend_coef[1],
            deltas: trend_coef[2..].to_vec(),
            changepoints,
            seasonalities,
            betas,
            sigma: 0.0,
            z,
        };

        let fitted = trained.evaluate(&history.ds)?;
        let sse: f64 = fitted
            .yhat
            .iter()
            .zip(&y)
            .map(|(f, v)| (f - v).powi(2))
            .sum();
        trained.sigma = (sse / y.len() as f64).sqrt();

        debug!(
            sigma = trained.sigma * y_scale,
            slope = trained.k,
            "decomposable model fitted"
        );

        Ok(trained)
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// Model terms in scaled units
struct Evaluation {
    trend: Vec<f64>,
    seasonal: Vec<Vec<f64>>,
    yhat: Vec<f64>,
}

impl TrainedDecomposableModel {
    pub fn seasonality_mode(&self) -> SeasonalityMode {
        self.mode
    }

    /// Residual standard deviation in sales units
    pub fn residual_std(&self) -> f64 {
        self.sigma * self.y_scale
    }

    fn evaluate(&self, dates: &[NaiveDate]) -> Result<Evaluation> {
        let t = scaled_time(dates, self.start, self.span_days);
        let trend = piecewise_linear(self.k, self.m, &self.deltas, &self.changepoints, &t)?;

        let mut seasonal = Vec::with_capacity(self.seasonalities.len());
        let days = epoch_days(dates);
        let mut offset = 0;
        for s in &self.seasonalities {
            let width = s.width();
            let term = match self.betas.get(offset..offset + width) {
                Some(beta) => s.features(&days)?.mul_vec(beta)?,
                None => vec![0.0; dates.len()],
            };
            seasonal.push(term);
            offset += width;
        }

        let yhat = (0..dates.len())
            .map(|i| {
                let total: f64 = seasonal.iter().map(|s| s[i]).sum();
                match self.mode {
                    SeasonalityMode::Additive => trend[i] + total,
                    SeasonalityMode::Multiplicative => trend[i] * (1.0 + total),
                }
            })
            .collect();

        Ok(Evaluation {
            trend,
            seasonal,
            yhat,
        })
    }

    /// Standard deviation of the trend drift `h` scaled time units past the history
    ///
    /// Future slope changes arrive at the historical changepoint rate with the
    /// mean magnitude of the fitted ones.
    fn trend_drift_std(&self, h: f64) -> f64 {
        if h <= 0.0 || self.deltas.is_empty() {
            return 0.0;
        }
        let rate = self.deltas.len() as f64;
        let scale = self.deltas.iter().map(|d| d.abs()).sum::<f64>() / self.deltas.len() as f64;
        scale * h * (rate * h / 3.0).sqrt()
    }
}

impl TrainedForecastModel for TrainedDecomposableModel {
    fn predict(&self, dates: &[NaiveDate]) -> Result<Prediction> {
        let eval = self.evaluate(dates)?;
        let t = scaled_time(dates, self.start, self.span_days);

        let mut yhat = Vec::with_capacity(dates.len());
        let mut lower = Vec::with_capacity(dates.len());
        let mut upper = Vec::with_capacity(dates.len());
        for i in 0..dates.len() {
            let mut drift = self.trend_drift_std(t[i] - 1.0);
            if self.mode == SeasonalityMode::Multiplicative {
                let total: f64 = eval.seasonal.iter().map(|s| s[i]).sum();
                drift *= (1.0 + total).abs();
            }
            let half = self.z * (self.sigma.powi(2) + drift.powi(2)).sqrt() * self.y_scale;
            let point = eval.yhat[i] * self.y_scale;

            yhat.push(point);
            lower.push(point - half);
            upper.push(point + half);
        }

        let unscale = |v: &Vec<f64>| -> Vec<f64> {
            match self.mode {
                SeasonalityMode::Additive => v.iter().map(|x| x * self.y_scale).collect(),
                SeasonalityMode::Multiplicative => v.clone(),
            }
        };

        let mut components = Components {
            trend: eval.trend.iter().map(|x| x * self.y_scale).collect(),
            ..Components::default()
        };
        for (s, term) in self.seasonalities.iter().zip(&eval.seasonal) {
            let values = Some(unscale(term));
            match s.name.as_str() {
                "yearly" => components.yearly = values,
                "weekly" => components.weekly = values,
                "daily" => components.daily = values,
                _ => {}
            }
        }

        Ok(Prediction {
            yhat,
            lower,
            upper,
            components,
        })
    }

    fn last_history_date(&self) -> NaiveDate {
        self.end
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// Time since `start` as a share of the history span
fn scaled_time(dates: &[NaiveDate], start: NaiveDate, span_days: f64) -> Vec<f64> {
    dates
        .iter()
        .map(|d| (*d - start).num_days() as f64 / span_days)
        .collect()
}

/// Absolute day numbers, so seasonal phases do not depend on the history start
fn epoch_days(dates: &[NaiveDate]) -> Vec<f64> {
    let epoch = NaiveDate::from_ymd_opt(1970, 1, 1).expect("valid epoch");
    dates
        .iter()
        .map(|d| (*d - epoch).num_days() as f64)
        .collect()
}

/// Columns `[1, t, hinges...]`
fn trend_design(t: &[f64], changepoints: &[f64]) -> Result<DesignMatrix> {
    let base = DesignMatrix::from_columns(&[vec![1.0; t.len()], t.to_vec()])?;
    let hinges = changepoint_matrix(t, changepoints);
    Ok(DesignMatrix::hstack(&[&base, &hinges])?)
}

fn seasonal_design(dates: &[NaiveDate], seasonalities: &[Seasonality]) -> Result<DesignMatrix> {
    let days = epoch_days(dates);
    let blocks = seasonalities
        .iter()
        .map(|s| s.features(&days))
        .collect::<forecast_math::Result<Vec<_>>>()?;
    if blocks.is_empty() {
        return Ok(DesignMatrix::zeros(dates.len(), 0));
    }
    let refs: Vec<&DesignMatrix> = blocks.iter().collect();
    Ok(DesignMatrix::hstack(&refs)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn daily_dates(n: usize) -> Vec<NaiveDate> {
        let start = NaiveDate::from_ymd_opt(2021, 1, 1).unwrap();
        (0..n).map(|i| start + chrono::Duration::days(i as i64)).collect()
    }

    #[test]
    fn test_recovers_linear_trend() {
        let ds = daily_dates(60);
        let y: Vec<f64> = (0..60).map(|i| 100.0 + 2.0 * i as f64).collect();
        let config = ModelConfig {
            yearly_seasonality: false,
            weekly_seasonality: false,
            ..ModelConfig::default()
        };

        let model = DecomposableModel::new(config).unwrap();
        let trained = model.fit(&ModelInput::new(ds.clone(), y.clone()).unwrap()).unwrap();
        let pred = trained.predict(&ds).unwrap();

        for (p, v) in pred.yhat.iter().zip(&y) {
            assert!((p - v).abs() < 0.5, "{} vs {}", p, v);
        }
        assert!(pred.components.yearly.is_none());
    }

    #[test]
    fn test_single_date_is_insufficient() {
        let model = DecomposableModel::new(ModelConfig::default()).unwrap();
        let input = ModelInput::new(daily_dates(1), vec![5.0]).unwrap();
        assert!(matches!(
            model.fit(&input),
            Err(ForecastError::InsufficientData(_))
        ));
    }

    #[test]
    fn test_weekly_pattern_is_learned() {
        let ds = daily_dates(84);
        let y: Vec<f64> = ds
            .iter()
            .map(|d| {
                use chrono::Datelike;
                if d.weekday().num_days_from_monday() >= 5 {
                    150.0
                } else {
                    100.0
                }
            })
            .collect();
        let config = ModelConfig {
            yearly_seasonality: false,
            ..ModelConfig::default()
        };

        let trained = DecomposableModel::new(config)
            .unwrap()
            .fit(&ModelInput::new(ds.clone(), y).unwrap())
            .unwrap();
        let weekly = trained.predict(&ds).unwrap().components.weekly.unwrap();

        // 2021-01-02 is a Saturday, 2021-01-04 a Monday
        assert!(weekly[1] > weekly[3] + 20.0);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = ModelConfig {
            changepoint_prior_scale: 0.0,
            ..ModelConfig::default()
        };
        assert!(DecomposableModel::new(config).is_err());
    }
}
