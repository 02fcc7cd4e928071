//! Pipeline configuration
//!
//! Every tunable of the generator and the model lives here. There are two
//! model profiles: the batch pipeline always fits a multiplicative model,
//! while the dashboard lets the user pick the mode and the changepoint prior
//! scale.

use crate::error::{ForecastError, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// Horizon used by the batch pipeline (two years)
pub const BATCH_HORIZON_DAYS: usize = 365 * 2;

/// Horizon used by `run_forecast` when the caller does not pick one
pub const DEFAULT_HORIZON_DAYS: usize = 365;

/// Longest horizon any pipeline accepts (five years)
pub const MAX_HORIZON_DAYS: usize = 365 * 5;

/// How seasonal terms combine with the trend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SeasonalityMode {
    /// `y = trend + seasonal`
    #[default]
    Additive,
    /// `y = trend * (1 + seasonal)`
    Multiplicative,
}

impl FromStr for SeasonalityMode {
    type Err = ForecastError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "additive" | "add" => Ok(SeasonalityMode::Additive),
            "multiplicative" | "mul" => Ok(SeasonalityMode::Multiplicative),
            other => Err(ForecastError::InvalidParameter(format!(
                "Unknown seasonality mode '{}', expected additive or multiplicative",
                other
            ))),
        }
    }
}

impl fmt::Display for SeasonalityMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SeasonalityMode::Additive => write!(f, "additive"),
            SeasonalityMode::Multiplicative => write!(f, "multiplicative"),
        }
    }
}

/// Parameters of the synthetic sales generator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    /// First generated day (inclusive)
    pub start: NaiveDate,
    /// Last generated day (inclusive)
    pub end: NaiveDate,
    /// Seed of the noise generator
    pub seed: u64,
    /// Linear growth per day
    pub slope: f64,
    /// Amplitude of the annual sine wave
    pub yearly_amplitude: f64,
    /// Step added on Saturdays and Sundays
    pub weekend_bonus: f64,
    /// Constant base level
    pub offset: f64,
    /// Standard deviation of the Gaussian noise
    pub noise_std: f64,
}

impl GeneratorConfig {
    /// Default shape over a custom range and seed
    pub fn new(start: NaiveDate, end: NaiveDate, seed: u64) -> Self {
        Self {
            start,
            end,
            seed,
            ..Self::default()
        }
    }

    /// Number of days in the range, or an error when `end < start`
    pub fn days(&self) -> Result<usize> {
        if self.end < self.start {
            return Err(ForecastError::ValidationError(format!(
                "End date {} is before start date {}",
                self.end, self.start
            )));
        }
        Ok((self.end - self.start).num_days() as usize + 1)
    }

    pub fn validate(&self) -> Result<()> {
        self.days()?;

        if !self.noise_std.is_finite() || self.noise_std < 0.0 {
            return Err(ForecastError::InvalidParameter(format!(
                "Noise standard deviation must be finite and non-negative, got {}",
                self.noise_std
            )));
        }

        let terms = [
            ("slope", self.slope),
            ("yearly_amplitude", self.yearly_amplitude),
            ("weekend_bonus", self.weekend_bonus),
            ("offset", self.offset),
        ];
        if let Some((name, value)) = terms.iter().find(|(_, v)| !v.is_finite()) {
            return Err(ForecastError::InvalidParameter(format!(
                "{} must be finite, got {}",
                name, value
            )));
        }

        Ok(())
    }
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            start: NaiveDate::from_ymd_opt(2018, 1, 1).expect("valid start date"),
            end: NaiveDate::from_ymd_opt(2022, 12, 31).expect("valid end date"),
            seed: 42,
            slope: 5.0,
            yearly_amplitude: 1000.0,
            weekend_bonus: 500.0,
            offset: 10_000.0,
            noise_std: 300.0,
        }
    }
}

/// Settings of the decomposable forecasting model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    pub seasonality_mode: SeasonalityMode,
    pub yearly_seasonality: bool,
    pub weekly_seasonality: bool,
    pub daily_seasonality: bool,
    /// Flexibility of the trend; larger values let it bend more
    pub changepoint_prior_scale: f64,
    /// Upper bound on the number of trend changepoints
    pub n_changepoints: usize,
    /// Share of the history in which changepoints may be placed
    pub changepoint_range: f64,
    /// Strength of the seasonal terms' prior
    pub seasonality_prior_scale: f64,
    /// Coverage of the uncertainty interval
    pub interval_width: f64,
}

impl ModelConfig {
    /// Profile of the batch pipeline: multiplicative, yearly and weekly terms
    pub fn batch() -> Self {
        Self {
            seasonality_mode: SeasonalityMode::Multiplicative,
            ..Self::default()
        }
    }

    /// Profile of the dashboard: user-selected mode and flexibility
    pub fn dashboard(mode: SeasonalityMode, changepoint_prior_scale: f64) -> Self {
        Self {
            seasonality_mode: mode,
            changepoint_prior_scale,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<()> {
        if !self.changepoint_prior_scale.is_finite() || self.changepoint_prior_scale <= 0.0 {
            return Err(ForecastError::InvalidParameter(format!(
                "Changepoint prior scale must be positive, got {}",
                self.changepoint_prior_scale
            )));
        }
        if !self.seasonality_prior_scale.is_finite() || self.seasonality_prior_scale <= 0.0 {
            return Err(ForecastError::InvalidParameter(format!(
                "Seasonality prior scale must be positive, got {}",
                self.seasonality_prior_scale
            )));
        }
        if !(self.changepoint_range > 0.0 && self.changepoint_range <= 1.0) {
            return Err(ForecastError::InvalidParameter(format!(
                "Changepoint range must be in (0, 1], got {}",
                self.changepoint_range
            )));
        }
        if !(self.interval_width > 0.0 && self.interval_width < 1.0) {
            return Err(ForecastError::InvalidParameter(format!(
                "Interval width must be in (0, 1), got {}",
                self.interval_width
            )));
        }
        Ok(())
    }
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            seasonality_mode: SeasonalityMode::Additive,
            yearly_seasonality: true,
            weekly_seasonality: true,
            daily_seasonality: false,
            changepoint_prior_scale: 0.05,
            n_changepoints: 25,
            changepoint_range: 0.8,
            seasonality_prior_scale: 10.0,
            interval_width: 0.8,
        }
    }
}

/// Everything one batch run needs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub generator: GeneratorConfig,
    pub model: ModelConfig,
    /// Number of future days to forecast
    pub horizon_days: usize,
}

impl PipelineConfig {
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    pub fn validate(&self) -> Result<()> {
        if self.horizon_days > MAX_HORIZON_DAYS {
            return Err(ForecastError::InvalidParameter(format!(
                "Horizon must be at most {} days, got {}",
                MAX_HORIZON_DAYS, self.horizon_days
            )));
        }
        self.generator.validate()?;
        self.model.validate()
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            generator: GeneratorConfig::default(),
            model: ModelConfig::batch(),
            horizon_days: BATCH_HORIZON_DAYS,
        }
    }
}
