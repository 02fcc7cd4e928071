//! Interactive forecast dashboard
//!
//! Holds one sales series and re-runs the whole pipeline synchronously every
//! time a setting changes. The terminal front end reads one command per line:
//!
//! ```text
//! horizon 90
//! mode multiplicative
//! changepoint 0.2
//! show
//! quit
//! ```

use crate::adapter::{forecast_series, ForecastRow};
use crate::config::{ModelConfig, SeasonalityMode, DEFAULT_HORIZON_DAYS};
pub use crate::config::MAX_HORIZON_DAYS;
use crate::data::TimeSeriesData;
use crate::error::{ForecastError, Result};
use crate::views::{ComponentsView, ForecastTable};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::io::{BufRead, Write};
use std::str::FromStr;
use tracing::{info, warn};

pub const MIN_HORIZON_DAYS: usize = 30;
pub const MIN_CHANGEPOINT_PRIOR_SCALE: f64 = 0.001;
pub const MAX_CHANGEPOINT_PRIOR_SCALE: f64 = 0.5;

/// Number of trailing forecast rows shown in the table
pub const TABLE_ROWS: usize = 30;

/// User-adjustable inputs
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DashboardSettings {
    pub horizon_days: usize,
    pub seasonality_mode: SeasonalityMode,
    pub changepoint_prior_scale: f64,
}

impl Default for DashboardSettings {
    fn default() -> Self {
        Self {
            horizon_days: DEFAULT_HORIZON_DAYS,
            seasonality_mode: SeasonalityMode::Additive,
            changepoint_prior_scale: 0.05,
        }
    }
}

impl DashboardSettings {
    pub fn validate(&self) -> Result<()> {
        if !(MIN_HORIZON_DAYS..=MAX_HORIZON_DAYS).contains(&self.horizon_days) {
            return Err(ForecastError::InvalidParameter(format!(
                "Forecast days must be between {} and {}, got {}",
                MIN_HORIZON_DAYS, MAX_HORIZON_DAYS, self.horizon_days
            )));
        }
        if !(MIN_CHANGEPOINT_PRIOR_SCALE..=MAX_CHANGEPOINT_PRIOR_SCALE)
            .contains(&self.changepoint_prior_scale)
        {
            return Err(ForecastError::InvalidParameter(format!(
                "Changepoint prior scale must be between {} and {}, got {}",
                MIN_CHANGEPOINT_PRIOR_SCALE,
                MAX_CHANGEPOINT_PRIOR_SCALE,
                self.changepoint_prior_scale
            )));
        }
        Ok(())
    }

    pub fn model_config(&self) -> ModelConfig {
        ModelConfig::dashboard(self.seasonality_mode, self.changepoint_prior_scale)
    }
}

/// Headline numbers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Kpis {
    pub last_recorded_sales: i64,
    pub average_daily_sales: i64,
    pub horizon_days: usize,
}

/// Which line a chart point belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartSeries {
    /// Observed sales
    Y,
    /// Model estimate
    Yhat,
}

/// Long-format chart row
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ChartPoint {
    pub ds: NaiveDate,
    pub series: ChartSeries,
    pub value: f64,
}

/// Everything the dashboard shows after one refit
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardSnapshot {
    pub settings: DashboardSettings,
    pub kpis: Kpis,
    pub chart: Vec<ChartPoint>,
    pub table: Vec<ForecastRow>,
    pub components: ComponentsView,
}

impl fmt::Display for DashboardSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Settings: horizon={} mode={} changepoint_prior_scale={}",
            self.settings.horizon_days,
            self.settings.seasonality_mode,
            self.settings.changepoint_prior_scale
        )?;
        writeln!(f, "Last recorded sales:              {}", self.kpis.last_recorded_sales)?;
        writeln!(f, "Average daily sales (historical): {}", self.kpis.average_daily_sales)?;
        writeln!(f, "Forecast horizon (days):          {}", self.kpis.horizon_days)?;
        writeln!(f)?;
        writeln!(f, "Forecast (last {} rows)", self.table.len())?;
        write!(f, "{}", ForecastTable::new(&self.table))
    }
}

/// Sales series plus the current settings
#[derive(Debug, Clone)]
pub struct Dashboard {
    series: TimeSeriesData,
    settings: DashboardSettings,
}

impl Dashboard {
    pub fn new(series: TimeSeriesData) -> Self {
        Self {
            series,
            settings: DashboardSettings::default(),
        }
    }

    pub fn settings(&self) -> &DashboardSettings {
        &self.settings
    }

    pub fn series(&self) -> &TimeSeriesData {
        &self.series
    }

    /// Validate `settings`, refit and keep them on success
    pub fn apply(&mut self, settings: DashboardSettings) -> Result<DashboardSnapshot> {
        settings.validate()?;
        let snapshot = Self::compute(&self.series, settings)?;
        self.settings = settings;
        Ok(snapshot)
    }

    /// Refit with the current settings
    pub fn refresh(&self) -> Result<DashboardSnapshot> {
        Self::compute(&self.series, self.settings)
    }

    fn compute(series: &TimeSeriesData, settings: DashboardSettings) -> Result<DashboardSnapshot> {
        info!(
            horizon = settings.horizon_days,
            mode = %settings.seasonality_mode,
            changepoint_prior_scale = settings.changepoint_prior_scale,
            "refitting dashboard model"
        );
        let frame = forecast_series(series, &settings.model_config(), settings.horizon_days)?;

        let kpis = Kpis {
            last_recorded_sales: series.last_value().unwrap_or_default().trunc() as i64,
            average_daily_sales: series.mean()?.trunc() as i64,
            horizon_days: settings.horizon_days,
        };

        let mut chart: Vec<ChartPoint> = series
            .iter()
            .map(|(ds, value)| ChartPoint {
                ds,
                series: ChartSeries::Y,
                value,
            })
            .collect();
        chart.extend(frame.rows().iter().map(|r| ChartPoint {
            ds: r.ds,
            series: ChartSeries::Yhat,
            value: r.yhat,
        }));

        Ok(DashboardSnapshot {
            settings,
            kpis,
            chart,
            table: frame.tail(TABLE_ROWS).to_vec(),
            components: ComponentsView::build(&frame),
        })
    }

    /// Apply one command; returns false once the user quits
    pub fn handle<W: Write>(&mut self, command: Command, out: &mut W) -> Result<bool> {
        let mut next = self.settings;
        match command {
            Command::Quit => return Ok(false),
            Command::Help => {
                writeln!(out, "{}", Command::USAGE)?;
                return Ok(true);
            }
            Command::Show => {
                write!(out, "{}", self.refresh()?)?;
                return Ok(true);
            }
            Command::Horizon(days) => next.horizon_days = days,
            Command::Mode(mode) => next.seasonality_mode = mode,
            Command::Changepoint(scale) => next.changepoint_prior_scale = scale,
        }
        write!(out, "{}", self.apply(next)?)?;
        Ok(true)
    }

    /// Read commands from `input` until `quit` or end of input
    ///
    /// Bad commands and rejected settings are reported and the loop goes on;
    /// I/O failures end it.
    pub fn run<R: BufRead, W: Write>(&mut self, input: R, out: &mut W) -> Result<()> {
        write!(out, "{}", self.refresh()?)?;
        for line in input.lines() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            let outcome = line.parse::<Command>().and_then(|c| self.handle(c, out));
            match outcome {
                Ok(true) => {}
                Ok(false) => break,
                Err(ForecastError::IoError(e)) => return Err(ForecastError::IoError(e)),
                Err(e) => {
                    warn!(error = %e, "dashboard command rejected");
                    writeln!(out, "error: {}", e)?;
                }
            }
        }
        Ok(())
    }
}

/// One line of dashboard input
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Command {
    Horizon(usize),
    Mode(SeasonalityMode),
    Changepoint(f64),
    Show,
    Help,
    Quit,
}

impl Command {
    pub const USAGE: &'static str = "commands: horizon <days> | mode <additive|multiplicative> | changepoint <scale> | show | help | quit";
}

impl FromStr for Command {
    type Err = ForecastError;

    fn from_str(s: &str) -> Result<Self> {
        let mut parts = s.split_whitespace();
        let verb = parts.next().unwrap_or_default().to_lowercase();
        let arg = parts.next();
        if parts.next().is_some() {
            return Err(ForecastError::InvalidParameter(format!(
                "Too many arguments in '{}'",
                s.trim()
            )));
        }

        let require = |name: &str| {
            arg.ok_or_else(|| {
                ForecastError::InvalidParameter(format!("'{}' needs a value", name))
            })
        };

        match verb.as_str() {
            "horizon" => {
                let value = require("horizon")?;
                value.parse().map(Command::Horizon).map_err(|_| {
                    ForecastError::InvalidParameter(format!("Invalid horizon '{}'", value))
                })
            }
            "mode" => require("mode")?.parse().map(Command::Mode),
            "changepoint" => {
                let value = require("changepoint")?;
                value.parse().map(Command::Changepoint).map_err(|_| {
                    ForecastError::InvalidParameter(format!(
                        "Invalid changepoint prior scale '{}'",
                        value
                    ))
                })
            }
            "show" => Ok(Command::Show),
            "help" | "?" => Ok(Command::Help),
            "quit" | "exit" | "q" => Ok(Command::Quit),
            other => Err(ForecastError::InvalidParameter(format!(
                "Unknown command '{}'. {}",
                other,
                Command::USAGE
            ))),
        }
    }
}
