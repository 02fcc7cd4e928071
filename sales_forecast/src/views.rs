//! Chart-ready views of a forecast
//!
//! Nothing here fits or predicts; every view is a reshaping of the history
//! and a [`ForecastFrame`] that a renderer can plot directly.

use crate::adapter::{ForecastFrame, ForecastRow};
use crate::data::TimeSeriesData;
use chrono::{Datelike, Duration, NaiveDate, Weekday};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

/// Days of history shown in the recent-window view
pub const RECENT_HISTORY_DAYS: i64 = 365;

/// Days before the forecast start from which the recent forecast is shown
pub const RECENT_FORECAST_DAYS: i64 = 365 * 2;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Point {
    pub date: NaiveDate,
    pub value: f64,
}

/// Uncertainty band at one date
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Band {
    pub date: NaiveDate,
    pub lower: f64,
    pub upper: f64,
}

fn history_points(series: &TimeSeriesData) -> Vec<Point> {
    series
        .iter()
        .map(|(date, value)| Point { date, value })
        .collect()
}

fn forecast_points(rows: &[ForecastRow]) -> Vec<Point> {
    rows.iter()
        .map(|r| Point {
            date: r.ds,
            value: r.yhat,
        })
        .collect()
}

fn bands(rows: &[ForecastRow]) -> Vec<Band> {
    rows.iter()
        .map(|r| Band {
            date: r.ds,
            lower: r.yhat_lower,
            upper: r.yhat_upper,
        })
        .collect()
}

/// History, forecast line and band over the whole range
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForecastView {
    pub title: String,
    pub history: Vec<Point>,
    pub forecast: Vec<Point>,
    pub band: Vec<Band>,
}

impl ForecastView {
    pub fn build(history: &TimeSeriesData, frame: &ForecastFrame) -> Self {
        Self {
            title: "Sales Forecast: Trend + Seasonality + Future Projection".to_string(),
            history: history_points(history),
            forecast: forecast_points(frame.rows()),
            band: bands(frame.rows()),
        }
    }
}

/// Weekly term by weekday
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct WeekdayPoint {
    pub weekday: Weekday,
    pub value: f64,
}

/// Yearly term by 1-based day of year
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DayOfYearPoint {
    pub day_of_year: u32,
    pub value: f64,
}

/// Decomposed model terms
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComponentsView {
    pub trend: Vec<Point>,
    /// Monday to Sunday
    pub weekly: Option<Vec<WeekdayPoint>>,
    /// One full year, ordered by day of year
    pub yearly: Option<Vec<DayOfYearPoint>>,
    pub daily: Option<Vec<Point>>,
}

impl ComponentsView {
    pub fn build(frame: &ForecastFrame) -> Self {
        let dates: Vec<NaiveDate> = frame.rows().iter().map(|r| r.ds).collect();
        let components = frame.components();

        let trend = dates
            .iter()
            .zip(&components.trend)
            .map(|(&date, &value)| Point { date, value })
            .collect();

        let weekly = components.weekly.as_ref().map(|values| {
            let mut by_day: BTreeMap<u32, f64> = BTreeMap::new();
            for (date, &value) in dates.iter().zip(values) {
                by_day
                    .entry(date.weekday().num_days_from_monday())
                    .or_insert(value);
            }
            by_day
                .into_iter()
                .filter_map(|(day, value)| {
                    weekday_from_monday(day).map(|weekday| WeekdayPoint { weekday, value })
                })
                .collect()
        });

        let yearly = components.yearly.as_ref().map(|values| {
            let mut by_ordinal: BTreeMap<u32, f64> = BTreeMap::new();
            for (date, &value) in dates.iter().zip(values) {
                by_ordinal.entry(date.ordinal()).or_insert(value);
            }
            by_ordinal
                .into_iter()
                .map(|(day_of_year, value)| DayOfYearPoint { day_of_year, value })
                .collect()
        });

        let daily = components.daily.as_ref().map(|values| {
            dates
                .iter()
                .zip(values)
                .map(|(&date, &value)| Point { date, value })
                .collect()
        });

        Self {
            trend,
            weekly,
            yearly,
            daily,
        }
    }
}

fn weekday_from_monday(day: u32) -> Option<Weekday> {
    match day {
        0 => Some(Weekday::Mon),
        1 => Some(Weekday::Tue),
        2 => Some(Weekday::Wed),
        3 => Some(Weekday::Thu),
        4 => Some(Weekday::Fri),
        5 => Some(Weekday::Sat),
        6 => Some(Weekday::Sun),
        _ => None,
    }
}

/// Last year of history with the near-term forecast
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecentWindowView {
    pub title: String,
    pub history: Vec<Point>,
    pub forecast: Vec<Point>,
    pub band: Vec<Band>,
    /// Vertical marker at the last observed date
    pub forecast_start: Option<NaiveDate>,
}

impl RecentWindowView {
    pub fn build(history: &TimeSeriesData, frame: &ForecastFrame) -> Self {
        let title = "Recent History + Near-Term Forecast".to_string();
        let Some(end) = history.last_date() else {
            return Self {
                title,
                history: Vec::new(),
                forecast: Vec::new(),
                band: Vec::new(),
                forecast_start: None,
            };
        };

        let recent = history.after(end - Duration::days(RECENT_HISTORY_DAYS));
        let cutoff = end - Duration::days(RECENT_FORECAST_DAYS);
        let start = frame.rows().partition_point(|r| r.ds <= cutoff);
        let rows = &frame.rows()[start..];

        Self {
            title,
            history: history_points(&recent),
            forecast: forecast_points(rows),
            band: bands(rows),
            forecast_start: Some(end),
        }
    }
}

/// Console rendering of forecast rows
#[derive(Debug, Clone, Copy)]
pub struct ForecastTable<'a> {
    rows: &'a [ForecastRow],
}

impl<'a> ForecastTable<'a> {
    pub fn new(rows: &'a [ForecastRow]) -> Self {
        Self { rows }
    }
}

impl fmt::Display for ForecastTable<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{:<12} {:>14} {:>14} {:>14}",
            "ds", "yhat", "yhat_lower", "yhat_upper"
        )?;
        for row in self.rows {
            writeln!(
                f,
                "{:<12} {:>14.2} {:>14.2} {:>14.2}",
                row.ds.to_string(),
                row.yhat,
                row.yhat_lower,
                row.yhat_upper
            )?;
        }
        Ok(())
    }
}

/// All static views of one run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForecastViews {
    pub forecast: ForecastView,
    pub components: ComponentsView,
    pub recent: RecentWindowView,
}

impl ForecastViews {
    pub fn build(history: &TimeSeriesData, frame: &ForecastFrame) -> Self {
        Self {
            forecast: ForecastView::build(history, frame),
            components: ComponentsView::build(frame),
            recent: RecentWindowView::build(history, frame),
        }
    }
}
