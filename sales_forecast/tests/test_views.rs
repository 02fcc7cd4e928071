mod common;

use chrono::{Duration, Weekday};
use common::{daily_series, MeanModel};
use pretty_assertions::assert_eq;
use sales_forecast::adapter::ForecastAdapter;
use sales_forecast::config::ModelConfig;
use sales_forecast::views::{
    ComponentsView, ForecastTable, ForecastView, ForecastViews, RecentWindowView,
};
use sales_forecast::{forecast_series, TimeSeriesData};

fn long_series(days: usize) -> TimeSeriesData {
    let values: Vec<f64> = (0..days).map(|i| 100.0 + (i % 7) as f64).collect();
    daily_series("2020-01-01", &values)
}

#[test]
fn test_forecast_view_covers_everything() {
    let series = long_series(20);
    let frame = ForecastAdapter::new(MeanModel { half_width: 1.0 })
        .run(&series, 10)
        .unwrap();

    let view = ForecastView::build(&series, &frame);
    assert_eq!(view.history.len(), 20);
    assert_eq!(view.forecast.len(), 30);
    assert_eq!(view.band.len(), 30);
    assert!(view.band.iter().all(|b| b.upper - b.lower == 2.0));
}

#[test]
fn test_recent_window_zoom() {
    let series = long_series(900);
    let frame = ForecastAdapter::new(MeanModel { half_width: 1.0 })
        .run(&series, 100)
        .unwrap();
    let end = series.last_date().unwrap();

    let view = RecentWindowView::build(&series, &frame);

    assert_eq!(view.forecast_start, Some(end));
    assert_eq!(view.history.len(), 365);
    assert_eq!(view.history[0].date, end - Duration::days(364));
    // 730 days of fitted history plus the whole horizon
    assert_eq!(view.forecast.len(), 730 + 100);
    assert_eq!(view.forecast[0].date, end - Duration::days(729));
    assert_eq!(view.band.len(), view.forecast.len());
}

#[test]
fn test_recent_window_short_history() {
    let series = long_series(10);
    let frame = ForecastAdapter::new(MeanModel { half_width: 1.0 })
        .run(&series, 5)
        .unwrap();

    let view = RecentWindowView::build(&series, &frame);
    assert_eq!(view.history.len(), 10);
    assert_eq!(view.forecast.len(), 15);
}

#[test]
fn test_weekly_profile_ordered_monday_first() {
    let series = long_series(21);
    let frame = ForecastAdapter::new(MeanModel { half_width: 1.0 })
        .run(&series, 0)
        .unwrap();

    let view = ComponentsView::build(&frame);
    let weekly = view.weekly.unwrap();

    assert_eq!(weekly.len(), 7);
    assert_eq!(weekly[0].weekday, Weekday::Mon);
    assert_eq!(weekly[6].weekday, Weekday::Sun);
    for (i, point) in weekly.iter().enumerate() {
        assert_eq!(point.value, i as f64);
    }
    assert!(view.yearly.is_none());
    assert_eq!(view.trend.len(), 21);
}

#[test]
fn test_yearly_profile_from_model() {
    let series = long_series(400);
    let frame = forecast_series(&series, &ModelConfig::default(), 30).unwrap();

    let view = ComponentsView::build(&frame);
    let yearly = view.yearly.unwrap();

    assert_eq!(yearly.len(), 366);
    assert_eq!(yearly[0].day_of_year, 1);
    assert!(yearly.windows(2).all(|w| w[0].day_of_year < w[1].day_of_year));
    assert!(view.daily.is_none());
}

#[test]
fn test_table_rendering() {
    let series = long_series(10);
    let frame = ForecastAdapter::new(MeanModel { half_width: 1.0 })
        .run(&series, 5)
        .unwrap();

    let text = ForecastTable::new(frame.tail(5)).to_string();
    let lines: Vec<&str> = text.lines().collect();

    assert_eq!(lines.len(), 6);
    assert!(lines[0].contains("yhat_lower"));
    assert!(lines[5].starts_with("2020-01-15"));
}

#[test]
fn test_views_serialize() {
    let series = long_series(30);
    let frame = ForecastAdapter::new(MeanModel { half_width: 1.0 })
        .run(&series, 5)
        .unwrap();

    let json = serde_json::to_string(&ForecastViews::build(&series, &frame)).unwrap();
    assert!(json.contains("\"forecast_start\":\"2020-01-30\""));
    assert!(json.contains("\"weekday\":\"Mon\""));
}
