mod common;

use chrono::Duration;
use common::date;
use pretty_assertions::assert_eq;
use sales_forecast::config::GeneratorConfig;
use sales_forecast::data::{write_csv, DataLoader};
use sales_forecast::generator::SyntheticSalesGenerator;
use sales_forecast::run_forecast;
use sales_forecast::views::{ForecastTable, ForecastViews};

#[test]
fn test_generate_save_load_forecast() {
    let config = GeneratorConfig::new(date("2020-01-01"), date("2021-06-30"), 42);
    let records = SyntheticSalesGenerator::new(config.clone())
        .unwrap()
        .generate()
        .unwrap();

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("sales.csv");
    write_csv(&records, &path).unwrap();

    let series = DataLoader::from_csv(&path).unwrap();
    assert_eq!(series.len(), records.len());
    assert_eq!(series.last_date(), Some(config.end));

    let frame = run_forecast(&path, 60).unwrap();

    assert_eq!(frame.len(), records.len() + 60);
    assert_eq!(frame.rows().last().unwrap().ds, config.end + Duration::days(60));
    assert!(frame
        .rows()
        .iter()
        .all(|r| r.yhat_lower <= r.yhat && r.yhat <= r.yhat_upper));

    // Multiplicative batch model keeps the level of the synthetic data
    let tail_mean = frame.tail(60).iter().map(|r| r.yhat).sum::<f64>() / 60.0;
    assert!(tail_mean > 10_000.0 && tail_mean < 16_000.0, "tail mean {}", tail_mean);

    let table = ForecastTable::new(frame.tail(5)).to_string();
    assert_eq!(table.lines().count(), 6);

    let views = ForecastViews::build(&series, &frame);
    assert_eq!(views.recent.forecast_start, Some(config.end));
    assert!(views.components.yearly.is_some());
    assert!(views.components.weekly.is_some());
}

#[test]
fn test_run_forecast_missing_file() {
    assert!(run_forecast("/nonexistent/sales.csv", 30).is_err());
}
