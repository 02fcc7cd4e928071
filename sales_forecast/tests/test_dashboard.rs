mod common;

use common::date;
use pretty_assertions::assert_eq;
use rstest::rstest;
use sales_forecast::config::{GeneratorConfig, SeasonalityMode};
use sales_forecast::dashboard::{
    ChartSeries, Command, Dashboard, DashboardSettings, TABLE_ROWS,
};
use sales_forecast::generator::SyntheticSalesGenerator;
use sales_forecast::ForecastError;
use std::io::Cursor;

fn sample_dashboard() -> Dashboard {
    let config = GeneratorConfig::new(date("2021-01-01"), date("2022-02-04"), 7);
    let series = SyntheticSalesGenerator::new(config)
        .unwrap()
        .generate_series()
        .unwrap();
    Dashboard::new(series)
}

fn settings(horizon_days: usize, scale: f64) -> DashboardSettings {
    DashboardSettings {
        horizon_days,
        seasonality_mode: SeasonalityMode::Additive,
        changepoint_prior_scale: scale,
    }
}

#[test]
fn test_default_settings() {
    let defaults = DashboardSettings::default();
    assert_eq!(defaults.horizon_days, 365);
    assert_eq!(defaults.seasonality_mode, SeasonalityMode::Additive);
    assert_eq!(defaults.changepoint_prior_scale, 0.05);
    assert!(defaults.validate().is_ok());
}

#[rstest]
#[case(30, 0.001, true)]
#[case(1825, 0.5, true)]
#[case(29, 0.05, false)]
#[case(1826, 0.05, false)]
#[case(365, 0.0005, false)]
#[case(365, 0.6, false)]
#[case(365, f64::NAN, false)]
fn test_settings_bounds(#[case] horizon: usize, #[case] scale: f64, #[case] valid: bool) {
    let result = settings(horizon, scale).validate();
    assert_eq!(result.is_ok(), valid);
    if let Err(e) = result {
        assert!(matches!(e, ForecastError::InvalidParameter(_)));
    }
}

#[test]
fn test_apply_builds_snapshot() {
    let mut dashboard = sample_dashboard();
    let n = dashboard.series().len();

    let snapshot = dashboard.apply(settings(30, 0.05)).unwrap();

    assert_eq!(snapshot.table.len(), TABLE_ROWS);
    assert_eq!(snapshot.chart.len(), n + n + 30);
    let observed = snapshot
        .chart
        .iter()
        .filter(|p| p.series == ChartSeries::Y)
        .count();
    assert_eq!(observed, n);

    let last = dashboard.series().last_date().unwrap();
    assert_eq!(snapshot.table.last().unwrap().ds, last + chrono::Duration::days(30));

    let series = dashboard.series();
    assert_eq!(
        snapshot.kpis.last_recorded_sales,
        series.last_value().unwrap() as i64
    );
    assert_eq!(
        snapshot.kpis.average_daily_sales,
        series.mean().unwrap().trunc() as i64
    );
    assert_eq!(snapshot.kpis.horizon_days, 30);
    assert!(snapshot.components.weekly.is_some());
    assert_eq!(dashboard.settings().horizon_days, 30);
}

#[test]
fn test_invalid_settings_keep_previous() {
    let mut dashboard = sample_dashboard();
    dashboard.apply(settings(60, 0.1)).unwrap();

    let result = dashboard.apply(settings(10, 0.1));

    assert!(matches!(result, Err(ForecastError::InvalidParameter(_))));
    assert_eq!(*dashboard.settings(), settings(60, 0.1));
}

#[rstest]
#[case("horizon 90", Command::Horizon(90))]
#[case("mode mul", Command::Mode(SeasonalityMode::Multiplicative))]
#[case("MODE additive", Command::Mode(SeasonalityMode::Additive))]
#[case("changepoint 0.2", Command::Changepoint(0.2))]
#[case("  show ", Command::Show)]
#[case("?", Command::Help)]
#[case("q", Command::Quit)]
fn test_command_parsing(#[case] line: &str, #[case] expected: Command) {
    assert_eq!(line.parse::<Command>().unwrap(), expected);
}

#[rstest]
#[case("horizon")]
#[case("horizon ten")]
#[case("mode sideways")]
#[case("changepoint 0.1 0.2")]
#[case("plot")]
fn test_bad_commands(#[case] line: &str) {
    assert!(matches!(
        line.parse::<Command>(),
        Err(ForecastError::InvalidParameter(_))
    ));
}

#[test]
fn test_run_loop() {
    let mut dashboard = sample_dashboard();
    let input = Cursor::new("horizon 45\nmode multiplicative\n\nbad\nhorizon 5\nquit\nhorizon 90\n");
    let mut out = Vec::new();

    dashboard.run(input, &mut out).unwrap();

    let text = String::from_utf8(out).unwrap();
    assert!(text.contains("Settings: horizon=365 mode=additive"));
    assert!(text.contains("Settings: horizon=45 mode=additive"));
    assert!(text.contains("Settings: horizon=45 mode=multiplicative"));
    assert!(text.contains("error: Invalid parameter: Unknown command 'bad'"));
    assert!(text.contains("error: Invalid parameter: Forecast days must be between 30 and 1825"));
    assert!(!text.contains("horizon=90"));

    assert_eq!(dashboard.settings().horizon_days, 45);
    assert_eq!(
        dashboard.settings().seasonality_mode,
        SeasonalityMode::Multiplicative
    );
}

#[test]
fn test_help_lists_commands() {
    let mut dashboard = sample_dashboard();
    let mut out = Vec::new();

    let keep_going = dashboard.handle(Command::Help, &mut out).unwrap();

    assert!(keep_going);
    assert!(String::from_utf8(out).unwrap().contains("changepoint <scale>"));
}
