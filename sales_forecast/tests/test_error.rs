use pretty_assertions::assert_eq;
use sales_forecast::ForecastError;

#[test]
fn test_error_messages() {
    let cases = [
        (ForecastError::DataError("x".into()), "Data error: x"),
        (ForecastError::ValidationError("x".into()), "Validation error: x"),
        (ForecastError::InsufficientData("x".into()), "Insufficient data: x"),
        (ForecastError::ForecastingError("x".into()), "Forecasting error: x"),
        (ForecastError::InvalidParameter("x".into()), "Invalid parameter: x"),
        (ForecastError::PolarsError("x".into()), "Polars error: x"),
    ];
    for (error, expected) in cases {
        assert_eq!(error.to_string(), expected);
    }
}

#[test]
fn test_error_conversions() {
    let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
    assert!(matches!(ForecastError::from(io), ForecastError::IoError(_)));

    let math = forecast_math::MathError::InsufficientData("short".into());
    let converted = ForecastError::from(math);
    assert!(matches!(converted, ForecastError::MathError(_)));
    assert!(converted.to_string().starts_with("Math error:"));

    let json = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
    assert!(matches!(ForecastError::from(json), ForecastError::JsonError(_)));
}
