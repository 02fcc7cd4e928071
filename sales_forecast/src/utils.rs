//! Date index helpers for daily series

use crate::error::{ForecastError, Result};
use chrono::{Duration, NaiveDate};

/// The `horizon` days following `last`
///
/// Fails when the horizon runs past the last representable date.
pub fn future_dates(last: NaiveDate, horizon: usize) -> Result<Vec<NaiveDate>> {
    let days = i64::try_from(horizon).ok().and_then(Duration::try_days);
    let end = days.and_then(|d| last.checked_add_signed(d));
    if end.is_none() {
        return Err(ForecastError::ValidationError(format!(
            "Horizon of {} days past {} is out of the supported date range",
            horizon, last
        )));
    }

    Ok(last.iter_days().skip(1).take(horizon).collect())
}

/// History dates followed by `horizon` future days
pub fn extend_daily_index(history: &[NaiveDate], horizon: usize) -> Result<Vec<NaiveDate>> {
    let last = history.last().copied().ok_or_else(|| {
        ForecastError::DataError("Cannot extend an empty date index".to_string())
    })?;
    let future = future_dates(last, horizon)?;

    let mut dates = Vec::with_capacity(history.len() + future.len());
    dates.extend_from_slice(history);
    dates.extend(future);
    Ok(dates)
}

/// Check that `dates` is a gap-free, strictly increasing daily index
///
/// Duplicates, reversals and gaps are reported with the offending dates so
/// the caller can fix the input rather than have it silently repaired.
pub fn validate_daily_index(dates: &[NaiveDate]) -> Result<()> {
    for (i, pair) in dates.windows(2).enumerate() {
        let (prev, next) = (pair[0], pair[1]);
        let step = (next - prev).num_days();
        if step == 0 {
            return Err(ForecastError::ValidationError(format!(
                "Duplicate date {} at rows {} and {}",
                next,
                i + 1,
                i + 2
            )));
        }
        if step < 0 {
            return Err(ForecastError::ValidationError(format!(
                "Dates are not increasing: {} follows {} at row {}",
                next,
                prev,
                i + 2
            )));
        }
        if step > 1 {
            return Err(ForecastError::ValidationError(format!(
                "Gap of {} days between {} and {}",
                step - 1,
                prev,
                next
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    #[test]
    fn test_future_dates_continue_daily() {
        let dates = future_dates(d("2020-12-30"), 3).unwrap();
        assert_eq!(dates, vec![d("2020-12-31"), d("2021-01-01"), d("2021-01-02")]);
        assert!(future_dates(d("2020-12-30"), 0).unwrap().is_empty());
    }

    #[test]
    fn test_future_dates_out_of_range() {
        let last = NaiveDate::MAX - Duration::days(2);
        assert_eq!(future_dates(last, 2).unwrap().last(), Some(&NaiveDate::MAX));
        assert!(matches!(
            future_dates(last, 3),
            Err(ForecastError::ValidationError(_))
        ));
        assert!(future_dates(d("2020-01-01"), usize::MAX).is_err());
        assert!(extend_daily_index(&[d("2020-01-01")], usize::MAX).is_err());
    }

    #[test]
    fn test_validate_daily_index() {
        assert!(validate_daily_index(&[d("2020-01-01"), d("2020-01-02")]).is_ok());
        assert!(validate_daily_index(&[]).is_ok());

        let dup = validate_daily_index(&[d("2020-01-01"), d("2020-01-01")]);
        assert!(matches!(dup, Err(ForecastError::ValidationError(m)) if m.contains("Duplicate")));

        let gap = validate_daily_index(&[d("2020-01-01"), d("2020-01-04")]);
        assert!(matches!(gap, Err(ForecastError::ValidationError(m)) if m.contains("Gap of 2")));

        let back = validate_daily_index(&[d("2020-01-02"), d("2020-01-01")]);
        assert!(back.is_err());
    }

    #[test]
    fn test_extend_empty_index_fails() {
        assert!(extend_daily_index(&[], 5).is_err());
    }
}
