//! Synthetic retail sales generator
//!
//! Each day's value is
//!
//! ```text
//! i * slope
//!   + amplitude * sin(day_of_year / 365.25 * 2π)
//!   + (weekend_bonus on Saturday and Sunday)
//!   + offset
//!   + Normal(0, noise_std)
//! ```
//!
//! clipped at zero and truncated to an integer. `i` counts days from the
//! start date and `day_of_year` is 1-based. Noise is drawn once per day, in
//! date order, from a generator seeded with `seed`, so a seed and range
//! always produce the same series.

use crate::config::GeneratorConfig;
use crate::data::{SalesRecord, TimeSeriesData};
use crate::error::{ForecastError, Result};
use chrono::{Datelike, Duration, NaiveDate, Weekday};
use num_traits::ToPrimitive;
use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::{Distribution, Normal};
use std::f64::consts::PI;
use tracing::info;

/// Generator of synthetic daily sales
#[derive(Debug, Clone)]
pub struct SyntheticSalesGenerator {
    config: GeneratorConfig,
}

impl SyntheticSalesGenerator {
    pub fn new(config: GeneratorConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// Noise-free part of the value for day `index` falling on `date`
    pub fn expected_value(&self, index: usize, date: NaiveDate) -> f64 {
        let c = &self.config;
        let trend = index as f64 * c.slope;
        let yearly = c.yearly_amplitude * (date.ordinal() as f64 / 365.25 * 2.0 * PI).sin();
        let weekend = match date.weekday() {
            Weekday::Sat | Weekday::Sun => c.weekend_bonus,
            _ => 0.0,
        };
        trend + yearly + weekend + c.offset
    }

    /// One record per calendar day from start to end inclusive
    pub fn generate(&self) -> Result<Vec<SalesRecord>> {
        let days = self.config.days()?;
        let noise = Normal::new(0.0, self.config.noise_std)
            .map_err(|e| ForecastError::InvalidParameter(e.to_string()))?;
        let mut rng = StdRng::seed_from_u64(self.config.seed);

        let records = (0..days)
            .map(|i| {
                let date = self.config.start + Duration::days(i as i64);
                let value = self.expected_value(i, date) + noise.sample(&mut rng);
                let sales = value.max(0.0).trunc().to_u64().ok_or_else(|| {
                    ForecastError::DataError(format!(
                        "Generated value {} on {} does not fit an integer",
                        value, date
                    ))
                })?;
                Ok(SalesRecord { date, sales })
            })
            .collect::<Result<Vec<_>>>()?;

        info!(
            start = %self.config.start,
            end = %self.config.end,
            days = records.len(),
            "generated synthetic sales"
        );
        Ok(records)
    }

    /// Generate and convert to a `(date, value)` series
    pub fn generate_series(&self) -> Result<TimeSeriesData> {
        Ok(TimeSeriesData::from_records(&self.generate()?))
    }
}
