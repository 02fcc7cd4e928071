//! Daily sales series handling

use crate::error::{ForecastError, Result};
use chrono::{Duration, NaiveDate, NaiveDateTime};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::path::Path;

/// Name of the date column in sales CSV files
pub const DATE_COLUMN: &str = "Date";

/// Name of the value column in sales CSV files
pub const SALES_COLUMN: &str = "Sales";

/// One day of sales as produced by the generator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SalesRecord {
    #[serde(rename = "Date")]
    pub date: NaiveDate,
    #[serde(rename = "Sales")]
    pub sales: u64,
}

/// A `(date, value)` table
#[derive(Debug, Clone, PartialEq)]
pub struct TimeSeriesData {
    dates: Vec<NaiveDate>,
    values: Vec<f64>,
}

/// Loader for sales series
#[derive(Debug)]
pub struct DataLoader;

impl DataLoader {
    /// Load a series from a CSV file with `Date` and `Sales` columns
    ///
    /// Rows are sorted by date; ordering, gaps and duplicates are checked
    /// later, when the series is handed to the adapter.
    pub fn from_csv<P: AsRef<Path>>(path: P) -> Result<TimeSeriesData> {
        let file = File::open(path)?;
        let df = CsvReader::new(file)
            .infer_schema(None)
            .has_header(true)
            .finish()?;

        Self::from_dataframe(&df)
    }

    /// Extract the `Date` and `Sales` columns of a DataFrame
    pub fn from_dataframe(df: &DataFrame) -> Result<TimeSeriesData> {
        let names = df.get_column_names();
        for required in [DATE_COLUMN, SALES_COLUMN] {
            if !names.contains(&required) {
                return Err(ForecastError::DataError(format!(
                    "Missing required column '{}' (found: {})",
                    required,
                    names.join(", ")
                )));
            }
        }

        let dates = Self::parse_dates(df.column(DATE_COLUMN)?)?;
        let values = Self::parse_values(df.column(SALES_COLUMN)?)?;

        let mut rows: Vec<(NaiveDate, f64)> = dates.into_iter().zip(values).collect();
        rows.sort_by_key(|(date, _)| *date);
        let (dates, values) = rows.into_iter().unzip();

        TimeSeriesData::new(dates, values)
    }

    fn parse_dates(col: &Series) -> Result<Vec<NaiveDate>> {
        match col.dtype() {
            DataType::Utf8 => col
                .utf8()?
                .into_iter()
                .enumerate()
                .map(|(row, cell)| {
                    let text = cell.ok_or_else(|| {
                        ForecastError::DataError(format!("Missing date in row {}", row + 1))
                    })?;
                    parse_date(text)
                })
                .collect(),
            DataType::Date => {
                let epoch = unix_epoch();
                col.cast(&DataType::Int32)?
                    .i32()?
                    .into_iter()
                    .enumerate()
                    .map(|(row, cell)| {
                        cell.map(|days| epoch + Duration::days(days as i64))
                            .ok_or_else(|| {
                                ForecastError::DataError(format!("Missing date in row {}", row + 1))
                            })
                    })
                    .collect()
            }
            other => Err(ForecastError::DataError(format!(
                "Column '{}' has type {} which cannot be read as dates",
                DATE_COLUMN, other
            ))),
        }
    }

    fn parse_values(col: &Series) -> Result<Vec<f64>> {
        if !col.dtype().is_numeric() {
            return Err(ForecastError::DataError(format!(
                "Column '{}' has type {} which is not numeric",
                SALES_COLUMN,
                col.dtype()
            )));
        }

        col.cast(&DataType::Float64)?
            .f64()?
            .into_iter()
            .enumerate()
            .map(|(row, cell)| {
                cell.ok_or_else(|| {
                    ForecastError::DataError(format!("Missing sales value in row {}", row + 1))
                })
            })
            .collect()
    }
}

/// Parse an ISO date, accepting a trailing time of day
pub fn parse_date(text: &str) -> Result<NaiveDate> {
    let text = text.trim();
    if let Ok(date) = NaiveDate::parse_from_str(text, "%Y-%m-%d") {
        return Ok(date);
    }
    for format in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"] {
        if let Ok(datetime) = NaiveDateTime::parse_from_str(text, format) {
            return Ok(datetime.date());
        }
    }
    Err(ForecastError::DataError(format!(
        "Cannot parse '{}' as a date",
        text
    )))
}

fn unix_epoch() -> NaiveDate {
    NaiveDate::from_ymd_opt(1970, 1, 1).expect("valid epoch")
}

impl TimeSeriesData {
    /// Create a series from parallel date and value vectors
    pub fn new(dates: Vec<NaiveDate>, values: Vec<f64>) -> Result<Self> {
        if dates.len() != values.len() {
            return Err(ForecastError::DataError(format!(
                "Got {} dates but {} values",
                dates.len(),
                values.len()
            )));
        }

        Ok(Self { dates, values })
    }

    /// Create a series from generated records
    pub fn from_records(records: &[SalesRecord]) -> Self {
        Self {
            dates: records.iter().map(|r| r.date).collect(),
            values: records.iter().map(|r| r.sales as f64).collect(),
        }
    }

    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.dates.last().copied()
    }

    pub fn last_value(&self) -> Option<f64> {
        self.values.last().copied()
    }

    /// Check if the series is empty
    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    /// Get the length of the series
    pub fn len(&self) -> usize {
        self.dates.len()
    }

    /// Iterate `(date, value)` pairs
    pub fn iter(&self) -> impl Iterator<Item = (NaiveDate, f64)> + '_ {
        self.dates.iter().copied().zip(self.values.iter().copied())
    }

    /// Mean of the values
    pub fn mean(&self) -> Result<f64> {
        if self.values.is_empty() {
            return Err(ForecastError::DataError(
                "No sales values available".to_string(),
            ));
        }

        Ok(self.values.iter().sum::<f64>() / self.values.len() as f64)
    }

    /// Rows strictly after `cutoff`
    pub fn after(&self, cutoff: NaiveDate) -> Self {
        let start = self.dates.partition_point(|d| *d <= cutoff);
        Self {
            dates: self.dates[start..].to_vec(),
            values: self.values[start..].to_vec(),
        }
    }

    /// Convert to a polars DataFrame with `Date` and `Sales` columns
    pub fn to_dataframe(&self) -> Result<DataFrame> {
        let dates: Vec<String> = self.dates.iter().map(|d| d.to_string()).collect();
        let df = DataFrame::new(vec![
            Series::new(DATE_COLUMN, dates),
            Series::new(SALES_COLUMN, self.values.clone()),
        ])?;
        Ok(df)
    }
}

/// Write records as a `Date,Sales` CSV file
pub fn write_csv<P: AsRef<Path>>(records: &[SalesRecord], path: P) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)?;
    for record in records {
        writer.serialize(record)?;
    }
    writer.flush()?;
    Ok(())
}
