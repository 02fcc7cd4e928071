//! Fourier seasonality features

use crate::linalg::DesignMatrix;
use crate::{MathError, Result};
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// A periodic component expressed as a truncated Fourier series
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Seasonality {
    /// Component name (e.g. "yearly")
    pub name: String,
    /// Period in days
    pub period: f64,
    /// Number of sine/cosine pairs
    pub order: usize,
}

impl Seasonality {
    pub fn new(name: &str, period: f64, order: usize) -> Result<Self> {
        if !(period.is_finite() && period > 0.0) {
            return Err(MathError::InvalidInput(format!(
                "Seasonality period must be positive, got {}",
                period
            )));
        }
        if order == 0 {
            return Err(MathError::InvalidInput(
                "Fourier order must be greater than zero".to_string(),
            ));
        }

        Ok(Self {
            name: name.to_string(),
            period,
            order,
        })
    }

    pub fn yearly() -> Self {
        Self {
            name: "yearly".to_string(),
            period: 365.25,
            order: 10,
        }
    }

    pub fn weekly() -> Self {
        Self {
            name: "weekly".to_string(),
            period: 7.0,
            order: 3,
        }
    }

    pub fn daily() -> Self {
        Self {
            name: "daily".to_string(),
            period: 1.0,
            order: 4,
        }
    }

    /// Number of design matrix columns this component occupies
    pub fn width(&self) -> usize {
        2 * self.order
    }

    pub fn features(&self, days: &[f64]) -> Result<DesignMatrix> {
        fourier_features(days, self.period, self.order)
    }
}

/// Build `[sin(2πkt/P), cos(2πkt/P)]` columns for `k = 1..=order`
///
/// `days` is absolute time in days, so features line up across fits.
pub fn fourier_features(days: &[f64], period: f64, order: usize) -> Result<DesignMatrix> {
    if !(period.is_finite() && period > 0.0) {
        return Err(MathError::InvalidInput(format!(
            "Seasonality period must be positive, got {}",
            period
        )));
    }

    let mut features = DesignMatrix::zeros(days.len(), 2 * order);
    for (i, &t) in days.iter().enumerate() {
        for k in 0..order {
            let angle = 2.0 * PI * (k + 1) as f64 * t / period;
            features.set(i, 2 * k, angle.sin());
            features.set(i, 2 * k + 1, angle.cos());
        }
    }
    Ok(features)
}
