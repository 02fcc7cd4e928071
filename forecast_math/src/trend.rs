//! Piecewise-linear trend with changepoints
//!
//! The trend is `k*t + m + sum_j delta_j * max(0, t - s_j)` on a time axis
//! scaled to `[0, 1]` over the history. Each `delta_j` is the slope change
//! at changepoint `s_j`.

use crate::linalg::DesignMatrix;
use crate::{MathError, Result};

/// Place up to `n_changepoints` evenly over the first `range` share of `t`
///
/// `t` must be sorted ascending. Fewer changepoints are returned when the
/// history is short: a history window of `h` points holds at most `h - 1`.
pub fn select_changepoints(t: &[f64], n_changepoints: usize, range: f64) -> Vec<f64> {
    let window = (t.len() as f64 * range.clamp(0.0, 1.0)).floor() as usize;
    if window < 2 || n_changepoints == 0 {
        return Vec::new();
    }

    let n = n_changepoints.min(window - 1);
    let last = (window - 1) as f64;
    (1..=n)
        .map(|i| {
            let idx = (last * i as f64 / n as f64).round() as usize;
            t[idx]
        })
        .collect()
}

/// Hinge columns `max(0, t - s_j)` for every changepoint
pub fn changepoint_matrix(t: &[f64], changepoints: &[f64]) -> DesignMatrix {
    let mut a = DesignMatrix::zeros(t.len(), changepoints.len());
    for (i, &ti) in t.iter().enumerate() {
        for (j, &s) in changepoints.iter().enumerate() {
            if ti > s {
                a.set(i, j, ti - s);
            }
        }
    }
    a
}

/// Evaluate the trend at `t`
pub fn piecewise_linear(
    k: f64,
    m: f64,
    deltas: &[f64],
    changepoints: &[f64],
    t: &[f64],
) -> Result<Vec<f64>> {
    if deltas.len() != changepoints.len() {
        return Err(MathError::InvalidInput(format!(
            "Got {} slope changes for {} changepoints",
            deltas.len(),
            changepoints.len()
        )));
    }

    let hinges = changepoint_matrix(t, changepoints);
    let shifts = if deltas.is_empty() {
        vec![0.0; t.len()]
    } else {
        hinges.mul_vec(deltas)?
    };

    Ok(t.iter()
        .zip(shifts)
        .map(|(&ti, shift)| k * ti + m + shift)
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_changepoints_cover_first_eighty_percent() {
        let t: Vec<f64> = (0..100).map(|i| i as f64 / 99.0).collect();
        let cps = select_changepoints(&t, 25, 0.8);

        assert_eq!(cps.len(), 25);
        assert!(cps.windows(2).all(|w| w[0] < w[1]));
        assert!(*cps.last().unwrap() <= t[79]);
        assert!(cps[0] > 0.0);
    }

    #[test]
    fn test_short_history_limits_changepoints() {
        let t = vec![0.0, 0.5, 1.0];
        assert_eq!(select_changepoints(&t, 25, 0.8), vec![0.5]);
        assert!(select_changepoints(&[0.0, 1.0], 25, 0.8).is_empty());
    }

    #[test]
    fn test_piecewise_linear_bends_at_changepoint() {
        let t = vec![0.0, 0.25, 0.5, 0.75, 1.0];
        let trend = piecewise_linear(1.0, 0.0, &[-1.0], &[0.5], &t).unwrap();

        assert_eq!(trend, vec![0.0, 0.25, 0.5, 0.5, 0.5]);
        assert!(piecewise_linear(1.0, 0.0, &[1.0, 2.0], &[0.5], &t).is_err());
    }
}
