//! Dense design matrices and penalised least squares
//!
//! Contains:
//! - `DesignMatrix`, a feature matrix backed by `faer::Mat` with column stacking
//! - Ridge least squares solved through faer's Cholesky (LLᵀ) factorisation

use crate::{MathError, Result};
use faer::linalg::solvers::Solve;
use faer::{Col, Mat, MatRef, Side};

/// Diagonal jitter added to every normal-equation pivot
const JITTER: f64 = 1e-10;

/// Dense matrix of regression features, one column per term
#[derive(Debug, Clone, PartialEq)]
pub struct DesignMatrix {
    inner: Mat<f64>,
}

impl DesignMatrix {
    /// Create a zero-filled matrix
    pub fn zeros(rows: usize, cols: usize) -> Self {
        Self {
            inner: Mat::zeros(rows, cols),
        }
    }

    /// Build a matrix from equally long columns
    pub fn from_columns(columns: &[Vec<f64>]) -> Result<Self> {
        let rows = columns.first().map_or(0, Vec::len);
        if let Some(bad) = columns.iter().position(|c| c.len() != rows) {
            return Err(MathError::InvalidInput(format!(
                "Column {} has {} rows, expected {}",
                bad,
                columns[bad].len(),
                rows
            )));
        }

        Ok(Self {
            inner: Mat::from_fn(rows, columns.len(), |i, j| columns[j][i]),
        })
    }

    /// Concatenate matrices side by side
    pub fn hstack(blocks: &[&DesignMatrix]) -> Result<Self> {
        let rows = blocks.first().map_or(0, |b| b.rows());
        if blocks.iter().any(|b| b.rows() != rows) {
            return Err(MathError::InvalidInput(
                "Cannot stack matrices with different row counts".to_string(),
            ));
        }

        // (block, column within block) for every output column
        let sources: Vec<(usize, usize)> = blocks
            .iter()
            .enumerate()
            .flat_map(|(b, block)| (0..block.cols()).map(move |j| (b, j)))
            .collect();

        Ok(Self {
            inner: Mat::from_fn(rows, sources.len(), |i, j| {
                let (b, col) = sources[j];
                blocks[b].inner[(i, col)]
            }),
        })
    }

    pub fn rows(&self) -> usize {
        self.inner.nrows()
    }

    pub fn cols(&self) -> usize {
        self.inner.ncols()
    }

    pub fn get(&self, row: usize, col: usize) -> f64 {
        self.inner[(row, col)]
    }

    pub fn set(&mut self, row: usize, col: usize, value: f64) {
        self.inner[(row, col)] = value;
    }

    pub fn as_mat(&self) -> MatRef<'_, f64> {
        self.inner.as_ref()
    }

    /// Multiply every row by its weight
    pub fn scale_rows(&self, weights: &[f64]) -> Result<Self> {
        if weights.len() != self.rows() {
            return Err(MathError::InvalidInput(format!(
                "Expected {} row weights, got {}",
                self.rows(),
                weights.len()
            )));
        }

        Ok(Self {
            inner: Mat::from_fn(self.rows(), self.cols(), |i, j| {
                self.inner[(i, j)] * weights[i]
            }),
        })
    }

    /// Matrix-vector product
    pub fn mul_vec(&self, coefficients: &[f64]) -> Result<Vec<f64>> {
        if coefficients.len() != self.cols() {
            return Err(MathError::InvalidInput(format!(
                "Expected {} coefficients, got {}",
                self.cols(),
                coefficients.len()
            )));
        }
        if self.cols() == 0 {
            return Ok(vec![0.0; self.rows()]);
        }

        let b = Col::from_fn(coefficients.len(), |j| coefficients[j]);
        let product: Col<f64> = self.inner.as_ref() * b.as_ref();
        Ok((0..product.nrows()).map(|i| product[i]).collect())
    }
}

/// Solve `min ||y - X b||^2 + sum_j penalties[j] * b_j^2`
///
/// `penalties` holds one non-negative weight per column; zero leaves the
/// coefficient unpenalised.
pub fn ridge_least_squares(x: &DesignMatrix, y: &[f64], penalties: &[f64]) -> Result<Vec<f64>> {
    let (n, p) = (x.rows(), x.cols());
    if n == 0 || p == 0 {
        return Err(MathError::InsufficientData(
            "Least squares needs at least one row and one column".to_string(),
        ));
    }
    if y.len() != n {
        return Err(MathError::InvalidInput(format!(
            "Response has {} rows, design matrix has {}",
            y.len(),
            n
        )));
    }
    if penalties.len() != p {
        return Err(MathError::InvalidInput(format!(
            "Expected {} penalties, got {}",
            p,
            penalties.len()
        )));
    }
    if penalties.iter().any(|l| !l.is_finite() || *l < 0.0) {
        return Err(MathError::InvalidInput(
            "Penalties must be finite and non-negative".to_string(),
        ));
    }

    // Normal equations: (X'X + diag(penalties)) b = X'y
    let xm = x.as_mat();
    let y_col = Col::from_fn(n, |i| y[i]);
    let mut gram: Mat<f64> = xm.transpose() * xm;
    for (j, penalty) in penalties.iter().enumerate() {
        gram[(j, j)] += penalty + JITTER;
    }
    let rhs: Col<f64> = xm.transpose() * y_col.as_ref();

    let llt = gram.llt(Side::Lower).map_err(|e| {
        MathError::CalculationError(format!(
            "Normal equations are not positive definite: {:?}",
            e
        ))
    })?;
    let beta = llt.solve(&rhs);

    let beta: Vec<f64> = (0..p).map(|j| beta[j]).collect();
    if beta.iter().any(|b| !b.is_finite()) {
        return Err(MathError::CalculationError(
            "Least squares produced non-finite coefficients".to_string(),
        ));
    }
    Ok(beta)
}
