//! Least-squares polynomial fits.

use crate::error::{SolverError, SolverResult};
use nalgebra::{DMatrix, DVector};

/// Polynomial in a centred and scaled abscissa, `p(x) = Σ c_k t^k` with
/// `t = (x - shift) / scale`.
#[derive(Debug, Clone, PartialEq)]
pub struct Polynomial {
    coeffs: Vec<f64>,
    shift: f64,
    scale: f64,
}

impl Polynomial {
    /// Least-squares fit of the given degree through `(x, y)`.
    pub fn fit(x: &[f64], y: &[f64], degree: usize) -> SolverResult<Self> {
        if x.len() != y.len() {
            return Err(SolverError::InvalidArg {
                what: "x and y lengths differ",
            });
        }
        if x.len() < degree + 1 {
            return Err(SolverError::InvalidArg {
                what: "not enough points for polynomial degree",
            });
        }
        if x.iter().chain(y).any(|v| !v.is_finite()) {
            return Err(SolverError::Numeric {
                what: "non-finite value in fit data".to_string(),
            });
        }

        let n = x.len();
        let shift = x.iter().sum::<f64>() / n as f64;
        let spread = x.iter().map(|v| (v - shift).abs()).fold(0.0, f64::max);
        let scale = if spread > 0.0 { spread } else { 1.0 };

        let a = DMatrix::from_fn(n, degree + 1, |i, j| ((x[i] - shift) / scale).powi(j as i32));
        let b = DVector::from_column_slice(y);
        let c = a
            .svd(true, true)
            .solve(&b, 1e-14)
            .map_err(|e| SolverError::Numeric {
                what: format!("least-squares solve failed: {e}"),
            })?;

        Ok(Self {
            coeffs: c.iter().copied().collect(),
            shift,
            scale,
        })
    }

    pub fn degree(&self) -> usize {
        self.coeffs.len().saturating_sub(1)
    }

    pub fn eval(&self, x: f64) -> f64 {
        let t = (x - self.shift) / self.scale;
        self.coeffs.iter().rev().fold(0.0, |acc, c| acc * t + c)
    }
}
