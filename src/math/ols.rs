//! Least-squares solve through the pseudo-inverse.
//!
//! Every linear fit in this crate is posed the same way:
//!
//! ```text
//! X · A = B
//! ```
//!
//! where `A` is `ncoeffs x npoints` (one basis function per row, one sample per
//! column), `B` is `1 x npoints` (the observations) and the unknown `X` is
//! `1 x ncoeffs`. The least-squares solution is
//!
//! ```text
//! X = B · Aᵗ · (A · Aᵗ)⁻¹
//! ```
//!
//! The normal matrix `A · Aᵗ` is tiny (ncoeffs²) so the explicit inverse is
//! cheap; it fails exactly when the basis functions are degenerate on the
//! sample.

use crate::error::FitError;
use crate::math::matrix::Matrix;

/// Solve `X · a = b` in the least-squares sense.
pub fn leastsq(a: &Matrix, b: &Matrix) -> Result<Matrix, FitError> {
    if a.cols() != b.cols() {
        return Err(FitError::DimensionMismatch {
            op: "leastsq",
            left: a.shape(),
            right: b.shape(),
        });
    }

    let at = a.transpose();
    let normal = a.multiply(&at)?;
    let normal_inv = normal.invert()?;
    b.multiply(&at)?.multiply(&normal_inv)
}

/// Mean squared residual `Σ (obs - fit)² / n`; 0 for empty input.
pub fn mean_squared_error(observed: &[f64], fitted: impl Iterator<Item = f64>) -> f64 {
    if observed.is_empty() {
        return 0.0;
    }
    let sse: f64 = observed
        .iter()
        .zip(fitted)
        .map(|(&o, f)| {
            let r = o - f;
            r * r
        })
        .sum();
    sse / observed.len() as f64
}
