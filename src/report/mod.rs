//! Reporting utilities: residuals, outlier rankings, and formatted terminal output.

use crate::error::AppError;

pub mod format;

pub use format::*;

/// Residual of one sample against a fitted model.
#[derive(Debug, Clone, PartialEq)]
pub struct Residual {
    /// Row index in the input point set.
    pub index: usize,
    pub observed: f64,
    pub fitted: f64,
    pub residual: f64,
}

/// Aggregate residual statistics for a fit.
#[derive(Debug, Clone, PartialEq)]
pub struct ResidualSummary {
    pub n: usize,
    pub rms: f64,
    pub mean_abs: f64,
    pub max_abs: f64,
}

/// Compute `observed - fitted` for each sample.
pub fn compute_residuals(observed: &[f64], fitted: &[f64]) -> Result<Vec<Residual>, AppError> {
    if observed.len() != fitted.len() {
        return Err(AppError::new(
            4,
            format!(
                "Residual length mismatch: {} observed vs {} fitted.",
                observed.len(),
                fitted.len()
            ),
        ));
    }

    let mut out = Vec::with_capacity(observed.len());
    for (index, (&o, &f)) in observed.iter().zip(fitted).enumerate() {
        if !f.is_finite() {
            return Err(AppError::new(4, "Non-finite model prediction during residual computation."));
        }
        out.push(Residual {
            index,
            observed: o,
            fitted: f,
            residual: o - f,
        });
    }
    Ok(out)
}

pub fn summarize(residuals: &[Residual]) -> ResidualSummary {
    let n = residuals.len();
    if n == 0 {
        return ResidualSummary {
            n,
            rms: 0.0,
            mean_abs: 0.0,
            max_abs: 0.0,
        };
    }
    let sum_sq: f64 = residuals.iter().map(|r| r.residual * r.residual).sum();
    let mean_abs = crate::math::mean_abs(residuals.iter().map(|r| r.residual));
    let max_abs = residuals.iter().map(|r| r.residual.abs()).fold(0.0, f64::max);
    ResidualSummary {
        n,
        rms: (sum_sq / n as f64).sqrt(),
        mean_abs,
        max_abs,
    }
}

/// The `top_n` samples with the largest absolute residual, largest first.
pub fn largest_residuals(residuals: &[Residual], top_n: usize) -> Vec<Residual> {
    let mut sorted = residuals.to_vec();
    sorted.sort_by(|a, b| {
        b.residual
            .abs()
            .partial_cmp(&a.residual.abs())
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    sorted.truncate(top_n);
    sorted
}
