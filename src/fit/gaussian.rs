//! Three-parameter Gaussian fit driven by the simplex minimizer.
//!
//! The starting simplex is derived from the brightest sample `(px, py)`:
//!
//! ```text
//! (py,       px,       1)
//! (1.1 py,   1.1 px,  10)
//! (1.2 py,   1.2 px,  20)
//! (1.3 py,   1.3 px,  30)
//! ```
//!
//! Keeping this seeding fixed makes results comparable on ambiguous or
//! multi-peaked profiles, where a different start can settle on another peak.

use log::debug;

use crate::domain::{GaussianFit, PointSet3};
use crate::error::FitError;
use crate::fit::simplex::{SimplexOptions, minimize_with};
use crate::models::gaussian;

/// Relative objective spread at which the fit is considered converged.
pub const DEFAULT_TOLERANCE: f64 = 1e-10;

/// Fit `amp · exp(-0.5 ((x - mu) / sigma)^2)` to `(x, y)` samples.
pub fn fit_gaussian(points: &PointSet3) -> Result<GaussianFit, FitError> {
    fit_gaussian_with(points, DEFAULT_TOLERANCE, &SimplexOptions::default())
}

pub fn fit_gaussian_with(
    points: &PointSet3,
    tolerance: f64,
    opts: &SimplexOptions,
) -> Result<GaussianFit, FitError> {
    let n = points.len();
    if n < 3 {
        return Err(FitError::InsufficientData { needed: 3, got: n });
    }

    let (peak_x, peak_y) = points
        .iter()
        .map(|(x, y, _)| (x, y))
        .fold((points.x()[0], points.y()[0]), |best, (x, y)| {
            if y > best.1 { (x, y) } else { best }
        });

    let start = seed_simplex(peak_x, peak_y);
    let (xs, ys) = (points.x(), points.y());
    let min = minimize_with(&start, tolerance, opts, |p| {
        xs.iter()
            .zip(ys)
            .map(|(&x, &y)| {
                let r = y - gaussian(x, p[0], p[1], p[2]);
                r * r
            })
            .sum()
    })?;

    let fit = GaussianFit {
        amplitude: min.vertex[0],
        center: min.vertex[1],
        sigma: min.vertex[2].abs(),
        sse: min.value,
        evaluations: min.evaluations,
    };
    debug!(
        "fit_gaussian: amp={:.6} mu={:.6} sigma={:.6} sse={:.3e} ({} evaluations)",
        fit.amplitude, fit.center, fit.sigma, fit.sse, fit.evaluations
    );
    Ok(fit)
}

fn seed_simplex(peak_x: f64, peak_y: f64) -> Vec<Vec<f64>> {
    vec![
        vec![peak_y, peak_x, 1.0],
        vec![1.1 * peak_y, 1.1 * peak_x, 10.0],
        vec![1.2 * peak_y, 1.2 * peak_x, 20.0],
        vec![1.3 * peak_y, 1.3 * peak_x, 30.0],
    ]
}
