//! Seeded synthetic samples for demos and tests.
//!
//! Every generator takes an explicit seed so a given configuration always
//! produces the same points.

use rand::prelude::*;
use rand::rngs::StdRng;
use rand_distr::Normal;

use crate::domain::PointSet3;
use crate::error::FitError;
use crate::models::{Poly2d, gaussian};

/// Straight line with Gaussian scatter and a fraction of gross outliers.
#[derive(Debug, Clone)]
pub struct LineSample {
    pub intercept: f64,
    pub slope: f64,
    pub count: usize,
    pub x_min: f64,
    pub x_max: f64,
    /// Standard deviation of the scatter on inliers.
    pub noise: f64,
    /// Fraction of points (0..1) replaced by outliers.
    pub outlier_fraction: f64,
    /// Outliers are displaced by `±outlier_scale` (plus scatter).
    pub outlier_scale: f64,
    pub seed: u64,
}

impl Default for LineSample {
    fn default() -> Self {
        Self {
            intercept: 1.0,
            slope: 2.0,
            count: 100,
            x_min: 0.0,
            x_max: 50.0,
            noise: 0.1,
            outlier_fraction: 0.3,
            outlier_scale: 200.0,
            seed: 42,
        }
    }
}

pub fn line_with_outliers(sample: &LineSample) -> Result<PointSet3, FitError> {
    if sample.count < 2 {
        return Err(FitError::InsufficientData {
            needed: 2,
            got: sample.count,
        });
    }
    let fraction = sample.outlier_fraction.clamp(0.0, 1.0);
    let mut rng = StdRng::seed_from_u64(sample.seed);
    let normal = scatter(sample.noise)?;

    let mut points = PointSet3::new(sample.count);
    let step = (sample.x_max - sample.x_min) / (sample.count as f64 - 1.0);
    for i in 0..sample.count {
        let x = sample.x_min + step * i as f64;
        let mut y = sample.intercept + sample.slope * x + normal.sample(&mut rng);
        if rng.gen_bool(fraction) {
            // Outliers lean upward at large x so that they bias the OLS slope.
            let upward = x > 0.5 * (sample.x_min + sample.x_max);
            let magnitude = sample.outlier_scale * rng.gen_range(0.5..1.5);
            y += if upward { magnitude } else { -magnitude };
        }
        points.set(i, x, y, 0.0);
    }
    Ok(points)
}

/// Gaussian line profile sampled on a regular grid with additive noise.
pub fn gaussian_profile(
    amplitude: f64,
    center: f64,
    sigma: f64,
    (x_min, x_max, count): (f64, f64, usize),
    noise: f64,
    seed: u64,
) -> Result<PointSet3, FitError> {
    if count < 3 {
        return Err(FitError::InsufficientData {
            needed: 3,
            got: count,
        });
    }
    let mut rng = StdRng::seed_from_u64(seed);
    let normal = scatter(noise)?;

    let step = (x_max - x_min) / (count as f64 - 1.0);
    let mut points = PointSet3::new(count);
    for i in 0..count {
        let x = x_min + step * i as f64;
        let y = gaussian(x, amplitude, center, sigma) + normal.sample(&mut rng);
        points.set(i, x, y, 0.0);
    }
    Ok(points)
}

/// Uniformly scattered `(x, y)` positions with `z = poly(x, y) + noise`.
pub fn surface_samples(
    poly: &Poly2d,
    count: usize,
    (lo, hi): (f64, f64),
    noise: f64,
    seed: u64,
) -> Result<PointSet3, FitError> {
    if !(lo < hi) {
        return Err(FitError::malformed(format!("{lo}..{hi}"), "empty sampling range"));
    }
    let mut rng = StdRng::seed_from_u64(seed);
    let normal = scatter(noise)?;

    let mut points = PointSet3::new(count);
    for i in 0..count {
        let x = rng.gen_range(lo..hi);
        let y = rng.gen_range(lo..hi);
        points.set(i, x, y, poly.evaluate(x, y) + normal.sample(&mut rng));
    }
    Ok(points)
}

fn scatter(sigma: f64) -> Result<Normal<f64>, FitError> {
    Normal::new(0.0, sigma.max(0.0))
        .map_err(|e| FitError::malformed(sigma.to_string(), format!("noise distribution error: {e}")))
}
