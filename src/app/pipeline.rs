//! Shared fit pipeline used by the point-file commands and the demo.
//!
//! The workflow is the same for every command:
//! load points -> run the selected fit -> compute residuals
//!
//! so command handlers only deal with presentation and export.

use log::{info, warn};
use serde::Serialize;

use crate::data::{LineSample, line_with_outliers};
use crate::domain::{
    DemoConfig, FitConfig, FitTask, GaussianFit, LegendreFit, LineFit, PointSet3, PolyFit, SlopeMethod,
    SurfaceFit,
};
use crate::error::{AppError, FitError};
use crate::fit::{
    SimplexOptions, fit_1d_poly, fit_gaussian_with, fit_legendre, fit_proportional, fit_slope, fit_slope_robust,
    fit_surface_polynomial,
};
use crate::io::{LoadedPoints, read_points_csv};
use crate::models::gaussian;
use crate::report::{Residual, compute_residuals};

/// The fitted model produced by one point-file command.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum FitOutcome {
    Poly(PolyFit),
    Legendre(LegendreFit),
    Surface(SurfaceFit),
    Line {
        method: SlopeMethod,
        fit: LineFit,
        /// `false` when the robust fit gave up and `fit` is the OLS fallback.
        converged: bool,
    },
    Gaussian(GaussianFit),
}

impl FitOutcome {
    /// Model prediction for every sample, aligned with `observed`.
    pub fn predict(&self, points: &PointSet3) -> Vec<f64> {
        match self {
            FitOutcome::Poly(fit) => points.x().iter().map(|&x| fit.eval(x)).collect(),
            FitOutcome::Legendre(fit) => points.x().iter().map(|&x| fit.eval(x)).collect(),
            FitOutcome::Surface(fit) => {
                let poly = fit.to_poly2d();
                points.iter().map(|(x, y, _)| poly.evaluate(x, y)).collect()
            }
            FitOutcome::Line { fit, .. } => points.x().iter().map(|&x| fit.eval(x)).collect(),
            FitOutcome::Gaussian(fit) => points
                .x()
                .iter()
                .map(|&x| gaussian(x, fit.amplitude, fit.center, fit.sigma))
                .collect(),
        }
    }

    /// Observed values the model is compared against (`z` for surfaces, `y` otherwise).
    pub fn observed<'a>(&self, points: &'a PointSet3) -> &'a [f64] {
        match self {
            FitOutcome::Surface(_) => points.z(),
            _ => points.y(),
        }
    }
}

/// All computed outputs of a single point-file run.
#[derive(Debug, Clone)]
pub struct RunOutput {
    pub loaded: LoadedPoints,
    pub outcome: FitOutcome,
    pub residuals: Vec<Residual>,
}

/// Load the configured point file and run its fit.
pub fn run_fit(config: &FitConfig) -> Result<RunOutput, AppError> {
    let loaded = read_points_csv(&config.input)?;
    info!(
        "{}: loaded {} points from '{}' ({} rows skipped)",
        config.task.command_name(),
        loaded.points.len(),
        config.input.display(),
        loaded.row_errors.len()
    );
    run_fit_with_points(&config.task, loaded)
}

/// Run a fit on points that are already loaded.
pub fn run_fit_with_points(task: &FitTask, loaded: LoadedPoints) -> Result<RunOutput, AppError> {
    let points = &loaded.points;
    let outcome = match task {
        FitTask::Poly {
            degree,
            legendre: false,
        } => FitOutcome::Poly(fit_1d_poly(*degree, points)?),
        FitTask::Poly {
            degree,
            legendre: true,
        } => FitOutcome::Legendre(fit_legendre(points.x(), points.y(), *degree)?),
        FitTask::Surface { max_degree, terms } => {
            if !loaded.has_z {
                return Err(AppError::new(2, "Surface fit needs a 'z' column."));
            }
            FitOutcome::Surface(fit_surface_polynomial(points, terms.as_deref(), *max_degree)?)
        }
        FitTask::Slope { method } => {
            let (fit, converged) = fit_line(*method, points)?;
            FitOutcome::Line {
                method: *method,
                fit,
                converged,
            }
        }
        FitTask::Gauss {
            tolerance,
            max_evaluations,
        } => {
            let opts = SimplexOptions {
                max_evaluations: *max_evaluations,
            };
            FitOutcome::Gaussian(fit_gaussian_with(points, *tolerance, &opts)?)
        }
    };

    let fitted = outcome.predict(points);
    let residuals = compute_residuals(outcome.observed(points), &fitted)?;

    Ok(RunOutput {
        loaded,
        outcome,
        residuals,
    })
}

/// Run one line estimator. A robust fit that hits its iteration cap yields
/// the attached OLS fallback with `converged = false`.
pub fn fit_line(method: SlopeMethod, points: &PointSet3) -> Result<(LineFit, bool), FitError> {
    match method {
        SlopeMethod::Ols => Ok((fit_slope(points)?, true)),
        SlopeMethod::Proportional => Ok((fit_proportional(points)?, true)),
        SlopeMethod::Robust => robust_or_fallback(fit_slope_robust(points)),
    }
}

fn robust_or_fallback(result: Result<LineFit, FitError>) -> Result<(LineFit, bool), FitError> {
    match result {
        Ok(fit) => Ok((fit, true)),
        Err(err) => match err.fallback_line() {
            Some(fallback) => {
                warn!("{err}; reporting the least-squares line instead");
                Ok((fallback.clone(), false))
            }
            None => Err(err),
        },
    }
}

/// Synthetic OLS vs robust comparison.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DemoRun {
    pub seed: u64,
    pub count: usize,
    pub outlier_fraction: f64,
    pub true_intercept: f64,
    pub true_slope: f64,
    pub ols: LineFit,
    pub robust: LineFit,
    pub robust_converged: bool,
}

pub fn run_demo(config: &DemoConfig) -> Result<DemoRun, AppError> {
    if !(0.0..=1.0).contains(&config.outlier_fraction) {
        return Err(AppError::new(
            2,
            format!("Outlier fraction must be in [0, 1], got {}.", config.outlier_fraction),
        ));
    }
    let sample = LineSample {
        count: config.count,
        outlier_fraction: config.outlier_fraction,
        seed: config.seed,
        ..LineSample::default()
    };
    let points = line_with_outliers(&sample)?;

    let (ols, _) = fit_line(SlopeMethod::Ols, &points)?;
    let (robust, robust_converged) = fit_line(SlopeMethod::Robust, &points)?;

    Ok(DemoRun {
        seed: sample.seed,
        count: sample.count,
        outlier_fraction: sample.outlier_fraction,
        true_intercept: sample.intercept,
        true_slope: sample.slope,
        ols,
        robust,
        robust_converged,
    })
}
