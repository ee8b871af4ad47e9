//! Formatted terminal output.
//!
//! Formatting lives here so fitting code returns plain values and output
//! changes stay in one file.

use std::path::Path;

use crate::app::pipeline::{DemoRun, FitOutcome};
use crate::domain::{GaussianFit, LegendreFit, LineFit, PolyFit, SlopeMethod, SurfaceFit};
use crate::fit::NON_CONVERGED_SPREAD;
use crate::io::LoadedPoints;
use crate::models::Poly2d;
use crate::report::{Residual, ResidualSummary};

/// Input file summary, including rows that were skipped.
pub fn format_load_summary(path: &Path, loaded: &LoadedPoints) -> String {
    let mut out = String::new();

    out.push_str("=== nirfit ===\n");
    out.push_str(&format!("Input: {}\n", path.display()));
    out.push_str(&format!(
        "Points: n={} (rows read={}, skipped={}){}\n",
        loaded.points.len(),
        loaded.rows_read,
        loaded.row_errors.len(),
        if loaded.has_z { " | with z" } else { "" }
    ));
    for e in loaded.row_errors.iter().take(5) {
        out.push_str(&format!("  line {}: {}\n", e.line, e.message));
    }
    if loaded.row_errors.len() > 5 {
        out.push_str(&format!("  ... {} more\n", loaded.row_errors.len() - 5));
    }

    out
}

pub fn format_fit_outcome(outcome: &FitOutcome) -> String {
    match outcome {
        FitOutcome::Poly(fit) => format_poly_fit(fit),
        FitOutcome::Legendre(fit) => format_legendre_fit(fit),
        FitOutcome::Surface(fit) => format_surface_fit(fit),
        FitOutcome::Line {
            method,
            fit,
            converged,
        } => format_line_fit(*method, fit, *converged),
        FitOutcome::Gaussian(fit) => format_gaussian_fit(fit),
    }
}

pub fn format_poly_fit(fit: &PolyFit) -> String {
    let mut out = String::new();
    out.push_str(&format!("\nPolynomial fit (degree {}):\n", fit.degree()));
    for (k, c) in fit.coeffs.iter().enumerate() {
        out.push_str(&format!("  c{k:<2} x^{k:<2} {c:>16.8e}\n"));
    }
    out.push_str(&format!("MSE: {:.6e}\n", fit.mse));
    out
}

pub fn format_legendre_fit(fit: &LegendreFit) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "\nLegendre fit (order {}):\n",
        fit.coeffs.len().saturating_sub(1)
    ));
    for (k, c) in fit.coeffs.iter().enumerate() {
        out.push_str(&format!("  P{k:<2} {c:>16.8e}\n"));
    }
    out.push_str(&format!("MSE: {:.6e}\n", fit.mse));
    out
}

pub fn format_surface_fit(fit: &SurfaceFit) -> String {
    let mut out = String::new();
    out.push_str(&format!("\nSurface fit ({} terms):\n", fit.ncoeffs()));
    out.push_str(&format!("  {:<8} {:>16}\n", "term", "coeff"));
    out.push_str(&format!("  {:-<8} {:-<16}\n", "", ""));
    for (t, c) in fit.terms.iter().zip(&fit.coeffs) {
        out.push_str(&format!("  {:<8} {c:>16.8e}\n", t.to_string()));
    }
    out.push_str(&format!("MSE: {:.6e}\n", fit.mse));
    out.push_str(&format!("Model: {}\n", fit.to_poly2d()));
    out
}

pub fn format_line_fit(method: SlopeMethod, fit: &LineFit, converged: bool) -> String {
    let mut out = String::new();
    out.push_str(&format!("\nLine fit ({}):\n", method_label(method)));
    out.push_str(&format!("  y = {:.8} + {:.8} x\n", fit.intercept, fit.slope));
    if converged {
        let label = match method {
            SlopeMethod::Robust => "mean |residual|",
            SlopeMethod::Ols | SlopeMethod::Proportional => "MSE",
        };
        out.push_str(&format!("  {label}: {:.6e}\n", fit.spread));
    } else {
        out.push_str("  robust fit did not converge; showing least-squares line\n");
    }
    out
}

pub fn format_gaussian_fit(fit: &GaussianFit) -> String {
    let mut out = String::new();
    out.push_str("\nGaussian fit:\n");
    out.push_str(&format!("  amplitude: {:.8}\n", fit.amplitude));
    out.push_str(&format!("  center   : {:.8}\n", fit.center));
    out.push_str(&format!("  sigma    : {:.8}\n", fit.sigma));
    out.push_str(&format!("  FWHM     : {:.8}\n", 2.0 * (2.0 * 2f64.ln()).sqrt() * fit.sigma));
    out.push_str(&format!("SSE: {:.6e} ({} evaluations)\n", fit.sse, fit.evaluations));
    out
}

/// Residual statistics plus the worst samples.
pub fn format_residuals(summary: &ResidualSummary, worst: &[Residual]) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "\nResiduals: n={} rms={:.6e} mean|r|={:.6e} max|r|={:.6e}\n",
        summary.n, summary.rms, summary.mean_abs, summary.max_abs
    ));
    if worst.is_empty() {
        return out;
    }

    out.push_str(&format!(
        "  {:>6} {:>14} {:>14} {:>14}\n",
        "row", "observed", "fitted", "residual"
    ));
    out.push_str(&format!("  {:->6} {:->14} {:->14} {:->14}\n", "", "", "", ""));
    for r in worst {
        out.push_str(&format!(
            "  {:>6} {:>14.6} {:>14.6} {:>14.6}\n",
            r.index, r.observed, r.fitted, r.residual
        ));
    }
    out
}

pub fn format_evaluation(poly: &Poly2d, x: f64, y: f64, value: f64) -> String {
    format!(
        "Model ({} terms, max degree {}): {}\np({x}, {y}) = {value:.10e}\n",
        poly.len(),
        poly.max_degree(),
        poly
    )
}

/// OLS vs robust side by side against the generating line.
pub fn format_demo(run: &DemoRun) -> String {
    let mut out = String::new();

    out.push_str("=== nirfit demo: least squares vs robust line ===\n");
    out.push_str(&format!(
        "Sample: n={} | outlier fraction={:.2} | seed={}\n",
        run.count, run.outlier_fraction, run.seed
    ));
    out.push_str(&format!(
        "Truth : y = {:.4} + {:.4} x\n\n",
        run.true_intercept, run.true_slope
    ));

    out.push_str(&format!(
        "{:<8} {:>12} {:>12} {:>12}\n",
        "method", "intercept", "slope", "slope err"
    ));
    out.push_str(&format!("{:-<8} {:->12} {:->12} {:->12}\n", "", "", "", ""));
    for (label, fit) in [("ols", &run.ols), ("robust", &run.robust)] {
        out.push_str(&format!(
            "{label:<8} {:>12.4} {:>12.4} {:>12.4}\n",
            fit.intercept,
            fit.slope,
            fit.slope - run.true_slope
        ));
    }
    if !run.robust_converged || run.robust.spread == NON_CONVERGED_SPREAD {
        out.push_str("(robust fit did not converge; row shows the least-squares fallback)\n");
    }

    out
}

fn method_label(method: SlopeMethod) -> &'static str {
    match method {
        SlopeMethod::Ols => "least squares",
        SlopeMethod::Robust => "robust",
        SlopeMethod::Proportional => "proportional",
    }
}
