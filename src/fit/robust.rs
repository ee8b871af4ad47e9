//! Straight-line estimators.
//!
//! - `fit_slope`: ordinary least squares for `y = a + b·x`
//! - `fit_slope_robust`: least-absolute-deviation style fit that tolerates up
//!   to roughly half the points being outliers
//! - `fit_proportional`: `y = a·x` through the origin, median of ratios
//!
//! The robust fit works on the slope alone. For a trial slope `b` the intercept
//! is always `median(y_i - b·x_i)`, and
//!
//! ```text
//! f(b) = Σ sign(d_i) · x_i,   d_i = y_i - (b·x_i + intercept(b))
//! ```
//!
//! changes sign at the optimal slope. We bracket that sign change starting
//! from the OLS slope and then bisect.

use log::{debug, warn};

use crate::domain::{LineFit, PointSet3};
use crate::error::FitError;
use crate::math::{mean_abs, mean_squared_error, median_mut};

/// Residuals below this magnitude (after `|y|` normalization) do not vote.
const ZERO_RESIDUAL: f64 = 1e-7;

/// Maximum number of outward bracket extensions.
const MAX_BRACKET_STEPS: usize = 30;

/// Bisection stops once the bracket is narrower than this fraction of σ_b.
const BISECT_FRACTION: f64 = 0.01;

/// Ratio used by `fit_proportional` for samples with `x ≈ 0`.
const RATIO_SENTINEL: f64 = 1e30;

/// Spread reported on the OLS fallback when the robust fit gives up.
pub const NON_CONVERGED_SPREAD: f64 = -1.0;

/// Ordinary least squares fit of `y = a + b·x`; spread is the MSE.
pub fn fit_slope(points: &PointSet3) -> Result<LineFit, FitError> {
    let ols = ols_line(points)?;
    let spread = mean_squared_error(points.y(), points.x().iter().map(|&x| ols.line.eval(x)));
    Ok(LineFit { spread, ..ols.line })
}

/// Outlier-resistant fit of `y = a + b·x`; spread is the mean absolute residual.
///
/// If no sign change of the slope criterion can be bracketed, the error
/// carries the OLS line as a fallback (with spread `-1.0`).
pub fn fit_slope_robust(points: &PointSet3) -> Result<LineFit, FitError> {
    fit_slope_robust_with(points, MAX_BRACKET_STEPS)
}

/// `fit_slope_robust` with an explicit limit on outward bracket extensions.
pub fn fit_slope_robust_with(points: &PointSet3, max_bracket_steps: usize) -> Result<LineFit, FitError> {
    let ols = ols_line(points)?;
    let (xs, ys) = (points.x(), points.y());

    let sigma_b = (ols.chisq / ols.det).sqrt();
    let mut b1 = ols.line.slope;
    let mut f1 = slope_criterion(xs, ys, b1);
    let mut b2 = b1 + (3.0 * sigma_b).copysign(f1);

    if b2 == b1 {
        // Exact fit: nothing to resist.
        let spread = mean_abs(points.iter().map(|(x, y, _)| y - ols.line.eval(x)));
        return Ok(LineFit {
            spread,
            ..ols.line
        });
    }
    let mut f2 = slope_criterion(xs, ys, b2);

    let mut steps = 0;
    while f1 * f2 > 0.0 {
        if steps == max_bracket_steps {
            warn!("fit_slope_robust: no bracket after {steps} extensions, keeping OLS line");
            return Err(FitError::NonConvergence {
                routine: "fit_slope_robust",
                iterations: steps,
                fallback: Some(LineFit {
                    spread: NON_CONVERGED_SPREAD,
                    ..ols.line
                }),
            });
        }
        let b = 2.0 * b2 - b1;
        b1 = b2;
        f1 = f2;
        b2 = b;
        f2 = slope_criterion(xs, ys, b2);
        steps += 1;
    }

    let tolerance = BISECT_FRACTION * sigma_b;
    let mut b = b1;
    while (b2 - b1).abs() >= tolerance {
        b = b1 + 0.5 * (b2 - b1);
        if b == b1 || b == b2 {
            break;
        }
        let f = slope_criterion(xs, ys, b);
        if f * f1 >= 0.0 {
            f1 = f;
            b1 = b;
        } else {
            b2 = b;
        }
    }

    let intercept = intercept_for(xs, ys, b);
    let spread = mean_abs(points.iter().map(|(x, y, _)| y - (intercept + b * x)));
    debug!(
        "fit_slope_robust: a={intercept:.6} b={b:.6} (ols b={:.6}, {steps} bracket steps)",
        ols.line.slope
    );
    Ok(LineFit {
        intercept,
        slope: b,
        spread,
    })
}

/// Fit `y = a·x` through the origin; the slope is the median of `y_i / x_i`.
pub fn fit_proportional(points: &PointSet3) -> Result<LineFit, FitError> {
    if points.is_empty() {
        return Err(FitError::InsufficientData { needed: 1, got: 0 });
    }

    let mut ratios: Vec<f64> = points
        .iter()
        .map(|(x, y, _)| {
            if x.abs() < 1e-30 {
                RATIO_SENTINEL
            } else {
                y / x
            }
        })
        .collect();
    let slope = median_mut(&mut ratios).unwrap_or(0.0);
    let spread = mean_squared_error(points.y(), points.x().iter().map(|&x| slope * x));

    Ok(LineFit {
        intercept: 0.0,
        slope,
        spread,
    })
}

struct OlsLine {
    line: LineFit,
    /// Residual sum of squares.
    chisq: f64,
    /// `n·Sxx - Sx²`.
    det: f64,
}

fn ols_line(points: &PointSet3) -> Result<OlsLine, FitError> {
    let n = points.len();
    if n < 2 {
        return Err(FitError::InsufficientData { needed: 2, got: n });
    }

    let (mut sx, mut sy, mut sxy, mut sxx) = (0.0, 0.0, 0.0, 0.0);
    for (x, y, _) in points.iter() {
        sx += x;
        sy += y;
        sxy += x * y;
        sxx += x * x;
    }
    // Rounding can leave `det` a tiny nonzero value when every x is the
    // same, so test the abscissae themselves.
    let x0 = points.x()[0];
    let nf = n as f64;
    let det = nf * sxx - sx * sx;
    if points.x().iter().all(|&x| x == x0) || det <= 0.0 {
        return Err(FitError::SingularMatrix);
    }

    let intercept = (sxx * sy - sx * sxy) / det;
    let slope = (nf * sxy - sx * sy) / det;
    let chisq = points
        .iter()
        .map(|(x, y, _)| {
            let r = y - (intercept + slope * x);
            r * r
        })
        .sum();

    Ok(OlsLine {
        line: LineFit {
            intercept,
            slope,
            spread: 0.0,
        },
        chisq,
        det,
    })
}

fn intercept_for(xs: &[f64], ys: &[f64], b: f64) -> f64 {
    let mut offsets: Vec<f64> = xs.iter().zip(ys).map(|(&x, &y)| y - b * x).collect();
    median_mut(&mut offsets).unwrap_or(0.0)
}

/// `Σ sign(d_i) x_i` for slope `b`.
fn slope_criterion(xs: &[f64], ys: &[f64], b: f64) -> f64 {
    let a = intercept_for(xs, ys, b);
    let mut sum = 0.0;
    for (&x, &y) in xs.iter().zip(ys) {
        let mut d = y - (b * x + a);
        if y != 0.0 {
            d /= y.abs();
        }
        if d.abs() > ZERO_RESIDUAL {
            sum += if d >= 0.0 { x } else { -x };
        }
    }
    sum
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    /// `y = 1 + 2x` on x = 0..50, with 40% of the points pushed far off the line.
    ///
    /// Outliers sit above the line at large x and below it at small x, which
    /// drags the OLS slope upward.
    fn line_with_outliers() -> PointSet3 {
        let mut points = PointSet3::new(0);
        for i in 0..50 {
            let x = i as f64;
            let mut y = 1.0 + 2.0 * x;
            if i % 5 == 1 || i % 5 == 3 {
                y += if x > 25.0 { 100.0 } else { -100.0 };
            }
            points.push(x, y, 0.0);
        }
        points
    }

    #[test]
    fn ols_recovers_clean_line() {
        let xs: Vec<f64> = (0..10).map(|i| i as f64).collect();
        let ys: Vec<f64> = xs.iter().map(|x| 4.0 - 0.5 * x).collect();
        let fit = fit_slope(&PointSet3::from_xy(xs, ys).unwrap()).unwrap();
        assert_abs_diff_eq!(fit.intercept, 4.0, epsilon = 1e-12);
        assert_abs_diff_eq!(fit.slope, -0.5, epsilon = 1e-12);
        assert!(fit.spread < 1e-20);
    }

    #[test]
    fn robust_fit_resists_outliers_where_ols_fails() {
        let points = line_with_outliers();

        let ols = fit_slope(&points).unwrap();
        assert!((ols.slope - 2.0).abs() > 0.5, "OLS slope {} unexpectedly close", ols.slope);

        let robust = fit_slope_robust(&points).unwrap();
        assert_abs_diff_eq!(robust.slope, 2.0, epsilon = 0.05);
        assert_abs_diff_eq!(robust.intercept, 1.0, epsilon = 1.0);
        assert!(robust.spread >= 0.0);
    }

    #[test]
    fn bracket_cap_returns_ols_fallback() {
        // The first trial step from the OLS slope stays on the same side of
        // the root, so a zero extension budget cannot bracket it.
        let points = line_with_outliers();
        let ols = fit_slope(&points).unwrap();

        let err = fit_slope_robust_with(&points, 0).unwrap_err();
        let FitError::NonConvergence {
            routine, iterations, ..
        } = &err
        else {
            panic!("expected NonConvergence, got {err:?}");
        };
        assert_eq!(*routine, "fit_slope_robust");
        assert_eq!(*iterations, 0);

        let fallback = err.fallback_line().unwrap();
        assert_eq!(fallback.spread, NON_CONVERGED_SPREAD);
        assert_abs_diff_eq!(fallback.slope, ols.slope, epsilon = 1e-12);
        assert_abs_diff_eq!(fallback.intercept, ols.intercept, epsilon = 1e-12);

        // One extension is enough for this data.
        let fit = fit_slope_robust_with(&points, 1).unwrap();
        assert_abs_diff_eq!(fit.slope, 2.0, epsilon = 0.05);
    }

    #[test]
    fn robust_fit_of_exact_line_keeps_ols() {
        let xs: Vec<f64> = (0..8).map(|i| i as f64).collect();
        let ys: Vec<f64> = xs.iter().map(|x| 3.0 + x).collect();
        let fit = fit_slope_robust(&PointSet3::from_xy(xs, ys).unwrap()).unwrap();
        assert_abs_diff_eq!(fit.slope, 1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(fit.intercept, 3.0, epsilon = 1e-12);
        assert_abs_diff_eq!(fit.spread, 0.0, epsilon = 1e-12);
    }

    #[test]
    fn line_fits_need_two_distinct_abscissae() {
        let one = PointSet3::from_xy(vec![1.0], vec![2.0]).unwrap();
        assert_eq!(
            fit_slope(&one).unwrap_err(),
            FitError::InsufficientData { needed: 2, got: 1 }
        );
        let vertical = PointSet3::from_xy(vec![1.0, 1.0, 1.0], vec![0.0, 1.0, 2.0]).unwrap();
        assert_eq!(fit_slope_robust(&vertical).unwrap_err(), FitError::SingularMatrix);
    }

    #[test]
    fn identical_inexact_abscissae_are_singular() {
        // 0.3 is not representable, so n·Sxx - Sx² does not cancel to zero.
        let xs = vec![0.3; 7];
        let ys: Vec<f64> = (0..7).map(|i| i as f64).collect();
        let points = PointSet3::from_xy(xs, ys).unwrap();
        assert_eq!(fit_slope(&points).unwrap_err(), FitError::SingularMatrix);
        assert_eq!(fit_slope_robust(&points).unwrap_err(), FitError::SingularMatrix);
    }

    #[test]
    fn proportional_uses_median_ratio() {
        let xs = vec![1.0, 2.0, 3.0, 4.0, 5.0];
        let ys = vec![2.0, 4.0, 6.0, 80.0, 10.0];
        let fit = fit_proportional(&PointSet3::from_xy(xs, ys).unwrap()).unwrap();
        assert_eq!(fit.intercept, 0.0);
        assert_abs_diff_eq!(fit.slope, 2.0, epsilon = 1e-12);
        // Only the outlier contributes: (80 - 8)^2 / 5.
        assert_abs_diff_eq!(fit.spread, 72.0 * 72.0 / 5.0, epsilon = 1e-9);
    }

    #[test]
    fn proportional_guards_zero_abscissa() {
        let xs = vec![0.0, 1.0, 2.0];
        let ys = vec![5.0, 3.0, 6.0];
        let fit = fit_proportional(&PointSet3::from_xy(xs, ys).unwrap()).unwrap();
        // Ratios: sentinel, 3, 3.
        assert_abs_diff_eq!(fit.slope, 3.0, epsilon = 1e-12);
        assert!(fit_proportional(&PointSet3::new(0)).is_err());
    }
}
