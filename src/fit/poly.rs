//! Linear-in-parameters polynomial fits.
//!
//! All three fits build a design matrix with one basis function per row and
//! one sample per column, then hand it to [`leastsq`]:
//!
//! - `fit_1d_poly`: basis `x^k`, `k = 0..=degree`
//! - `fit_surface_polynomial`: basis `x^dx · y^dy` for the selected terms
//! - `fit_legendre`: basis `P_k(x)`, `k = 0..=order`
//!
//! The reported MSE is in-sample over every input point.

use log::debug;

use crate::domain::{LegendreFit, PointSet3, PolyFit, SurfaceFit, Term};
use crate::error::FitError;
use crate::fit::terms::{default_terms, parse_terms};
use crate::math::{Matrix, leastsq, legendre_basis, mean_squared_error};

/// Fit `y ≈ Σ c_k x^k` for `k = 0..=degree`.
pub fn fit_1d_poly(degree: usize, points: &PointSet3) -> Result<PolyFit, FitError> {
    let n = points.len();
    let ncoeffs = degree + 1;
    if n < ncoeffs {
        return Err(FitError::InsufficientData {
            needed: ncoeffs,
            got: n,
        });
    }

    let xs = points.x();
    let design = Matrix::from_fn(ncoeffs, n, |k, i| xs[i].powi(k as i32));
    let target = Matrix::from_row_slice(1, n, points.y());

    let solution = leastsq(&design, &target)?;
    let fit = PolyFit {
        coeffs: solution.row(0),
        mse: 0.0,
    };
    let mse = mean_squared_error(points.y(), xs.iter().map(|&x| fit.eval(x)));

    debug!("fit_1d_poly: degree={degree} n={n} mse={mse:.6e}");
    Ok(PolyFit { mse, ..fit })
}

/// Fit `z ≈ Σ c_j x^dx_j y^dy_j`.
///
/// With no control string every monomial of total degree `<= max_degree` is
/// used, in [`default_terms`] order. Otherwise the control string selects the
/// terms (and must respect `max_degree`).
pub fn fit_surface_polynomial(
    points: &PointSet3,
    control: Option<&str>,
    max_degree: u32,
) -> Result<SurfaceFit, FitError> {
    let terms = match control {
        Some(s) => parse_terms(s, max_degree)?,
        None => default_terms(max_degree),
    };
    fit_surface_terms(points, terms)
}

/// Surface fit over an explicit, already validated term list.
pub fn fit_surface_terms(points: &PointSet3, terms: Vec<Term>) -> Result<SurfaceFit, FitError> {
    let n = points.len();
    let ncoeffs = terms.len();
    if n < ncoeffs {
        return Err(FitError::InsufficientData {
            needed: ncoeffs,
            got: n,
        });
    }

    let (xs, ys) = (points.x(), points.y());
    let design = Matrix::from_fn(ncoeffs, n, |j, i| terms[j].eval(xs[i], ys[i]));
    let target = Matrix::from_row_slice(1, n, points.z());

    let coeffs = leastsq(&design, &target)?.row(0);
    let fitted = (0..n).map(|i| {
        terms
            .iter()
            .zip(coeffs.iter())
            .map(|(t, c)| c * t.eval(xs[i], ys[i]))
            .sum::<f64>()
    });
    let mse = mean_squared_error(points.z(), fitted);

    debug!("fit_surface_polynomial: ncoeffs={ncoeffs} n={n} mse={mse:.6e}");
    Ok(SurfaceFit { terms, coeffs, mse })
}

/// Fit `y ≈ Σ c_k P_k(x)` for `k = 0..=order`.
pub fn fit_legendre(xs: &[f64], ys: &[f64], order: usize) -> Result<LegendreFit, FitError> {
    if xs.len() != ys.len() {
        return Err(FitError::LengthMismatch {
            expected: xs.len(),
            got: ys.len(),
        });
    }
    let n = xs.len();
    let ncoeffs = order + 1;
    if n < ncoeffs {
        return Err(FitError::InsufficientData {
            needed: ncoeffs,
            got: n,
        });
    }

    let basis: Vec<Vec<f64>> = xs.iter().map(|&x| legendre_basis(x, order)).collect();
    let design = Matrix::from_fn(ncoeffs, n, |k, i| basis[i][k]);
    let target = Matrix::from_row_slice(1, n, ys);

    let coeffs = leastsq(&design, &target)?.row(0);
    let fitted = basis
        .iter()
        .map(|row| row.iter().zip(coeffs.iter()).map(|(p, c)| p * c).sum::<f64>());
    let mse = mean_squared_error(ys, fitted);

    debug!("fit_legendre: order={order} n={n} mse={mse:.6e}");
    Ok(LegendreFit { coeffs, mse })
}
