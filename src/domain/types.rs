//! Shared domain types.
//!
//! These types are intentionally kept lightweight and serializable so they can be:
//!
//! - passed between fit routines without conversion
//! - exported to JSON from the `nirfit` binary
//! - reloaded later (e.g. a surface fit becomes a `Poly2d` descriptor)

use serde::{Deserialize, Serialize};

use crate::error::FitError;

/// Parallel-array `(x, y, z)` sample container.
///
/// All three channels always have the same length. 1-D fits only read `x` and
/// `y`; surface fits read all three.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PointSet3 {
    x: Vec<f64>,
    y: Vec<f64>,
    z: Vec<f64>,
}

impl PointSet3 {
    /// Create `n` samples with every channel zero-filled.
    pub fn new(n: usize) -> Self {
        Self {
            x: vec![0.0; n],
            y: vec![0.0; n],
            z: vec![0.0; n],
        }
    }

    /// Build from x/y channels; `z` is zero-filled.
    pub fn from_xy(x: Vec<f64>, y: Vec<f64>) -> Result<Self, FitError> {
        let n = x.len();
        Self::from_xyz(x, y, vec![0.0; n])
    }

    pub fn from_xyz(x: Vec<f64>, y: Vec<f64>, z: Vec<f64>) -> Result<Self, FitError> {
        if y.len() != x.len() {
            return Err(FitError::LengthMismatch {
                expected: x.len(),
                got: y.len(),
            });
        }
        if z.len() != x.len() {
            return Err(FitError::LengthMismatch {
                expected: x.len(),
                got: z.len(),
            });
        }
        Ok(Self { x, y, z })
    }

    pub fn len(&self) -> usize {
        self.x.len()
    }

    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }

    pub fn x(&self) -> &[f64] {
        &self.x
    }

    pub fn y(&self) -> &[f64] {
        &self.y
    }

    pub fn z(&self) -> &[f64] {
        &self.z
    }

    /// Overwrite sample `i`.
    ///
    /// # Panics
    /// Panics if `i >= self.len()`.
    pub fn set(&mut self, i: usize, x: f64, y: f64, z: f64) {
        self.x[i] = x;
        self.y[i] = y;
        self.z[i] = z;
    }

    pub fn push(&mut self, x: f64, y: f64, z: f64) {
        self.x.push(x);
        self.y.push(y);
        self.z.push(z);
    }

    /// Iterate samples as `(x, y, z)` tuples.
    pub fn iter(&self) -> impl Iterator<Item = (f64, f64, f64)> + '_ {
        self.x
            .iter()
            .zip(self.y.iter())
            .zip(self.z.iter())
            .map(|((&x, &y), &z)| (x, y, z))
    }
}

/// Largest exponent accepted by the term and descriptor parsers.
pub const MAX_EXPONENT: u32 = i32::MAX as u32;

/// A monomial `x^dx · y^dy` participating in a surface fit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Term {
    pub dx: u32,
    pub dy: u32,
}

impl Term {
    pub fn new(dx: u32, dy: u32) -> Self {
        Self { dx, dy }
    }

    /// Total degree `dx + dy`, widened so it cannot overflow.
    pub fn degree(self) -> u64 {
        u64::from(self.dx) + u64::from(self.dy)
    }

    /// Evaluate the monomial. `0^0` is 1.
    pub fn eval(self, x: f64, y: f64) -> f64 {
        pow_u32(x, self.dx) * pow_u32(y, self.dy)
    }
}

fn pow_u32(base: f64, exp: u32) -> f64 {
    match i32::try_from(exp) {
        Ok(e) => base.powi(e),
        Err(_) => base.powf(f64::from(exp)),
    }
}

impl std::fmt::Display for Term {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({},{})", self.dx, self.dy)
    }
}

/// 1-D polynomial fit: `y ≈ Σ coeffs[k] · x^k`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolyFit {
    pub coeffs: Vec<f64>,
    /// Mean squared residual over the input points.
    pub mse: f64,
}

impl PolyFit {
    pub fn degree(&self) -> usize {
        self.coeffs.len().saturating_sub(1)
    }

    /// Evaluate the fitted polynomial (Horner).
    pub fn eval(&self, x: f64) -> f64 {
        self.coeffs.iter().rev().fold(0.0, |acc, &c| acc * x + c)
    }
}

/// Legendre-basis fit: `y ≈ Σ coeffs[k] · P_k(x)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LegendreFit {
    pub coeffs: Vec<f64>,
    pub mse: f64,
}

impl LegendreFit {
    pub fn eval(&self, x: f64) -> f64 {
        let basis = crate::math::legendre_basis(x, self.coeffs.len().saturating_sub(1));
        basis.iter().zip(self.coeffs.iter()).map(|(p, c)| p * c).sum()
    }
}

/// 2-D surface fit: `z ≈ Σ coeffs[j] · x^terms[j].dx · y^terms[j].dy`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SurfaceFit {
    pub terms: Vec<Term>,
    pub coeffs: Vec<f64>,
    pub mse: f64,
}

impl SurfaceFit {
    pub fn ncoeffs(&self) -> usize {
        self.coeffs.len()
    }

    /// Convert into the sparse polynomial model consumed by callers.
    pub fn to_poly2d(&self) -> crate::models::Poly2d {
        crate::models::Poly2d::from_terms(
            self.terms
                .iter()
                .zip(self.coeffs.iter())
                .map(|(&t, &c)| (t, c)),
        )
    }
}

/// Straight line `y = intercept + slope · x`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineFit {
    pub intercept: f64,
    pub slope: f64,
    /// Mean squared residual (OLS, proportional) or mean absolute residual
    /// (robust). `-1.0` marks a robust fit that fell back to OLS.
    pub spread: f64,
}

impl LineFit {
    pub fn eval(&self, x: f64) -> f64 {
        self.intercept + self.slope * x
    }
}

/// Gaussian profile `amplitude · exp(-0.5 ((x - center) / sigma)^2)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GaussianFit {
    pub amplitude: f64,
    pub center: f64,
    pub sigma: f64,
    /// Summed squared residual at the optimum.
    pub sse: f64,
    pub evaluations: usize,
}

/// Outcome of a simplex minimization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Minimum {
    pub vertex: Vec<f64>,
    pub value: f64,
    pub evaluations: usize,
}

/// Which line estimator the `slope` command runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum SlopeMethod {
    /// Ordinary least squares.
    Ols,
    /// Median-based resistant fit.
    Robust,
    /// `y = a·x` through the origin.
    Proportional,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_point_set_is_zero_filled() {
        let p = PointSet3::new(4);
        assert_eq!(p.len(), 4);
        assert!(p.x().iter().chain(p.y()).chain(p.z()).all(|&v| v == 0.0));
    }

    #[test]
    fn from_xyz_rejects_unequal_channels() {
        let err = PointSet3::from_xyz(vec![1.0, 2.0], vec![1.0], vec![0.0, 0.0]).unwrap_err();
        assert_eq!(err, FitError::LengthMismatch { expected: 2, got: 1 });
    }

    #[test]
    fn push_keeps_channels_aligned() {
        let mut p = PointSet3::from_xy(vec![1.0], vec![2.0]).unwrap();
        p.push(3.0, 4.0, 5.0);
        assert_eq!(p.x(), &[1.0, 3.0]);
        assert_eq!(p.z(), &[0.0, 5.0]);
        let collected: Vec<_> = p.iter().collect();
        assert_eq!(collected[1], (3.0, 4.0, 5.0));
    }

    #[test]
    fn poly_fit_eval_uses_ascending_coefficients() {
        let fit = PolyFit {
            coeffs: vec![1.0, 0.0, 2.0],
            mse: 0.0,
        };
        assert_eq!(fit.degree(), 2);
        assert!((fit.eval(3.0) - 19.0).abs() < 1e-12);
    }

    #[test]
    fn term_zero_power_is_one() {
        assert_eq!(Term::new(0, 0).eval(0.0, 0.0), 1.0);
        assert_eq!(Term::new(2, 1).eval(2.0, 3.0), 12.0);
    }

    #[test]
    fn term_handles_exponents_beyond_i32() {
        let big = Term::new(u32::MAX, u32::MAX);
        assert_eq!(big.degree(), 2 * u64::from(u32::MAX));
        assert_eq!(Term::new(MAX_EXPONENT + 1, 0).eval(2.0, 1.0), f64::INFINITY);
        assert_eq!(Term::new(MAX_EXPONENT + 1, 0).eval(0.5, 1.0), 0.0);
    }
}
