//! Sparse two-dimensional polynomial.
//!
//! A `Poly2d` is an ordered list of `(dx, dy, coeff)` terms:
//!
//! ```text
//! p(x, y) = Σ coeff · x^dx · y^dy
//! ```
//!
//! It is the hand-off format between fitting and the calibration steps that
//! apply a fitted distortion or dispersion map. Models come from three places:
//!
//! - a surface fit (`SurfaceFit::to_poly2d`)
//! - a descriptor string `"dx dy coeff dx dy coeff ..."` (`str::parse`)
//! - three parallel numeric columns, e.g. loaded from a table (`from_columns`)
//!
//! The evaluator simply sums every term, so duplicated exponent pairs would
//! add up; the string and column constructors reject them.

use std::collections::HashSet;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::domain::{MAX_EXPONENT, Term};
use crate::error::FitError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Poly2dTerm {
    pub dx: u32,
    pub dy: u32,
    pub coeff: f64,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Poly2d {
    terms: Vec<Poly2dTerm>,
}

impl Poly2d {
    /// Build from `(term, coefficient)` pairs without validation.
    pub fn from_terms(terms: impl IntoIterator<Item = (Term, f64)>) -> Self {
        Self {
            terms: terms
                .into_iter()
                .map(|(t, coeff)| Poly2dTerm {
                    dx: t.dx,
                    dy: t.dy,
                    coeff,
                })
                .collect(),
        }
    }

    /// Build from parallel exponent / coefficient columns.
    ///
    /// Exponents are read from numeric columns and must be non-negative
    /// integers.
    pub fn from_columns(dx: &[f64], dy: &[f64], coeffs: &[f64]) -> Result<Self, FitError> {
        for other in [dy.len(), coeffs.len()] {
            if other != dx.len() {
                return Err(FitError::LengthMismatch {
                    expected: dx.len(),
                    got: other,
                });
            }
        }

        let mut builder = Builder::default();
        for ((&ex, &ey), &c) in dx.iter().zip(dy).zip(coeffs) {
            builder.push(exponent_from_f64(ex)?, exponent_from_f64(ey)?, c)?;
        }
        Ok(builder.finish())
    }

    pub fn terms(&self) -> &[Poly2dTerm] {
        &self.terms
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// Highest total degree `dx + dy` over all terms.
    pub fn max_degree(&self) -> u64 {
        self.terms
            .iter()
            .map(|t| Term::new(t.dx, t.dy).degree())
            .max()
            .unwrap_or(0)
    }

    /// `Σ coeff · x^dx · y^dy`, with `0^0 = 1`.
    pub fn evaluate(&self, x: f64, y: f64) -> f64 {
        self.terms
            .iter()
            .map(|t| t.coeff * Term::new(t.dx, t.dy).eval(x, y))
            .sum()
    }

    /// Evaluate at each `(xs[i], ys[i])`.
    pub fn evaluate_many(&self, xs: &[f64], ys: &[f64]) -> Result<Vec<f64>, FitError> {
        if xs.len() != ys.len() {
            return Err(FitError::LengthMismatch {
                expected: xs.len(),
                got: ys.len(),
            });
        }
        Ok(xs.iter().zip(ys).map(|(&x, &y)| self.evaluate(x, y)).collect())
    }
}

impl FromStr for Poly2d {
    type Err = FitError;

    /// Parse the `"dx dy coeff dx dy coeff ..."` descriptor grammar.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let tokens: Vec<&str> = s.split_whitespace().collect();
        if tokens.is_empty() {
            return Err(FitError::malformed(s, "empty polynomial descriptor"));
        }
        if tokens.len() % 3 != 0 {
            return Err(FitError::malformed(
                s,
                format!("{} tokens is not a multiple of 3", tokens.len()),
            ));
        }

        let mut builder = Builder::default();
        for chunk in tokens.chunks(3) {
            let dx = parse_exponent(chunk[0])?;
            let dy = parse_exponent(chunk[1])?;
            let coeff = chunk[2]
                .parse::<f64>()
                .map_err(|_| FitError::malformed(chunk[2], "invalid coefficient"))?;
            builder.push(dx, dy, coeff)?;
        }
        Ok(builder.finish())
    }
}

impl std::fmt::Display for Poly2d {
    /// Descriptor form; parses back to the same model.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (i, t) in self.terms.iter().enumerate() {
            if i > 0 {
                write!(f, " ")?;
            }
            write!(f, "{} {} {:e}", t.dx, t.dy, t.coeff)?;
        }
        Ok(())
    }
}

#[derive(Default)]
struct Builder {
    terms: Vec<Poly2dTerm>,
    seen: HashSet<(u32, u32)>,
}

impl Builder {
    fn push(&mut self, dx: u32, dy: u32, coeff: f64) -> Result<(), FitError> {
        if !self.seen.insert((dx, dy)) {
            return Err(FitError::DuplicateTerm { dx, dy });
        }
        self.terms.push(Poly2dTerm { dx, dy, coeff });
        Ok(())
    }

    fn finish(self) -> Poly2d {
        Poly2d { terms: self.terms }
    }
}

fn parse_exponent(token: &str) -> Result<u32, FitError> {
    match token.parse::<u32>() {
        Ok(e) if e <= MAX_EXPONENT => Ok(e),
        Ok(_) => Err(FitError::malformed(token, format!("exponent exceeds {MAX_EXPONENT}"))),
        Err(_) => Err(FitError::malformed(token, "exponent must be a non-negative integer")),
    }
}

fn exponent_from_f64(v: f64) -> Result<u32, FitError> {
    if v.is_finite() && v >= 0.0 && v.fract() == 0.0 && v <= f64::from(MAX_EXPONENT) {
        Ok(v as u32)
    } else {
        Err(FitError::malformed(
            v.to_string(),
            "exponent must be a non-negative integer",
        ))
    }
}
