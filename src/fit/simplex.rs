//! Downhill simplex (Nelder–Mead) minimizer.
//!
//! The simplex keeps `dim + 1` vertices with their objective values and the
//! coordinate-wise sum of all vertices. The sum is updated incrementally when a
//! vertex moves, so a reflection costs `O(dim)` plus one objective call.
//!
//! Each iteration moves the worst vertex:
//!
//! 1. reflect it through the centroid of the others (factor `-1`)
//! 2. if that beats the best vertex, try to expand further (factor `2`)
//! 3. if it is still worse than the second-worst, contract halfway (factor `0.5`)
//! 4. if contraction does not help either, shrink every vertex toward the best
//!
//! Termination is a relative spread test on the objective values, or the
//! evaluation cap.

use log::{trace, warn};

use crate::domain::Minimum;
use crate::error::FitError;

/// Guards the relative convergence test against a zero minimum.
const TINY: f64 = 1e-10;

#[derive(Debug, Clone, PartialEq)]
pub struct SimplexOptions {
    /// Maximum number of objective evaluations before giving up.
    pub max_evaluations: usize,
}

impl Default for SimplexOptions {
    fn default() -> Self {
        Self {
            max_evaluations: 5000,
        }
    }
}

/// Minimize `objective` starting from `initial` (`dim + 1` vertices of length `dim`).
///
/// Converges when `2|f_worst - f_best| / (|f_worst| + |f_best| + 1e-10) < tolerance`.
pub fn minimize<F>(initial: &[Vec<f64>], tolerance: f64, objective: F) -> Result<Minimum, FitError>
where
    F: FnMut(&[f64]) -> f64,
{
    minimize_with(initial, tolerance, &SimplexOptions::default(), objective)
}

pub fn minimize_with<F>(
    initial: &[Vec<f64>],
    tolerance: f64,
    opts: &SimplexOptions,
    mut objective: F,
) -> Result<Minimum, FitError>
where
    F: FnMut(&[f64]) -> f64,
{
    let mpts = initial.len();
    if mpts < 2 {
        return Err(FitError::InsufficientData {
            needed: 2,
            got: mpts,
        });
    }
    let dim = mpts - 1;
    if let Some(bad) = initial.iter().find(|v| v.len() != dim) {
        return Err(FitError::LengthMismatch {
            expected: dim,
            got: bad.len(),
        });
    }

    let mut simplex = Simplex {
        vertices: initial.to_vec(),
        values: initial.iter().map(|v| objective(v)).collect(),
        sum: vec![0.0; dim],
        evaluations: mpts,
    };
    simplex.recompute_sum();

    loop {
        let (best, worst, second) = simplex.rank();
        let (f_best, f_worst) = (simplex.values[best], simplex.values[worst]);

        let rtol = 2.0 * (f_worst - f_best).abs() / (f_worst.abs() + f_best.abs() + TINY);
        if rtol < tolerance {
            trace!("simplex converged: f={f_best:e} after {} evaluations", simplex.evaluations);
            return Ok(Minimum {
                vertex: simplex.vertices[best].clone(),
                value: f_best,
                evaluations: simplex.evaluations,
            });
        }
        if simplex.evaluations >= opts.max_evaluations {
            warn!(
                "simplex gave up after {} evaluations (rtol={rtol:e})",
                simplex.evaluations
            );
            return Err(FitError::NonConvergence {
                routine: "simplex",
                iterations: simplex.evaluations,
                fallback: None,
            });
        }

        let reflected = simplex.try_move(worst, -1.0, &mut objective);
        if reflected <= f_best {
            simplex.try_move(worst, 2.0, &mut objective);
        } else if reflected >= simplex.values[second] {
            let before = simplex.values[worst];
            let contracted = simplex.try_move(worst, 0.5, &mut objective);
            if contracted >= before {
                simplex.shrink_toward(best, &mut objective);
            }
        }
    }
}

struct Simplex {
    vertices: Vec<Vec<f64>>,
    values: Vec<f64>,
    sum: Vec<f64>,
    evaluations: usize,
}

impl Simplex {
    fn recompute_sum(&mut self) {
        for (j, s) in self.sum.iter_mut().enumerate() {
            *s = self.vertices.iter().map(|v| v[j]).sum();
        }
    }

    /// Indices of the best, worst and second-worst vertex.
    fn rank(&self) -> (usize, usize, usize) {
        let y = &self.values;
        let mut best = 0;
        let (mut worst, mut second) = if y[0] > y[1] { (0, 1) } else { (1, 0) };
        for i in 0..y.len() {
            if y[i] <= y[best] {
                best = i;
            }
            if y[i] > y[worst] {
                second = worst;
                worst = i;
            } else if y[i] > y[second] && i != worst {
                second = i;
            }
        }
        (best, worst, second)
    }

    /// Move vertex `hi` along the line through the centroid of the others.
    ///
    /// `factor = -1` reflects, `2` expands, `0.5` contracts. The vertex is
    /// replaced only if the trial point improves on it.
    fn try_move<F>(&mut self, hi: usize, factor: f64, objective: &mut F) -> f64
    where
        F: FnMut(&[f64]) -> f64,
    {
        let dim = self.sum.len() as f64;
        let fac1 = (1.0 - factor) / dim;
        let fac2 = fac1 - factor;
        let trial: Vec<f64> = self
            .sum
            .iter()
            .zip(self.vertices[hi].iter())
            .map(|(s, p)| s * fac1 - p * fac2)
            .collect();

        let value = objective(&trial);
        self.evaluations += 1;
        if value < self.values[hi] {
            self.values[hi] = value;
            for ((s, p), t) in self.sum.iter_mut().zip(self.vertices[hi].iter()).zip(trial.iter()) {
                *s += t - p;
            }
            self.vertices[hi] = trial;
        }
        value
    }

    fn shrink_toward<F>(&mut self, best: usize, objective: &mut F)
    where
        F: FnMut(&[f64]) -> f64,
    {
        let anchor = self.vertices[best].clone();
        for i in 0..self.vertices.len() {
            if i == best {
                continue;
            }
            for (p, a) in self.vertices[i].iter_mut().zip(anchor.iter()) {
                *p = 0.5 * (*p + a);
            }
            self.values[i] = objective(&self.vertices[i]);
            self.evaluations += 1;
        }
        self.recompute_sum();
    }
}
