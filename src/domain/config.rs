//! Run configuration for the `nirfit` commands.
//!
//! These are plain values built from CLI arguments (see `app`), so the
//! library side never depends on clap types.

use std::path::PathBuf;

use crate::domain::SlopeMethod;

/// What a point-file command fits.
#[derive(Debug, Clone, PartialEq)]
pub enum FitTask {
    /// `y(x)` polynomial of the given degree, optionally in the Legendre basis.
    Poly { degree: usize, legendre: bool },
    /// `z(x, y)` surface; `terms` is a control string, `None` selects every
    /// term up to `max_degree`.
    Surface { max_degree: u32, terms: Option<String> },
    Slope { method: SlopeMethod },
    Gauss { tolerance: f64, max_evaluations: usize },
}

impl FitTask {
    /// Command name used in logs and export envelopes.
    pub fn command_name(&self) -> &'static str {
        match self {
            FitTask::Poly { .. } => "poly",
            FitTask::Surface { .. } => "surface",
            FitTask::Slope { .. } => "slope",
            FitTask::Gauss { .. } => "gauss",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FitConfig {
    pub input: PathBuf,
    pub task: FitTask,
    pub export: Option<PathBuf>,
}

/// Where `eval` takes its model from.
#[derive(Debug, Clone, PartialEq)]
pub enum ModelSource {
    Descriptor(String),
    Table(PathBuf),
}

#[derive(Debug, Clone, PartialEq)]
pub struct EvalConfig {
    pub model: ModelSource,
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DemoConfig {
    pub seed: u64,
    pub count: usize,
    pub outlier_fraction: f64,
    pub export: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_names_match_subcommands() {
        assert_eq!(
            FitTask::Poly {
                degree: 2,
                legendre: false
            }
            .command_name(),
            "poly"
        );
        assert_eq!(
            FitTask::Slope {
                method: SlopeMethod::Robust
            }
            .command_name(),
            "slope"
        );
    }
}
