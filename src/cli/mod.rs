//! Command-line parsing for `nirfit`.
//!
//! Argument parsing is kept separate from command dispatch (`app`) and from
//! the numerical code, which only ever sees the config structs in `domain`.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::domain::SlopeMethod;
use crate::fit::DEFAULT_TOLERANCE;

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "nirfit", version, about = "Least-squares, robust and simplex fitting for NIR calibration data")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Fit a 1-D polynomial y(x) to a point file.
    Poly(PolyArgs),
    /// Fit a 2-D polynomial surface z(x, y) to a point file.
    Surface(SurfaceArgs),
    /// Fit a straight line y(x), optionally outlier-resistant.
    Slope(SlopeArgs),
    /// Fit a Gaussian profile y(x) with the downhill simplex.
    Gauss(GaussArgs),
    /// Evaluate a 2-D polynomial model at one point.
    Eval(EvalArgs),
    /// Compare least-squares and robust line fits on synthetic data with outliers.
    Demo(DemoArgs),
}

/// Options shared by every point-file command.
#[derive(Debug, Args, Clone)]
pub struct InputArgs {
    /// CSV file with an `x`, `y` (and, for surfaces, `z`) header.
    #[arg(short = 'i', long, value_name = "CSV")]
    pub input: PathBuf,

    /// Export the fit result to JSON.
    #[arg(long, value_name = "JSON")]
    pub export: Option<PathBuf>,

    /// Number of largest residuals to list.
    #[arg(long, default_value_t = 5)]
    pub top: usize,
}

#[derive(Debug, Args, Clone)]
pub struct PolyArgs {
    #[command(flatten)]
    pub input: InputArgs,

    /// Polynomial degree.
    #[arg(short = 'd', long, default_value_t = 2)]
    pub degree: usize,

    /// Fit in the Legendre basis P_k(x) instead of powers of x.
    #[arg(long)]
    pub legendre: bool,
}

#[derive(Debug, Args, Clone)]
pub struct SurfaceArgs {
    #[command(flatten)]
    pub input: InputArgs,

    /// Maximum total degree dx + dy.
    #[arg(short = 'd', long, default_value_t = 2)]
    pub degree: u32,

    /// Term selection, e.g. "(0,0) (1,0) (0,1)". Defaults to every term up to --degree.
    #[arg(long)]
    pub terms: Option<String>,
}

#[derive(Debug, Args, Clone)]
pub struct SlopeArgs {
    #[command(flatten)]
    pub input: InputArgs,

    /// Line estimator.
    #[arg(short = 'm', long, value_enum, default_value_t = SlopeMethod::Robust)]
    pub method: SlopeMethod,
}

#[derive(Debug, Args, Clone)]
pub struct GaussArgs {
    #[command(flatten)]
    pub input: InputArgs,

    /// Relative convergence tolerance on the objective.
    #[arg(long, default_value_t = DEFAULT_TOLERANCE)]
    pub tolerance: f64,

    /// Maximum number of objective evaluations.
    #[arg(long, default_value_t = 5000)]
    pub max_evaluations: usize,
}

#[derive(Debug, Args, Clone)]
pub struct EvalArgs {
    /// Model descriptor "dx dy coeff dx dy coeff ...".
    #[arg(long, conflicts_with = "table", required_unless_present = "table")]
    pub poly: Option<String>,

    /// CSV coefficient table with `degx`, `degy`, `coeff` columns.
    #[arg(long, value_name = "CSV")]
    pub table: Option<PathBuf>,

    #[arg(short = 'x', long, allow_negative_numbers = true)]
    pub x: f64,

    #[arg(short = 'y', long, allow_negative_numbers = true)]
    pub y: f64,
}

#[derive(Debug, Args, Clone)]
pub struct DemoArgs {
    /// Random seed for the synthetic sample.
    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    /// Number of synthetic points.
    #[arg(short = 'n', long, default_value_t = 100)]
    pub count: usize,

    /// Fraction of points turned into outliers (0..1).
    #[arg(long, default_value_t = 0.3)]
    pub outlier_fraction: f64,

    /// Export the comparison to JSON.
    #[arg(long, value_name = "JSON")]
    pub export: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_poly_with_defaults() {
        let cli = Cli::try_parse_from(["nirfit", "poly", "--input", "pts.csv"]).unwrap();
        let Command::Poly(args) = cli.command else {
            panic!("expected poly");
        };
        assert_eq!(args.degree, 2);
        assert!(!args.legendre);
        assert_eq!(args.input.top, 5);
        assert!(args.input.export.is_none());
    }

    #[test]
    fn parses_slope_method() {
        let cli = Cli::try_parse_from(["nirfit", "slope", "-i", "pts.csv", "--method", "ols"]).unwrap();
        let Command::Slope(args) = cli.command else {
            panic!("expected slope");
        };
        assert_eq!(args.method, SlopeMethod::Ols);
    }

    #[test]
    fn eval_needs_exactly_one_model_source() {
        assert!(Cli::try_parse_from(["nirfit", "eval", "-x", "1", "-y", "2"]).is_err());
        assert!(
            Cli::try_parse_from(["nirfit", "eval", "--poly", "0 0 1", "--table", "t.csv", "-x", "1", "-y", "2"])
                .is_err()
        );
        let cli = Cli::try_parse_from(["nirfit", "eval", "--poly", "0 0 1", "-x", "-1.5", "-y", "2"]).unwrap();
        let Command::Eval(args) = cli.command else {
            panic!("expected eval");
        };
        assert_eq!(args.x, -1.5);
    }
}
