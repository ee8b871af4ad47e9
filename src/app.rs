//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - sets up logging
//! - parses CLI arguments into config structs
//! - runs the fit pipeline
//! - prints reports and writes optional exports

use clap::Parser;
use log::info;

use crate::cli::{Command, DemoArgs, EvalArgs, GaussArgs, InputArgs, PolyArgs, SlopeArgs, SurfaceArgs};
use crate::domain::{DemoConfig, EvalConfig, FitConfig, FitTask, ModelSource};
use crate::error::AppError;
use crate::models::Poly2d;

pub mod pipeline;

/// Environment variable holding the `env_logger` filter.
pub const LOG_ENV: &str = "NIRFIT_LOG";

/// Entry point for the `nirfit` binary.
pub fn run() -> Result<(), AppError> {
    // A local .env may set NIRFIT_LOG.
    dotenvy::dotenv().ok();
    init_logging();

    let cli = crate::cli::Cli::parse();

    match cli.command {
        Command::Poly(args) => {
            let top = args.input.top;
            handle_fit(&poly_config_from_args(&args), top)
        }
        Command::Surface(args) => {
            let top = args.input.top;
            handle_fit(&surface_config_from_args(&args), top)
        }
        Command::Slope(args) => {
            let top = args.input.top;
            handle_fit(&slope_config_from_args(&args), top)
        }
        Command::Gauss(args) => {
            let top = args.input.top;
            handle_fit(&gauss_config_from_args(&args), top)
        }
        Command::Eval(args) => handle_eval(&eval_config_from_args(&args)?),
        Command::Demo(args) => handle_demo(&demo_config_from_args(&args)),
    }
}

fn init_logging() {
    let env = env_logger::Env::default().filter_or(LOG_ENV, "warn");
    // Ignore a second initialization (e.g. when `run` is called from tests).
    let _ = env_logger::Builder::from_env(env).try_init();
}

fn handle_fit(config: &FitConfig, top: usize) -> Result<(), AppError> {
    let run = pipeline::run_fit(config)?;

    println!("{}", crate::report::format_load_summary(&config.input, &run.loaded));
    println!("{}", crate::report::format_fit_outcome(&run.outcome));

    let summary = crate::report::summarize(&run.residuals);
    let worst = crate::report::largest_residuals(&run.residuals, top);
    println!("{}", crate::report::format_residuals(&summary, &worst));

    if let Some(path) = &config.export {
        crate::io::write_result_json(path, config.task.command_name(), &run.outcome)?;
        info!("exported {} result to '{}'", config.task.command_name(), path.display());
    }

    Ok(())
}

fn handle_eval(config: &EvalConfig) -> Result<(), AppError> {
    let poly = load_model(&config.model)?;
    let value = poly.evaluate(config.x, config.y);
    print!("{}", crate::report::format_evaluation(&poly, config.x, config.y, value));
    Ok(())
}

fn handle_demo(config: &DemoConfig) -> Result<(), AppError> {
    let run = pipeline::run_demo(config)?;
    println!("{}", crate::report::format_demo(&run));

    if let Some(path) = &config.export {
        crate::io::write_result_json(path, "demo", &run)?;
    }
    Ok(())
}

/// Resolve a model source into a `Poly2d`.
pub fn load_model(source: &ModelSource) -> Result<Poly2d, AppError> {
    match source {
        ModelSource::Descriptor(s) => s
            .parse()
            .map_err(|e| AppError::new(2, format!("Invalid polynomial descriptor: {e}"))),
        ModelSource::Table(path) => crate::io::read_poly2d_csv(path),
    }
}

fn fit_config(input: &InputArgs, task: FitTask) -> FitConfig {
    FitConfig {
        input: input.input.clone(),
        task,
        export: input.export.clone(),
    }
}

pub fn poly_config_from_args(args: &PolyArgs) -> FitConfig {
    fit_config(
        &args.input,
        FitTask::Poly {
            degree: args.degree,
            legendre: args.legendre,
        },
    )
}

pub fn surface_config_from_args(args: &SurfaceArgs) -> FitConfig {
    fit_config(
        &args.input,
        FitTask::Surface {
            max_degree: args.degree,
            terms: args.terms.clone(),
        },
    )
}

pub fn slope_config_from_args(args: &SlopeArgs) -> FitConfig {
    fit_config(&args.input, FitTask::Slope { method: args.method })
}

pub fn gauss_config_from_args(args: &GaussArgs) -> FitConfig {
    fit_config(
        &args.input,
        FitTask::Gauss {
            tolerance: args.tolerance,
            max_evaluations: args.max_evaluations,
        },
    )
}

pub fn eval_config_from_args(args: &EvalArgs) -> Result<EvalConfig, AppError> {
    let model = match (&args.poly, &args.table) {
        (Some(s), None) => ModelSource::Descriptor(s.clone()),
        (None, Some(path)) => ModelSource::Table(path.clone()),
        _ => return Err(AppError::new(2, "Give exactly one of --poly or --table.")),
    };
    Ok(EvalConfig {
        model,
        x: args.x,
        y: args.y,
    })
}

pub fn demo_config_from_args(args: &DemoArgs) -> DemoConfig {
    DemoConfig {
        seed: args.seed,
        count: args.count,
        outlier_fraction: args.outlier_fraction,
        export: args.export.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::Cli;
    use crate::domain::SlopeMethod;

    fn parse(argv: &[&str]) -> Command {
        Cli::try_parse_from(argv).unwrap().command
    }

    #[test]
    fn surface_args_become_config() {
        let Command::Surface(args) = parse(&[
            "nirfit", "surface", "-i", "s.csv", "-d", "3", "--terms", "(0,0) (1,1)", "--export", "out.json",
        ]) else {
            panic!("expected surface");
        };
        let config = surface_config_from_args(&args);
        assert_eq!(config.input.to_str(), Some("s.csv"));
        assert_eq!(config.export.as_deref().and_then(|p| p.to_str()), Some("out.json"));
        assert_eq!(
            config.task,
            FitTask::Surface {
                max_degree: 3,
                terms: Some("(0,0) (1,1)".to_string())
            }
        );
    }

    #[test]
    fn slope_and_gauss_args_become_config() {
        let Command::Slope(args) = parse(&["nirfit", "slope", "-i", "a.csv", "-m", "proportional"]) else {
            panic!("expected slope");
        };
        assert_eq!(
            slope_config_from_args(&args).task,
            FitTask::Slope {
                method: SlopeMethod::Proportional
            }
        );

        let Command::Gauss(args) = parse(&["nirfit", "gauss", "-i", "a.csv", "--max-evaluations", "200"]) else {
            panic!("expected gauss");
        };
        assert_eq!(
            gauss_config_from_args(&args).task,
            FitTask::Gauss {
                tolerance: crate::fit::DEFAULT_TOLERANCE,
                max_evaluations: 200
            }
        );
    }

    #[test]
    fn eval_loads_descriptor_model() {
        let Command::Eval(args) = parse(&["nirfit", "eval", "--poly", "0 0 12.0 1 0 24.0", "-x", "2", "-y", "0"])
        else {
            panic!("expected eval");
        };
        let config = eval_config_from_args(&args).unwrap();
        let poly = load_model(&config.model).unwrap();
        assert_eq!(poly.evaluate(config.x, config.y), 60.0);
    }

    #[test]
    fn bad_descriptor_is_usage_error() {
        let err = load_model(&ModelSource::Descriptor("0 0".to_string())).unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn demo_args_become_config() {
        let Command::Demo(args) = parse(&["nirfit", "demo", "--seed", "7", "-n", "50"]) else {
            panic!("expected demo");
        };
        let config = demo_config_from_args(&args);
        assert_eq!(config.seed, 7);
        assert_eq!(config.count, 50);
        assert!((config.outlier_fraction - 0.3).abs() < 1e-12);
    }
}
