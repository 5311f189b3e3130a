//! Reservecraft: builds solver-ready reserve-design models.
//!
//! Reservecraft turns planning units (a cost grid or a polygon layer with a
//! `cost` attribute), feature distributions, and lock constraints into a
//! single canonical model: a cost vector, a sparse feature-by-planning-unit
//! representation matrix, a budget or per-feature targets, and lock sets.
//! Solving the model is left to an external optimizer.
//!
//! # Modules
//!
//! - [`ir`]: Input and canonical model types, plus file formats
//! - [`rij`]: Representation-matrix construction from dense, triplet, tabular, or grid input
//! - [`inclusion`]: Exclusion of planning units with missing cost, and lock remapping
//! - [`targets`]: Relative and absolute target calculation
//! - [`summarize`]: Feature summarising over polygon planning units
//! - [`validation`]: Precondition checks and collected validation reports
//! - [`builder`]: The max-coverage and target-based model builders
//! - [`error`]: Error types for reservecraft operations

pub mod builder;
pub mod error;
pub mod inclusion;
pub mod ir;
pub mod rij;
pub mod summarize;
pub mod targets;
pub mod validation;

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand, ValueEnum};
use tracing::info;

pub use builder::{build_maxcoverage_model, build_target_model, ModelInputs, Objective, Problem};
pub use error::ReserveError;

/// The reservecraft CLI application.
#[derive(Parser)]
#[command(name = "reservecraft")]
#[command(version, author, about)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable debug logging (overridden by RESERVECRAFT_LOG).
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the canonical model for a problem file.
    Build(BuildArgs),
    /// Validate a problem file, reporting every issue found.
    Validate(ValidateArgs),
}

#[derive(clap::Args)]
struct BuildArgs {
    /// Problem file (JSON, or YAML with a .yaml/.yml extension).
    problem: PathBuf,

    /// Representation matrix file (.csv long-format table or .json matrix),
    /// replacing any matrix given in the problem file.
    #[arg(long)]
    rij: Option<PathBuf>,

    /// Write the model JSON here instead of stdout.
    #[arg(long, short)]
    output: Option<PathBuf>,

    /// Print a short model summary instead of the model JSON.
    #[arg(long)]
    summary: bool,
}

#[derive(clap::Args)]
struct ValidateArgs {
    /// Problem file (JSON, or YAML with a .yaml/.yml extension).
    problem: PathBuf,

    /// Representation matrix file, as for `build`.
    #[arg(long)]
    rij: Option<PathBuf>,

    /// Fail on warnings as well as errors.
    #[arg(long)]
    strict: bool,

    /// Report format.
    #[arg(long, value_enum, default_value_t = ReportFormat::Text)]
    output: ReportFormat,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum ReportFormat {
    Text,
    Json,
}

/// Parses the command line and runs the chosen subcommand.
pub fn run() -> Result<(), ReserveError> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Some(Commands::Build(args)) => run_build(args),
        Some(Commands::Validate(args)) => run_validate(args),
        None => {
            println!("reservecraft {}", env!("CARGO_PKG_VERSION"));
            println!();
            println!("Builds solver-ready reserve-design models.");
            println!();
            println!("Run 'reservecraft --help' for usage information.");
            Ok(())
        }
    }
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    // A subscriber may already be installed when embedded; keep it.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_env("RESERVECRAFT_LOG")
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .try_init();
}

/// Loads a problem file and applies an optional representation-matrix override.
fn load_problem(problem: &Path, rij: Option<&Path>) -> Result<Problem, ReserveError> {
    let mut problem = ir::io_problem::read_problem(problem)?;
    if let Some(path) = rij {
        problem.inputs.rij = Some(load_rij(path)?);
    }
    Ok(problem)
}

/// Reads a representation matrix, choosing the shape by file extension.
fn load_rij(path: &Path) -> Result<rij::RijInput, ReserveError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);
    match ext.as_deref() {
        Some("csv") => Ok(rij::RijInput::Table(ir::io_rij_csv::read_rij_csv(path)?)),
        Some("json") => {
            let reader = BufReader::new(File::open(path)?);
            serde_json::from_reader(reader).map_err(|source| ReserveError::RijJsonParse {
                path: path.to_path_buf(),
                source,
            })
        }
        _ => Err(ReserveError::UnsupportedInputType(format!(
            "representation matrix file '{}' (supported: .csv, .json)",
            path.display()
        ))),
    }
}

/// Builds a problem's model and prints or writes it.
fn run_build(args: BuildArgs) -> Result<(), ReserveError> {
    let problem = load_problem(&args.problem, args.rij.as_deref())?;
    let model = problem.build(&summarize::CellCentroidSummarizer)?;

    if args.summary {
        println!("{}", model);
        return Ok(());
    }

    match &args.output {
        Some(path) => {
            ir::io_model_json::write_model_json(path, &model)?;
            info!("wrote model to {}", path.display());
        }
        None => {
            let json = ir::io_model_json::to_model_json_string(&model).map_err(|source| {
                ReserveError::ModelJsonWrite {
                    path: PathBuf::from("<stdout>"),
                    source,
                }
            })?;
            println!("{}", json);
        }
    }
    Ok(())
}

/// Validates a problem and prints the collected report.
fn run_validate(args: ValidateArgs) -> Result<(), ReserveError> {
    let problem = load_problem(&args.problem, args.rij.as_deref())?;
    let report = validation::validate_problem(&problem, &summarize::CellCentroidSummarizer);

    match args.output {
        ReportFormat::Json => println!("{}", report.to_json_string()?),
        ReportFormat::Text => print!("{}", report),
    }

    if !report.is_ok() || (args.strict && !report.is_clean()) {
        Err(ReserveError::ValidationFailed {
            error_count: report.error_count(),
            warning_count: report.warning_count(),
            report,
        })
    } else {
        Ok(())
    }
}
