//! Command line tool to read the printed DIF3D output
//!
//! Pulls the eigenvalues, convergence, REGION TOTALS, and region group fluxes
//! out of a DIF3D output and writes them as JSON.
//!
//! # Usage
//!
//! ```text
//! Usage: d3dout <output> [options]
//! ```
//!
//! Help is printed with the `-h` flag, and `--help` will show examples, default
//! values, examples, and any important behaviour.
//!
//! ## Options
//!
//! ### > How to check the region order
//!
//! Given the core snapshot the output was made from, every table is checked
//! against the expected region labels.
//!
//! ```bash
//! d3dout case.out --core core.json
//! ```
//!
//! ### > How to check against the binary DIF3D file
//!
//! ```bash
//! # Warn if the eigenvalues differ by more than 1e-5 relative
//! d3dout case.out --summary DIF3D
//! ```

// crate modules
use dif3d::geometry::Addressing;
use dif3d::model::Core;
use dif3d::options::{SolutionType, SolverOptions};
use dif3d::readers::{OutputReader, SummaryReader};
use dif3d::utils::f;

// standard library
use std::path::Path;

// external crates
use anyhow::{Context, Result};
use clap::{arg, Parser, ValueEnum};
use log::*;

#[doc(hidden)]
fn main() -> Result<()> {
    // set up the command line interface and match arguments
    let cli: Cli = Cli::parse();

    // set up logging (+2 to make 'Info' the default)
    let verbosity = cli.verbose as usize + 2;
    logging_init(verbosity, cli.quiet);

    let mut reader = OutputReader::new();
    reader.set_solution(cli.solution.into());
    if cli.quiet || cli.verbose > 0 {
        reader.disable_progress();
    }

    if let Some(path) = &cli.core {
        info!("Reading expected regions from \"{path}\"");
        let core = Core::from_file(path).with_context(|| f!("Could not load {path}"))?;
        let addressing = Addressing::new(&core, &SolverOptions::default())?;
        reader.set_expected_regions(addressing.regions.labels());
    }

    info!("Reading \"{}\"", cli.output);
    let result = reader.parse(Path::new(&cli.output))?;
    info!("  - {}", result.summary());

    if let Some(path) = &cli.summary {
        let summary = SummaryReader::new().parse(Path::new(path))?;
        info!("DIF3D file:\n  > {}", summary.summary());
        summary.check_keff(&result);
    }

    let path = cli.json.clone().unwrap_or_else(|| f!("{}.json", cli.output));
    info!("Writing results to \"{path}\"");
    std::fs::write(&path, result.to_json()?)?;

    Ok(())
}

/// Read a printed DIF3D output into JSON
///
/// Every requested solution type must be in the output. A missing
/// convergence message is only a warning.
///
/// Examples
/// --------
///
///  Typical use
///     $ d3dout case.out
///
///  Real and adjoint solutions, checked against the core
///     $ d3dout case.out --solution real-and-adjoint --core core.json
///
///  Check the eigenvalue against the binary DIF3D file
///     $ d3dout case.out --summary DIF3D
///
#[doc(hidden)]
#[derive(Parser)]
#[command(
    verbatim_doc_comment,
    arg_required_else_help(true),
    before_help(banner()),
    after_help("Typical use: d3dout case.out\n\nNOTE: --help shows more detail and examples"),
    term_width(70),
    hide_possible_values(true),
    override_usage("d3dout <output> [options]")
)]
struct Cli {
    // * Positional
    /// Path to the printed DIF3D output
    #[arg(name = "output")]
    output: String,

    /// Solution types expected in the output
    ///
    /// Any of 'real' (default), 'adjoint', or 'real-and-adjoint'.
    #[arg(help_heading("Parse options"))]
    #[arg(short, long, value_enum)]
    #[arg(default_value = "real")]
    solution: CliSolution,

    /// Core snapshot to check the region order against
    ///
    /// Regions are addressed with the default uniform axial mesh.
    #[arg(help_heading("Parse options"))]
    #[arg(long)]
    #[arg(value_name = "path")]
    core: Option<String>,

    /// Binary DIF3D file to check the eigenvalue against
    #[arg(help_heading("Parse options"))]
    #[arg(long)]
    #[arg(value_name = "path")]
    summary: Option<String>,

    /// Name of the JSON file ('<output>.json' default)
    #[arg(help_heading("Parse options"))]
    #[arg(short, long)]
    #[arg(value_name = "path")]
    json: Option<String>,

    // * Flags
    /// Verbose logging (-v, -vv)
    ///
    /// If specified, the default log level of INFO is increased to DEBUG (-v)
    /// or TRACE (-vv). Errors and Warnings are always logged unless in quiet
    /// (-q) mode.
    #[arg(short, long)]
    #[arg(action = clap::ArgAction::Count)]
    verbose: u8,

    /// Supress all log output (overrules --verbose)
    #[arg(short, long)]
    quiet: bool,
}

// Wrapper for the solution type used by the readers
#[doc(hidden)]
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, ValueEnum)]
enum CliSolution {
    Real,
    Adjoint,
    RealAndAdjoint,
}

impl From<CliSolution> for SolutionType {
    fn from(value: CliSolution) -> Self {
        match value {
            CliSolution::Real => SolutionType::Real,
            CliSolution::Adjoint => SolutionType::Adjoint,
            CliSolution::RealAndAdjoint => SolutionType::RealAndAdjoint,
        }
    }
}

/// Sets up logging at runtime to allow for multiple verbosity levels
#[doc(hidden)]
fn logging_init(verbosity: usize, quiet: bool) {
    stderrlog::new()
        .modules(vec![module_path!(), "dif3d::readers", "dif3d::geometry"])
        .quiet(quiet)
        .verbosity(verbosity)
        .show_level(false)
        .color(stderrlog::ColorChoice::Never)
        .timestamp(stderrlog::Timestamp::Off)
        .init()
        .unwrap();
}

/// Creates a banner for the command line
#[doc(hidden)]
fn banner() -> String {
    let mut s = f!("{:-<1$}\n", "", 70);
    s += &f!("{:^70}\n", "DIF3D :: Output");
    s += &f!("{:-<1$}", "", 70);
    s
}
