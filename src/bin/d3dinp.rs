//! Command line tool to write a DIF3D input from a core snapshot
//!
//! Reads a JSON core snapshot and optional solver options, addresses the
//! geometry on the uniform axial mesh, and renders the `A.DIF3D`, `A.NIP3`,
//! and `A.SUMMAR` blocks.
//!
//! # Usage
//!
//! ```text
//! Usage: d3dinp <core> [options]
//! ```
//!
//! Help is printed with the `-h` flag, and `--help` will show examples, default
//! values, examples, and any important behaviour.
//!
//! ## Options
//!
//! ### > How to change the solver settings
//!
//! Settings are read from a JSON file with `--options`. Anything not listed
//! in the file keeps its default.
//!
//! ```bash
//! # Real and adjoint nodal run with 60 outers at most
//! echo '{"solution": "real-and-adjoint", "max_outers": 60}' > opts.json
//! d3dinp core.json --options opts.json
//! ```
//!
//! ### > How to set the eigenvalue guess
//!
//! ```bash
//! # Start the outers from the last known eigenvalue
//! d3dinp core.json --keff 1.0083
//! ```

// crate modules
use dif3d::geometry::Addressing;
use dif3d::input::InputWriter;
use dif3d::model::Core;
use dif3d::options::SolverOptions;
use dif3d::utils::f;

// external crates
use anyhow::{Context, Result};
use clap::{arg, Parser};
use log::*;

#[doc(hidden)]
fn main() -> Result<()> {
    // set up the command line interface and match arguments
    let cli: Cli = Cli::parse();

    // set up logging (+2 to make 'Info' the default)
    let verbosity = cli.verbose as usize + 2;
    logging_init(verbosity, cli.quiet);

    let options = read_options(&cli)?;

    info!("Reading core snapshot from \"{}\"", cli.core);
    let core = Core::from_file(&cli.core).with_context(|| f!("Could not load {}", cli.core))?;

    let addressing = Addressing::new(&core, &options)?;

    let path = cli.output.clone().unwrap_or_else(|| options.input_file());
    info!("Writing input to \"{path}\"");
    InputWriter::new(&core, &options, &addressing)
        .keff_guess(cli.keff)
        .write(&path)?;

    info!(
        "  - {} regions, {} axial zones",
        addressing.regions.len(),
        addressing.axial_zones.len()
    );
    Ok(())
}

/// Write a DIF3D input file for a core snapshot
///
/// The core snapshot is a JSON export of the reactor model. Solver settings
/// come from an optional JSON options file, with every field defaulted.
///
/// Examples
/// --------
///
///  Typical use
///     $ d3dinp core.json
///
///  Custom settings and eigenvalue guess
///     $ d3dinp core.json --options opts.json --keff 1.0083
///
///  Change the output file name from '<label>.inp'
///     $ d3dinp core.json --output case.inp
///
#[doc(hidden)]
#[derive(Parser)]
#[command(
    verbatim_doc_comment,
    arg_required_else_help(true),
    before_help(banner()),
    after_help("Typical use: d3dinp core.json\n\nNOTE: --help shows more detail and examples"),
    term_width(70),
    hide_possible_values(true),
    override_usage("d3dinp <core> [options]")
)]
struct Cli {
    // * Positional
    /// Path to the JSON core snapshot
    #[arg(name = "core")]
    core: String,

    /// JSON file of solver options
    ///
    /// Every field is optional and defaults to a real, nodal, k-effective
    /// run with extrapolated boundaries.
    #[arg(help_heading("Input options"))]
    #[arg(long)]
    #[arg(value_name = "path")]
    options: Option<String>,

    /// Initial k-effective guess ('1.0' default)
    #[arg(help_heading("Input options"))]
    #[arg(short, long)]
    #[arg(value_name = "keff")]
    #[arg(default_value = "1.0")]
    keff: f64,

    /// Name of the input file ('<label>.inp' default)
    #[arg(help_heading("Input options"))]
    #[arg(short, long)]
    #[arg(value_name = "path")]
    output: Option<String>,

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

#[doc(hidden)]
fn read_options(cli: &Cli) -> Result<SolverOptions> {
    match &cli.options {
        Some(path) => {
            info!("Reading solver options from \"{path}\"");
            SolverOptions::from_file(path).with_context(|| f!("Could not load {path}"))
        }
        None => {
            debug!("Using default solver options");
            Ok(SolverOptions::default())
        }
    }
}

/// Sets up logging at runtime to allow for multiple verbosity levels
#[doc(hidden)]
fn logging_init(verbosity: usize, quiet: bool) {
    stderrlog::new()
        .modules(vec![
            module_path!(),
            "dif3d::geometry",
            "dif3d::input",
            "dif3d::options",
        ])
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
    s += &f!("{:^70}\n", "DIF3D :: Input");
    s += &f!("{:-<1$}", "", 70);
    s
}
