//! Command line tool to run a full DIF3D calculation
//!
//! Renders the input for a core snapshot, runs DIF3D on it, reads the output,
//! and writes the results mapped back onto the as-modeled blocks as JSON.
//!
//! # Usage
//!
//! ```text
//! Usage: d3drun <core> --exe <path> [options]
//! ```
//!
//! Help is printed with the `-h` flag, and `--help` will show examples, default
//! values, examples, and any important behaviour.
//!
//! ## Options
//!
//! ### > How to run somewhere else
//!
//! Everything DIF3D writes stays in the run directory, which defaults to the
//! current directory.
//!
//! ```bash
//! d3drun core.json --exe /opt/dif3d/dif3d.x --run-dir runs/case1
//! ```
//!
//! ### > How to fail on unconverged runs
//!
//! Set `"strict_convergence": true` in the options file. Otherwise a missing
//! convergence message is only a warning.

// crate modules
use dif3d::convert::MappedState;
use dif3d::model::{Core, ReactorModel};
use dif3d::options::SolverOptions;
use dif3d::run::{ProcessExecutor, Run};
use dif3d::utils::f;

// standard library
use std::path::PathBuf;

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

    let options = match &cli.options {
        Some(path) => {
            SolverOptions::from_file(path).with_context(|| f!("Could not load {path}"))?
        }
        None => SolverOptions::default(),
    };

    let mut model = JsonModel {
        core: PathBuf::from(&cli.core),
        results: cli
            .results
            .clone()
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(&cli.run_dir).join(f!("{}.json", options.label))),
    };

    let mut run = Run::new(options, &cli.run_dir);
    run.set_keff_guess(cli.keff);

    let executor = ProcessExecutor::new(&cli.exe);
    if let Err(e) = run.run_all(&mut model, &executor) {
        error!("Run stopped in state {:?}", run.state());
        return Err(e.into());
    }

    if let Some(result) = run.result() {
        info!("  - {}", result.summary());
    }
    for path in run.retrieved_files() {
        debug!("  - retrieved {}", path.display());
    }

    Ok(())
}

/// Core snapshot read from JSON, results written back as JSON
#[doc(hidden)]
struct JsonModel {
    core: PathBuf,
    results: PathBuf,
}

impl ReactorModel for JsonModel {
    fn snapshot(&self) -> dif3d::Result<Core> {
        info!("Reading core snapshot from \"{}\"", self.core.display());
        Core::from_file(&self.core)
    }

    fn commit(&mut self, state: MappedState) -> dif3d::Result<()> {
        info!("Writing mapped results to \"{}\"", self.results.display());
        let json = serde_json::to_string_pretty(&state).map_err(std::io::Error::from)?;
        std::fs::write(&self.results, json)?;
        Ok(())
    }
}

/// Render, run, parse, and map a DIF3D calculation
///
/// The input is fed to the executable on stdin, and stdout is kept as
/// '<label>.out' in the run directory.
///
/// Examples
/// --------
///
///  Typical use
///     $ d3drun core.json --exe dif3d.x
///
///  Custom settings in a separate run directory
///     $ d3drun core.json --exe dif3d.x --options opts.json --run-dir case1
///
///  Change the results file from '<run-dir>/<label>.json'
///     $ d3drun core.json --exe dif3d.x --results mapped.json
///
#[doc(hidden)]
#[derive(Parser)]
#[command(
    verbatim_doc_comment,
    arg_required_else_help(true),
    before_help(banner()),
    after_help("Typical use: d3drun core.json --exe dif3d.x\n\nNOTE: --help shows more detail and examples"),
    term_width(70),
    hide_possible_values(true),
    override_usage("d3drun <core> --exe <path> [options]")
)]
struct Cli {
    // * Positional
    /// Path to the JSON core snapshot
    #[arg(name = "core")]
    core: String,

    /// Path to the DIF3D executable
    #[arg(help_heading("Run options"))]
    #[arg(short, long)]
    #[arg(value_name = "path")]
    exe: String,

    /// JSON file of solver options
    #[arg(help_heading("Run options"))]
    #[arg(long)]
    #[arg(value_name = "path")]
    options: Option<String>,

    /// Directory to run in ('.' default)
    #[arg(help_heading("Run options"))]
    #[arg(long)]
    #[arg(value_name = "path")]
    #[arg(default_value = ".")]
    run_dir: String,

    /// Initial k-effective guess ('1.0' default)
    #[arg(help_heading("Run options"))]
    #[arg(short, long)]
    #[arg(value_name = "keff")]
    #[arg(default_value = "1.0")]
    keff: f64,

    /// Mapped results file ('<run-dir>/<label>.json' default)
    #[arg(help_heading("Run options"))]
    #[arg(short, long)]
    #[arg(value_name = "path")]
    results: Option<String>,

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

/// Sets up logging at runtime to allow for multiple verbosity levels
#[doc(hidden)]
fn logging_init(verbosity: usize, quiet: bool) {
    stderrlog::new()
        .modules(vec![module_path!(), "dif3d"])
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
    s += &f!("{:^70}\n", "DIF3D :: Run");
    s += &f!("{:-<1$}", "", 70);
    s
}
