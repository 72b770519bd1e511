//! Sequencing of a single DIF3D run
//!
//! A [Run] moves strictly forward through its states:
//!
//! ```text
//! Configured -> InputRendered -> Executed -> Parsed -> MeshConverted -> Committed
//! ```
//!
//! Any stage that fails leaves the run in `Failed` with the [ErrorKind] of the
//! failure, and nothing moves it on from there. Calling a stage out of order
//! is an [Error::InvalidTransition] and leaves the state as it was.

// internal modules
use crate::convert::{MappedState, MeshConverter};
use crate::error::{Error, ErrorKind, Result, RunStateName};
use crate::geometry::Addressing;
use crate::input::InputWriter;
use crate::model::{Core, ReactorModel};
use crate::options::SolverOptions;
use crate::readers::{OutputReader, SummaryReader};
use crate::result::SolverResult;
use crate::utils::*;

// standard library
use std::fs::File;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

// external crates
use log::{debug, error, info, warn};

/// Name of the binary run summary DIF3D leaves in the run directory
pub const SUMMARY_FILE: &str = "DIF3D";

/// Where a [Run] is up to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Configured,
    InputRendered,
    Executed,
    Parsed,
    MeshConverted,
    Committed,
    Failed(ErrorKind),
}

impl RunState {
    pub fn name(&self) -> RunStateName {
        match self {
            Self::Configured => "Configured",
            Self::InputRendered => "InputRendered",
            Self::Executed => "Executed",
            Self::Parsed => "Parsed",
            Self::MeshConverted => "MeshConverted",
            Self::Committed => "Committed",
            Self::Failed(_) => "Failed",
        }
    }
}

/// Runs the solver on a rendered input
///
/// Implementations must leave the printed output at `output`. Anything else
/// the solver writes stays in `run_dir`.
pub trait Executor {
    fn execute(&self, input: &Path, output: &Path, run_dir: &Path) -> Result<()>;
}

/// Runs a DIF3D executable as a child process
///
/// The input is fed on stdin and stdout is captured to the output file, which
/// is how DIF3D expects to be driven.
#[derive(Debug, Clone)]
pub struct ProcessExecutor {
    executable: PathBuf,
}

impl ProcessExecutor {
    pub fn new<P: AsRef<Path>>(executable: P) -> Self {
        Self {
            executable: executable.as_ref().to_path_buf(),
        }
    }
}

impl Executor for ProcessExecutor {
    fn execute(&self, input: &Path, output: &Path, run_dir: &Path) -> Result<()> {
        let exe = self.executable.display();
        info!("Running {exe} on {}", input.display());

        let stdin = File::open(input)
            .map_err(|e| Error::ExecutionFailure(f!("Could not open {}: {e}", input.display())))?;
        let stdout = File::create(output)
            .map_err(|e| Error::ExecutionFailure(f!("Could not create {}: {e}", output.display())))?;

        let status = Command::new(&self.executable)
            .current_dir(run_dir)
            .stdin(Stdio::from(stdin))
            .stdout(Stdio::from(stdout))
            .status()
            .map_err(|e| Error::ExecutionFailure(f!("Could not run {exe}: {e}")))?;

        if !status.success() {
            return Err(Error::ExecutionFailure(f!("{exe} exited with {status}")));
        }

        debug!("{exe} finished with {status}");
        Ok(())
    }
}

/// Files worth keeping from a run directory for a given set of options
///
/// ```rust
/// # use dif3d::run::retrieved_files;
/// # use dif3d::options::SolverOptions;
/// let files = retrieved_files(&SolverOptions::default());
/// assert!(files.contains(&"RTFLUX"));
/// assert!(files.contains(&"NHFLUX"));
/// assert!(!files.contains(&"ATFLUX"));
/// ```
pub fn retrieved_files(options: &SolverOptions) -> Vec<&'static str> {
    let mut files = vec!["GEODST", "LABELS", SUMMARY_FILE];
    let nodal = options.approximation.is_nodal();
    if options.solution.includes_real() {
        files.extend(["RZFLUX", "RTFLUX", "PWDINT", "PKEDIT"]);
        if nodal {
            files.push("NHFLUX");
        }
    }
    if options.solution.includes_adjoint() {
        files.push("ATFLUX");
        if nodal {
            files.push("NAFLUX");
        }
    }
    files
}

/// One pass of snapshot, input, execution, parsing, and mapping
///
/// Example
/// ```ignore
///     let mut run = Run::new(options, "path/to/run_dir");
///     run.render_input(&model)?;
///     run.execute(&ProcessExecutor::new("dif3d"))?;
///     run.parse_output()?;
///     run.convert()?;
///     run.commit(&mut model)?;
/// ```
#[derive(Debug)]
pub struct Run {
    options: SolverOptions,
    run_dir: PathBuf,
    keff_guess: f64,
    state: RunState,
    core: Option<Core>,
    addressing: Option<Addressing>,
    result: Option<SolverResult>,
    mapped: Option<MappedState>,
}

/// High level methods
impl Run {
    pub fn new<P: AsRef<Path>>(options: SolverOptions, run_dir: P) -> Self {
        Self {
            options,
            run_dir: run_dir.as_ref().to_path_buf(),
            keff_guess: 1.0,
            state: RunState::Configured,
            core: None,
            addressing: None,
            result: None,
            mapped: None,
        }
    }

    /// Initial eigenvalue written to the input, 1.0 by default
    pub fn set_keff_guess(&mut self, keff: f64) {
        self.keff_guess = keff;
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    pub fn options(&self) -> &SolverOptions {
        &self.options
    }

    pub fn addressing(&self) -> Option<&Addressing> {
        self.addressing.as_ref()
    }

    pub fn result(&self) -> Option<&SolverResult> {
        self.result.as_ref()
    }

    pub fn mapped_state(&self) -> Option<&MappedState> {
        self.mapped.as_ref()
    }

    pub fn input_path(&self) -> PathBuf {
        self.run_dir.join(self.options.input_file())
    }

    pub fn output_path(&self) -> PathBuf {
        self.run_dir.join(self.options.output_file())
    }

    /// Retrievable files that the solver actually left in the run directory
    pub fn retrieved_files(&self) -> Vec<PathBuf> {
        retrieved_files(&self.options)
            .into_iter()
            .map(|f| self.run_dir.join(f))
            .filter(|p| p.exists())
            .collect()
    }

    /// Every stage in turn, stopping at the first failure
    pub fn run_all<M: ReactorModel, E: Executor>(
        &mut self,
        model: &mut M,
        executor: &E,
    ) -> Result<()> {
        self.render_input(model)?;
        self.execute(executor)?;
        self.parse_output()?;
        self.convert()?;
        self.commit(model)
    }
}

/// Stages
impl Run {
    /// Snapshot the model, address the geometry, and write the input file
    ///
    /// Geometry and option problems are found before the input is written.
    pub fn render_input<M: ReactorModel>(&mut self, model: &M) -> Result<()> {
        self.step(RunState::Configured, RunState::InputRendered, |run| {
            run.options.validate()?;
            let core = model.snapshot()?;
            let addressing = Addressing::new(&core, &run.options)?;

            std::fs::create_dir_all(&run.run_dir)?;
            InputWriter::new(&core, &run.options, &addressing)
                .keff_guess(run.keff_guess)
                .write(run.input_path())?;

            run.core = Some(core);
            run.addressing = Some(addressing);
            Ok(())
        })
    }

    /// Hand the input to the solver
    pub fn execute<E: Executor>(&mut self, executor: &E) -> Result<()> {
        self.step(RunState::InputRendered, RunState::Executed, |run| {
            let output = run.output_path();
            executor.execute(&run.input_path(), &output, &run.run_dir)?;
            if !output.exists() {
                return Err(Error::ExecutionFailure(f!(
                    "No output found at {}",
                    output.display()
                )));
            }
            Ok(())
        })
    }

    /// Read the printed output, checked against the addressed regions
    pub fn parse_output(&mut self) -> Result<()> {
        self.step(RunState::Executed, RunState::Parsed, |run| {
            let addressing = run.require_addressing(RunState::Parsed)?;

            let mut reader = OutputReader::new();
            reader.disable_progress();
            reader.set_solution(run.options.solution);
            reader.set_expected_regions(addressing.regions.labels());
            let result = reader.parse(&run.output_path())?;

            if run.options.strict_convergence {
                result.ensure_converged()?;
            }

            run.check_summary_file(&result);
            run.result = Some(result);
            Ok(())
        })
    }

    /// Map the parsed results onto the as-modeled blocks
    pub fn convert(&mut self) -> Result<()> {
        self.step(RunState::Parsed, RunState::MeshConverted, |run| {
            let to = RunState::MeshConverted;
            let (core, addressing, result) = match (&run.core, &run.addressing, &run.result) {
                (Some(c), Some(a), Some(r)) => (c, a, r),
                _ => return Err(run.missing(to)),
            };
            let mapped = MeshConverter::new(core, addressing).convert(result)?;
            run.mapped = Some(mapped);
            Ok(())
        })
    }

    /// Write the mapped state back to the model, once
    pub fn commit<M: ReactorModel>(&mut self, model: &mut M) -> Result<()> {
        self.step(RunState::MeshConverted, RunState::Committed, |run| {
            let mapped = run.mapped.clone().ok_or_else(|| run.missing(RunState::Committed))?;
            model.commit(mapped)
        })
    }
}

/// Internals
impl Run {
    /// Guard a stage and record its outcome
    fn step<F>(&mut self, from: RunState, to: RunState, stage: F) -> Result<()>
    where
        F: FnOnce(&mut Self) -> Result<()>,
    {
        if self.state != from {
            return Err(Error::InvalidTransition {
                from: self.state.name(),
                to: to.name(),
            });
        }

        match stage(self) {
            Ok(()) => {
                info!("{} -> {}", from.name(), to.name());
                self.state = to;
                Ok(())
            }
            Err(e) => {
                error!("{} failed: {e}", to.name());
                self.state = RunState::Failed(e.kind());
                Err(e)
            }
        }
    }

    fn require_addressing(&self, to: RunState) -> Result<&Addressing> {
        self.addressing.as_ref().ok_or_else(|| self.missing(to))
    }

    /// State that should exist at this point does not
    fn missing(&self, to: RunState) -> Error {
        Error::InvalidTransition {
            from: self.state.name(),
            to: to.name(),
        }
    }

    /// Cross-check against the binary summary, only ever a warning
    fn check_summary_file(&self, result: &SolverResult) {
        let path = self.run_dir.join(SUMMARY_FILE);
        if !path.exists() {
            debug!("No {SUMMARY_FILE} file to check against");
            return;
        }
        match SummaryReader::new().parse(&path) {
            Ok(summary) => {
                summary.check_keff(result);
            }
            Err(e) => warn!("Could not read {}: {e}", path.display()),
        }
    }
}
