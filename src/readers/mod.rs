//! Readers for the files DIF3D leaves behind

// internal modules
use crate::error::Result;
use crate::options::SolutionType;
use crate::result::SolverResult;

// standard library
use std::path::Path;

// files under the readers module
mod output_file;
pub mod parsers;
mod summary_file;

#[doc(inline)]
pub use crate::readers::output_file::OutputReader;

#[doc(inline)]
pub use crate::readers::summary_file::{OuterConvergence, RunSummary, SummaryReader, KEFF_TOLERANCE};

/// Read everything of interest from the printed DIF3D output
///
/// Returns a result containing the [SolverResult] extracted from the file at
/// `path`, requiring every solution type in `solution` to be present.
///
/// - `path` - Path to the output file, can be [&str], [String], [Path], etc...
/// - `solution` - Solution types that were requested from DIF3D
///
/// Example
/// ```ignore
/// // Read the real and adjoint eigenvalues and fluxes
/// let result = dif3d::read_output("path/to/dif3d.out", SolutionType::RealAndAdjoint)?;
/// ```
pub fn read_output<P: AsRef<Path>>(path: P, solution: SolutionType) -> Result<SolverResult> {
    let path: &Path = Path::new(path.as_ref());
    let mut reader = OutputReader::new();
    reader.disable_progress();
    reader.set_solution(solution);
    reader.parse(path)
}

/// Deserialise the binary `DIF3D` run summary file
///
/// Returns a Result containing a [RunSummary] with the convergence state,
/// eigenvalue and dominance ratio of the file at `path`.
pub fn read_summary_file<P: AsRef<Path>>(path: P) -> Result<RunSummary> {
    let path: &Path = Path::new(path.as_ref());
    let reader = SummaryReader::new();
    reader.parse(path)
}
