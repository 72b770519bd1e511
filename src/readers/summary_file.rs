//! Reader for the binary `DIF3D` run summary file
//!
//! DIF3D keeps the state of a run in a small file of FORTRAN sequential
//! records, each written as a 4-byte length, the payload, then the length
//! again. Only the first four records are of interest:
//!
//! | Record  | Content                                           |
//! | ------- | ------------------------------------------------- |
//! | File ID | 28 characters, usually blank                      |
//! | 1D      | 25 integers, unused here                          |
//! | 2D      | 47 integer controls (`IPROBT`, `ISOLNT`, `IRETRN`) |
//! | 3D      | 30 doubles (`EFFK`, `SIGBAR`)                     |
//!
//! Values are little endian with 4-byte integers.

// internal modules
use crate::error::{Error, Result};
use crate::options::{ProblemType, SolutionType};
use crate::result::SolverResult;
use crate::utils::*;

// standard library
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

// external crates
use bincode::deserialize;
use log::{debug, warn};
use serde::{Deserialize, Serialize};

const FILE_ID_BYTES: usize = 28;
const RECORD_1D_BYTES: usize = 25 * std::mem::size_of::<i32>();
const RECORD_2D_BYTES: usize = 47 * std::mem::size_of::<i32>();
const RECORD_3D_BYTES: usize = 30 * std::mem::size_of::<f64>();

/// Relative k-effective difference tolerated against the printed output
pub const KEFF_TOLERANCE: f64 = 1.0e-5;

/// State of the outer iterations when DIF3D stopped (`IRETRN`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum OuterConvergence {
    NoIterations,
    Converged,
    OutersLimitReached,
    TimeLimitReached,
}

impl OuterConvergence {
    fn from_code(code: i32) -> Option<Self> {
        match code {
            0 => Some(Self::NoIterations),
            1 => Some(Self::Converged),
            2 => Some(Self::OutersLimitReached),
            3 => Some(Self::TimeLimitReached),
            _ => None,
        }
    }
}

/// The useful parts of a `DIF3D` file
///
/// Note that a real and adjoint run leaves only the adjoint flag behind, so
/// `solution` is the last solve done rather than what was requested.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunSummary {
    /// File identification, trimmed
    pub label: String,
    pub problem: ProblemType,
    pub solution: SolutionType,
    /// Restart flag `IRSTRT`
    pub restart: i32,
    pub convergence: OuterConvergence,
    pub keff: f64,
    /// Dominance ratio `SIGBAR`, zero for some kernels
    pub dominance_ratio: f64,
}

impl RunSummary {
    /// Multi-line description for logging
    pub fn summary(&self) -> String {
        [
            f!("keff = {:.11}", self.keff),
            f!("Dominance ratio = {}", self.dominance_ratio.sci(5, 2)),
            f!("Problem type = {:?}", self.problem),
            f!("Solution type = {:?}", self.solution),
            f!("Restart = {}", self.restart),
            f!("Convergence = {:?}", self.convergence),
        ]
        .join("\n  > ")
    }

    /// Compare against the eigenvalue from the printed output
    ///
    /// Returns whether the two agree, warning when they do not. A mismatch is
    /// not an error as either file may be left over from an earlier run.
    pub fn check_keff(&self, result: &SolverResult) -> bool {
        let Some(printed) = result.keff() else {
            return true;
        };
        let difference = relative_difference(printed, self.keff);
        if difference > KEFF_TOLERANCE {
            warn!(
                "k-effective differs between output ({printed:.11}) and DIF3D file ({:.11})",
                self.keff
            );
            false
        } else {
            debug!("k-effective consistent to {}", difference.sci(2, 2));
            true
        }
    }
}

/// Integer controls of the 2D record, named up to `IRETRN`
#[derive(Debug, Deserialize)]
struct IntControls {
    iprobt: i32,
    isolnt: i32,
    _ixtrap: i32,
    _minbsz: i32,
    _noutmx: i32,
    irstrt: i32,
    _limtim: i32,
    _nupmax: i32,
    _iosave: i32,
    _iomeg: i32,
    _inrmax: i32,
    _numorp: i32,
    iretrn: i32,
    _remaining: ([i32; 32], [i32; 2]),
}

/// Real controls of the 3D record
#[derive(Debug, Deserialize)]
struct KeffControls {
    _eps: [f64; 3],
    effk: f64,
    _fismin: f64,
    _psinrm: f64,
    _powin: f64,
    sigbar: f64,
    _effkq: f64,
    _epswp: f64,
    _dummy: [f64; 20],
}

/// A simple reader for the `DIF3D` binary
#[derive(Debug, Default)]
pub struct SummaryReader {}

impl SummaryReader {
    /// Just calls Default::default(), nothing special to be initialised
    pub fn new() -> Self {
        Default::default()
    }

    pub fn parse(&self, path: &Path) -> Result<RunSummary> {
        debug!("Reading DIF3D file {}", path.display());
        let mut reader = BufReader::new(File::open(path)?);
        self.parse_reader(&mut reader)
    }

    pub fn parse_reader<R: Read>(&self, reader: &mut R) -> Result<RunSummary> {
        let file_id = read_record(reader, "file ID", FILE_ID_BYTES)?;
        let label = String::from_utf8_lossy(&file_id).trim().to_string();

        // 1D record holds nothing needed
        read_record(reader, "1D", RECORD_1D_BYTES)?;

        let record = read_record(reader, "2D", RECORD_2D_BYTES)?;
        let controls: IntControls = deserialize(&record).map_err(|e| bad_record("2D", e))?;

        let record = read_record(reader, "3D", RECORD_3D_BYTES)?;
        let keff: KeffControls = deserialize(&record).map_err(|e| bad_record("3D", e))?;

        let summary = RunSummary {
            label,
            problem: ProblemType::from_code(controls.iprobt as i64)
                .ok_or_else(|| bad_record("2D", f!("unknown IPROBT {}", controls.iprobt)))?,
            solution: SolutionType::from_code(controls.isolnt as i64)
                .ok_or_else(|| bad_record("2D", f!("unknown ISOLNT {}", controls.isolnt)))?,
            restart: controls.irstrt,
            convergence: OuterConvergence::from_code(controls.iretrn)
                .ok_or_else(|| bad_record("2D", f!("unknown IRETRN {}", controls.iretrn)))?,
            keff: keff.effk,
            dominance_ratio: keff.sigbar,
        };

        debug!("DIF3D file:\n  > {}", summary.summary());
        Ok(summary)
    }
}

/// Read one FORTRAN sequential record of a known length
fn read_record<R: Read>(reader: &mut R, name: &str, expected: usize) -> Result<Vec<u8>> {
    // `size_of` is less error prone but could just be 4
    let mut buffer = [0u8; std::mem::size_of::<i32>()];

    reader.read_exact(&mut buffer)?;
    let length = i32::from_le_bytes(buffer);
    if length != expected as i32 {
        return Err(bad_record(
            name,
            f!("expected {expected} bytes, found {length}"),
        ));
    }

    let mut payload = vec![0u8; expected];
    reader.read_exact(&mut payload)?;

    // closing length should match the opening one
    reader.read_exact(&mut buffer)?;
    if i32::from_le_bytes(buffer) != length {
        return Err(bad_record(
            name,
            f!("record closes with {}", i32::from_le_bytes(buffer)),
        ));
    }

    Ok(payload)
}

fn bad_record(name: &str, reason: impl std::fmt::Display) -> Error {
    Error::parse(&f!("DIF3D {name} record"), reason.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    fn record(payload: &[u8]) -> Vec<u8> {
        let mut bytes = (payload.len() as i32).to_le_bytes().to_vec();
        bytes.extend_from_slice(payload);
        bytes.extend_from_slice(&(payload.len() as i32).to_le_bytes());
        bytes
    }

    /// A complete file in memory with the given controls
    fn summary_bytes(isolnt: i32, iretrn: i32, effk: f64, sigbar: f64) -> Vec<u8> {
        let mut ints = vec![0i32; 47];
        ints[1] = isolnt;
        ints[4] = 40;
        ints[12] = iretrn;
        let mut reals = vec![0.0f64; 30];
        reals[3] = effk;
        reals[7] = sigbar;

        let mut bytes = record(&[b' '; FILE_ID_BYTES]);
        bytes.extend(record(&[0u8; RECORD_1D_BYTES]));
        bytes.extend(record(
            &ints.iter().flat_map(|i| i.to_le_bytes()).collect::<Vec<u8>>(),
        ));
        bytes.extend(record(
            &reals.iter().flat_map(|r| r.to_le_bytes()).collect::<Vec<u8>>(),
        ));
        bytes
    }

    #[test]
    fn read_summary() {
        let bytes = summary_bytes(1, 1, 1.0083017198449564, 0.750317601546759);
        let summary = SummaryReader::new()
            .parse_reader(&mut bytes.as_slice())
            .unwrap();
        assert_eq!(summary.keff, 1.0083017198449564);
        assert_eq!(summary.dominance_ratio, 0.750317601546759);
        assert_eq!(summary.solution, SolutionType::Adjoint);
        assert_eq!(summary.convergence, OuterConvergence::Converged);
        assert_eq!(summary.label, "");
        assert!(summary.summary().contains("keff"));
    }

    #[test]
    fn bad_record_length() {
        let mut bytes = summary_bytes(0, 1, 1.0, 0.0);
        bytes[0] = 27;
        let err = SummaryReader::new()
            .parse_reader(&mut bytes.as_slice())
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ParseFailure);
    }

    #[test]
    fn unknown_convergence_code() {
        let bytes = summary_bytes(0, 9, 1.0, 0.0);
        let err = SummaryReader::new()
            .parse_reader(&mut bytes.as_slice())
            .unwrap_err();
        assert!(err.to_string().contains("IRETRN"));
    }

    #[test]
    fn truncated_file() {
        let bytes = summary_bytes(0, 1, 1.0, 0.0);
        let err = SummaryReader::new()
            .parse_reader(&mut &bytes[..bytes.len() - 10])
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Io);
    }
}
