//! Error types for every stage of a DIF3D run
//!
//! Each variant corresponds to one failure kind of the run. The [ErrorKind]
//! discriminant is what gets recorded by a failed [Run](crate::run::Run) so
//! that the caller can decide what to do with a batch of runs.

// internal modules
use crate::options::SolutionType;

// external crates
use thiserror::Error;

/// Type alias for results returned throughout the crate
pub type Result<T> = std::result::Result<T, Error>;

/// Everything that can go wrong between a core snapshot and a committed state
#[derive(Error, Debug)]
pub enum Error {
    /// Ring/position addressing is not injective, or bad axial boundaries
    #[error("Invalid geometry: {0}")]
    InvalidGeometry(String),

    /// Configuration value outside its valid range
    #[error("Invalid option `{option}`: {reason}")]
    InvalidOption { option: String, reason: String },

    /// Internal consistency fault while writing a record
    #[error("Failed to render card {card}: {reason}")]
    RenderFailure { card: String, reason: String },

    /// The external solver could not be run to completion
    #[error("Solver execution failed: {0}")]
    ExecutionFailure(String),

    /// Valid output, but the outer iterations never converged
    #[error("{0:?} solution did not converge")]
    NotConverged(SolutionType),

    /// Malformed, truncated, or misaligned output
    #[error("Failed to parse {table}: {reason}")]
    ParseFailure { table: String, reason: String },

    /// A requested real/adjoint solution is not in the output
    #[error("{solution:?} solution requested but no {what} found in output")]
    MissingSolutionType {
        solution: SolutionType,
        what: String,
    },

    /// Results could not be moved onto the as-modeled mesh
    #[error("Mesh conversion failed: {0}")]
    MeshConversionError(String),

    /// Run stages called out of order
    #[error("Cannot move from {from} to {to}")]
    InvalidTransition {
        from: RunStateName,
        to: RunStateName,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Short name of a run state, kept separate to avoid a dependency cycle
pub type RunStateName = &'static str;

/// Discriminant of [Error] without the payload
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    InvalidGeometry,
    InvalidOption,
    RenderFailure,
    ExecutionFailure,
    NotConverged,
    ParseFailure,
    MissingSolutionType,
    MeshConversionError,
    InvalidTransition,
    Io,
}

impl Error {
    /// The failure kind without any of the detail
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidGeometry(_) => ErrorKind::InvalidGeometry,
            Self::InvalidOption { .. } => ErrorKind::InvalidOption,
            Self::RenderFailure { .. } => ErrorKind::RenderFailure,
            Self::ExecutionFailure(_) => ErrorKind::ExecutionFailure,
            Self::NotConverged(_) => ErrorKind::NotConverged,
            Self::ParseFailure { .. } => ErrorKind::ParseFailure,
            Self::MissingSolutionType { .. } => ErrorKind::MissingSolutionType,
            Self::MeshConversionError(_) => ErrorKind::MeshConversionError,
            Self::InvalidTransition { .. } => ErrorKind::InvalidTransition,
            Self::Io(_) => ErrorKind::Io,
        }
    }

    /// Geometry and option problems are caught before any file is touched
    pub fn is_pre_execution(&self) -> bool {
        matches!(
            self.kind(),
            ErrorKind::InvalidGeometry | ErrorKind::InvalidOption
        )
    }

    // Small constructors, since the struct variants are verbose to build

    pub(crate) fn option(option: &str, reason: impl Into<String>) -> Self {
        Self::InvalidOption {
            option: option.to_string(),
            reason: reason.into(),
        }
    }

    pub(crate) fn render(card: &str, reason: impl Into<String>) -> Self {
        Self::RenderFailure {
            card: card.to_string(),
            reason: reason.into(),
        }
    }

    pub(crate) fn parse(table: &str, reason: impl Into<String>) -> Self {
        Self::ParseFailure {
            table: table.to_string(),
            reason: reason.into(),
        }
    }

    pub(crate) fn missing(solution: SolutionType, what: &str) -> Self {
        Self::MissingSolutionType {
            solution,
            what: what.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_match_variants() {
        let e = Error::parse("REGION TOTALS", "truncated");
        assert_eq!(e.kind(), ErrorKind::ParseFailure);
        assert!(e.to_string().contains("REGION TOTALS"));

        let e = Error::NotConverged(SolutionType::Real);
        assert_eq!(e.kind(), ErrorKind::NotConverged);
        assert!(!e.is_pre_execution());

        let e = Error::option("max_outers", "must be > 0");
        assert!(e.is_pre_execution());
    }
}
