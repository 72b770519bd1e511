//! # The DIF3D crate
//!
//! Exchange of whole-core reactor state with the DIF3D neutron diffusion and
//! transport solver
//!
//! ## Installation
//!
//! Direct install from source:
//!
//! ```shell
//! cargo install --path .
//! ```
//!
//! ## Overview
//!
//! A reactor model snapshot goes in, and per-block fluxes, powers, and
//! reaction rates come out. In between the crate writes the DIF3D input,
//! runs the solver, reads the printed output, and maps everything from the
//! uniform solver mesh back onto the blocks as they were modeled.
//!
//! ```text
//! Core snapshot -> Addressing -> Input -> (DIF3D) -> SolverResult -> MappedState
//! ```
//!
//! There are a few command line tools for the common steps:
//!
//! | Command line | Description                                             |
//! | ------------ | ------------------------------------------------------- |
//! | `d3dinp`     | Write a DIF3D input file from a core snapshot           |
//! | `d3dout`     | Read the printed DIF3D output into JSON                 |
//! | `d3drun`     | Render, run, parse, and map a full DIF3D calculation    |
//!
//! All tools are fully documented with detailed `--help` messages.
//!
//! ### Supported problems
//!
//! | Option                                                  | Supported                         |
//! | ------------------------------------------------------- | --------------------------------- |
//! | [ProblemType](crate::options::ProblemType)              | k-effective eigenvalue            |
//! | [SolutionType](crate::options::SolutionType)            | real, adjoint, real and adjoint   |
//! | [SpatialApproximation](crate::options::SpatialApproximation) | finite difference, nodal, VARIANT |
//! | [Symmetry](crate::model::Symmetry)                      | full core, 1/3 core periodic      |
//!
//! ## Advanced use
//!
//! The readers are the most reusable part. The printed output can be read
//! into a [SolverResult](crate::result::SolverResult) with a one-liner.
//!
//! ```rust,ignore
//! use dif3d::{read_output, options::SolutionType};
//!
//! let result = read_output("./data/dif3d.out", SolutionType::Real).unwrap();
//! println!("k-eff = {:?}", result.keff());
//! ```
//!
//! As an overview:
//! - The [model] module holds the read-only core snapshot and the
//! [ReactorModel](crate::model::ReactorModel) collaborator trait
//! - The [geometry] module addresses regions, labels, boundaries, and the
//! uniform axial mesh
//! - The [input] module renders the fixed-format input cards
//! - The [readers] module parses the printed output and the `DIF3D` binary
//! - The [convert] module maps region results back onto blocks
//! - The [run] module sequences everything as a small state machine
//!
//! In the background, the `nom` parser combinator library reads the output
//! tables, `serde` loads snapshots and options, `bincode` reads the binary
//! records, and `clap` is used for the command line interface.

// Public facing modules
pub mod convert;
pub mod error;
pub mod geometry;
pub mod input;
pub mod model;
pub mod options;
pub mod result;
pub mod run;
pub mod utils;

pub mod readers;

// Re-exports of useful data structures
#[doc(inline)]
pub use crate::error::{Error, ErrorKind, Result};

#[doc(inline)]
pub use crate::readers::{read_output, read_summary_file};

#[doc(inline)]
pub use crate::run::{Executor, ProcessExecutor, Run, RunState};
