//! Options controlling a single DIF3D execution
//!
//! A [SolverOptions] is built once per run, validated, and then passed by value
//! through the whole pipeline. Nothing reads global settings.
//!
//! Options are usually read from a JSON file. Every field has a default, so a
//! minimal file only needs to name what differs from the defaults.
//!
//! ```rust
//! # use dif3d::options::{SolverOptions, SolutionType, SpatialApproximation};
//! let json = r#"{
//!     "solution": "real-and-adjoint",
//!     "approximation": "nodal",
//!     "max_outers": 60
//! }"#;
//!
//! let options = SolverOptions::from_json(json).unwrap();
//! assert_eq!(options.solution, SolutionType::RealAndAdjoint);
//! assert!(options.approximation.is_nodal());
//! ```

// internal modules
use crate::error::{Error, Result};

// standard library
use std::path::Path;

// external crates
use log::{debug, warn};
use serde::{Deserialize, Serialize};

/// Problem type, written as `IPROBT` on card 03
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ProblemType {
    /// k-effective eigenvalue problem
    #[default]
    Keff,
}

impl ProblemType {
    /// DIF3D integer code
    pub fn code(&self) -> i64 {
        match self {
            Self::Keff => 0,
        }
    }

    /// Inverse of [ProblemType::code()]
    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            0 => Some(Self::Keff),
            _ => None,
        }
    }
}

/// Type of flux computed, written as `ISOLNT` on card 03
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum SolutionType {
    #[default]
    Real,
    Adjoint,
    RealAndAdjoint,
}

impl SolutionType {
    /// DIF3D integer code
    pub fn code(&self) -> i64 {
        match self {
            Self::Real => 0,
            Self::Adjoint => 1,
            Self::RealAndAdjoint => 2,
        }
    }

    /// Inverse of [SolutionType::code()]
    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            0 => Some(Self::Real),
            1 => Some(Self::Adjoint),
            2 => Some(Self::RealAndAdjoint),
            _ => None,
        }
    }

    /// Check if the real flux is requested
    pub fn includes_real(&self) -> bool {
        matches!(self, Self::Real | Self::RealAndAdjoint)
    }

    /// Check if the adjoint flux is requested
    pub fn includes_adjoint(&self) -> bool {
        matches!(self, Self::Adjoint | Self::RealAndAdjoint)
    }

    /// The individual solutions making up this request
    pub fn components(&self) -> Vec<SolutionType> {
        match self {
            Self::RealAndAdjoint => vec![Self::Real, Self::Adjoint],
            s => vec![*s],
        }
    }
}

/// Spatial approximation, which is really the choice of DIF3D kernel
///
/// | Variant            | Kernel      | Geometry numbers (full, third) |
/// | ------------------ | ----------- | ------------------------------ |
/// | `FiniteDifference` | DIF3D-FD    | 100, 94                        |
/// | `Nodal`            | DIF3D-Nodal | 120, 126                       |
/// | `Transport`        | VARIANT     | 120, 126                       |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum SpatialApproximation {
    FiniteDifference,
    #[default]
    Nodal,
    Transport,
}

impl SpatialApproximation {
    /// VARIANT is a nodal method too, as far as the geometry cards care
    pub fn is_nodal(&self) -> bool {
        matches!(self, Self::Nodal | Self::Transport)
    }
}

/// Outer boundary condition applied to the core
#[derive(Debug, Clone, Copy, PartialEq, Default, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum BoundaryCondition {
    #[default]
    Extrapolated,
    ZeroInwardCurrent,
    /// General condition using `bc_coefficient`
    General,
    Infinite,
    Reflective,
    ZeroFlux,
}

impl BoundaryCondition {
    /// Conditions that DIF3D expresses through boundary coefficients
    pub fn is_generalized(&self) -> bool {
        matches!(
            self,
            Self::Extrapolated | Self::ZeroInwardCurrent | Self::General
        )
    }
}

/// Angular and scattering order presets for VARIANT
///
/// P5P1 is recommended for small/medium cores, and P3P1 for large cores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub enum TransportOrder {
    P1P0,
    P3P1,
    P3P3,
    P5P1,
    P5P3,
}

impl TransportOrder {
    /// (angular approximation code, anisotropic scattering order)
    pub fn codes(&self) -> (i64, i64) {
        match self {
            Self::P1P0 => (10101, 0),
            Self::P3P1 => (10303, 1),
            Self::P3P3 => (10303, 3),
            Self::P5P1 => (10505, 1),
            Self::P5P3 => (10505, 3),
        }
    }
}

/// Everything needed to write and interpret one DIF3D run
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct SolverOptions {
    /// Case label, used for file names and titles
    pub label: String,
    pub problem: ProblemType,
    pub solution: SolutionType,
    pub approximation: SpatialApproximation,
    pub boundaries: BoundaryCondition,
    /// Coefficient for [BoundaryCondition::General]
    pub bc_coefficient: Option<f64>,

    // convergence
    /// Eigenvalue convergence criterion
    pub eps_eigenvalue: f64,
    /// Pointwise fission source convergence criterion
    pub eps_fission_point: f64,
    /// Average fission source convergence criterion
    pub eps_fission_average: f64,
    /// Maximum number of outer iterations
    pub max_outers: i64,
    /// Maximum inner iterations per outer
    pub max_inners: i64,
    /// Restart from an existing DIF3D file
    pub restart: bool,

    // acceleration and memory
    pub error_reduction_factor: f64,
    pub neglect_fission: f64,
    pub asymptotic_extrapolation_overrelax: i64,
    pub asymptotic_extrapolation_nodal: i64,
    pub coarse_mesh_rebalance: i64,
    pub memory: [i64; 3],

    // nodal and transport
    pub nodal_approx_xy: i64,
    pub nodal_approx_z: i64,
    pub transport_order: Option<TransportOrder>,
    pub variant_spatial_approximation: i64,
    pub radial_inner_iterations: bool,

    // input shaping
    /// Print the ISOTXS library in the output
    pub list_isotxs: bool,
    /// Maximum height of an axial submesh, one submesh per zone if unset
    pub max_axial_submesh: Option<f64>,
    /// Explicit uniform mesh boundaries, union of block boundaries if unset
    pub uniform_mesh: Option<Vec<f64>>,
    /// Treat unconverged output as a failure
    pub strict_convergence: bool,
}

impl Default for SolverOptions {
    fn default() -> Self {
        Self {
            label: "dif3d".to_string(),
            problem: ProblemType::Keff,
            solution: SolutionType::Real,
            approximation: SpatialApproximation::Nodal,
            boundaries: BoundaryCondition::Extrapolated,
            bc_coefficient: None,
            eps_eigenvalue: 1.0e-7,
            eps_fission_point: 1.0e-5,
            eps_fission_average: 1.0e-5,
            max_outers: 100,
            max_inners: 0,
            restart: false,
            error_reduction_factor: 0.04,
            neglect_fission: 0.001,
            asymptotic_extrapolation_overrelax: 0,
            asymptotic_extrapolation_nodal: 0,
            coarse_mesh_rebalance: -1,
            memory: [24_000_000, 40_000_000, 40_000_000],
            nodal_approx_xy: 40,
            nodal_approx_z: 32,
            transport_order: None,
            variant_spatial_approximation: 20501,
            radial_inner_iterations: false,
            list_isotxs: false,
            max_axial_submesh: None,
            uniform_mesh: None,
            strict_convergence: false,
        }
    }
}

/// Loading
impl SolverOptions {
    /// Read options from a JSON string and validate them
    pub fn from_json(json: &str) -> Result<Self> {
        let options: Self =
            serde_json::from_str(json).map_err(|e| Error::option("json", e.to_string()))?;
        options.validate()?;
        Ok(options)
    }

    /// Read options from a JSON file and validate them
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        debug!("Reading solver options from {}", path.display());
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Name of the input file written for this run
    pub fn input_file(&self) -> String {
        format!("{}.inp", self.label)
    }

    /// Name of the captured standard output for this run
    pub fn output_file(&self) -> String {
        format!("{}.out", self.label)
    }
}

/// Validation
impl SolverOptions {
    /// Reject anything outside its valid range before a file is written
    ///
    /// This is where settings that DIF3D would otherwise choke on half way
    /// through a run are caught.
    pub fn validate(&self) -> Result<()> {
        if self.label.trim().is_empty() {
            return Err(Error::option("label", "must not be empty"));
        }

        for (name, eps) in [
            ("eps_eigenvalue", self.eps_eigenvalue),
            ("eps_fission_point", self.eps_fission_point),
            ("eps_fission_average", self.eps_fission_average),
        ] {
            if !(eps.is_finite() && eps > 0.0 && eps < 1.0) {
                return Err(Error::option(name, format!("{eps} not in (0, 1)")));
            }
        }

        if self.max_outers < 1 || self.max_outers > 999_999 {
            return Err(Error::option(
                "max_outers",
                format!("{} not in [1, 999999]", self.max_outers),
            ));
        }

        if self.max_inners < 0 || self.max_inners > 999_999 {
            return Err(Error::option(
                "max_inners",
                format!("{} not in [0, 999999]", self.max_inners),
            ));
        }

        if !(self.error_reduction_factor > 0.0 && self.error_reduction_factor <= 1.0) {
            return Err(Error::option(
                "error_reduction_factor",
                format!("{} not in (0, 1]", self.error_reduction_factor),
            ));
        }

        if !(0.0..1.0).contains(&self.neglect_fission) {
            return Err(Error::option(
                "neglect_fission",
                format!("{} not in [0, 1)", self.neglect_fission),
            ));
        }

        if let Some(m) = self.memory.iter().find(|m| **m <= 0) {
            return Err(Error::option("memory", format!("{m} must be positive")));
        }

        self.validate_boundaries()?;
        self.validate_kernel_settings()?;
        self.validate_axial_controls()
    }

    fn validate_boundaries(&self) -> Result<()> {
        match (self.boundaries, self.bc_coefficient) {
            (BoundaryCondition::General, None) => Err(Error::option(
                "bc_coefficient",
                "required for general boundary conditions",
            )),
            (BoundaryCondition::General, Some(c)) if !(c.is_finite() && c > 0.0) => {
                Err(Error::option("bc_coefficient", format!("{c} must be > 0")))
            }
            (b, Some(_)) if b != BoundaryCondition::General => {
                warn!("bc_coefficient ignored for {b:?} boundaries");
                Ok(())
            }
            _ => Ok(()),
        }
    }

    fn validate_kernel_settings(&self) -> Result<()> {
        if !(0..=99).contains(&self.nodal_approx_xy) {
            return Err(Error::option(
                "nodal_approx_xy",
                format!("{} not in [0, 99]", self.nodal_approx_xy),
            ));
        }

        if !(0..=99).contains(&self.nodal_approx_z) {
            return Err(Error::option(
                "nodal_approx_z",
                format!("{} not in [0, 99]", self.nodal_approx_z),
            ));
        }

        for (name, flag) in [
            (
                "asymptotic_extrapolation_overrelax",
                self.asymptotic_extrapolation_overrelax,
            ),
            (
                "asymptotic_extrapolation_nodal",
                self.asymptotic_extrapolation_nodal,
            ),
            ("coarse_mesh_rebalance", self.coarse_mesh_rebalance),
        ] {
            if !(-1..=1).contains(&flag) {
                return Err(Error::option(name, format!("{flag} not in [-1, 1]")));
            }
        }

        match self.approximation {
            SpatialApproximation::Nodal => {
                if self.coarse_mesh_rebalance > -1 {
                    return Err(Error::option(
                        "coarse_mesh_rebalance",
                        "must be disabled (-1) for the nodal kernel",
                    ));
                }
                if self.asymptotic_extrapolation_nodal == -1 {
                    return Err(Error::option(
                        "asymptotic_extrapolation_nodal",
                        "-1 is not valid for the nodal kernel",
                    ));
                }
            }
            SpatialApproximation::Transport => {
                if self.transport_order.is_none() {
                    return Err(Error::option(
                        "transport_order",
                        "must be set for the transport kernel",
                    ));
                }
                if !(10000..=99999).contains(&self.variant_spatial_approximation) {
                    return Err(Error::option(
                        "variant_spatial_approximation",
                        format!(
                            "{} is not a five digit code",
                            self.variant_spatial_approximation
                        ),
                    ));
                }
            }
            SpatialApproximation::FiniteDifference => (),
        }

        Ok(())
    }

    fn validate_axial_controls(&self) -> Result<()> {
        if let Some(h) = self.max_axial_submesh {
            if !(h.is_finite() && h > 0.0) {
                return Err(Error::option(
                    "max_axial_submesh",
                    format!("{h} must be > 0"),
                ));
            }
        }

        if let Some(bounds) = &self.uniform_mesh {
            if bounds.len() < 2 {
                return Err(Error::option(
                    "uniform_mesh",
                    "at least two boundaries are needed",
                ));
            }
            if bounds.windows(2).any(|w| !(w[1] > w[0])) {
                return Err(Error::option(
                    "uniform_mesh",
                    "boundaries must be strictly increasing",
                ));
            }
        }

        Ok(())
    }
}
