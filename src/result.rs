//! Results parsed from a DIF3D run, still on the uniform solver mesh
//!
//! Everything is indexed by the linear region index from
//! [RegionMap](crate::geometry::RegionMap), with region labels kept alongside
//! so the ordering can be checked.

// internal modules
use crate::error::{Error, Result};
use crate::options::SolutionType;
use crate::utils::*;

// external crates
use serde::Serialize;

/// Convergence annotation of a single solution
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Convergence {
    Converged,
    /// Output is complete but the convergence message never appeared
    NotConverged,
}

/// Eigenvalue and group fluxes of one real or adjoint solve
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Solution {
    /// Either [SolutionType::Real] or [SolutionType::Adjoint]
    pub solution: SolutionType,
    /// Last k-effective reported for this solve
    pub keff: f64,
    pub convergence: Convergence,
    /// Region group flux integrals, `[region][group]` (n/s for real)
    pub group_flux: Vec<Vec<f64>>,
}

impl Solution {
    /// Number of energy groups
    pub fn n_groups(&self) -> usize {
        self.group_flux.first().map_or(0, |g| g.len())
    }
}

/// The REGION TOTALS edit of a real solve
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct RegionTotals {
    /// Volume integrated total flux
    pub total_flux: Vec<f64>,
    pub peak_flux: Vec<f64>,
    /// Region power (W)
    pub power: Vec<f64>,
    /// Average power density (W/cc)
    pub power_density: Vec<f64>,
    pub peak_power_density: Vec<f64>,
}

impl RegionTotals {
    /// Every column of the edit, with the row label used in the output
    pub fn columns(&self) -> [(&'static str, &Vec<f64>); 5] {
        [
            ("TOTAL FLUX", &self.total_flux),
            ("PEAK FLUX", &self.peak_flux),
            ("POWER", &self.power),
            ("POWER DENSITY", &self.power_density),
            ("PEAK PWR DENS", &self.peak_power_density),
        ]
    }

    pub(crate) fn column_mut(&mut self, label: &str) -> Option<&mut Vec<f64>> {
        match label {
            "TOTAL FLUX" => Some(&mut self.total_flux),
            "PEAK FLUX" => Some(&mut self.peak_flux),
            "POWER" => Some(&mut self.power),
            "POWER DENSITY" => Some(&mut self.power_density),
            "PEAK PWR DENS" => Some(&mut self.peak_power_density),
            _ => None,
        }
    }

    /// Sum of the region powers
    pub fn total_power(&self) -> f64 {
        self.power.iter().sum()
    }
}

/// Everything parsed from one DIF3D output, immutable once built
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SolverResult {
    /// Region labels in solver order
    pub regions: Vec<String>,
    pub real: Option<Solution>,
    pub adjoint: Option<Solution>,
    /// Only present for real solves
    pub totals: Option<RegionTotals>,
}

impl SolverResult {
    /// Solution of a single type, `RealAndAdjoint` gives the real one
    pub fn solution(&self, solution: SolutionType) -> Option<&Solution> {
        match solution {
            SolutionType::Real | SolutionType::RealAndAdjoint => self.real.as_ref(),
            SolutionType::Adjoint => self.adjoint.as_ref(),
        }
    }

    /// The problem eigenvalue, taken from the real solve when there is one
    pub fn keff(&self) -> Option<f64> {
        self.real.as_ref().or(self.adjoint.as_ref()).map(|s| s.keff)
    }

    pub fn n_regions(&self) -> usize {
        self.regions.len()
    }

    /// Linear index of a region label
    pub fn region_index(&self, label: &str) -> Option<usize> {
        self.regions.iter().position(|r| r == label)
    }

    /// Fail on the first solution that did not converge
    pub fn ensure_converged(&self) -> Result<()> {
        for s in [&self.real, &self.adjoint].into_iter().flatten() {
            if s.convergence == Convergence::NotConverged {
                return Err(Error::NotConverged(s.solution));
            }
        }
        Ok(())
    }

    /// Pretty JSON of the whole result
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| Error::Io(e.into()))
    }

    /// Short human readable summary for logging
    pub fn summary(&self) -> String {
        let mut s = f!("{} regions", self.n_regions());
        for solution in [&self.real, &self.adjoint].into_iter().flatten() {
            s += &f!(
                "\n  > {:?}: k-eff {:.11}, {} groups, {:?}",
                solution.solution,
                solution.keff,
                solution.n_groups(),
                solution.convergence
            );
        }
        if let Some(totals) = &self.totals {
            s += &f!("\n  > Total power {} W", totals.total_power().sci(5, 2));
        }
        s
    }
}
