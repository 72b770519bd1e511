//! Mapping of region results from the uniform mesh back onto the blocks
//!
//! DIF3D solves on the uniform axial mesh, while the reactor model holds
//! blocks with their own boundaries. Each block collects the uniform cells of
//! its assembly that it overlaps:
//!
//! | Quantity                        | Mapping                              |
//! | ------------------------------- | ------------------------------------ |
//! | Group flux, total flux          | length-weighted average of densities |
//! | Power                           | overlapped fraction of each cell     |
//! | Peak flux, peak power density   | maximum over the overlapped cells    |
//! | Power density                   | block power over block volume        |
//! | Reaction rates                  | Σ_g φ_g Σ_x,g from the block flux    |
//!
//! Region flux integrals are turned into densities with the uniform cell
//! volume before any of this, so the block values are per cm³.

// internal modules
use crate::error::{Error, Result};
use crate::geometry::{Addressing, ELEVATION_TOLERANCE};
use crate::model::{Block, Core, MacroXs};
use crate::result::SolverResult;
use crate::utils::*;

// external crates
use itertools::izip;
use log::{debug, info};
use serde::Serialize;

/// Reaction rate densities of a block (reactions/cm³/s)
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct ReactionRates {
    pub capture: f64,
    pub fission: f64,
    pub absorption: f64,
    pub n2n: f64,
    /// Fission neutron production
    pub nu_fission: f64,
}

impl ReactionRates {
    /// Σ_g φ_g Σ_x,g for every reaction
    pub fn from_flux(flux: &[f64], xs: &MacroXs) -> Self {
        let fold = |sigma: &[f64]| flux.iter().zip(sigma).map(|(f, s)| f * s).sum::<f64>();
        Self {
            capture: fold(&xs.capture),
            fission: fold(&xs.fission),
            absorption: fold(&xs.absorption),
            n2n: fold(&xs.n2n),
            nu_fission: fold(&xs.nu_fission),
        }
    }

    fn values(&self) -> [f64; 5] {
        [
            self.capture,
            self.fission,
            self.absorption,
            self.n2n,
            self.nu_fission,
        ]
    }
}

/// Results mapped onto a single as-modeled block
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct BlockState {
    pub ring: usize,
    pub position: usize,
    /// Index of the block in its assembly, bottom up
    pub block: usize,
    pub bottom: f64,
    pub top: f64,
    /// Real group flux (n/cm²/s)
    pub group_flux: Option<Vec<f64>>,
    /// Adjoint group flux
    pub adjoint_flux: Option<Vec<f64>>,
    /// Total flux (n/cm²/s)
    pub total_flux: Option<f64>,
    pub peak_flux: Option<f64>,
    /// Block power (W)
    pub power: Option<f64>,
    /// Average power density (W/cc)
    pub power_density: Option<f64>,
    pub peak_power_density: Option<f64>,
    pub reaction_rates: Option<ReactionRates>,
}

impl BlockState {
    /// Everything numeric, labelled, for sanity checks
    fn values(&self) -> Vec<(&'static str, f64)> {
        let mut values = Vec::new();
        for (name, group) in [("group flux", &self.group_flux), ("adjoint flux", &self.adjoint_flux)] {
            if let Some(group) = group {
                values.extend(group.iter().map(|v| (name, *v)));
            }
        }
        for (name, value) in [
            ("total flux", self.total_flux),
            ("peak flux", self.peak_flux),
            ("power", self.power),
            ("power density", self.power_density),
            ("peak power density", self.peak_power_density),
        ] {
            if let Some(value) = value {
                values.push((name, value));
            }
        }
        if let Some(rates) = &self.reaction_rates {
            values.extend(rates.values().into_iter().map(|v| ("reaction rate", v)));
        }
        values
    }
}

/// Everything to be written back to the reactor model
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct MappedState {
    /// Eigenvalue of the real solve, or the adjoint if only that was run
    pub keff: Option<f64>,
    pub adjoint_keff: Option<f64>,
    /// Blocks in assembly order, bottom to top
    pub blocks: Vec<BlockState>,
}

impl MappedState {
    /// Sum of the block powers, zero if no power was mapped
    pub fn total_power(&self) -> f64 {
        self.blocks.iter().filter_map(|b| b.power).sum()
    }

    /// State of a block by location and index in the assembly
    pub fn block(&self, ring: usize, position: usize, block: usize) -> Option<&BlockState> {
        self.blocks
            .iter()
            .find(|b| b.ring == ring && b.position == position && b.block == block)
    }
}

/// Converts a [SolverResult] on the uniform mesh to a [MappedState]
///
/// Example
/// ```ignore
///     let converter = MeshConverter::new(&core, &addressing);
///     let state = converter.convert(&result)?;
/// ```
#[derive(Debug)]
pub struct MeshConverter<'a> {
    core: &'a Core,
    addressing: &'a Addressing,
}

/// A uniform cell overlapped by a block
#[derive(Debug, Clone, Copy)]
struct Overlap {
    /// Linear region index
    region: usize,
    /// Overlapped length (cm)
    length: f64,
    /// Overlapped fraction of the cell
    fraction: f64,
}

impl<'a> MeshConverter<'a> {
    pub fn new(core: &'a Core, addressing: &'a Addressing) -> Self {
        Self { core, addressing }
    }

    /// Map every block of every modeled assembly
    pub fn convert(&self, result: &SolverResult) -> Result<MappedState> {
        self.check_regions(result)?;

        let mut state = MappedState {
            keff: result.keff(),
            adjoint_keff: result.adjoint.as_ref().map(|s| s.keff),
            blocks: Vec::with_capacity(self.core.n_blocks()),
        };

        let real = self.densities(result.real.as_ref().map(|s| &s.group_flux));
        let adjoint = self.densities(result.adjoint.as_ref().map(|s| &s.group_flux));
        let total = match &result.totals {
            Some(t) => Some(self.per_volume(&t.total_flux)?),
            None => None,
        };

        for assembly in self.core.modeled_assemblies() {
            let fraction = self.core.symmetry.volume_fraction(assembly.ring);
            for (index, block) in assembly.blocks.iter().enumerate() {
                let overlaps = self.overlaps(assembly.ring, assembly.position, block)?;
                let volume = self.core.hex_area() * block.height() * fraction;

                let mut block_state = BlockState {
                    ring: assembly.ring,
                    position: assembly.position,
                    block: index,
                    bottom: block.bottom,
                    top: block.top,
                    group_flux: real.as_ref().map(|f| length_weighted_groups(f, &overlaps)),
                    adjoint_flux: adjoint.as_ref().map(|f| length_weighted_groups(f, &overlaps)),
                    total_flux: total.as_ref().map(|f| length_weighted(f, &overlaps)),
                    ..Default::default()
                };

                if let Some(totals) = &result.totals {
                    let power = overlaps
                        .iter()
                        .map(|o| totals.power[o.region] * o.fraction)
                        .sum::<f64>();
                    block_state.power = Some(power);
                    block_state.power_density = Some(power / volume);
                    block_state.peak_flux = Some(peak(&totals.peak_flux, &overlaps));
                    block_state.peak_power_density =
                        Some(peak(&totals.peak_power_density, &overlaps));
                }

                if let (Some(flux), Some(xs)) = (&block_state.group_flux, &block.xs) {
                    if !xs.has_groups(flux.len()) {
                        return Err(Error::MeshConversionError(f!(
                            "Block {index} of ring {} position {} has cross sections for the wrong number of groups, expected {}",
                            assembly.ring,
                            assembly.position,
                            flux.len()
                        )));
                    }
                    block_state.reaction_rates = Some(ReactionRates::from_flux(flux, xs));
                }

                check_values(&block_state)?;
                state.blocks.push(block_state);
            }
        }

        info!(
            "Mapped results onto {} blocks, total power {} W",
            state.blocks.len(),
            state.total_power().sci(5, 2)
        );
        Ok(state)
    }

    /// The result must come from the same regions in the same order
    fn check_regions(&self, result: &SolverResult) -> Result<()> {
        let expected = self.addressing.regions.labels();
        if result.regions != expected {
            return Err(Error::MeshConversionError(f!(
                "Result has {} regions that do not match the {} regions of the core",
                result.n_regions(),
                expected.len()
            )));
        }

        let tables = [
            result.real.as_ref().map(|s| s.group_flux.len()),
            result.adjoint.as_ref().map(|s| s.group_flux.len()),
            result.totals.as_ref().map(|t| t.power.len()),
        ];
        if tables.into_iter().flatten().any(|n| n != expected.len()) {
            return Err(Error::MeshConversionError(
                "Result tables do not cover every region".to_string(),
            ));
        }

        if let Some(totals) = &result.totals {
            if totals.columns().iter().any(|(_, c)| c.len() != expected.len()) {
                return Err(Error::MeshConversionError(
                    "REGION TOTALS columns do not cover every region".to_string(),
                ));
            }
        }
        Ok(())
    }

    /// Group flux integrals divided by the region volumes
    fn densities(&self, integrals: Option<&Vec<Vec<f64>>>) -> Option<Vec<Vec<f64>>> {
        let integrals = integrals?;
        let regions = self.addressing.regions.regions();
        Some(
            regions
                .iter()
                .zip(integrals)
                .map(|(region, groups)| groups.iter().map(|g| g / region.volume).collect())
                .collect(),
        )
    }

    fn per_volume(&self, integrals: &[f64]) -> Result<Vec<f64>> {
        let regions = self.addressing.regions.regions();
        if regions.iter().any(|r| r.volume <= 0.0) {
            return Err(Error::MeshConversionError(
                "Region with no volume".to_string(),
            ));
        }
        Ok(regions
            .iter()
            .zip(integrals)
            .map(|(r, v)| v / r.volume)
            .collect())
    }

    /// Uniform cells of the assembly overlapped by a block
    fn overlaps(&self, ring: usize, position: usize, block: &Block) -> Result<Vec<Overlap>> {
        let mut overlaps = Vec::new();
        for (axial, (bottom, top)) in self.addressing.mesh.cells().enumerate() {
            let length = block.overlap(bottom, top);
            if length <= ELEVATION_TOLERANCE {
                continue;
            }
            let region = self
                .addressing
                .regions
                .index(ring, position, axial)
                .ok_or_else(|| {
                    Error::MeshConversionError(f!(
                        "No region for ring {ring} position {position} axial cell {axial}"
                    ))
                })?;
            overlaps.push(Overlap {
                region,
                length,
                fraction: length / (top - bottom),
            });
        }

        if overlaps.is_empty() {
            return Err(Error::MeshConversionError(f!(
                "Block {}-{} cm of ring {ring} position {position} overlaps no mesh cell",
                block.bottom,
                block.top
            )));
        }

        debug!(
            "Ring {ring} position {position} block at {} cm overlaps {} cells",
            block.bottom,
            overlaps.len()
        );
        Ok(overlaps)
    }
}

/// Length-weighted average of a per-region quantity
fn length_weighted(values: &[f64], overlaps: &[Overlap]) -> f64 {
    let length: f64 = overlaps.iter().map(|o| o.length).sum();
    overlaps
        .iter()
        .map(|o| values[o.region] * o.length)
        .sum::<f64>()
        / length
}

/// Length-weighted average of per-region group values
fn length_weighted_groups(values: &[Vec<f64>], overlaps: &[Overlap]) -> Vec<f64> {
    let length: f64 = overlaps.iter().map(|o| o.length).sum();
    let n_groups = values.first().map_or(0, |v| v.len());
    let mut average = vec![0.0; n_groups];
    for o in overlaps {
        for (avg, value) in izip!(&mut average, &values[o.region]) {
            *avg += value * o.length / length;
        }
    }
    average
}

/// Maximum of a per-region quantity over the overlapped cells
fn peak(values: &[f64], overlaps: &[Overlap]) -> f64 {
    let overlapped: Vec<f64> = overlaps.iter().map(|o| values[o.region]).collect();
    f64_max(&overlapped).unwrap_or(0.0)
}

/// Mapped values must be finite and non-negative
fn check_values(state: &BlockState) -> Result<()> {
    for (name, value) in state.values() {
        if !value.is_finite() || value < 0.0 {
            return Err(Error::MeshConversionError(f!(
                "Block {} of ring {} position {} has {name} of {value}",
                state.block,
                state.ring,
                state.position
            )));
        }
    }
    Ok(())
}
