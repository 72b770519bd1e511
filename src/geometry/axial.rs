// internal modules
use crate::error::{Error, Result};
use crate::model::{Assembly, Core};
use crate::options::SolverOptions;
use crate::utils::*;

// standard library
use std::collections::BTreeMap;

// external crates
use log::{debug, warn};

/// Elevations closer than this are treated as the same boundary (cm)
pub const ELEVATION_TOLERANCE: f64 = 1.0e-6;

/// Boundaries closer than this are likely to upset DIF3D convergence (cm)
const NEAR_BOUNDARY_WARNING: f64 = 0.1;

/// The single axial mesh shared by every assembly in the solver model
#[derive(Debug, Clone, PartialEq)]
pub struct UniformMesh {
    bounds: Vec<f64>,
}

impl UniformMesh {
    /// Uniform mesh for a core, explicit boundaries win over the block union
    pub fn new(core: &Core, options: &SolverOptions) -> Result<Self> {
        let mesh = match &options.uniform_mesh {
            Some(bounds) => Self::from_bounds(core, bounds.clone())?,
            None => Self::from_blocks(core)?,
        };
        mesh.check_spacing();
        debug!("Uniform mesh has {} axial cells", mesh.n_cells());
        Ok(mesh)
    }

    /// Union of every block boundary of the modeled assemblies
    pub fn from_blocks(core: &Core) -> Result<Self> {
        let mut all: Vec<f64> = core
            .modeled_assemblies()
            .iter()
            .flat_map(|a| a.blocks.iter().flat_map(|b| [b.bottom, b.top]))
            .collect();
        all.sort_by(|a, b| a.total_cmp(b));

        let mut bounds: Vec<f64> = Vec::with_capacity(all.len());
        for z in all {
            match bounds.last() {
                Some(last) if (z - last).abs() <= ELEVATION_TOLERANCE => (),
                _ => bounds.push(z),
            }
        }

        Self::checked(bounds)
    }

    /// User supplied boundaries, which must span the same extent as the core
    pub fn from_bounds(core: &Core, bounds: Vec<f64>) -> Result<Self> {
        let mesh = Self::checked(bounds)?;
        let (bottom, top) = core_extent(core)?;
        if (mesh.bottom() - bottom).abs() > ELEVATION_TOLERANCE
            || (mesh.top() - top).abs() > ELEVATION_TOLERANCE
        {
            return Err(Error::InvalidGeometry(f!(
                "Uniform mesh spans {}-{} cm but the core spans {bottom}-{top} cm",
                mesh.bottom(),
                mesh.top()
            )));
        }
        Ok(mesh)
    }

    fn checked(bounds: Vec<f64>) -> Result<Self> {
        if bounds.len() < 2 {
            return Err(Error::InvalidGeometry(
                "Uniform mesh needs at least one axial cell".to_string(),
            ));
        }
        if bounds.iter().any(|z| !z.is_finite()) {
            return Err(Error::InvalidGeometry(
                "Uniform mesh boundaries must be finite".to_string(),
            ));
        }
        if bounds.windows(2).any(|w| w[1] - w[0] <= ELEVATION_TOLERANCE) {
            return Err(Error::InvalidGeometry(
                "Uniform mesh boundaries must be strictly increasing".to_string(),
            ));
        }
        Ok(Self { bounds })
    }

    /// Boundaries bottom to top
    pub fn bounds(&self) -> &[f64] {
        &self.bounds
    }

    /// Number of axial cells
    pub fn n_cells(&self) -> usize {
        self.bounds.len() - 1
    }

    pub fn bottom(&self) -> f64 {
        self.bounds[0]
    }

    pub fn top(&self) -> f64 {
        self.bounds[self.bounds.len() - 1]
    }

    /// (bottom, top) of an axial cell
    pub fn cell(&self, index: usize) -> Option<(f64, f64)> {
        match (self.bounds.get(index), self.bounds.get(index + 1)) {
            (Some(b), Some(t)) => Some((*b, *t)),
            _ => None,
        }
    }

    /// Iterator over (bottom, top) of every axial cell
    pub fn cells(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.bounds.windows(2).map(|w| (w[0], w[1]))
    }

    /// Warn about adjacent boundaries that are suspiciously close
    pub fn check_spacing(&self) {
        for w in self.bounds.windows(2) {
            if w[1] - w[0] < NEAR_BOUNDARY_WARNING {
                warn!(
                    "Mesh value {} is close to neighbouring mesh value {}, watch for convergence issues",
                    w[1], w[0]
                );
            }
        }
    }
}

/// Common (bottom, top) of all modeled assemblies
fn core_extent(core: &Core) -> Result<(f64, f64)> {
    let assemblies = core.modeled_assemblies();
    let first = assemblies
        .first()
        .ok_or_else(|| Error::InvalidGeometry("Core has no modeled assemblies".to_string()))?;
    match (first.bottom(), first.top()) {
        (Some(bottom), Some(top)) => Ok((bottom, top)),
        _ => Err(Error::InvalidGeometry(f!(
            "Assembly {} has no blocks",
            first.number
        ))),
    }
}

/// Composition of one uniform axial cell of one assembly
#[derive(Debug, Clone, PartialEq)]
pub struct UniformCell {
    pub bottom: f64,
    pub top: f64,
    /// Suffix of the block with the largest overlap
    pub xs_suffix: String,
    /// Length-weighted number densities
    pub densities: BTreeMap<String, f64>,
}

/// One assembly projected onto the uniform mesh
#[derive(Debug, Clone, PartialEq)]
pub struct UniformColumn {
    pub ring: usize,
    pub position: usize,
    pub number: usize,
    pub cells: Vec<UniformCell>,
}

/// The modeled assemblies projected onto the uniform mesh
///
/// Columns are kept in the canonical (ring, position) order, so the n-th
/// column and the m-th cell line up with the region index built by
/// [RegionMap](crate::geometry::RegionMap).
#[derive(Debug, Clone, PartialEq)]
pub struct UniformCore {
    pub columns: Vec<UniformColumn>,
}

impl UniformCore {
    /// Project every modeled assembly onto the uniform mesh
    pub fn new(core: &Core, mesh: &UniformMesh) -> Result<Self> {
        let columns = core
            .modeled_assemblies()
            .into_iter()
            .map(|a| Self::project(a, mesh))
            .collect::<Result<Vec<UniformColumn>>>()?;
        Ok(Self { columns })
    }

    fn project(assembly: &Assembly, mesh: &UniformMesh) -> Result<UniformColumn> {
        let mut cells = Vec::with_capacity(mesh.n_cells());

        for (bottom, top) in mesh.cells() {
            let height = top - bottom;
            let mut densities: BTreeMap<String, f64> = BTreeMap::new();
            let mut dominant: Option<(f64, &str)> = None;

            for block in &assembly.blocks {
                let overlap = block.overlap(bottom, top);
                if overlap <= ELEVATION_TOLERANCE {
                    continue;
                }
                let weight = overlap / height;
                for (name, density) in &block.densities {
                    *densities.entry(name.clone()).or_insert(0.0) += weight * density;
                }
                // strict comparison keeps the lowest block on a tie
                if dominant.map_or(true, |(length, _)| overlap > length) {
                    dominant = Some((overlap, &block.xs_suffix));
                }
            }

            let xs_suffix = match dominant {
                Some((_, suffix)) => suffix.to_string(),
                None => {
                    return Err(Error::InvalidGeometry(f!(
                        "No block of assembly {} covers {bottom}-{top} cm",
                        assembly.number
                    )))
                }
            };

            cells.push(UniformCell {
                bottom,
                top,
                xs_suffix,
                densities,
            });
        }

        Ok(UniformColumn {
            ring: assembly.ring,
            position: assembly.position,
            number: assembly.number,
            cells,
        })
    }
}
