// internal modules
use crate::error::{Error, Result};
use crate::geometry::axial::ELEVATION_TOLERANCE;
use crate::geometry::{area_label, region_label, zone_label, UniformCore, UniformMesh};
use crate::model::{Assembly, Core, Symmetry};
use crate::options::{BoundaryCondition, SolverOptions};
use crate::utils::*;

// standard library
use std::collections::{HashMap, HashSet};

// external crates
use log::{debug, info};

/// Everything the input renderer needs to know about the solver geometry
#[derive(Debug, Clone)]
pub struct Addressing {
    pub regions: RegionMap,
    pub boundaries: BoundaryConditions,
    pub axial_zones: Vec<AxialZone>,
    pub mesh: UniformMesh,
    pub uniform: UniformCore,
}

impl Addressing {
    /// Validate the core and derive the full solver addressing
    pub fn new(core: &Core, options: &SolverOptions) -> Result<Self> {
        validate_core(core)?;

        let mesh = UniformMesh::new(core, options)?;
        let uniform = UniformCore::new(core, &mesh)?;
        let regions = RegionMap::new(core, &mesh)?;
        let boundaries = BoundaryConditions::new(core.symmetry, options);
        let axial_zones = AxialZone::from_mesh(&mesh, options.max_axial_submesh);

        info!(
            "Addressed {} regions ({} assemblies x {} axial cells), geometry {}",
            regions.len(),
            uniform.columns.len(),
            mesh.n_cells(),
            boundaries.geometry_number
        );

        Ok(Self {
            regions,
            boundaries,
            axial_zones,
            mesh,
            uniform,
        })
    }
}

/// One solver region, an assembly location at a uniform axial cell
#[derive(Debug, Clone, PartialEq)]
pub struct Region {
    /// Linear region index in solver order
    pub index: usize,
    pub ring: usize,
    pub position: usize,
    /// Assembly number of the assembly at this location
    pub assembly: usize,
    /// Uniform axial cell index, 0 at the bottom
    pub axial: usize,
    /// Composition label, e.g. `B0012E`
    pub zone: String,
    /// Area label, e.g. `A3002`
    pub area: String,
    /// Region label, e.g. `A3002E`
    pub label: String,
    pub bottom: f64,
    pub top: f64,
    /// Volume inside the modeled domain (cm3)
    pub volume: f64,
}

/// Bijection between (ring, position, axial cell) and linear region index
#[derive(Debug, Clone, Default)]
pub struct RegionMap {
    regions: Vec<Region>,
    lookup: HashMap<(usize, usize, usize), usize>,
}

impl RegionMap {
    /// Build the map in canonical order: ring, then position, then bottom to top
    pub fn new(core: &Core, mesh: &UniformMesh) -> Result<Self> {
        let mut map = Self::default();
        let area = core.hex_area();

        for assembly in core.modeled_assemblies() {
            let fraction = core.symmetry.volume_fraction(assembly.ring);
            let area_name = area_label(assembly.ring, assembly.position)?;

            for (axial, (bottom, top)) in mesh.cells().enumerate() {
                let index = map.regions.len();
                let key = (assembly.ring, assembly.position, axial);
                if map.lookup.insert(key, index).is_some() {
                    return Err(Error::InvalidGeometry(f!(
                        "Ring {} position {} is used more than once",
                        assembly.ring,
                        assembly.position
                    )));
                }

                map.regions.push(Region {
                    index,
                    ring: assembly.ring,
                    position: assembly.position,
                    assembly: assembly.number,
                    axial,
                    zone: zone_label(assembly.number, axial)?,
                    area: area_name.clone(),
                    label: region_label(assembly.ring, assembly.position, axial)?,
                    bottom,
                    top,
                    volume: area * (top - bottom) * fraction,
                });
            }
        }

        debug!("Region map built with {} regions", map.regions.len());
        Ok(map)
    }

    /// Linear index of a (ring, position, axial cell)
    pub fn index(&self, ring: usize, position: usize, axial: usize) -> Option<usize> {
        self.lookup.get(&(ring, position, axial)).copied()
    }

    pub fn region(&self, index: usize) -> Option<&Region> {
        self.regions.get(index)
    }

    /// All regions in solver order
    pub fn regions(&self) -> &[Region] {
        &self.regions
    }

    /// Region labels in solver order, as expected in the output tables
    pub fn labels(&self) -> Vec<String> {
        self.regions.iter().map(|r| r.label.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.regions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }
}

/// Outer boundary description for card 04 and card 05 of `A.NIP3`
#[derive(Debug, Clone, PartialEq)]
pub struct BoundaryConditions {
    /// DIF3D boundary codes, one per boundary of the hex geometry
    pub codes: [i64; 6],
    /// Coefficient for the code 4 boundaries, if DIF3D needs to be told
    pub coefficient: Option<f64>,
    /// DIF3D geometry number for card 03
    pub geometry_number: i64,
}

impl BoundaryConditions {
    /// Boundary codes and geometry number for a symmetry and option set
    ///
    /// | Symmetry | Kernel   | Geometry | Infinite    | Reflective  | Generalised | Zero flux   |
    /// | -------- | -------- | -------- | ----------- | ----------- | ----------- | ----------- |
    /// | Full     | FD       | 100      | 3 3 3 3 3 3 | 3 3 3 3 4 4 | 4 4 4 4 4 4 | 7 2 2 2 2 2 |
    /// | Full     | Nodal    | 120      | "           | "           | "           | "           |
    /// | Third    | FD       | 94       | 7 3 3 3 3 3 | 7 3 3 3 4 4 | 7 4 4 4 4 4 | 7 2 2 2 2 2 |
    /// | Third    | Nodal    | 126      | "           | "           | "           | "           |
    ///
    /// Extrapolated boundaries are the DIF3D default for code 4, so no
    /// coefficient is written for them.
    pub fn new(symmetry: Symmetry, options: &SolverOptions) -> Self {
        let nodal = options.approximation.is_nodal();
        let geometry_number = match (symmetry, nodal) {
            (Symmetry::Full, true) => 120,
            (Symmetry::Full, false) => 100,
            (Symmetry::ThirdPeriodic, true) => 126,
            (Symmetry::ThirdPeriodic, false) => 94,
        };

        let first = match symmetry {
            Symmetry::Full => None,
            Symmetry::ThirdPeriodic => Some(7),
        };

        let mut codes = match options.boundaries {
            BoundaryCondition::Infinite => [3, 3, 3, 3, 3, 3],
            BoundaryCondition::Reflective => [3, 3, 3, 3, 4, 4],
            BoundaryCondition::ZeroFlux => [7, 2, 2, 2, 2, 2],
            _ => [4, 4, 4, 4, 4, 4],
        };
        if let Some(code) = first {
            codes[0] = code;
        }

        let coefficient = match options.boundaries {
            BoundaryCondition::ZeroInwardCurrent => Some(0.5),
            BoundaryCondition::General => options.bc_coefficient,
            _ => None,
        };

        Self {
            codes,
            coefficient,
            geometry_number,
        }
    }

    /// Coefficients for card 05, zero for the boundaries that do not use one
    pub fn coefficients(&self) -> Option<[f64; 6]> {
        self.coefficient
            .map(|c| self.codes.map(|code| if code == 4 { c } else { 0.0 }))
    }
}

/// One axial mesh step for card 09
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AxialZone {
    /// Number of equal submeshes in the step
    pub submeshes: usize,
    /// Upper elevation of the step (cm)
    pub top: f64,
}

impl AxialZone {
    /// One zone per uniform cell, split to keep submeshes under `max_height`
    pub fn from_mesh(mesh: &UniformMesh, max_height: Option<f64>) -> Vec<Self> {
        mesh.cells()
            .map(|(bottom, top)| {
                let submeshes = match max_height {
                    Some(h) => ((top - bottom) / h).ceil().max(1.0) as usize,
                    None => 1,
                };
                Self { submeshes, top }
            })
            .collect()
    }
}

/// Structural checks on the snapshot, done before anything else
///
/// Rings start at 1 and hold `6(r-1)` positions, locations and assembly
/// numbers are unique, and every assembly is a contiguous stack of blocks
/// sharing a common bottom and top.
pub fn validate_core(core: &Core) -> Result<()> {
    if !(core.pitch.is_finite() && core.pitch > 0.0) {
        return Err(Error::InvalidGeometry(f!(
            "Assembly pitch {} must be positive",
            core.pitch
        )));
    }

    if core.modeled_assemblies().is_empty() {
        return Err(Error::InvalidGeometry(
            "Core has no modeled assemblies".to_string(),
        ));
    }

    let mut locations = HashSet::new();
    let mut numbers = HashSet::new();
    let mut extent: Option<(f64, f64)> = None;

    for a in &core.assemblies {
        let n_positions = Symmetry::positions_in_ring(a.ring);
        if a.ring == 0 || a.position == 0 || a.position > n_positions {
            return Err(Error::InvalidGeometry(f!(
                "Position {} is out of range for ring {}",
                a.position,
                a.ring
            )));
        }

        if !locations.insert((a.ring, a.position)) {
            return Err(Error::InvalidGeometry(f!(
                "Ring {} position {} is used more than once",
                a.ring,
                a.position
            )));
        }

        if !numbers.insert(a.number) {
            return Err(Error::InvalidGeometry(f!(
                "Assembly number {} is used more than once",
                a.number
            )));
        }

        check_blocks(core, a)?;

        // every assembly has at least one block at this point
        let (bottom, top) = (a.blocks[0].bottom, a.blocks[a.blocks.len() - 1].top);
        match extent {
            None => extent = Some((bottom, top)),
            Some((b, t)) => {
                if (b - bottom).abs() > ELEVATION_TOLERANCE || (t - top).abs() > ELEVATION_TOLERANCE
                {
                    return Err(Error::InvalidGeometry(f!(
                        "Assembly {} spans {bottom}-{top} cm, expected {b}-{t} cm",
                        a.number
                    )));
                }
            }
        }
    }

    Ok(())
}

fn check_blocks(core: &Core, assembly: &Assembly) -> Result<()> {
    if assembly.blocks.is_empty() {
        return Err(Error::InvalidGeometry(f!(
            "Assembly {} has no blocks",
            assembly.number
        )));
    }

    for block in &assembly.blocks {
        if !(block.bottom.is_finite() && block.top.is_finite() && block.height() > 0.0) {
            return Err(Error::InvalidGeometry(f!(
                "Block {}-{} cm in assembly {} is not strictly increasing",
                block.bottom,
                block.top,
                assembly.number
            )));
        }
        for (name, d) in &block.densities {
            if !(d.is_finite() && *d >= 0.0) {
                return Err(Error::InvalidGeometry(f!(
                    "Invalid {name} density {d} in assembly {}",
                    assembly.number
                )));
            }
            if core.nuclide(name).is_none() {
                return Err(Error::InvalidGeometry(f!(
                    "Nuclide {name} in assembly {} is not in the library",
                    assembly.number
                )));
            }
        }
    }

    for pair in assembly.blocks.windows(2) {
        if (pair[1].bottom - pair[0].top).abs() > ELEVATION_TOLERANCE {
            return Err(Error::InvalidGeometry(f!(
                "Blocks of assembly {} are not contiguous at {} cm",
                assembly.number,
                pair[0].top
            )));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::model::fixtures::hex_core;
    use crate::options::SpatialApproximation;
    use rstest::rstest;

    #[rstest]
    #[case(1)]
    #[case(2)]
    #[case(4)]
    fn full_core_cardinality(#[case] rings: usize) {
        let core = hex_core(rings, Symmetry::Full);
        let addressing = Addressing::new(&core, &SolverOptions::default()).unwrap();
        assert_eq!(
            addressing.regions.len(),
            core.assemblies.len() * addressing.mesh.n_cells()
        );
    }

    #[rstest]
    #[case(2)]
    #[case(3)]
    #[case(5)]
    fn third_core_cardinality(#[case] rings: usize) {
        let full = hex_core(rings, Symmetry::Full);
        let third = hex_core(rings, Symmetry::ThirdPeriodic);
        let mesh = UniformMesh::from_blocks(&full).unwrap();

        let n_full = RegionMap::new(&full, &mesh).unwrap().len() / mesh.n_cells();
        let n_third = RegionMap::new(&third, &mesh).unwrap().len() / mesh.n_cells();
        assert_eq!(n_third, (n_full - 1) / 3 + 1);
    }

    #[test]
    fn canonical_order_and_lookup() {
        let core = hex_core(2, Symmetry::Full);
        let mesh = UniformMesh::from_blocks(&core).unwrap();
        let map = RegionMap::new(&core, &mesh).unwrap();

        for (i, region) in map.regions().iter().enumerate() {
            assert_eq!(region.index, i);
            assert_eq!(map.index(region.ring, region.position, region.axial), Some(i));
        }

        let first = map.region(0).unwrap();
        assert_eq!((first.ring, first.position, first.axial), (1, 1, 0));
        assert_eq!(first.label, "A1001A");
        assert_eq!(first.zone, "B0001A");

        let second_assembly = map.region(mesh.n_cells()).unwrap();
        assert_eq!((second_assembly.ring, second_assembly.position), (2, 1));
        assert_eq!(map.index(2, 7, 0), None);
    }

    #[test]
    fn centre_volume_is_cut_in_third_core() {
        let core = hex_core(2, Symmetry::ThirdPeriodic);
        let mesh = UniformMesh::from_blocks(&core).unwrap();
        let map = RegionMap::new(&core, &mesh).unwrap();

        let centre = map.region(0).unwrap();
        let outer = map.region(mesh.n_cells()).unwrap();
        let ratio = centre.volume / outer.volume;
        assert!((ratio - 1.0 / 3.0).abs() < 1e-12);
    }

    #[rstest]
    #[case(Symmetry::Full, BoundaryCondition::Infinite, [3, 3, 3, 3, 3, 3])]
    #[case(Symmetry::Full, BoundaryCondition::Reflective, [3, 3, 3, 3, 4, 4])]
    #[case(Symmetry::Full, BoundaryCondition::Extrapolated, [4, 4, 4, 4, 4, 4])]
    #[case(Symmetry::Full, BoundaryCondition::ZeroFlux, [7, 2, 2, 2, 2, 2])]
    #[case(Symmetry::ThirdPeriodic, BoundaryCondition::Infinite, [7, 3, 3, 3, 3, 3])]
    #[case(Symmetry::ThirdPeriodic, BoundaryCondition::Reflective, [7, 3, 3, 3, 4, 4])]
    #[case(Symmetry::ThirdPeriodic, BoundaryCondition::ZeroInwardCurrent, [7, 4, 4, 4, 4, 4])]
    #[case(Symmetry::ThirdPeriodic, BoundaryCondition::ZeroFlux, [7, 2, 2, 2, 2, 2])]
    fn boundary_codes(
        #[case] symmetry: Symmetry,
        #[case] boundaries: BoundaryCondition,
        #[case] expected: [i64; 6],
    ) {
        let options = SolverOptions {
            boundaries,
            ..Default::default()
        };
        assert_eq!(BoundaryConditions::new(symmetry, &options).codes, expected);
    }

    #[rstest]
    #[case(Symmetry::Full, SpatialApproximation::Nodal, 120)]
    #[case(Symmetry::Full, SpatialApproximation::FiniteDifference, 100)]
    #[case(Symmetry::ThirdPeriodic, SpatialApproximation::Transport, 126)]
    #[case(Symmetry::ThirdPeriodic, SpatialApproximation::FiniteDifference, 94)]
    fn geometry_numbers(
        #[case] symmetry: Symmetry,
        #[case] approximation: SpatialApproximation,
        #[case] expected: i64,
    ) {
        let options = SolverOptions {
            approximation,
            ..Default::default()
        };
        let bc = BoundaryConditions::new(symmetry, &options);
        assert_eq!(bc.geometry_number, expected);
    }

    #[test]
    fn coefficients_only_where_needed() {
        let options = SolverOptions::default();
        let bc = BoundaryConditions::new(Symmetry::Full, &options);
        assert_eq!(bc.coefficients(), None);

        let options = SolverOptions {
            boundaries: BoundaryCondition::ZeroInwardCurrent,
            ..Default::default()
        };
        let bc = BoundaryConditions::new(Symmetry::ThirdPeriodic, &options);
        assert_eq!(bc.coefficients(), Some([0.0, 0.5, 0.5, 0.5, 0.5, 0.5]));
    }

    #[test]
    fn submesh_counts() {
        let core = hex_core(1, Symmetry::Full);
        let mesh = UniformMesh::from_blocks(&core).unwrap();
        let zones = AxialZone::from_mesh(&mesh, Some(10.0));
        let counts: Vec<usize> = zones.iter().map(|z| z.submeshes).collect();
        assert_eq!(counts, vec![2, 3, 3, 2]);
        assert_eq!(zones.last().unwrap().top, 100.0);
        assert!(AxialZone::from_mesh(&mesh, None).iter().all(|z| z.submeshes == 1));
    }

    #[test]
    fn duplicate_location_is_rejected() {
        let mut core = hex_core(2, Symmetry::Full);
        core.assemblies[2].position = 1;
        let err = validate_core(&core).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidGeometry);
    }

    #[rstest]
    #[case(2, 7)]
    #[case(1, 2)]
    #[case(0, 1)]
    fn position_out_of_range(#[case] ring: usize, #[case] position: usize) {
        let mut core = hex_core(2, Symmetry::Full);
        core.assemblies[1].ring = ring;
        core.assemblies[1].position = position;
        assert!(validate_core(&core).is_err());
    }

    #[test]
    fn unknown_nuclide_is_rejected() {
        let mut core = hex_core(1, Symmetry::Full);
        core.assemblies[0].blocks[0]
            .densities
            .insert("PU239".to_string(), 0.001);
        assert!(validate_core(&core).is_err());
    }

    #[test]
    fn gap_between_blocks_is_rejected() {
        let mut core = hex_core(1, Symmetry::Full);
        core.assemblies[0].blocks[1].bottom = 21.0;
        assert!(validate_core(&core).is_err());
    }

    #[test]
    fn mismatched_assembly_heights_are_rejected() {
        let mut core = hex_core(2, Symmetry::Full);
        let last = core.assemblies[3].blocks.len() - 1;
        core.assemblies[3].blocks[last].top = 110.0;
        assert!(validate_core(&core).is_err());
    }
}
