// internal modules
use crate::error::{Error, Result};
use crate::model::Nuclide;
use crate::utils::*;

// standard library
use std::collections::BTreeMap;
use std::path::Path;

// external crates
use log::debug;
use serde::{Deserialize, Serialize};

/// Core symmetry options supported for hexagonal geometry
///
/// | Symmetry       | Modeled positions in ring `r > 1` | Centre assembly |
/// | -------------- | --------------------------------- | --------------- |
/// | Full           | 1 ..= 6(r-1)                      | whole           |
/// | ThirdPeriodic  | 1 ..= 2(r-1)                      | one third       |
///
/// Positions beyond the 1/3 wedge are 120 degree rotations of positions
/// inside it, and are excluded from the solver model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Symmetry {
    #[default]
    Full,
    ThirdPeriodic,
}

impl Symmetry {
    /// Number of hex positions around a ring
    ///
    /// ```rust
    /// # use dif3d::model::Symmetry;
    /// assert_eq!(Symmetry::positions_in_ring(1), 1);
    /// assert_eq!(Symmetry::positions_in_ring(3), 12);
    /// ```
    pub fn positions_in_ring(ring: usize) -> usize {
        match ring {
            0 => 0,
            1 => 1,
            r => 6 * (r - 1),
        }
    }

    /// Check if a ring/position is physically modeled under this symmetry
    ///
    /// ```rust
    /// # use dif3d::model::Symmetry;
    /// assert!(Symmetry::ThirdPeriodic.is_modeled(1, 1));
    /// assert!(Symmetry::ThirdPeriodic.is_modeled(3, 4));
    /// assert!(!Symmetry::ThirdPeriodic.is_modeled(3, 5));
    /// assert!(Symmetry::Full.is_modeled(3, 12));
    /// ```
    pub fn is_modeled(&self, ring: usize, position: usize) -> bool {
        match self {
            Self::Full => true,
            Self::ThirdPeriodic => match ring {
                1 => true,
                r => position <= 2 * r.saturating_sub(1),
            },
        }
    }

    /// Fraction of an assembly that sits inside the modeled domain
    ///
    /// Only the centre assembly of a 1/3 core is cut by the symmetry lines.
    pub fn volume_fraction(&self, ring: usize) -> f64 {
        match (self, ring) {
            (Self::ThirdPeriodic, 1) => 1.0 / 3.0,
            _ => 1.0,
        }
    }
}

/// Macroscopic cross sections of a block (1/cm), one value per energy group
#[derive(Debug, Clone, PartialEq, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct MacroXs {
    pub capture: Vec<f64>,
    pub fission: Vec<f64>,
    pub absorption: Vec<f64>,
    pub n2n: Vec<f64>,
    /// nu-fission, neutrons produced per unit path length
    pub nu_fission: Vec<f64>,
}

impl MacroXs {
    /// Check that every reaction has exactly `n_groups` entries
    pub fn has_groups(&self, n_groups: usize) -> bool {
        [
            &self.capture,
            &self.fission,
            &self.absorption,
            &self.n2n,
            &self.nu_fission,
        ]
        .iter()
        .all(|xs| xs.len() == n_groups)
    }
}

/// A single axial block of an assembly
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Block {
    /// Bottom elevation (cm)
    pub bottom: f64,
    /// Top elevation (cm)
    pub top: f64,
    /// Cross section suffix appended to nuclide labels, e.g. `AA`
    pub xs_suffix: String,
    /// Number densities (atoms/b-cm) by nuclide name
    #[serde(default)]
    pub densities: BTreeMap<String, f64>,
    /// Macroscopic cross sections for recomputing reaction rates
    #[serde(default)]
    pub xs: Option<MacroXs>,
}

impl Block {
    /// Axial height of the block (cm)
    pub fn height(&self) -> f64 {
        self.top - self.bottom
    }

    /// Length of overlap with an axial segment, zero if they do not touch
    ///
    /// ```rust
    /// # use dif3d::model::Block;
    /// let block = Block {
    ///     bottom: 10.0,
    ///     top: 20.0,
    ///     xs_suffix: "AA".to_string(),
    ///     densities: Default::default(),
    ///     xs: None,
    /// };
    /// assert_eq!(block.overlap(15.0, 30.0), 5.0);
    /// assert_eq!(block.overlap(20.0, 30.0), 0.0);
    /// ```
    pub fn overlap(&self, bottom: f64, top: f64) -> f64 {
        (self.top.min(top) - self.bottom.max(bottom)).max(0.0)
    }
}

/// A hexagonal assembly at a ring/position with its stack of blocks
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Assembly {
    /// Hex ring, 1 for the centre
    pub ring: usize,
    /// Position around the ring, starting at 1
    pub position: usize,
    /// Assembly number used in composition names
    pub number: usize,
    /// Blocks ordered bottom to top
    pub blocks: Vec<Block>,
}

impl Assembly {
    /// Bottom elevation of the first block
    pub fn bottom(&self) -> Option<f64> {
        self.blocks.first().map(|b| b.bottom)
    }

    /// Top elevation of the last block
    pub fn top(&self) -> Option<f64> {
        self.blocks.last().map(|b| b.top)
    }
}

/// Snapshot of the whole core as seen by the solver interface
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Core {
    #[serde(default)]
    pub symmetry: Symmetry,
    /// Flat-to-flat hex assembly pitch (cm)
    pub pitch: f64,
    /// Every nuclide that may appear in a composition, in library order
    pub nuclides: Vec<Nuclide>,
    pub assemblies: Vec<Assembly>,
}

impl Core {
    /// Read a core snapshot from a JSON string
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json)
            .map_err(|e| Error::InvalidGeometry(f!("Could not read core snapshot: {e}")))
    }

    /// Read a core snapshot from a JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        debug!("Reading core snapshot from {}", path.display());
        Self::from_json(&std::fs::read_to_string(path)?)
    }

    /// Total number of blocks in the snapshot
    pub fn n_blocks(&self) -> usize {
        self.assemblies.iter().map(|a| a.blocks.len()).sum()
    }

    /// Cross-sectional area of one hexagon (cm2)
    ///
    /// ```rust
    /// # use dif3d::model::{Core, Symmetry};
    /// let core = Core { symmetry: Symmetry::Full, pitch: 2.0, nuclides: vec![], assemblies: vec![] };
    /// assert!((core.hex_area() - 2.0 * 3.0_f64.sqrt()).abs() < 1e-12);
    /// ```
    pub fn hex_area(&self) -> f64 {
        0.5 * 3.0_f64.sqrt() * self.pitch * self.pitch
    }

    /// Assemblies inside the modeled domain, in canonical (ring, position) order
    pub fn modeled_assemblies(&self) -> Vec<&Assembly> {
        let mut assemblies: Vec<&Assembly> = self
            .assemblies
            .iter()
            .filter(|a| self.symmetry.is_modeled(a.ring, a.position))
            .collect();
        assemblies.sort_by_key(|a| (a.ring, a.position));
        assemblies
    }

    /// Look up a nuclide definition by name
    pub fn nuclide(&self, name: &str) -> Option<&Nuclide> {
        self.nuclides.iter().find(|n| n.name == name)
    }

    /// Every cross section suffix used in the modeled core, sorted
    pub fn xs_suffixes(&self) -> Vec<String> {
        let mut suffixes: Vec<String> = self
            .modeled_assemblies()
            .iter()
            .flat_map(|a| a.blocks.iter().map(|b| b.xs_suffix.clone()))
            .collect();
        suffixes.sort();
        suffixes.dedup();
        suffixes
    }
}
