//! Read-only snapshot of the reactor model
//!
//! # Overview
//!
//! The reactor data model itself lives outside this crate. What the crate sees
//! is a [Core] snapshot: hexagonal assemblies addressed by ring and position,
//! each holding an ordered stack of axial [Block]s with their compositions.
//!
//! Nothing in the crate mutates the snapshot. Results go back to the model
//! through the [ReactorModel] trait as a separate
//! [MappedState](crate::convert::MappedState) record.
//!
//! # Quickstart
//!
//! Snapshots are normally exported from the reactor model as JSON.
//!
//! ```rust
//! use dif3d::model::Core;
//!
//! let json = r#"{
//!     "symmetry": "full",
//!     "pitch": 16.0,
//!     "nuclides": [
//!         {"name": "U235", "label": "U235", "lib_id": "U235_7", "weight": 235.04, "kind": "fissile"}
//!     ],
//!     "assemblies": [{
//!         "ring": 1, "position": 1, "number": 1,
//!         "blocks": [
//!             {"bottom": 0.0, "top": 50.0, "xs_suffix": "AA", "densities": {"U235": 0.002}}
//!         ]
//!     }]
//! }"#;
//!
//! let core = Core::from_json(json).unwrap();
//! assert_eq!(core.n_blocks(), 1);
//! ```

// Split into subfiles for development, but anything important is re-exported
mod core;
mod nuclide;

#[doc(inline)]
pub use crate::model::core::{Assembly, Block, Core, MacroXs, Symmetry};

#[doc(inline)]
pub use crate::model::nuclide::{Nuclide, NuclideKind};

use crate::convert::MappedState;
use crate::error::Result;

/// Collaborator interface to the reactor data model
///
/// The model exposes a snapshot for reading and accepts the mapped results
/// as a single write at the end of a run.
pub trait ReactorModel {
    /// Current geometry, compositions, and cross sections
    fn snapshot(&self) -> Result<Core>;

    /// Write per-block flux, power, and reaction rates back onto the model
    fn commit(&mut self, state: MappedState) -> Result<()>;
}

/// Small cores shared by the unit tests
#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;
    use std::collections::BTreeMap;

    /// Hex core of `rings` rings with staggered axial meshes between rings
    ///
    /// Odd rings are split at 20, 50, 80 cm and even rings at 30, 50 cm, so
    /// the uniform mesh is 0, 20, 30, 50, 80, 100.
    pub(crate) fn hex_core(rings: usize, symmetry: Symmetry) -> Core {
        let nuclides = vec![
            nuclide("U235", "U2357", 235.044, NuclideKind::Fissile),
            nuclide("U238", "U2387", 238.051, NuclideKind::Fertile),
            nuclide("NA23", "NA237", 22.990, NuclideKind::Other),
            nuclide("DUMP1", "DUMP1", 0.0, NuclideKind::Dummy),
        ];

        let mut assemblies = Vec::new();
        let mut number = 1;
        for ring in 1..=rings {
            for position in 1..=Symmetry::positions_in_ring(ring) {
                let bounds: &[f64] = match ring % 2 {
                    1 => &[0.0, 20.0, 50.0, 80.0, 100.0],
                    _ => &[0.0, 30.0, 50.0, 100.0],
                };
                let blocks = bounds
                    .windows(2)
                    .enumerate()
                    .map(|(i, w)| block(w[0], w[1], i))
                    .collect();
                assemblies.push(Assembly {
                    ring,
                    position,
                    number,
                    blocks,
                });
                number += 1;
            }
        }

        Core {
            symmetry,
            pitch: 16.0,
            nuclides,
            assemblies,
        }
    }

    fn nuclide(name: &str, lib_id: &str, weight: f64, kind: NuclideKind) -> Nuclide {
        Nuclide {
            name: name.to_string(),
            label: name.to_string(),
            lib_id: lib_id.to_string(),
            weight,
            kind,
        }
    }

    fn block(bottom: f64, top: f64, i: usize) -> Block {
        let densities = BTreeMap::from([
            ("U235".to_string(), 0.001 * (i + 1) as f64),
            ("U238".to_string(), 0.02),
            ("NA23".to_string(), 0.0),
            ("DUMP1".to_string(), 1.0),
        ]);
        Block {
            bottom,
            top,
            xs_suffix: if i == 0 { "AA" } else { "AB" }.to_string(),
            densities,
            xs: Some(MacroXs {
                capture: vec![0.01, 0.02],
                fission: vec![0.005, 0.01],
                absorption: vec![0.015, 0.03],
                n2n: vec![0.001, 0.0],
                nu_fission: vec![0.0125, 0.025],
            }),
        }
    }
}
