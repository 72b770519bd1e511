//! Geometry addressing for the hexagonal solver model
//!
//! # Overview
//!
//! DIF3D knows nothing of rings, positions, and blocks of different heights.
//! It sees regions: a hex area at one level of a single axial mesh shared by
//! the whole core. This module provides the mapping.
//!
//! - [UniformMesh] is the shared axial mesh, by default the union of every
//!   block boundary
//! - [UniformCore] projects each assembly onto it with length-weighted
//!   compositions
//! - [RegionMap] is the bijection between (ring, position, axial cell) and
//!   the linear region index used by the solver
//! - [BoundaryConditions] and [AxialZone] describe the outer boundary and
//!   axial mesh cards
//!
//! The region index is built in a canonical order: assemblies sorted by ring
//! then position, then axial cells bottom to top. Only assemblies inside the
//! modeled domain are included, so a 1/3 core drops everything outside the
//! wedge.
//!
//! # Labels
//!
//! | Label  | Example  | Made from                             |
//! | ------ | -------- | ------------------------------------- |
//! | Zone   | `B0012E` | assembly number and axial character   |
//! | Area   | `A3002`  | ring (tens as a letter) and position  |
//! | Region | `A3002E` | area label and axial character        |
//!
//! # Example
//!
//! ```rust
//! # use dif3d::geometry::Addressing;
//! # use dif3d::model::Core;
//! # use dif3d::options::SolverOptions;
//! let json = r#"{
//!     "pitch": 16.0,
//!     "nuclides": [],
//!     "assemblies": [{
//!         "ring": 1, "position": 1, "number": 1,
//!         "blocks": [
//!             {"bottom": 0.0, "top": 50.0, "xs_suffix": "AA"},
//!             {"bottom": 50.0, "top": 100.0, "xs_suffix": "AB"}
//!         ]
//!     }]
//! }"#;
//!
//! let core = Core::from_json(json).unwrap();
//! let addressing = Addressing::new(&core, &SolverOptions::default()).unwrap();
//!
//! assert_eq!(addressing.regions.len(), 2);
//! assert_eq!(addressing.regions.labels(), vec!["A1001A", "A1001B"]);
//! assert_eq!(addressing.boundaries.geometry_number, 120);
//! ```

mod addressing;
mod axial;
mod labels;

#[doc(inline)]
pub use crate::geometry::addressing::{
    validate_core, Addressing, AxialZone, BoundaryConditions, Region, RegionMap,
};

#[doc(inline)]
pub use crate::geometry::axial::{
    UniformCell, UniformColumn, UniformCore, UniformMesh, ELEVATION_TOLERANCE,
};

#[doc(inline)]
pub use crate::geometry::labels::{
    area_label, axial_char, region_label, zone_label, MAX_AXIAL_CELLS,
};
