//! DIF3D-style six character labels
//!
//! DIF3D wants labels that start with a letter and are six characters long.
//! Axial indices are mapped onto single characters: `A-Z`, then `0-9`, then
//! ASCII 91 through 122 (`[` to `z`).

// internal modules
use crate::error::{Error, Result};
use crate::utils::*;

/// Number of axial cells that can be given a single character label
pub const MAX_AXIAL_CELLS: usize = 26 + 10 + 32;

/// Single character for an axial index, bottom cell is `A`
///
/// ```rust
/// # use dif3d::geometry::axial_char;
/// assert_eq!(axial_char(0), Some('A'));
/// assert_eq!(axial_char(26), Some('0'));
/// assert_eq!(axial_char(36), Some('['));
/// assert_eq!(axial_char(67), Some('z'));
/// assert_eq!(axial_char(68), None);
/// ```
pub fn axial_char(index: usize) -> Option<char> {
    let code = match index {
        0..=25 => b'A' + index as u8,
        26..=35 => b'0' + (index - 26) as u8,
        36..=67 => 91 + (index - 36) as u8,
        _ => return None,
    };
    Some(code as char)
}

/// Composition (zone) label of a block, `B{assembly:04}{axial}`
///
/// ```rust
/// # use dif3d::geometry::zone_label;
/// assert_eq!(zone_label(12, 4).unwrap(), "B0012E");
/// assert!(zone_label(10000, 0).is_err());
/// ```
pub fn zone_label(assembly: usize, axial: usize) -> Result<String> {
    if assembly > 9999 {
        return Err(Error::InvalidGeometry(f!(
            "Assembly number {assembly} does not fit a zone label"
        )));
    }
    Ok(f!("B{assembly:04}{}", checked_axial_char(axial)?))
}

/// Area label of an assembly location, e.g. ring 3 position 2 is `A3002`
///
/// The tens digit of the ring is written as a letter, so only rings below 26
/// and positions below 1000 can be labelled.
///
/// ```rust
/// # use dif3d::geometry::area_label;
/// assert_eq!(area_label(3, 2).unwrap(), "A3002");
/// assert_eq!(area_label(12, 45).unwrap(), "B2045");
/// assert!(area_label(26, 1).is_err());
/// ```
pub fn area_label(ring: usize, position: usize) -> Result<String> {
    if ring >= 26 || position >= 1000 {
        return Err(Error::InvalidGeometry(f!(
            "Cannot derive a label for ring {ring} position {position}"
        )));
    }
    let letter = (b'A' + (ring / 10) as u8) as char;
    Ok(f!("{letter}{}{position:03}", ring % 10))
}

/// Region label, the area label with the axial character appended
///
/// ```rust
/// # use dif3d::geometry::region_label;
/// assert_eq!(region_label(3, 2, 4).unwrap(), "A3002E");
/// ```
pub fn region_label(ring: usize, position: usize, axial: usize) -> Result<String> {
    Ok(f!("{}{}", area_label(ring, position)?, checked_axial_char(axial)?))
}

fn checked_axial_char(axial: usize) -> Result<char> {
    axial_char(axial).ok_or_else(|| {
        Error::InvalidGeometry(f!(
            "Axial index {axial} exceeds the {MAX_AXIAL_CELLS} labelled cells"
        ))
    })
}
