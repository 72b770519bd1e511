//! Rendering of the DIF3D input file
//!
//! The input is made of three free-format blocks following the ISOTXS
//! dataset declaration:
//!
//! | Block      | Content                                               |
//! | ---------- | ----------------------------------------------------- |
//! | `A.DIF3D`  | Solution controls, convergence, kernel options        |
//! | `A.NIP3`   | Geometry, boundaries, axial mesh, compositions        |
//! | `A.SUMMAR` | Nuclide summary, only when the real flux is requested |
//!
//! Cards are described declaratively in [records](crate::input::Card) and
//! the [InputWriter] fills them from the options and the addressing.

mod records;
mod writer;

#[doc(inline)]
pub use crate::input::records::{Card, Field, Value};

#[doc(inline)]
pub use crate::input::writer::InputWriter;

/// Full card table, for anyone wanting to write individual cards
pub mod cards {
    pub use crate::input::records::{
        DIF3D_01, DIF3D_02, DIF3D_03, DIF3D_04, DIF3D_05, DIF3D_06, DIF3D_10, DIF3D_11,
        NIP3_01, NIP3_02, NIP3_03, NIP3_04, NIP3_05, NIP3_09, NIP3_13, NIP3_14, NIP3_15,
        NIP3_29, NIP3_30, SUMMAR_02,
    };
}
