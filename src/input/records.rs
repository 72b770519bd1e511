//! Declarative descriptions of the fixed-format input cards
//!
//! Each [Card] is a card id plus the list of fields making up one group of
//! values. Cards that carry more than one group per line (compositions,
//! region assignments) simply repeat the field list along the line.
//!
//! The blocks are read free format, so fields are separated by one blank on
//! top of their fixed width.

// internal modules
use crate::error::{Error, Result};
use crate::utils::*;

/// Fixed-width field of a card
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    /// Right aligned integer of width `w`
    Int(usize),
    /// Right aligned FORTRAN `E` of width `w` with `p` decimals
    Real(usize, usize),
    /// Left aligned text of width `w`
    Text(usize),
}

/// Value to be written into a [Field]
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Int(i64),
    Real(f64),
    Text(String),
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Int(value)
    }
}

impl From<usize> for Value {
    fn from(value: usize) -> Self {
        Value::Int(value as i64)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Real(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Text(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Text(value)
    }
}

impl Field {
    /// Format a single value, failing if it does not fit
    fn render(&self, value: &Value, card: &str) -> Result<String> {
        let s = match (self, value) {
            (Field::Int(w), Value::Int(v)) => {
                let s = f!("{v:>w$}");
                if s.len() > *w {
                    return Err(Error::render(card, f!("{v} overflows I{w}")));
                }
                s
            }
            (Field::Real(w, p), Value::Real(v)) => {
                if !v.is_finite() {
                    return Err(Error::render(card, f!("{v} is not a finite number")));
                }
                let s = f!("{:>w$}", v.fortran(*p));
                if s.len() > *w {
                    return Err(Error::render(card, f!("{v} overflows E{w}.{p}")));
                }
                s
            }
            (Field::Text(w), Value::Text(v)) => {
                if !v.is_ascii() || v.len() > *w {
                    return Err(Error::render(card, f!("\"{v}\" does not fit A{w}")));
                }
                f!("{v:<w$}")
            }
            (field, value) => {
                return Err(Error::render(
                    card,
                    f!("{value:?} cannot be written to a {field:?} field"),
                ))
            }
        };
        Ok(s)
    }
}

/// One card type of an input block
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Card {
    /// Block the card belongs to, e.g. `A.NIP3`
    pub block: &'static str,
    /// Card number written at the start of every line
    pub id: &'static str,
    /// Fields of a single group of values
    pub fields: &'static [Field],
    /// How many groups are packed onto one line
    pub groups_per_line: usize,
}

impl Card {
    /// Render groups of values, packing `groups_per_line` onto each line
    ///
    /// ```rust
    /// # use dif3d::input::{Card, Field, Value};
    /// const CARD: Card = Card {
    ///     block: "A.NIP3",
    ///     id: "15",
    ///     fields: &[Field::Text(6), Field::Text(6)],
    ///     groups_per_line: 2,
    /// };
    /// let groups: Vec<Vec<Value>> = ["A", "B", "C"]
    ///     .iter()
    ///     .map(|r| vec![Value::from("Z1"), Value::from(*r)])
    ///     .collect();
    ///
    /// let lines = CARD.render(&groups).unwrap();
    /// assert_eq!(lines[0], "15    Z1     A      Z1     B");
    /// assert_eq!(lines[1], "15    Z1     C");
    /// ```
    pub fn render(&self, groups: &[Vec<Value>]) -> Result<Vec<String>> {
        groups
            .chunks(self.groups_per_line.max(1))
            .map(|chunk| self.render_line(chunk))
            .collect()
    }

    /// Render a single group of values onto its own line
    pub fn render_one(&self, values: Vec<Value>) -> Result<String> {
        self.render_line(&[values])
    }

    fn render_line(&self, groups: &[Vec<Value>]) -> Result<String> {
        let name = self.name();
        let mut fields: Vec<String> = Vec::with_capacity(self.fields.len() * groups.len());

        for values in groups {
            if values.len() != self.fields.len() {
                return Err(Error::render(
                    &name,
                    f!(
                        "expected {} values per group, got {}",
                        self.fields.len(),
                        values.len()
                    ),
                ));
            }
            for (field, value) in self.fields.iter().zip(values) {
                fields.push(field.render(value, &name)?);
            }
        }

        let line = f!("{:<6}{}", self.id, fields.join(" "));
        Ok(line.trim_end().to_string())
    }

    /// Full name used in error messages, e.g. `A.NIP3 card 13`
    pub fn name(&self) -> String {
        f!("{} card {}", self.block, self.id)
    }
}

const DIF3D: &str = "A.DIF3D";
const NIP3: &str = "A.NIP3";
const SUMMAR: &str = "A.SUMMAR";

const TITLE: &[Field] = &[Field::Text(66)];
const INT_1: &[Field] = &[Field::Int(6)];
const INT_4: &[Field] = &[Field::Int(6); 4];
const INT_6: &[Field] = &[Field::Int(6); 6];
const INT_10: &[Field] = &[Field::Int(6); 10];
const REAL_3: &[Field] = &[Field::Real(12, 5); 3];
const REAL_6: &[Field] = &[Field::Real(12, 5); 6];

/// Problem title
pub const DIF3D_01: Card = Card {
    block: DIF3D,
    id: "01",
    fields: TITLE,
    groups_per_line: 1,
};

/// Memory for the fast, extended and ECM containers
pub const DIF3D_02: Card = Card {
    block: DIF3D,
    id: "02",
    fields: &[Field::Int(12); 3],
    groups_per_line: 1,
};

/// IPROBT ISOLNT IXTRAP MINBSZ NOUTMX IRSTRT LIMTIM NUPMAX IOSAVE IOMEG
pub const DIF3D_03: Card = Card {
    block: DIF3D,
    id: "03",
    fields: INT_10,
    groups_per_line: 1,
};

/// Edit options and inner iteration limit
pub const DIF3D_04: Card = Card {
    block: DIF3D,
    id: "04",
    fields: INT_4,
    groups_per_line: 1,
};

/// Eigenvalue, pointwise and average fission source convergence criteria
pub const DIF3D_05: Card = Card {
    block: DIF3D,
    id: "05",
    fields: REAL_3,
    groups_per_line: 1,
};

/// Eigenvalue guess, error reduction factor, and fission neglect fraction
pub const DIF3D_06: Card = Card {
    block: DIF3D,
    id: "06",
    fields: REAL_3,
    groups_per_line: 1,
};

/// Nodal options
pub const DIF3D_10: Card = Card {
    block: DIF3D,
    id: "10",
    fields: INT_4,
    groups_per_line: 1,
};

/// VARIANT transport options
pub const DIF3D_11: Card = Card {
    block: DIF3D,
    id: "11",
    fields: INT_4,
    groups_per_line: 1,
};

pub const NIP3_01: Card = Card {
    block: NIP3,
    id: "01",
    fields: TITLE,
    groups_per_line: 1,
};

/// ISOTXS print flag
pub const NIP3_02: Card = Card {
    block: NIP3,
    id: "02",
    fields: INT_1,
    groups_per_line: 1,
};

/// Geometry number
pub const NIP3_03: Card = Card {
    block: NIP3,
    id: "03",
    fields: INT_1,
    groups_per_line: 1,
};

/// Boundary codes
pub const NIP3_04: Card = Card {
    block: NIP3,
    id: "04",
    fields: INT_6,
    groups_per_line: 1,
};

/// Boundary coefficients
pub const NIP3_05: Card = Card {
    block: NIP3,
    id: "05",
    fields: REAL_6,
    groups_per_line: 1,
};

/// Axial mesh: direction, submeshes, upper elevation
pub const NIP3_09: Card = Card {
    block: NIP3,
    id: "09",
    fields: &[Field::Text(6), Field::Int(6), Field::Real(12, 5)],
    groups_per_line: 1,
};

/// Number densities: zone, nuclide, density
pub const NIP3_13: Card = Card {
    block: NIP3,
    id: "13",
    fields: &[Field::Text(6), Field::Text(8), Field::Real(12, 5)],
    groups_per_line: 3,
};

/// Zone compositions: zone, composition, fraction
pub const NIP3_14: Card = Card {
    block: NIP3,
    id: "14",
    fields: &[Field::Text(6), Field::Text(6), Field::Real(12, 5)],
    groups_per_line: 1,
};

/// Zone to region assignment
pub const NIP3_15: Card = Card {
    block: NIP3,
    id: "15",
    fields: &[Field::Text(6), Field::Text(6)],
    groups_per_line: 3,
};

/// Hex pitch
pub const NIP3_29: Card = Card {
    block: NIP3,
    id: "29",
    fields: &[Field::Real(12, 5)],
    groups_per_line: 1,
};

/// Hexagon definitions: region, ring/position range, bottom, top
pub const NIP3_30: Card = Card {
    block: NIP3,
    id: "30",
    fields: &[
        Field::Text(6),
        Field::Int(6),
        Field::Int(6),
        Field::Int(6),
        Field::Int(6),
        Field::Real(12, 5),
        Field::Real(12, 5),
    ],
    groups_per_line: 1,
};

/// Nuclide summary: library id, type, weight, ISOTXS label
pub const SUMMAR_02: Card = Card {
    block: SUMMAR,
    id: "02",
    fields: &[
        Field::Text(8),
        Field::Text(6),
        Field::Real(12, 5),
        Field::Text(8),
    ],
    groups_per_line: 1,
};

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use rstest::rstest;

    #[test]
    fn card_id_and_fields() {
        let line = DIF3D_05
            .render_one(vec![1.0e-7.into(), 1.0e-5.into(), 1.0e-5.into()])
            .unwrap();
        assert_eq!(line, "05     1.00000E-07  1.00000E-05  1.00000E-05");
    }

    #[test]
    fn mixed_fields() {
        let line = NIP3_09
            .render_one(vec!["Z".into(), 2_usize.into(), 20.0.into()])
            .unwrap();
        assert_eq!(line, "09    Z           2  2.00000E+01");
    }

    #[test]
    fn three_groups_per_line() {
        let groups: Vec<Vec<Value>> = (1..=4)
            .map(|i| vec!["B0001A".into(), f!("NUC{i}").into(), (i as f64).into()])
            .collect();
        let lines = NIP3_13.render(&groups).unwrap();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].len(), 6 + 3 * 26 + 8);
        assert!(lines[1].starts_with("13    B0001A NUC4      4.00000E+00"));
    }

    #[rstest]
    #[case(DIF3D_03, vec![Value::Int(1234567); 10])]
    #[case(NIP3_29, vec![Value::Real(f64::NAN)])]
    #[case(NIP3_15, vec![Value::from("TOOLONGZONE"), Value::from("A1001A")])]
    #[case(NIP3_29, vec![Value::Int(1)])]
    #[case(NIP3_29, vec![Value::Real(1.0), Value::Real(2.0)])]
    fn values_that_do_not_fit(#[case] card: Card, #[case] values: Vec<Value>) {
        let err = card.render_one(values).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::RenderFailure);
        assert!(err.to_string().contains(&card.name()));
    }

    #[test]
    fn three_digit_exponent_overflows_narrow_field() {
        const NARROW: Card = Card {
            block: "TEST",
            id: "99",
            fields: &[Field::Real(11, 5)],
            groups_per_line: 1,
        };
        assert!(NARROW.render_one(vec![1.0e-5.into()]).is_ok());
        assert!(NARROW.render_one(vec![1.0e-150.into()]).is_err());
    }
}
