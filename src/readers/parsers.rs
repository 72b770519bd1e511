//! Line classification and small nom parsers for the printed DIF3D output

// internal modules
use crate::options::SolutionType;

// nom parser combinators
use nom::branch::alt;
use nom::bytes::complete::{tag, take_until};
use nom::character::complete::{char, digit0, digit1, one_of, space0, space1};
use nom::combinator::{map_res, opt, recognize};
use nom::sequence::{pair, preceded, tuple};
use nom::{self, IResult};

/// Width of the leading label columns of every table row
pub const LEAD_WIDTH: usize = 15;

/// Width of every value column
pub const WINDOW_WIDTH: usize = 13;

/// Start of the REGION TOTALS edit
pub fn is_region_totals(i: &str) -> bool {
    i.contains("REGION TOTALS")
}

/// End of the REGION TOTALS edit
pub fn is_reaction_integrals(i: &str) -> bool {
    i.contains("REACTION INTEGRALS")
}

pub fn is_real_problem(i: &str) -> bool {
    i.contains("REAL PROBLEM")
}

pub fn is_adjoint_problem(i: &str) -> bool {
    i.contains("ADJOINT PROBLEM")
}

pub fn is_keff(i: &str) -> bool {
    i.contains("K-EFFECTIVE =")
}

pub fn is_converged(i: &str) -> bool {
    i.contains("ITERATIONS HAVE CONVERGED")
}

/// Start of a group flux table, and which solution it belongs to
pub fn flux_table_marker(i: &str) -> Option<SolutionType> {
    if i.contains("ADJOINT REGION GROUP FLUX INTEGRALS") {
        Some(SolutionType::Adjoint)
    } else if i.contains("REAL REGION GROUP FLUX INTEGRALS") {
        Some(SolutionType::Real)
    } else {
        None
    }
}

/// Start of either group flux table
pub fn is_flux_table(i: &str) -> bool {
    flux_table_marker(i).is_some()
}

/// Region header row of the REGION TOTALS edit
pub fn is_totals_header(i: &str) -> bool {
    i.starts_with("     REGION")
}

/// Group header row of a group flux table
pub fn is_flux_header(i: &str) -> bool {
    i.trim_start().starts_with("REGION  LABEL")
}

/// Data row of a group flux table, a region number and label then values
pub fn is_flux_row(i: &str) -> bool {
    i.len() > LEAD_WIDTH && flux_row_lead(i).is_some()
}

/// Carriage control `1`, the page header printed at every page eject
pub fn is_page_eject(i: &str) -> bool {
    i.starts_with('1')
}

/// Later pages of a table are marked as continued
pub fn is_continued(i: &str) -> bool {
    i.contains("(CONTINUED)")
}

/// Split whatever follows the lead columns into fixed width windows
///
/// Trailing whitespace is dropped first, so a short final window is kept
/// as it is. Lines with multi-byte characters give nothing.
///
/// ```rust
/// # use dif3d::readers::parsers::windows;
/// let line = "     REGION        1  A1001A    2  A1001B";
/// assert_eq!(windows(line), vec!["    1  A1001A", "    2  A1001B"]);
/// ```
pub fn windows(i: &str) -> Vec<&str> {
    let i = i.trim_end();
    if !i.is_ascii() || i.len() <= LEAD_WIDTH {
        return Vec::new();
    }
    let data = &i[LEAD_WIDTH..];
    (0..data.len())
        .step_by(WINDOW_WIDTH)
        .map(|start| &data[start..(start + WINDOW_WIDTH).min(data.len())])
        .collect()
}

/// FORTRAN real, including the forms DIF3D prints
///
/// Handles `1.00830E+00`, three digit exponents such as `2.5E-120`, and the
/// form with the `E` dropped to make room for the exponent, `1.0-100`.
///
/// ```rust
/// # use dif3d::readers::parsers::fortran_float;
/// assert_eq!(fortran_float("1.00830E+00").unwrap().1, 1.0083);
/// assert_eq!(fortran_float("1.0-100").unwrap().1, 1.0e-100);
/// assert_eq!(fortran_float("2.5E-120").unwrap().1, 2.5e-120);
/// assert_eq!(fortran_float("0.00000E+00").unwrap().1, 0.0);
/// assert_eq!(fortran_float("-3.5").unwrap().1, -3.5);
/// ```
pub fn fortran_float(i: &str) -> IResult<&str, f64> {
    map_res(
        pair(mantissa, opt(exponent)),
        |(m, e): (&str, Option<&str>)| match e {
            Some(e) => format!("{m}e{e}").parse::<f64>(),
            None => m.parse::<f64>(),
        },
    )(i)
}

fn mantissa(i: &str) -> IResult<&str, &str> {
    recognize(tuple((
        opt(one_of("+-")),
        alt((
            recognize(tuple((digit1, opt(pair(char('.'), digit0))))),
            recognize(pair(char('.'), digit1)),
        )),
    )))(i)
}

fn exponent(i: &str) -> IResult<&str, &str> {
    alt((
        preceded(
            one_of("EeDd"),
            recognize(pair(opt(one_of("+-")), digit1)),
        ),
        recognize(pair(one_of("+-"), digit1)),
    ))(i)
}

/// A value window must hold a single number and nothing else
pub fn window_value(i: &str) -> Option<f64> {
    match fortran_float(i.trim()) {
        Ok(("", value)) => Some(value),
        _ => None,
    }
}

/// Eigenvalue from a `K-EFFECTIVE =` line
///
/// ```rust
/// # use dif3d::readers::parsers::keff;
/// let line = "0            K-EFFECTIVE =  1.00830171984";
/// assert_eq!(keff(line).unwrap().1, 1.00830171984);
/// ```
pub fn keff(i: &str) -> IResult<&str, f64> {
    preceded(
        tuple((take_until("K-EFFECTIVE ="), tag("K-EFFECTIVE ="), space0)),
        fortran_float,
    )(i)
}

/// Group number from a `GROUP n` header window
pub fn group_number(i: &str) -> IResult<&str, usize> {
    let (i, number) = preceded(tuple((space0, tag("GROUP"), space1)), digit1)(i)?;
    let (_, number) = nom::character::complete::u64(number)?;
    Ok((i, number as usize))
}

/// Region number and label from a region header window
///
/// The number is 5 wide, and swallows the separating blank from 10000
/// regions onwards, so the label is taken from the split.
pub fn region_window(i: &str) -> Option<(usize, &str)> {
    let mut parts = i.split_whitespace();
    let number = parts.next()?.parse::<usize>().ok()?;
    let label = parts.next()?;
    match parts.next() {
        None => Some((number, label)),
        Some(_) => None,
    }
}

/// Region number and label from the lead of a group flux data row
///
/// The number is right aligned in the first 7 columns and the label fills
/// columns 10 to 15, e.g. `     25  A3002E`.
pub fn flux_row_lead(i: &str) -> Option<(usize, &str)> {
    let number = i.get(..7)?.trim().parse::<usize>().ok()?;
    let label = i.get(9..LEAD_WIDTH)?;
    if i.get(7..9)? != "  " || !label.chars().all(|c| c.is_ascii_graphic()) {
        return None;
    }
    Some((number, label))
}
