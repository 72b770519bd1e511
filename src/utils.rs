//! Common small functions used throughout the crate
//!
//! These are left public for the convenience of the user. For example using
//! the FORTRAN-style formatting for scientific numbers that DIF3D expects.

use std::fmt::LowerExp;

// Alias for the format! macro out of laziness
pub use std::format as f;

/// Extends primitives with more specific formatting options
pub trait NumberFmt {
    /// Better scientific number formatting
    ///
    /// The default is not very consistent for scientific in particular, so this
    /// allows easy definition.
    ///
    /// Works for anything that can be represented as scientific using the
    /// LowerExp trait.
    ///
    /// ```rust
    /// # use dif3d::utils::NumberFmt;
    /// let number = -1.0;
    /// assert_eq!(number.sci(5, 2), "-1.00000e+00".to_string());
    /// assert_eq!((1.0).sci(5, 2), "1.00000e+00".to_string());
    /// ```
    fn sci(&self, precision: usize, exp_pad: usize) -> String;

    /// FORTRAN `E` edit descriptor style, as written to and read from DIF3D
    ///
    /// Exponents always carry a sign and at least two digits, so three digit
    /// exponents are left as they are.
    ///
    /// ```rust
    /// # use dif3d::utils::NumberFmt;
    /// assert_eq!(1242.0.fortran(5), "1.24200E+03".to_string());
    /// assert_eq!(2.5e-120.fortran(3), "2.500E-120".to_string());
    /// assert_eq!(0.0.fortran(5), "0.00000E+00".to_string());
    /// ```
    fn fortran(&self, precision: usize) -> String {
        self.sci(precision, 2).replace('e', "E")
    }
}

impl<T: LowerExp> NumberFmt for T {
    fn sci(&self, precision: usize, exp_pad: usize) -> String {
        let mut num = f!("{:.precision$e}", &self, precision = precision);
        // Safe to `unwrap` as `num` is guaranteed to contain `'e'`
        let exp = num.split_off(num.find('e').unwrap());
        // Make sure the exponent is signed
        let (sign, exp) = match exp.strip_prefix("e-") {
            Some(exp) => ('-', exp),
            None => ('+', &exp[1..]),
        };
        // Pad the exponent with zeros if needed and put it back on the number
        num.push_str(&f!("e{}{:0>pad$}", sign, exp, pad = exp_pad));
        num
    }
}

/// Find the maximum value of a slice of `f64`
///
/// Rust only havs a built-in max method for types that implement Ord. However,
/// floating-point types do not implement Ord because of NaN, so this is the
/// workaround. Empty slices have no maximum.
///
/// ```rust
/// # use dif3d::utils::f64_max;
/// let vector = vec![1.0, 3.0, 2.0];
/// assert_eq!(f64_max(&vector), Some(3.0));
/// assert_eq!(f64_max(&[]), None);
/// ```
pub fn f64_max(values: &[f64]) -> Option<f64> {
    values.iter().copied().max_by(|a, b| a.total_cmp(b))
}

/// Relative difference used for the various floating point sanity checks
///
/// ```rust
/// # use dif3d::utils::relative_difference;
/// assert_eq!(relative_difference(1.0, 1.0), 0.0);
/// assert!((relative_difference(1.01, 1.0) - 0.01).abs() < 1e-12);
/// ```
pub fn relative_difference(value: f64, reference: f64) -> f64 {
    if reference == 0.0 {
        value.abs()
    } else {
        ((value - reference) / reference).abs()
    }
}
