//! Nuclide definitions needed for the composition cards

// external crates
use serde::{Deserialize, Serialize};

/// Broad classification used for the nuclide summary
///
/// `Dummy` nuclides have no neutronic significance and are left out of the
/// input entirely.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum NuclideKind {
    Fissile,
    Fertile,
    #[default]
    Other,
    Dummy,
}

impl NuclideKind {
    /// Type identifier written to the summary block
    pub fn type_id(&self) -> &'static str {
        match self {
            Self::Fissile => "FISS",
            Self::Fertile => "FERT",
            Self::Other | Self::Dummy => "",
        }
    }
}

/// A nuclide as known to the cross section library
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Nuclide {
    /// Name used as the composition key, e.g. `U235`
    pub name: String,
    /// Short library label that the cross section suffix is appended to
    pub label: String,
    /// Identifier of the nuclide in the library
    pub lib_id: String,
    /// Atomic weight (amu)
    pub weight: f64,
    #[serde(default)]
    pub kind: NuclideKind,
}

impl Nuclide {
    /// Label as it appears in ISOTXS for a given suffix
    ///
    /// ```rust
    /// # use dif3d::model::{Nuclide, NuclideKind};
    /// let u235 = Nuclide {
    ///     name: "U235".into(),
    ///     label: "U235".into(),
    ///     lib_id: "U235_7".into(),
    ///     weight: 235.04,
    ///     kind: NuclideKind::Fissile,
    /// };
    /// assert_eq!(u235.isotxs_label("AA"), "U235AA");
    /// ```
    pub fn isotxs_label(&self, suffix: &str) -> String {
        format!("{}{}", self.label, suffix)
    }

    /// Dummy nuclides never make it into the input
    pub fn is_skipped(&self) -> bool {
        self.kind == NuclideKind::Dummy
    }
}
