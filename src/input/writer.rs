// internal modules
use crate::error::{Error, Result};
use crate::geometry::Addressing;
use crate::input::records::*;
use crate::model::Core;
use crate::options::{SolverOptions, SpatialApproximation};
use crate::utils::*;

// standard library
use std::path::Path;

// external crates
use log::{debug, info};

/// Writer for the DIF3D input file
///
/// Everything is rendered in memory first, so a failure part way through
/// never leaves a partial input file behind. Rendering is a pure function of
/// the core, the options, the addressing and the eigenvalue guess: the same
/// inputs give byte-identical text.
///
/// Example:
/// ```rust
/// # use dif3d::geometry::Addressing;
/// # use dif3d::input::InputWriter;
/// # use dif3d::model::Core;
/// # use dif3d::options::SolverOptions;
/// # let json = r#"{"pitch": 16.0, "nuclides": [], "assemblies": [{
/// #     "ring": 1, "position": 1, "number": 1,
/// #     "blocks": [{"bottom": 0.0, "top": 50.0, "xs_suffix": "AA"}]}]}"#;
/// let core = Core::from_json(json).unwrap();
/// let options = SolverOptions::default();
/// let addressing = Addressing::new(&core, &options).unwrap();
///
/// let text = InputWriter::new(&core, &options, &addressing)
///     .keff_guess(1.02)
///     .render()
///     .unwrap();
///
/// assert!(text.starts_with("BLOCK=OLD\n"));
/// assert!(text.contains("UNFORM=A.NIP3"));
/// ```
#[derive(Debug)]
pub struct InputWriter<'a> {
    core: &'a Core,
    options: &'a SolverOptions,
    addressing: &'a Addressing,
    keff_guess: f64,
}

impl<'a> InputWriter<'a> {
    pub fn new(core: &'a Core, options: &'a SolverOptions, addressing: &'a Addressing) -> Self {
        Self {
            core,
            options,
            addressing,
            keff_guess: 1.0,
        }
    }

    /// Initial eigenvalue guess for card 06, 1.0 by default
    pub fn keff_guess(mut self, keff: f64) -> Self {
        self.keff_guess = keff;
        self
    }

    /// Render the complete input text
    pub fn render(&self) -> Result<String> {
        self.options.validate()?;
        if !(self.keff_guess.is_finite() && self.keff_guess > 0.0) {
            return Err(Error::option(
                "keff_guess",
                f!("{} must be a positive number", self.keff_guess),
            ));
        }

        let mut lines = vec!["BLOCK=OLD".to_string(), "DATASET=ISOTXS".to_string()];
        lines.extend(self.block_dif3d()?);
        lines.extend(self.block_nip3()?);
        if self.options.solution.includes_real() {
            lines.extend(self.block_summar()?);
        }

        debug!("Rendered {} input lines", lines.len());
        let mut text = lines.join("\n");
        text.push('\n');
        Ok(text)
    }

    /// Render the input and only then write it to `path`
    pub fn write<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let text = self.render()?;
        std::fs::write(path, text)?;
        info!("Input written to {}", path.display());
        Ok(())
    }

    fn title(&self) -> String {
        let kernel = match self.options.approximation {
            SpatialApproximation::FiniteDifference => "finite difference",
            SpatialApproximation::Nodal => "nodal",
            SpatialApproximation::Transport => "VARIANT transport",
        };
        f!(
            "{} {:?} k-effective problem, {kernel} hex geometry with {} regions",
            self.options.label,
            self.options.solution,
            self.addressing.regions.len()
        )
    }

    fn title_cards(&self, card: &Card) -> Result<Vec<String>> {
        let title = self.title();
        textwrap::wrap(&title, 66)
            .into_iter()
            .map(|line| card.render_one(vec![line.to_string().into()]))
            .collect()
    }
}

/// A.DIF3D block, solution controls
impl<'a> InputWriter<'a> {
    pub fn block_dif3d(&self) -> Result<Vec<String>> {
        let o = self.options;
        let mut lines = vec!["UNFORM=A.DIF3D".to_string()];

        lines.extend(self.title_cards(&DIF3D_01)?);

        lines.push(DIF3D_02.render_one(o.memory.iter().map(|m| Value::Int(*m)).collect())?);

        lines.push(DIF3D_03.render_one(vec![
            o.problem.code().into(),
            o.solution.code().into(),
            o.asymptotic_extrapolation_overrelax.into(),
            0_i64.into(), // MINBSZ, DIF3D default
            o.max_outers.into(),
            (o.restart as i64).into(),
            0_i64.into(), // LIMTIM, no time limit
            0_i64.into(), // NUPMAX
            0_i64.into(), // IOSAVE
            0_i64.into(), // IOMEG
        ])?);

        // region totals and region group flux edits are needed by the parser
        lines.push(DIF3D_04.render_one(vec![
            0_i64.into(),
            1_i64.into(),
            1_i64.into(),
            o.max_inners.into(),
        ])?);

        lines.push(DIF3D_05.render_one(vec![
            o.eps_eigenvalue.into(),
            o.eps_fission_point.into(),
            o.eps_fission_average.into(),
        ])?);

        lines.push(DIF3D_06.render_one(vec![
            self.keff_guess.into(),
            o.error_reduction_factor.into(),
            o.neglect_fission.into(),
        ])?);

        match o.approximation {
            SpatialApproximation::Nodal => {
                lines.push(DIF3D_10.render_one(vec![
                    o.nodal_approx_xy.into(),
                    o.nodal_approx_z.into(),
                    o.coarse_mesh_rebalance.into(),
                    o.asymptotic_extrapolation_nodal.into(),
                ])?);
            }
            SpatialApproximation::Transport => {
                // validation guarantees an order for the transport kernel
                let (angular, scattering) = o
                    .transport_order
                    .map(|order| order.codes())
                    .ok_or_else(|| Error::option("transport_order", "not set"))?;
                lines.push(DIF3D_11.render_one(vec![
                    angular.into(),
                    scattering.into(),
                    o.variant_spatial_approximation.into(),
                    (o.radial_inner_iterations as i64).into(),
                ])?);
            }
            SpatialApproximation::FiniteDifference => (),
        }

        Ok(lines)
    }
}

/// A.NIP3 block, geometry and compositions
impl<'a> InputWriter<'a> {
    pub fn block_nip3(&self) -> Result<Vec<String>> {
        let bc = &self.addressing.boundaries;
        let mut lines = vec!["UNFORM=A.NIP3".to_string()];

        lines.extend(self.title_cards(&NIP3_01)?);
        lines.push(NIP3_02.render_one(vec![(self.options.list_isotxs as i64).into()])?);
        lines.push(NIP3_03.render_one(vec![bc.geometry_number.into()])?);
        lines.push(NIP3_04.render_one(bc.codes.iter().map(|c| Value::Int(*c)).collect())?);

        if let Some(coefficients) = bc.coefficients() {
            lines.push(NIP3_05.render_one(coefficients.iter().map(|c| Value::Real(*c)).collect())?);
        }

        for zone in &self.addressing.axial_zones {
            lines.push(NIP3_09.render_one(vec![
                "Z".into(),
                zone.submeshes.into(),
                zone.top.into(),
            ])?);
        }

        lines.extend(NIP3_13.render(&self.number_densities())?);

        let zones: Vec<Vec<Value>> = self
            .addressing
            .regions
            .regions()
            .iter()
            .map(|r| vec![r.zone.as_str().into(), r.zone.as_str().into(), 1.0.into()])
            .collect();
        lines.extend(NIP3_14.render(&zones)?);

        let assignments: Vec<Vec<Value>> = self
            .addressing
            .regions
            .regions()
            .iter()
            .map(|r| vec![r.zone.as_str().into(), r.label.as_str().into()])
            .collect();
        lines.extend(NIP3_15.render(&assignments)?);

        lines.push(NIP3_29.render_one(vec![self.core.pitch.into()])?);

        let hexes: Vec<Vec<Value>> = self
            .addressing
            .regions
            .regions()
            .iter()
            .map(|r| {
                vec![
                    r.label.as_str().into(),
                    r.ring.into(),
                    r.position.into(),
                    r.ring.into(),
                    r.position.into(),
                    r.bottom.into(),
                    r.top.into(),
                ]
            })
            .collect();
        lines.extend(NIP3_30.render(&hexes)?);

        Ok(lines)
    }

    /// Card 13 entries for every zone, nuclides in library order
    fn number_densities(&self) -> Vec<Vec<Value>> {
        let regions = self.addressing.regions.regions();
        let cells = self
            .addressing
            .uniform
            .columns
            .iter()
            .flat_map(|column| column.cells.iter());

        let mut groups = Vec::new();
        for (region, cell) in regions.iter().zip(cells) {
            for nuclide in self.core.nuclides.iter().filter(|n| !n.is_skipped()) {
                let density = cell.densities.get(&nuclide.name).copied().unwrap_or(0.0);
                if density == 0.0 {
                    continue;
                }
                groups.push(vec![
                    region.zone.as_str().into(),
                    nuclide.isotxs_label(&cell.xs_suffix).into(),
                    density.into(),
                ]);
            }
        }
        groups
    }
}

/// A.SUMMAR block, nuclide summary
impl<'a> InputWriter<'a> {
    pub fn block_summar(&self) -> Result<Vec<String>> {
        let mut suffixes: Vec<&str> = self
            .addressing
            .uniform
            .columns
            .iter()
            .flat_map(|c| c.cells.iter().map(|cell| cell.xs_suffix.as_str()))
            .collect();
        suffixes.sort();
        suffixes.dedup();

        let mut groups = Vec::new();
        for suffix in suffixes {
            for nuclide in self.core.nuclides.iter().filter(|n| !n.is_skipped()) {
                groups.push(vec![
                    nuclide.lib_id.as_str().into(),
                    nuclide.kind.type_id().into(),
                    nuclide.weight.into(),
                    nuclide.isotxs_label(suffix).into(),
                ]);
            }
        }

        let mut lines = vec!["UNFORM=A.SUMMAR".to_string()];
        lines.extend(SUMMAR_02.render(&groups)?);
        Ok(lines)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::model::fixtures::hex_core;
    use crate::model::Symmetry;
    use crate::options::{BoundaryCondition, SolutionType, TransportOrder};
    use rstest::rstest;

    fn render(core: &Core, options: &SolverOptions) -> Result<String> {
        let addressing = Addressing::new(core, options)?;
        InputWriter::new(core, options, &addressing).render()
    }

    fn card_lines<'t>(text: &'t str, block: &str, id: &str) -> Vec<&'t str> {
        let start = f!("UNFORM={block}");
        text.lines()
            .skip_while(|l| *l != start)
            .skip(1)
            .take_while(|l| !l.starts_with("UNFORM="))
            .filter(|l| l.starts_with(&f!("{id:<6}")))
            .collect()
    }

    #[test]
    fn rendering_is_deterministic() {
        let core = hex_core(3, Symmetry::Full);
        let options = SolverOptions::default();
        assert_eq!(render(&core, &options).unwrap(), render(&core, &options).unwrap());
    }

    #[test]
    fn block_order() {
        let text = render(&hex_core(2, Symmetry::Full), &SolverOptions::default()).unwrap();
        let headers: Vec<&str> = text
            .lines()
            .filter(|l| l.starts_with("UNFORM=") || l.starts_with("BLOCK=") || l.starts_with("DATASET="))
            .collect();
        assert_eq!(
            headers,
            vec![
                "BLOCK=OLD",
                "DATASET=ISOTXS",
                "UNFORM=A.DIF3D",
                "UNFORM=A.NIP3",
                "UNFORM=A.SUMMAR"
            ]
        );
    }

    #[rstest]
    #[case(SpatialApproximation::Nodal, 1, 0)]
    #[case(SpatialApproximation::FiniteDifference, 0, 0)]
    #[case(SpatialApproximation::Transport, 0, 1)]
    fn kernel_cards(
        #[case] approximation: SpatialApproximation,
        #[case] n_card_10: usize,
        #[case] n_card_11: usize,
    ) {
        let options = SolverOptions {
            approximation,
            transport_order: Some(TransportOrder::P3P1),
            ..Default::default()
        };
        let text = render(&hex_core(1, Symmetry::Full), &options).unwrap();
        assert_eq!(card_lines(&text, "A.DIF3D", "10").len(), n_card_10);
        assert_eq!(card_lines(&text, "A.DIF3D", "11").len(), n_card_11);
    }

    #[test]
    fn transport_card_values() {
        let options = SolverOptions {
            approximation: SpatialApproximation::Transport,
            transport_order: Some(TransportOrder::P5P1),
            ..Default::default()
        };
        let text = render(&hex_core(1, Symmetry::Full), &options).unwrap();
        assert_eq!(
            card_lines(&text, "A.DIF3D", "11"),
            vec!["11     10505      1  20501      0"]
        );
    }

    #[test]
    fn adjoint_only_has_no_summary() {
        let options = SolverOptions {
            solution: SolutionType::Adjoint,
            ..Default::default()
        };
        let text = render(&hex_core(1, Symmetry::Full), &options).unwrap();
        assert!(!text.contains("UNFORM=A.SUMMAR"));
        assert!(card_lines(&text, "A.DIF3D", "03")[0].starts_with("03         0      1"));
    }

    #[test]
    fn coefficients_for_zero_inward_current() {
        let options = SolverOptions {
            boundaries: BoundaryCondition::ZeroInwardCurrent,
            ..Default::default()
        };
        let text = render(&hex_core(1, Symmetry::Full), &options).unwrap();
        assert_eq!(card_lines(&text, "A.NIP3", "05").len(), 1);

        let text = render(&hex_core(1, Symmetry::Full), &SolverOptions::default()).unwrap();
        assert!(card_lines(&text, "A.NIP3", "05").is_empty());
    }

    #[test]
    fn geometry_cards_per_region() {
        let core = hex_core(2, Symmetry::Full);
        let text = render(&core, &SolverOptions::default()).unwrap();
        let n_regions = 7 * 5;

        assert_eq!(card_lines(&text, "A.NIP3", "09").len(), 5);
        assert_eq!(card_lines(&text, "A.NIP3", "14").len(), n_regions);
        assert_eq!(card_lines(&text, "A.NIP3", "15").len(), (n_regions + 2) / 3);
        assert_eq!(card_lines(&text, "A.NIP3", "30").len(), n_regions);
        assert_eq!(
            card_lines(&text, "A.NIP3", "30")[0],
            "30    A1001A      1      1      1      1  0.00000E+00  2.00000E+01"
        );
    }

    #[test]
    fn dummy_and_zero_densities_are_skipped() {
        let text = render(&hex_core(1, Symmetry::Full), &SolverOptions::default()).unwrap();
        let densities = card_lines(&text, "A.NIP3", "13").join("\n");
        assert!(densities.contains("U235AA"));
        assert!(!densities.contains("NA23"));
        assert!(!densities.contains("DUMP1"));

        let summary = card_lines(&text, "A.SUMMAR", "02");
        // two suffixes with three real nuclides each
        assert_eq!(summary.len(), 6);
        assert!(summary[0].starts_with("02    U2357    FISS    2.35044E+02 U235AA"));
    }

    #[test]
    fn invalid_options_fail_before_rendering() {
        let core = hex_core(1, Symmetry::Full);
        let options = SolverOptions::default();
        let addressing = Addressing::new(&core, &options).unwrap();

        let bad = SolverOptions {
            max_outers: 0,
            ..Default::default()
        };
        let err = InputWriter::new(&core, &bad, &addressing).render().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidOption);

        let err = InputWriter::new(&core, &options, &addressing)
            .keff_guess(-1.0)
            .render()
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidOption);
    }

    #[test]
    fn overflowing_value_is_a_render_failure() {
        let core = hex_core(1, Symmetry::Full);
        // 14 digits into the I12 memory fields of card 02
        let options = SolverOptions {
            memory: [10_000_000_000_000, 200_000, 200_000],
            ..Default::default()
        };
        let err = render(&core, &options).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::RenderFailure);
        assert!(err.to_string().contains("A.DIF3D card 02"));
    }
}
