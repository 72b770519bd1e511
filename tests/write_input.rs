use dif3d::geometry::Addressing;
use dif3d::input::InputWriter;
use dif3d::model::{Core, Symmetry};
use dif3d::options::{SolutionType, SolverOptions, SpatialApproximation};
use dif3d::utils::f;
use dif3d::ErrorKind;

use rstest::rstest;

const CORE: &str = "./data/core-third.json";

fn render(core: &Core, options: &SolverOptions) -> String {
    let addressing = Addressing::new(core, options).unwrap();
    InputWriter::new(core, options, &addressing)
        .keff_guess(1.0083)
        .render()
        .unwrap()
}

/// Lines of a single `UNFORM=` block
fn block<'a>(input: &'a str, name: &str) -> Vec<&'a str> {
    input
        .lines()
        .skip_while(|l| *l != f!("UNFORM={name}"))
        .skip(1)
        .take_while(|l| !l.starts_with("UNFORM="))
        .collect()
}

#[test]
fn rendering_is_deterministic() {
    let core = Core::from_file(CORE).unwrap();
    let options = SolverOptions::default();
    assert_eq!(render(&core, &options), render(&core, &options));
}

#[test]
fn third_core_cardinality() {
    let core = Core::from_file(CORE).unwrap();
    assert_eq!(core.symmetry, Symmetry::ThirdPeriodic);

    // 19 assemblies in 3 rings, (19 - 1) / 3 + 1 modeled
    let addressing = Addressing::new(&core, &SolverOptions::default()).unwrap();
    assert_eq!(core.assemblies.len(), 19);
    assert_eq!(addressing.uniform.columns.len(), 7);
    assert_eq!(addressing.regions.len(), 7 * 5);
    assert!(addressing.regions.labels().contains(&"A3002E".to_string()));
}

#[test]
fn region_cards() {
    let core = Core::from_file(CORE).unwrap();
    let input = render(&core, &SolverOptions::default());
    let nip3 = block(&input, "A.NIP3");

    assert_eq!(nip3.iter().filter(|l| l.starts_with("30    ")).count(), 35);
    assert_eq!(nip3.iter().filter(|l| l.starts_with("09    ")).count(), 5);
    assert!(nip3.contains(&"03       126"));
}

#[rstest]
#[case(SpatialApproximation::Nodal, true)]
#[case(SpatialApproximation::FiniteDifference, false)]
fn nodal_card(#[case] approximation: SpatialApproximation, #[case] has_card: bool) {
    let core = Core::from_file(CORE).unwrap();
    let options = SolverOptions {
        approximation,
        ..Default::default()
    };
    let input = render(&core, &options);
    let dif3d = block(&input, "A.DIF3D");
    assert_eq!(dif3d.iter().any(|l| l.starts_with("10    ")), has_card);
}

#[rstest]
#[case(SolutionType::Real, true)]
#[case(SolutionType::Adjoint, false)]
#[case(SolutionType::RealAndAdjoint, true)]
fn summary_block(#[case] solution: SolutionType, #[case] has_block: bool) {
    let core = Core::from_file(CORE).unwrap();
    let options = SolverOptions {
        solution,
        ..Default::default()
    };
    let input = render(&core, &options);
    assert_eq!(input.contains("UNFORM=A.SUMMAR"), has_block);
}

#[test]
fn misplaced_assembly() {
    let mut core = Core::from_file(CORE).unwrap();
    core.assemblies[1].position = 9;

    let err = Addressing::new(&core, &SolverOptions::default()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidGeometry);
    assert!(err.is_pre_execution());
}
