use dif3d::geometry::Addressing;
use dif3d::model::Core;
use dif3d::options::{SolutionType, SolverOptions};
use dif3d::readers::{OuterConvergence, OutputReader};
use dif3d::result::Convergence;
use dif3d::{read_output, read_summary_file, ErrorKind};

use rstest::rstest;
use std::path::Path;

const OUTPUT: &str = "./data/dif3d-third-nodal.out";
const CORE: &str = "./data/core-third.json";

/// Group flux integrals of A3002E as printed
const A3002E: [f64; 33] = [
    1.47312E+14, 2.30742E+15, 1.53930E+16, 2.54007E+16, 6.25577E+16, 1.44366E+17, 1.97879E+17,
    4.38889E+17, 3.41350E+17, 3.64783E+17, 2.39746E+17, 2.56849E+17, 2.73795E+17, 1.71025E+17,
    1.11952E+17, 8.32989E+16, 3.26362E+16, 2.98441E+16, 7.66527E+16, 5.52959E+16, 5.77510E+16,
    3.08758E+16, 1.98528E+16, 1.15805E+16, 5.43152E+15, 3.75557E+15, 1.38772E+15, 6.75732E+14,
    9.02733E+14, 2.31725E+14, 3.40262E+14, 3.05077E+12, 3.51154E+12,
];

#[test]
fn read_keff() {
    let result = read_output(OUTPUT, SolutionType::Real).unwrap();
    assert_eq!(result.keff(), Some(1.00830171984));
    assert_eq!(result.real.unwrap().convergence, Convergence::Converged);
}

#[test]
fn read_group_flux() {
    let result = read_output(OUTPUT, SolutionType::Real).unwrap();
    let index = result.region_index("A3002E").unwrap();
    let real = result.real.as_ref().unwrap();

    assert_eq!(real.n_groups(), 33);
    assert_eq!(real.group_flux[index], A3002E.to_vec());
}

#[test]
fn adjoint_pages_are_stitched() {
    let result = read_output(OUTPUT, SolutionType::Adjoint).unwrap();
    let adjoint = result.adjoint.as_ref().unwrap();

    // groups 19-24 follow a page eject in both tables
    assert_eq!(adjoint.n_groups(), 33);
    assert!(adjoint.group_flux.iter().all(|g| g.len() == 33));
    assert_eq!(result.regions.len(), 35);
}

#[test]
fn read_region_totals() {
    let result = read_output(OUTPUT, SolutionType::Real).unwrap();
    let totals = result.totals.as_ref().unwrap();

    let plenum = result.region_index("A3002E").unwrap();
    assert_eq!(totals.total_flux[plenum], 3.05696e18);
    assert_eq!(totals.peak_flux[plenum], 3.81625e14);

    let fuel = result.region_index("A3002D").unwrap();
    assert_eq!(totals.power[fuel], 7.34698e05);
    assert_eq!(totals.power_density[fuel], 1.20951e02);
    assert_eq!(totals.peak_power_density[fuel], 1.69977e02);
}

#[rstest]
#[case(SolutionType::Real, true, false)]
#[case(SolutionType::Adjoint, false, true)]
#[case(SolutionType::RealAndAdjoint, true, true)]
fn requested_solutions(#[case] solution: SolutionType, #[case] real: bool, #[case] adjoint: bool) {
    let result = read_output(OUTPUT, solution).unwrap();
    assert_eq!(result.real.is_some(), real);
    assert_eq!(result.adjoint.is_some(), adjoint);
    assert_eq!(result.totals.is_some(), real);
    assert_eq!(result.n_regions(), 35);
}

#[test]
fn adjoint_keff_is_kept_apart() {
    let result = read_output(OUTPUT, SolutionType::RealAndAdjoint).unwrap();
    assert_eq!(result.adjoint.as_ref().unwrap().keff, 1.00830171990);
    assert_eq!(result.keff(), Some(1.00830171984));
}

#[test]
fn regions_match_the_core() {
    let core = Core::from_file(CORE).unwrap();
    let addressing = Addressing::new(&core, &SolverOptions::default()).unwrap();

    let mut reader = OutputReader::new();
    reader.disable_progress();
    reader.set_solution(SolutionType::RealAndAdjoint);
    reader.set_expected_regions(addressing.regions.labels());

    let result = reader.parse(Path::new(OUTPUT)).unwrap();
    assert_eq!(result.regions, addressing.regions.labels());
}

#[test]
fn truncated_output() {
    let text = std::fs::read_to_string(OUTPUT).unwrap();
    let cut = text.find("REACTION INTEGRALS").unwrap();

    let mut reader = OutputReader::new();
    reader.disable_progress();
    let err = reader.parse_str(&text[..cut]).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ParseFailure);
}

#[test]
fn unconverged_output() {
    let text = std::fs::read_to_string(OUTPUT)
        .unwrap()
        .replace("OUTER ITERATIONS HAVE CONVERGED", "OUTER ITERATION LIMIT REACHED");

    let mut reader = OutputReader::new();
    reader.disable_progress();
    let result = reader.parse_str(&text).unwrap();

    assert_eq!(result.real.as_ref().unwrap().convergence, Convergence::NotConverged);
    assert_eq!(result.ensure_converged().unwrap_err().kind(), ErrorKind::NotConverged);
}

#[test]
fn summary_file() {
    let summary = read_summary_file("./data/DIF3D").unwrap();
    assert_eq!(summary.keff, 1.0083017198449564);
    assert_eq!(summary.dominance_ratio, 0.750317601546759);
    assert_eq!(summary.convergence, OuterConvergence::Converged);
    assert_eq!(summary.solution, SolutionType::Adjoint);

    let result = read_output(OUTPUT, SolutionType::Real).unwrap();
    assert!(summary.check_keff(&result));
}
