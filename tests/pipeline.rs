use dif3d::convert::{MappedState, MeshConverter};
use dif3d::geometry::Addressing;
use dif3d::model::{Core, ReactorModel};
use dif3d::options::{SolutionType, SolverOptions};
use dif3d::run::{Executor, Run, RunState};
use dif3d::utils::relative_difference;
use dif3d::{read_output, ErrorKind, Result};

use std::path::{Path, PathBuf};

const OUTPUT: &str = "./data/dif3d-third-nodal.out";
const CORE: &str = "./data/core-third.json";

/// Core snapshot read from the test data
struct FileModel {
    core: Core,
    committed: Vec<MappedState>,
}

impl FileModel {
    fn new() -> Self {
        Self {
            core: Core::from_file(CORE).unwrap(),
            committed: Vec::new(),
        }
    }
}

impl ReactorModel for FileModel {
    fn snapshot(&self) -> Result<Core> {
        Ok(self.core.clone())
    }

    fn commit(&mut self, state: MappedState) -> Result<()> {
        self.committed.push(state);
        Ok(())
    }
}

/// Copies the recorded output and DIF3D file into place
struct RecordedSolver;

impl Executor for RecordedSolver {
    fn execute(&self, _input: &Path, output: &Path, run_dir: &Path) -> Result<()> {
        std::fs::copy(OUTPUT, output)?;
        std::fs::copy("./data/DIF3D", run_dir.join("DIF3D"))?;
        Ok(())
    }
}

fn run_dir(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!("dif3d-pipeline-{name}-{}", std::process::id()))
}

fn mapped_state() -> (Core, MappedState) {
    let core = Core::from_file(CORE).unwrap();
    let addressing = Addressing::new(&core, &SolverOptions::default()).unwrap();
    let result = read_output(OUTPUT, SolutionType::RealAndAdjoint).unwrap();
    let state = MeshConverter::new(&core, &addressing).convert(&result).unwrap();
    (core, state)
}

#[test]
fn power_is_conserved() {
    let result = read_output(OUTPUT, SolutionType::Real).unwrap();
    let (_, state) = mapped_state();

    let total = result.totals.unwrap().total_power();
    assert!(relative_difference(state.total_power(), total) < 1.0e-9);
}

#[test]
fn blocks_get_their_regions() {
    let (core, state) = mapped_state();

    // ring 3 position 2 blocks are 0-20, 20-50, 50-80, 80-100 cm, the last two
    // lining up exactly with regions A3002D and A3002E
    let block = state.block(3, 2, 2).unwrap();
    assert!(relative_difference(block.power.unwrap(), 7.34698e05) < 1.0e-12);
    assert_eq!(block.peak_power_density, Some(1.69977e02));

    let block = state.block(3, 2, 3).unwrap();
    let volume = core.hex_area() * 20.0;
    let flux_volume = block.total_flux.unwrap() * volume;
    assert!(relative_difference(flux_volume, 3.05696e18) < 1.0e-12);
    assert_eq!(block.peak_flux, Some(3.81625e14));
    assert_eq!(block.group_flux.as_ref().unwrap().len(), 33);
    assert_eq!(block.adjoint_flux.as_ref().unwrap().len(), 33);
}

#[test]
fn only_modeled_blocks_are_mapped() {
    let (core, state) = mapped_state();
    let modeled: usize = core
        .modeled_assemblies()
        .iter()
        .map(|a| a.blocks.len())
        .sum();
    assert_eq!(state.blocks.len(), modeled);
    assert!(state.block(3, 5, 0).is_none());
}

#[test]
fn full_run() {
    let dir = run_dir("full");
    let mut model = FileModel::new();

    let options = SolverOptions {
        label: "third".to_string(),
        solution: SolutionType::RealAndAdjoint,
        strict_convergence: true,
        ..Default::default()
    };
    let mut run = Run::new(options, &dir);
    run.run_all(&mut model, &RecordedSolver).unwrap();

    assert_eq!(run.state(), RunState::Committed);
    assert!(dir.join("third.inp").exists());
    assert_eq!(run.retrieved_files(), vec![dir.join("DIF3D")]);
    assert_eq!(model.committed.len(), 1);
    assert_eq!(model.committed[0].adjoint_keff, Some(1.00830171990));

    // committing twice is not a thing
    let err = run.commit(&mut model).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidTransition);
    assert_eq!(model.committed.len(), 1);

    std::fs::remove_dir_all(dir).ok();
}

#[test]
fn region_mismatch_fails_the_run() {
    let dir = run_dir("mismatch");
    let mut model = FileModel::new();

    // an extra axial cell, so the recorded output no longer lines up
    let options = SolverOptions {
        uniform_mesh: Some(vec![0.0, 10.0, 20.0, 30.0, 50.0, 80.0, 100.0]),
        ..Default::default()
    };
    let mut run = Run::new(options, &dir);
    let err = run.run_all(&mut model, &RecordedSolver).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ParseFailure);
    assert_eq!(run.state(), RunState::Failed(ErrorKind::ParseFailure));
    assert!(model.committed.is_empty());

    std::fs::remove_dir_all(dir).ok();
}
