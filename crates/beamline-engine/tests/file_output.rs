//! Integration test: a full run writing text diagnostics to disk.

use std::fs;
use std::path::Path;

use beamline_core::ParticleShape;
use beamline_diagnostics::{FileDiagnostics, DIAGS_DIR};
use beamline_engine::{Simulation, SimulationConfig};
use beamline_lattice::Lattice;
use beamline_test_utils::fixtures;
use tempfile::TempDir;

fn table(root: &Path, name: &str) -> Vec<Vec<String>> {
    let text = fs::read_to_string(root.join(DIAGS_DIR).join(name))
        .unwrap_or_else(|e| panic!("reading {name}: {e}"));
    text.lines()
        .map(|l| l.split_whitespace().map(str::to_string).collect())
        .collect()
}

fn run(root: &Path, lattice: Lattice, npart: usize, num_steps: usize) -> Simulation {
    let _ = env_logger::builder().is_test(true).try_init();
    let config = SimulationConfig::new(
        Box::new(fixtures::waterbag_beam(npart, 17)),
        Box::new(fixtures::mesh(2)),
        Box::new(FileDiagnostics::new(root)),
    )
    .with_lattice(lattice)
    .with_particle_shape(ParticleShape::Quadratic);
    let mut sim = Simulation::new(config).unwrap();
    sim.initialize().unwrap();
    let metrics = sim.evolve(num_steps).unwrap();
    assert_eq!(metrics.diagnostic_failures, 0);
    sim
}

#[test]
fn fodo_run_writes_six_tables() {
    let tmp = TempDir::new().unwrap();
    run(tmp.path(), fixtures::fodo(), 200, 4);

    let mut names: Vec<String> = fs::read_dir(tmp.path().join(DIAGS_DIR))
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    assert_eq!(
        names,
        [
            "initial_beam.txt",
            "initial_nonlinear_lens_invariants.txt",
            "initial_ref_particle.txt",
            "output_beam.txt",
            "output_nonlinear_lens_invariants.txt",
            "output_ref_particle.txt",
        ]
    );

    for name in ["initial_beam.txt", "output_beam.txt"] {
        let rows = table(tmp.path(), name);
        assert_eq!(rows[0].join(" "), "id x y t px py pt");
        assert_eq!(rows.len(), 201, "{name}");
    }
}

#[test]
fn reference_table_tracks_path_length() {
    let tmp = TempDir::new().unwrap();
    run(tmp.path(), fixtures::fodo(), 50, 3);

    let initial = table(tmp.path(), "initial_ref_particle.txt");
    let output = table(tmp.path(), "output_ref_particle.txt");
    assert_eq!(initial[0][0], "s");
    let s0: f64 = initial[1][0].parse().unwrap();
    let s1: f64 = output[1][0].parse().unwrap();
    assert_eq!(s0, 0.0);
    assert!((s1 - 3.0 * fixtures::fodo().total_length()).abs() < 1e-12);
}

#[test]
fn particle_ids_survive_redistribution() {
    let tmp = TempDir::new().unwrap();
    run(tmp.path(), fixtures::drift_and_lens(), 120, 2);

    let ids = |name: &str| {
        let mut ids: Vec<u64> = table(tmp.path(), name)[1..]
            .iter()
            .map(|row| row[0].parse().unwrap())
            .collect();
        ids.sort_unstable();
        ids
    };
    let before = ids("initial_beam.txt");
    assert_eq!(before, (1..=120).collect::<Vec<u64>>());
    assert_eq!(ids("output_beam.txt"), before);
}

#[test]
fn second_run_replaces_previous_output() {
    let tmp = TempDir::new().unwrap();
    let stale = tmp.path().join(DIAGS_DIR).join("stale.txt");
    fs::create_dir_all(stale.parent().unwrap()).unwrap();
    fs::write(&stale, "left over").unwrap();

    run(tmp.path(), fixtures::fodo(), 10, 1);

    assert!(!stale.exists());
    assert_eq!(table(tmp.path(), "output_beam.txt").len(), 11);
}
