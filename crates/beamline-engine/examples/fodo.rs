//! FODO cell with space charge: a complete run from a text lattice.
//!
//! Demonstrates:
//!   1. Parsing a lattice from its text form
//!   2. Sampling a waterbag beam
//!   3. Initializing the mesh and diagnostics
//!   4. Evolving and reading back the metrics
//!
//! Run with:
//!   RUST_LOG=debug cargo run --example fodo

use std::error::Error;

use beamline_core::{ParticleShape, RefParticle};
use beamline_diagnostics::FileDiagnostics;
use beamline_engine::{ConfigError, Simulation, SimulationConfig};
use beamline_lattice::Lattice;
use beamline_mesh::{MeshConfig, MeshHierarchy};
use beamline_particles::{Distribution, ParticleContainer};

// ─── Beam parameters ────────────────────────────────────────────

const NPART: usize = 10_000;
const BUNCH_CHARGE_C: f64 = 1e-9;
const KIN_ENERGY_MEV: f64 = 2_000.0;
const SEED: u64 = 42;
const NUM_STEPS: usize = 10;

const FODO: &str = "
# drift - QF - drift - QD - drift
drift ds=0.25
quad  ds=1.0 k=1.0
drift ds=0.5
quad  ds=1.0 k=-1.0
drift ds=0.25
";

fn lattice() -> Result<Lattice, ConfigError> {
    Ok(Lattice::parse(FODO)?)
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();

    let refpart = RefParticle::default().set_kin_energy_mev(KIN_ENERGY_MEV);
    let mut beam = ParticleContainer::new(refpart);
    let distribution = Distribution::waterbag()
        .sigma(3.9984884770e-5, 3.9984884770e-5, 1.0e-3)
        .sigma_momentum(2.6623538760e-5, 2.6623538760e-5, 2.0e-3)
        .correlation(-0.846574929020762, 0.846574929020762, 0.0);
    beam.add_particles(BUNCH_CHARGE_C, &distribution, NPART, SEED)?;

    let mesh = MeshHierarchy::new(MeshConfig {
        n_cells: [32, 32, 32],
        ..MeshConfig::default()
    })?;

    let config = SimulationConfig::new(
        Box::new(beam),
        Box::new(mesh),
        Box::new(FileDiagnostics::new(".")),
    )
    .with_lattice(lattice()?)
    .with_particle_shape(ParticleShape::Quadratic);

    let mut sim = Simulation::new(config)?;
    sim.initialize()?;
    let metrics = sim.evolve(NUM_STEPS)?;

    println!(
        "{} pushes, {} space-charge steps, s = {:.3} m, {} us",
        metrics.push_calls,
        metrics.coupling_calls,
        sim.ensemble().ref_particle().s,
        metrics.total_us
    );
    Ok(())
}
