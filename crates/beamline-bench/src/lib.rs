//! Benchmark profiles for the Beamline evolve driver.
//!
//! - [`reference_profile`]: 10K-particle waterbag beam through a FODO cell
//! - [`stress_profile`]: the same cell with 100K particles on a finer mesh
//! - [`beam`]: a seeded beam on its own, for particle-level benchmarks

#![forbid(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use beamline_core::{MeshError, ParticleShape};
use beamline_diagnostics::NullSink;
use beamline_engine::SimulationConfig;
use beamline_lattice::{Drift, Lattice, Quad};
use beamline_mesh::{MeshConfig, MeshHierarchy};
use beamline_particles::{Distribution, DistributionError, ParticleContainer};

/// Bunch charge of every profile beam (C).
pub const BUNCH_CHARGE_C: f64 = 1e-9;

/// Seeded waterbag beam of `npart` 1 GeV protons.
pub fn beam(npart: usize, seed: u64) -> Result<ParticleContainer, DistributionError> {
    let mut pc = ParticleContainer::default();
    pc.add_particles(BUNCH_CHARGE_C, &Distribution::waterbag(), npart, seed)?;
    Ok(pc)
}

/// Focusing and defocusing quads separated by drifts.
pub fn fodo_cell() -> Lattice {
    Lattice::new()
        .with(Drift::new(0.25))
        .with(Quad::new(1.0, 1.0))
        .with(Drift::new(0.5))
        .with(Quad::new(1.0, -1.0))
        .with(Drift::new(0.25))
}

fn profile(npart: usize, n_cells: u32, seed: u64) -> Result<SimulationConfig, ProfileError> {
    let mesh = MeshHierarchy::new(MeshConfig {
        n_cells: [n_cells; 3],
        ..MeshConfig::default()
    })?;
    Ok(SimulationConfig::new(
        Box::new(beam(npart, seed)?),
        Box::new(mesh),
        Box::new(NullSink),
    )
    .with_lattice(fodo_cell())
    .with_particle_shape(ParticleShape::Quadratic))
}

/// 10K particles, 16³ cells, diagnostics discarded.
pub fn reference_profile(seed: u64) -> Result<SimulationConfig, ProfileError> {
    profile(10_000, 16, seed)
}

/// 100K particles, 32³ cells, diagnostics discarded.
pub fn stress_profile(seed: u64) -> Result<SimulationConfig, ProfileError> {
    profile(100_000, 32, seed)
}

/// Failure building a profile.
#[derive(Debug)]
pub enum ProfileError {
    /// The beam could not be sampled.
    Beam(DistributionError),
    /// The mesh configuration was rejected.
    Mesh(MeshError),
}

impl std::fmt::Display for ProfileError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Beam(e) => write!(f, "profile beam: {e}"),
            Self::Mesh(e) => write!(f, "profile mesh: {e}"),
        }
    }
}

impl std::error::Error for ProfileError {}

impl From<DistributionError> for ProfileError {
    fn from(e: DistributionError) -> Self {
        Self::Beam(e)
    }
}

impl From<MeshError> for ProfileError {
    fn from(e: MeshError) -> Self {
        Self::Mesh(e)
    }
}
