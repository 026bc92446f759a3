//! Reusable beams, meshes, and lattices.

use beamline_core::Particle;
use beamline_lattice::{Drift, Lattice, NonlinearLens, Quad};
use beamline_mesh::{MeshConfig, MeshHierarchy};
use beamline_particles::{Distribution, ParticleContainer};

/// Bunch charge used by every fixture beam (C).
pub const BUNCH_CHARGE_C: f64 = 1e-9;

/// A 1 GeV proton waterbag beam of `npart` particles.
pub fn waterbag_beam(npart: usize, seed: u64) -> ParticleContainer {
    let mut pc = ParticleContainer::default();
    pc.add_particles(BUNCH_CHARGE_C, &Distribution::waterbag(), npart, seed)
        .unwrap_or_else(|e| panic!("fixture beam: {e}"));
    pc
}

/// A beam holding exactly the given particles.
pub fn beam_of(particles: impl IntoIterator<Item = Particle>) -> ParticleContainer {
    let mut pc = ParticleContainer::default();
    pc.insert(particles)
        .unwrap_or_else(|e| panic!("fixture beam: {e}"));
    pc
}

/// Default mesh with `n_ranks` boxes.
pub fn mesh(n_ranks: u32) -> MeshHierarchy {
    MeshHierarchy::new(MeshConfig {
        n_ranks,
        ..MeshConfig::default()
    })
    .unwrap_or_else(|e| panic!("fixture mesh: {e}"))
}

/// Drift, focusing quad, drift, defocusing quad: 4 m in total.
pub fn fodo() -> Lattice {
    Lattice::new()
        .with(Drift::new(0.75))
        .with(Quad::new(0.5, 1.0))
        .with(Drift::new(1.5))
        .with(Quad::new(0.5, -1.0))
        .with(Drift::new(0.75))
}

/// A drift followed by a thin nonlinear lens.
pub fn drift_and_lens() -> Lattice {
    Lattice::new()
        .with(Drift::new(1.0))
        .with(NonlinearLens::new(1e-4, 0.01))
}
