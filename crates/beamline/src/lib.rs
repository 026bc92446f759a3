//! Beamline: a space-charge beam transport driver.
//!
//! This is the top-level facade crate that re-exports the public API from
//! all Beamline sub-crates. For most users, adding `beamline` as a single
//! dependency is sufficient.
//!
//! # Quick start
//!
//! ```rust
//! use beamline::prelude::*;
//! use beamline::diagnostics::NullSink;
//!
//! let mut beam = ParticleContainer::default();
//! beam.add_particles(1e-9, &Distribution::waterbag(), 100, 7).unwrap();
//!
//! let lattice = Lattice::parse("drift ds=0.5\nquad ds=0.2 k=1.5\n").unwrap();
//! let config = SimulationConfig::new(
//!     Box::new(beam),
//!     Box::new(MeshHierarchy::new(MeshConfig::default()).unwrap()),
//!     Box::new(NullSink),
//! )
//! .with_lattice(lattice)
//! .with_particle_shape(ParticleShape::Linear);
//!
//! let mut sim = Simulation::new(config).unwrap();
//! sim.initialize().unwrap();
//! let metrics = sim.evolve(4).unwrap();
//! assert_eq!(metrics.push_calls, 8);
//! assert!((sim.ensemble().ref_particle().s - 2.8).abs() < 1e-12);
//! ```
//!
//! # Modules
//!
//! | Module | Sub-crate | Contents |
//! |--------|-----------|----------|
//! | [`types`] | `beamline-core` | Particles, frames, shapes, IDs, errors |
//! | [`lattice`] | `beamline-lattice` | Beamline elements and their maps |
//! | [`mesh`] | `beamline-mesh` | Mesh hierarchy, domain layout, charge density |
//! | [`particles`] | `beamline-particles` | Particle container, transforms, deposition |
//! | [`diagnostics`] | `beamline-diagnostics` | Checkpoint sinks and table formats |
//! | [`engine`] | `beamline-engine` | The evolve driver and space-charge coupling |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

/// Core types, IDs, and error enums (`beamline-core`).
pub use beamline_core as types;

/// Lattice elements (`beamline-lattice`).
///
/// [`lattice::Lattice`] is an ordered element sequence; it can be built in
/// code or parsed from text with [`lattice::Lattice::parse`].
pub use beamline_lattice as lattice;

/// Mesh hierarchy and charge density (`beamline-mesh`).
pub use beamline_mesh as mesh;

/// Particle ensemble storage (`beamline-particles`).
///
/// The [`particles::ParticleStorage`] trait is what the driver operates
/// on; [`particles::ParticleContainer`] is the tiled implementation.
pub use beamline_particles as particles;

/// Diagnostic sinks (`beamline-diagnostics`).
pub use beamline_diagnostics as diagnostics;

/// The simulation driver (`beamline-engine`).
///
/// [`engine::Simulation`] runs `initialize` then `evolve`.
pub use beamline_engine as engine;

/// Common imports for typical Beamline usage.
///
/// ```rust
/// use beamline::prelude::*;
/// ```
pub mod prelude {
    // Core types
    pub use beamline_core::{Direction, Extent, Frame, Particle, ParticleShape, RefParticle};

    // Errors
    pub use beamline_core::{DiagnosticError, MeshError, PushError, TransformError};

    // Lattice
    pub use beamline_lattice::{Lattice, LatticeElement};

    // Mesh
    pub use beamline_mesh::{MeshConfig, MeshHierarchy, MeshProvider};

    // Particles
    pub use beamline_particles::{Distribution, ParticleContainer, ParticleStorage};

    // Diagnostics
    pub use beamline_diagnostics::{DiagnosticSink, FileDiagnostics, OutputType};

    // Engine
    pub use beamline_engine::{
        ConfigError, DriverError, EvolveMetrics, Simulation, SimulationConfig, SpaceChargeConfig,
    };
}
