//! Simulation configuration, validation, and error types.

use std::error::Error;
use std::fmt;

use beamline_core::ParticleShape;
use beamline_diagnostics::DiagnosticSink;
use beamline_lattice::{Lattice, LatticeError};
use beamline_mesh::MeshProvider;
use beamline_particles::ParticleStorage;

use crate::coupler::FieldSolver;

// ── SpaceChargeConfig ──────────────────────────────────────────────

/// When space-charge coupling runs.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SpaceChargeConfig {
    /// Master switch. Default: true.
    pub enabled: bool,
    /// Minimum global particle count for coupling to run. Default: 2.
    ///
    /// A single particle carries no self-field, so values below 2 are
    /// rejected.
    pub min_particles: u64,
}

impl Default for SpaceChargeConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            min_particles: 2,
        }
    }
}

impl SpaceChargeConfig {
    /// Coupling switched off.
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Self::default()
        }
    }
}

// ── ConfigError ────────────────────────────────────────────────────

/// Errors detected before any stepping begins.
#[derive(Clone, Debug, PartialEq)]
pub enum ConfigError {
    /// No particle shape was configured.
    ParticleShapeUnset,
    /// The lattice has no elements.
    EmptyLattice,
    /// `min_particles` is below 2.
    InvalidThreshold {
        /// The configured value.
        configured: u64,
    },
    /// Lattice assembly failed.
    Lattice(LatticeError),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ParticleShapeUnset => write!(f, "particle shape is not set"),
            Self::EmptyLattice => write!(f, "lattice has no elements"),
            Self::InvalidThreshold { configured } => write!(
                f,
                "space-charge min_particles must be at least 2, got {configured}"
            ),
            Self::Lattice(e) => write!(f, "lattice: {e}"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Lattice(e) => Some(e),
            _ => None,
        }
    }
}

impl From<LatticeError> for ConfigError {
    fn from(e: LatticeError) -> Self {
        Self::Lattice(e)
    }
}

// ── SimulationConfig ───────────────────────────────────────────────

/// Everything [`Simulation::new`](crate::Simulation::new) consumes.
///
/// The particle shape may be left unset here and supplied later through
/// [`Simulation::set_particle_shape`](crate::Simulation::set_particle_shape);
/// it is checked by `initialize` and `evolve`, not by `validate`.
pub struct SimulationConfig {
    /// The particle ensemble.
    pub ensemble: Box<dyn ParticleStorage>,
    /// The mesh hierarchy.
    pub mesh: Box<dyn MeshProvider>,
    /// Where checkpoints go.
    pub diagnostics: Box<dyn DiagnosticSink>,
    /// Elements in traversal order.
    pub lattice: Lattice,
    /// Deposition shape. Default: unset.
    pub particle_shape: Option<ParticleShape>,
    /// Space-charge policy.
    pub space_charge: SpaceChargeConfig,
    /// Optional field solve applied after deposition.
    pub field_solver: Option<Box<dyn FieldSolver>>,
}

impl SimulationConfig {
    /// A config with the given collaborators, an empty lattice, no shape,
    /// default space-charge policy, and no field solver.
    pub fn new(
        ensemble: Box<dyn ParticleStorage>,
        mesh: Box<dyn MeshProvider>,
        diagnostics: Box<dyn DiagnosticSink>,
    ) -> Self {
        Self {
            ensemble,
            mesh,
            diagnostics,
            lattice: Lattice::new(),
            particle_shape: None,
            space_charge: SpaceChargeConfig::default(),
            field_solver: None,
        }
    }

    /// Set the lattice.
    pub fn with_lattice(mut self, lattice: Lattice) -> Self {
        self.lattice = lattice;
        self
    }

    /// Set the particle shape.
    pub fn with_particle_shape(mut self, shape: ParticleShape) -> Self {
        self.particle_shape = Some(shape);
        self
    }

    /// Set the space-charge policy.
    pub fn with_space_charge(mut self, space_charge: SpaceChargeConfig) -> Self {
        self.space_charge = space_charge;
        self
    }

    /// Install a field solver.
    pub fn with_field_solver(mut self, solver: Box<dyn FieldSolver>) -> Self {
        self.field_solver = Some(solver);
        self
    }

    /// Validate structural invariants.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.lattice.is_empty() {
            return Err(ConfigError::EmptyLattice);
        }
        if self.space_charge.min_particles < 2 {
            return Err(ConfigError::InvalidThreshold {
                configured: self.space_charge.min_particles,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use beamline_diagnostics::NullSink;
    use beamline_lattice::Drift;
    use beamline_mesh::{MeshConfig, MeshHierarchy};
    use beamline_particles::ParticleContainer;

    fn config() -> SimulationConfig {
        SimulationConfig::new(
            Box::new(ParticleContainer::default()),
            Box::new(MeshHierarchy::new(MeshConfig::default()).unwrap()),
            Box::new(NullSink),
        )
    }

    #[test]
    fn default_space_charge_needs_two_particles() {
        let sc = SpaceChargeConfig::default();
        assert!(sc.enabled);
        assert_eq!(sc.min_particles, 2);
        assert!(!SpaceChargeConfig::disabled().enabled);
    }

    #[test]
    fn empty_lattice_rejected() {
        match config().validate() {
            Err(ConfigError::EmptyLattice) => {}
            other => panic!("expected EmptyLattice, got {other:?}"),
        }
    }

    #[test]
    fn threshold_below_two_rejected() {
        let cfg = config()
            .with_lattice(Lattice::new().with(Drift::new(1.0)))
            .with_space_charge(SpaceChargeConfig {
                enabled: true,
                min_particles: 1,
            });
        match cfg.validate() {
            Err(ConfigError::InvalidThreshold { configured: 1 }) => {}
            other => panic!("expected InvalidThreshold, got {other:?}"),
        }
    }

    #[test]
    fn unset_shape_passes_validation() {
        let cfg = config().with_lattice(Lattice::new().with(Drift::new(1.0)));
        assert!(cfg.particle_shape.is_none());
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn lattice_error_chains() {
        let err: ConfigError = Lattice::parse("bogus").unwrap_err().into();
        assert!(err.source().is_some());
        assert!(err.to_string().starts_with("lattice:"));
    }
}
