//! Conditional space-charge coupling for one sub-step.
//!
//! The coupler decides whether coupling runs and, if it does, drives the
//! mesh and ensemble through resize, redistribute, and deposit, then
//! hands the deposited density to an optional [`FieldSolver`].

use std::error::Error;
use std::fmt;

use beamline_core::{Frame, MeshError};
use beamline_mesh::{ChargeDensity, MeshProvider};
use beamline_particles::ParticleStorage;

use crate::config::SpaceChargeConfig;

// ── FieldSolver ────────────────────────────────────────────────────

/// Error reported by a [`FieldSolver`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SolverError {
    /// Description of the failure.
    pub reason: String,
}

impl fmt::Display for SolverError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "field solve failed: {}", self.reason)
    }
}

impl Error for SolverError {}

/// Poisson solve and space-charge kick, applied in the spatial frame.
///
/// Called after deposition with the freshly deposited density. The
/// ensemble is still in [`Frame::Spatial`] and must be left there.
pub trait FieldSolver: Send {
    /// Solve for the fields of `rho` and kick the particles.
    fn solve_and_kick(
        &mut self,
        ensemble: &mut dyn ParticleStorage,
        rho: &ChargeDensity,
        ratios: &[u32],
    ) -> Result<(), SolverError>;
}

// ── Outcome and errors ─────────────────────────────────────────────

/// Why coupling did not run this sub-step.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SkipReason {
    /// Space charge is switched off.
    Disabled,
    /// The ensemble was not in the spatial frame.
    WrongFrame(Frame),
    /// Too few particles for a self-field.
    TooFewParticles {
        /// Global particle count.
        count: u64,
        /// Configured minimum.
        min: u64,
    },
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Disabled => write!(f, "space charge disabled"),
            Self::WrongFrame(frame) => write!(f, "ensemble in {frame} frame"),
            Self::TooFewParticles { count, min } => {
                write!(f, "{count} particle(s), need at least {min}")
            }
        }
    }
}

/// Whether coupling ran.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CouplingOutcome {
    /// Resize, redistribute, deposit (and solve, if configured) all ran.
    Applied,
    /// Nothing was touched.
    Skipped(SkipReason),
}

/// Fatal coupling failures.
#[derive(Clone, Debug, PartialEq)]
pub enum CouplingError {
    /// Resize, redistribution, or deposition failed.
    Mesh(MeshError),
    /// The field solver failed.
    Solver(SolverError),
}

impl fmt::Display for CouplingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Mesh(e) => write!(f, "space charge: {e}"),
            Self::Solver(e) => write!(f, "space charge: {e}"),
        }
    }
}

impl Error for CouplingError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Mesh(e) => Some(e),
            Self::Solver(e) => Some(e),
        }
    }
}

impl From<MeshError> for CouplingError {
    fn from(e: MeshError) -> Self {
        Self::Mesh(e)
    }
}

impl From<SolverError> for CouplingError {
    fn from(e: SolverError) -> Self {
        Self::Solver(e)
    }
}

// ── SpaceChargeCoupler ─────────────────────────────────────────────

/// Applies space-charge coupling when its policy allows.
pub struct SpaceChargeCoupler {
    config: SpaceChargeConfig,
    solver: Option<Box<dyn FieldSolver>>,
}

impl SpaceChargeCoupler {
    /// Create a coupler with `config` and an optional field solver.
    pub fn new(config: SpaceChargeConfig, solver: Option<Box<dyn FieldSolver>>) -> Self {
        Self { config, solver }
    }

    /// The policy in force.
    pub fn config(&self) -> &SpaceChargeConfig {
        &self.config
    }

    /// Whether a field solver is installed.
    pub fn has_solver(&self) -> bool {
        self.solver.is_some()
    }

    /// Check the policy: enabled, spatial frame, and at least
    /// `min_particles` particles globally.
    pub fn check(&self, ensemble: &dyn ParticleStorage) -> Result<(), SkipReason> {
        if !self.config.enabled {
            return Err(SkipReason::Disabled);
        }
        let frame = ensemble.frame();
        if frame != Frame::Spatial {
            return Err(SkipReason::WrongFrame(frame));
        }
        let count = ensemble.total_particle_count(false);
        if count < self.config.min_particles {
            return Err(SkipReason::TooFewParticles {
                count,
                min: self.config.min_particles,
            });
        }
        Ok(())
    }

    /// Run one coupling phase if the policy allows.
    ///
    /// Order: resize the mesh to the ensemble extent, redistribute the
    /// particles into the new layout, deposit charge, then solve.
    ///
    /// # Errors
    ///
    /// Any mesh or solver failure is returned as-is; there are no retries.
    pub fn apply(
        &mut self,
        ensemble: &mut dyn ParticleStorage,
        mesh: &mut dyn MeshProvider,
    ) -> Result<CouplingOutcome, CouplingError> {
        if let Err(reason) = self.check(ensemble) {
            return Ok(CouplingOutcome::Skipped(reason));
        }
        let Some(extent) = ensemble.extent() else {
            return Ok(CouplingOutcome::Skipped(SkipReason::TooFewParticles {
                count: 0,
                min: self.config.min_particles,
            }));
        };

        mesh.resize_mesh(&extent)?;
        ensemble.redistribute(mesh.layout()?)?;
        let ratios = mesh.refinement_ratios();
        ensemble.deposit_charge(mesh.rho_mut()?, &ratios)?;
        if let Some(solver) = self.solver.as_mut() {
            solver.solve_and_kick(ensemble, mesh.rho()?, &ratios)?;
        }
        Ok(CouplingOutcome::Applied)
    }
}
