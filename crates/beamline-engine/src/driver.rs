//! The simulation driver: initialize once, then evolve.

use std::error::Error;
use std::fmt;
use std::time::Instant;

use beamline_core::{
    DiagnosticError, Direction, MeshError, ParticleShape, PushError, TransformError,
};
use beamline_diagnostics::checkpoint::checkpoint;
use beamline_diagnostics::{DiagnosticSink, OutputType, Stage};
use beamline_lattice::Lattice;
use beamline_mesh::MeshProvider;
use beamline_particles::ParticleStorage;

use crate::config::{ConfigError, SimulationConfig};
use crate::coupler::{CouplingError, CouplingOutcome, SpaceChargeCoupler};
use crate::metrics::EvolveMetrics;

// Simulation is Send so a whole run can move to a worker thread.
const _: () = {
    #[allow(dead_code)]
    fn assert_send<T: Send>() {}
    #[allow(dead_code)]
    fn check() {
        assert_send::<Simulation>();
    }
};

// ── DriverError ────────────────────────────────────────────────────

/// Fatal errors from [`Simulation`].
#[derive(Debug)]
pub enum DriverError {
    /// Configuration problem, detected before stepping.
    Config(ConfigError),
    /// `initialize` was called a second time.
    AlreadyInitialized,
    /// `evolve` was called before `initialize`.
    NotInitialized,
    /// Mesh construction failed during `initialize`.
    Mesh(MeshError),
    /// A coordinate transform failed (including frame violations).
    Transform(TransformError),
    /// Space-charge coupling failed.
    Coupling(CouplingError),
    /// An element push failed (including frame violations).
    Push(PushError),
    /// The diagnostics directory could not be prepared.
    Diagnostic(DiagnosticError),
}

impl fmt::Display for DriverError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config(e) => write!(f, "config: {e}"),
            Self::AlreadyInitialized => write!(f, "simulation is already initialized"),
            Self::NotInitialized => write!(f, "simulation has not been initialized"),
            Self::Mesh(e) => write!(f, "mesh: {e}"),
            Self::Transform(e) => write!(f, "transform: {e}"),
            Self::Coupling(e) => write!(f, "{e}"),
            Self::Push(e) => write!(f, "push: {e}"),
            Self::Diagnostic(e) => write!(f, "diagnostics: {e}"),
        }
    }
}

impl Error for DriverError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Config(e) => Some(e),
            Self::Mesh(e) => Some(e),
            Self::Transform(e) => Some(e),
            Self::Coupling(e) => Some(e),
            Self::Push(e) => Some(e),
            Self::Diagnostic(e) => Some(e),
            Self::AlreadyInitialized | Self::NotInitialized => None,
        }
    }
}

impl From<ConfigError> for DriverError {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

impl From<MeshError> for DriverError {
    fn from(e: MeshError) -> Self {
        Self::Mesh(e)
    }
}

impl From<TransformError> for DriverError {
    fn from(e: TransformError) -> Self {
        Self::Transform(e)
    }
}

impl From<CouplingError> for DriverError {
    fn from(e: CouplingError) -> Self {
        Self::Coupling(e)
    }
}

impl From<PushError> for DriverError {
    fn from(e: PushError) -> Self {
        Self::Push(e)
    }
}

impl From<DiagnosticError> for DriverError {
    fn from(e: DiagnosticError) -> Self {
        Self::Diagnostic(e)
    }
}

// ── Simulation ─────────────────────────────────────────────────────

/// Beam-dynamics driver over trait-object collaborators.
///
/// # Example
///
/// ```ignore
/// let mut sim = Simulation::new(config)?;
/// sim.set_particle_shape(ParticleShape::Quadratic)?;
/// sim.initialize()?;
/// let metrics = sim.evolve(25)?;
/// ```
pub struct Simulation {
    ensemble: Box<dyn ParticleStorage>,
    mesh: Box<dyn MeshProvider>,
    diagnostics: Box<dyn DiagnosticSink>,
    lattice: Lattice,
    particle_shape: Option<ParticleShape>,
    coupler: SpaceChargeCoupler,
    initialized: bool,
}

impl Simulation {
    /// Validate `config` and build an uninitialized simulation.
    pub fn new(config: SimulationConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            ensemble: config.ensemble,
            mesh: config.mesh,
            diagnostics: config.diagnostics,
            lattice: config.lattice,
            particle_shape: config.particle_shape,
            coupler: SpaceChargeCoupler::new(config.space_charge, config.field_solver),
            initialized: false,
        })
    }

    /// Set the particle shape. Only allowed before `initialize`, since the
    /// mesh guard width depends on it.
    pub fn set_particle_shape(&mut self, shape: ParticleShape) -> Result<(), DriverError> {
        if self.initialized {
            return Err(DriverError::AlreadyInitialized);
        }
        self.particle_shape = Some(shape);
        Ok(())
    }

    /// Configured particle shape.
    pub fn particle_shape(&self) -> Option<ParticleShape> {
        self.particle_shape
    }

    /// Whether `initialize` has completed.
    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// The ensemble.
    pub fn ensemble(&self) -> &dyn ParticleStorage {
        self.ensemble.as_ref()
    }

    /// The mesh provider.
    pub fn mesh(&self) -> &dyn MeshProvider {
        self.mesh.as_ref()
    }

    /// The lattice.
    pub fn lattice(&self) -> &Lattice {
        &self.lattice
    }

    /// The space-charge coupler.
    pub fn coupler(&self) -> &SpaceChargeCoupler {
        &self.coupler
    }

    /// Set the particle shape on the ensemble, build the mesh, and clean
    /// the diagnostics output.
    ///
    /// The shape is applied before any grid is built. On failure the
    /// simulation stays uninitialized.
    ///
    /// # Errors
    ///
    /// - [`DriverError::AlreadyInitialized`] on a second call.
    /// - [`ConfigError::ParticleShapeUnset`] if no shape is configured;
    ///   the mesh is not touched.
    /// - [`DriverError::Mesh`] or [`DriverError::Diagnostic`] if the mesh
    ///   or the output directory cannot be prepared.
    pub fn initialize(&mut self) -> Result<(), DriverError> {
        if self.initialized {
            return Err(DriverError::AlreadyInitialized);
        }
        let shape = self.particle_shape.ok_or(ConfigError::ParticleShapeUnset)?;
        self.ensemble.set_particle_shape(shape);
        self.mesh.init_from_scratch(shape.guard_cells())?;
        self.diagnostics.prepare()?;
        self.initialized = true;
        log::info!(
            "initialized: {} shape, {} guard cell(s), {} particle(s)",
            shape,
            shape.guard_cells(),
            self.ensemble.total_particle_count(false)
        );
        Ok(())
    }

    /// Traverse the lattice once with `num_steps` sub-steps per element.
    ///
    /// Each sub-step pushes the whole element, so a call advances the
    /// reference by `num_steps` times the lattice length. `num_steps == 0`
    /// moves nothing but still writes both sets of checkpoints. Calls
    /// continue from the current ensemble state.
    ///
    /// Diagnostic write failures are logged and counted in the returned
    /// metrics; every other failure aborts the call.
    ///
    /// # Errors
    ///
    /// - [`ConfigError::ParticleShapeUnset`] if no shape is configured,
    ///   checked before anything else.
    /// - [`DriverError::NotInitialized`] before `initialize`.
    /// - Transform, coupling, and push failures as they occur.
    pub fn evolve(&mut self, num_steps: usize) -> Result<EvolveMetrics, DriverError> {
        if self.particle_shape.is_none() {
            return Err(ConfigError::ParticleShapeUnset.into());
        }
        if !self.initialized {
            return Err(DriverError::NotInitialized);
        }
        let start = Instant::now();
        let mut metrics = EvolveMetrics::default();
        log::info!(
            "evolve: {} element(s), {num_steps} step(s) per element",
            self.lattice.len()
        );

        record_checkpoints(
            self.diagnostics.as_mut(),
            self.ensemble.as_ref(),
            Stage::Initial,
            &mut metrics,
        );

        for element in &self.lattice {
            metrics.elements_visited += 1;
            for step in 0..num_steps {
                log::debug!(" ++++ Starting step={step} in {}", element.kind());

                self.ensemble.transform(Direction::TimeToSpatial)?;
                match self
                    .coupler
                    .apply(self.ensemble.as_mut(), self.mesh.as_mut())?
                {
                    CouplingOutcome::Applied => metrics.coupling_calls += 1,
                    CouplingOutcome::Skipped(reason) => {
                        log::trace!("space charge skipped: {reason}");
                        metrics.coupling_skips += 1;
                    }
                }
                self.ensemble.transform(Direction::SpatialToTime)?;

                self.ensemble.push(element)?;
                metrics.push_calls += 1;
                metrics.substeps += 1;
            }
        }

        record_checkpoints(
            self.diagnostics.as_mut(),
            self.ensemble.as_ref(),
            Stage::Output,
            &mut metrics,
        );

        metrics.total_us = start.elapsed().as_micros() as u64;
        log::info!(
            "evolve done: {} push(es), {} coupling call(s), s = {:.6} m, {} us",
            metrics.push_calls,
            metrics.coupling_calls,
            self.ensemble.ref_particle().s,
            metrics.total_us
        );
        Ok(metrics)
    }
}

/// Write the three checkpoints of `stage`, counting rather than
/// propagating failures.
fn record_checkpoints(
    sink: &mut dyn DiagnosticSink,
    ensemble: &dyn ParticleStorage,
    stage: Stage,
    metrics: &mut EvolveMetrics,
) {
    for output in OutputType::ALL {
        let destination = checkpoint(stage, output);
        match sink.record(ensemble, output, &destination) {
            Ok(()) => metrics.diagnostics_written += 1,
            Err(e) => {
                log::warn!("diagnostic '{destination}' not written: {e}");
                metrics.diagnostic_failures += 1;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use beamline_diagnostics::NullSink;
    use beamline_lattice::{Drift, Quad};
    use beamline_mesh::{MeshConfig, MeshHierarchy};
    use beamline_particles::{Distribution, ParticleContainer};

    fn config(npart: usize) -> SimulationConfig {
        let mut pc = ParticleContainer::default();
        pc.add_particles(1e-9, &Distribution::waterbag(), npart, 11)
            .unwrap();
        SimulationConfig::new(
            Box::new(pc),
            Box::new(MeshHierarchy::new(MeshConfig::default()).unwrap()),
            Box::new(NullSink),
        )
        .with_lattice(
            Lattice::new()
                .with(Drift::new(1.0))
                .with(Quad::new(0.5, 1.0)),
        )
    }

    #[test]
    fn evolve_before_initialize_fails() {
        let mut sim = Simulation::new(config(4).with_particle_shape(ParticleShape::Linear)).unwrap();
        assert!(matches!(sim.evolve(1), Err(DriverError::NotInitialized)));
    }

    #[test]
    fn unset_shape_fails_both_entry_points() {
        let mut sim = Simulation::new(config(4)).unwrap();
        assert!(matches!(
            sim.evolve(1),
            Err(DriverError::Config(ConfigError::ParticleShapeUnset))
        ));
        assert!(matches!(
            sim.initialize(),
            Err(DriverError::Config(ConfigError::ParticleShapeUnset))
        ));
        assert!(!sim.mesh().is_initialized());
        assert!(!sim.is_initialized());
    }

    #[test]
    fn initialize_twice_fails() {
        let mut sim = Simulation::new(config(4).with_particle_shape(ParticleShape::Cubic)).unwrap();
        sim.initialize().unwrap();
        assert_eq!(sim.ensemble().particle_shape(), Some(ParticleShape::Cubic));
        assert!(matches!(
            sim.initialize(),
            Err(DriverError::AlreadyInitialized)
        ));
        assert!(matches!(
            sim.set_particle_shape(ParticleShape::Linear),
            Err(DriverError::AlreadyInitialized)
        ));
    }

    #[test]
    fn evolve_counts_and_advances_reference() {
        let mut sim = Simulation::new(config(50)).unwrap();
        sim.set_particle_shape(ParticleShape::Quadratic).unwrap();
        sim.initialize().unwrap();
        let m = sim.evolve(3).unwrap();
        assert_eq!(m.elements_visited, 2);
        assert_eq!(m.substeps, 6);
        assert_eq!(m.push_calls, 6);
        assert_eq!(m.coupling_calls, 6);
        assert_eq!(m.diagnostics_written, 6);
        // Three whole pushes of a 1.5 m lattice.
        assert!((sim.ensemble().ref_particle().s - 4.5).abs() < 1e-12);

        // Resumable: a second traversal continues from s = 4.5.
        sim.evolve(1).unwrap();
        assert!((sim.ensemble().ref_particle().s - 6.0).abs() < 1e-12);
    }

    #[test]
    fn every_substep_pushes_the_whole_element() {
        let mut pc = ParticleContainer::default();
        pc.add_particles(1e-9, &Distribution::waterbag(), 10, 3)
            .unwrap();
        let config = SimulationConfig::new(
            Box::new(pc),
            Box::new(MeshHierarchy::new(MeshConfig::default()).unwrap()),
            Box::new(NullSink),
        )
        .with_lattice(Lattice::new().with(Drift::new(1.0)))
        .with_particle_shape(ParticleShape::Linear);
        let mut sim = Simulation::new(config).unwrap();
        sim.initialize().unwrap();

        let m = sim.evolve(2).unwrap();

        assert_eq!(m.push_calls, 2);
        assert!((sim.ensemble().ref_particle().s - 2.0).abs() < 1e-12);
    }

    #[test]
    fn driver_error_chains_sources() {
        let err = DriverError::from(ConfigError::EmptyLattice);
        assert!(err.source().is_some());
        assert!(DriverError::NotInitialized.source().is_none());
    }
}
