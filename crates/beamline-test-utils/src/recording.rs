//! Recording decorators over the collaborator traits.

use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard};

use beamline_core::{
    DiagnosticError, Direction, Extent, Frame, MeshError, Particle, ParticleShape, PushError,
    RefParticle, TransformError,
};
use beamline_diagnostics::{DiagnosticSink, OutputType};
use beamline_lattice::LatticeElement;
use beamline_mesh::{ChargeDensity, DomainLayout, MeshProvider, RefinementRatios};
use beamline_particles::ParticleStorage;

/// One observed call.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    SetShape(ParticleShape),
    Transform(Direction),
    Redistribute,
    Deposit,
    Push(&'static str),
    InitFromScratch { guard_cells: u32 },
    Resize,
    Prepare,
    Record { output: OutputType, destination: String },
}

/// Shared, append-only event log.
#[derive(Clone, Debug, Default)]
pub struct EventLog {
    inner: Arc<Mutex<Vec<Event>>>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<Event>> {
        // A panicking test poisons the lock; the log is still readable.
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn push(&self, event: Event) {
        self.lock().push(event);
    }

    /// Copy of every event so far.
    pub fn events(&self) -> Vec<Event> {
        self.lock().clone()
    }

    /// Number of events matching `pred`.
    pub fn count(&self, pred: impl Fn(&Event) -> bool) -> usize {
        self.lock().iter().filter(|e| pred(e)).count()
    }

    /// Destinations of every `Record` event, in order.
    pub fn destinations(&self) -> Vec<String> {
        self.lock()
            .iter()
            .filter_map(|e| match e {
                Event::Record { destination, .. } => Some(destination.clone()),
                _ => None,
            })
            .collect()
    }
}

// ── RecordingStorage ───────────────────────────────────────────────

/// Wraps a [`ParticleStorage`] and logs every mutating call.
pub struct RecordingStorage<S> {
    inner: S,
    log: EventLog,
}

impl<S: ParticleStorage> RecordingStorage<S> {
    pub fn new(inner: S, log: EventLog) -> Self {
        Self { inner, log }
    }
}

impl<S: ParticleStorage> ParticleStorage for RecordingStorage<S> {
    fn frame(&self) -> Frame {
        self.inner.frame()
    }

    fn set_particle_shape(&mut self, shape: ParticleShape) {
        self.log.push(Event::SetShape(shape));
        self.inner.set_particle_shape(shape);
    }

    fn particle_shape(&self) -> Option<ParticleShape> {
        self.inner.particle_shape()
    }

    fn total_particle_count(&self, local_only: bool) -> u64 {
        self.inner.total_particle_count(local_only)
    }

    fn extent(&self) -> Option<Extent> {
        self.inner.extent()
    }

    fn transform(&mut self, direction: Direction) -> Result<(), TransformError> {
        self.log.push(Event::Transform(direction));
        self.inner.transform(direction)
    }

    fn redistribute(&mut self, layout: &DomainLayout) -> Result<(), MeshError> {
        self.log.push(Event::Redistribute);
        self.inner.redistribute(layout)
    }

    fn deposit_charge(&self, rho: &mut ChargeDensity, ratios: &[u32]) -> Result<(), MeshError> {
        self.log.push(Event::Deposit);
        self.inner.deposit_charge(rho, ratios)
    }

    fn push(&mut self, element: &LatticeElement) -> Result<(), PushError> {
        self.log.push(Event::Push(element.kind()));
        self.inner.push(element)
    }

    fn ref_particle(&self) -> &RefParticle {
        self.inner.ref_particle()
    }

    fn for_each_particle(&self, f: &mut dyn FnMut(&Particle)) {
        self.inner.for_each_particle(f)
    }
}

// ── RecordingMesh ──────────────────────────────────────────────────

/// Wraps a [`MeshProvider`] and logs init and resize calls.
pub struct RecordingMesh<M> {
    inner: M,
    log: EventLog,
}

impl<M: MeshProvider> RecordingMesh<M> {
    pub fn new(inner: M, log: EventLog) -> Self {
        Self { inner, log }
    }
}

impl<M: MeshProvider> MeshProvider for RecordingMesh<M> {
    fn init_from_scratch(&mut self, guard_cells: u32) -> Result<(), MeshError> {
        self.log.push(Event::InitFromScratch { guard_cells });
        self.inner.init_from_scratch(guard_cells)
    }

    fn resize_mesh(&mut self, extent: &Extent) -> Result<(), MeshError> {
        self.log.push(Event::Resize);
        self.inner.resize_mesh(extent)
    }

    fn refinement_ratios(&self) -> RefinementRatios {
        self.inner.refinement_ratios()
    }

    fn layout(&self) -> Result<&DomainLayout, MeshError> {
        self.inner.layout()
    }

    fn rho(&self) -> Result<&ChargeDensity, MeshError> {
        self.inner.rho()
    }

    fn rho_mut(&mut self) -> Result<&mut ChargeDensity, MeshError> {
        self.inner.rho_mut()
    }
}

// ── RecordingSink ──────────────────────────────────────────────────

/// In-memory [`DiagnosticSink`] that logs every record.
///
/// Destinations registered with [`fail_on`](RecordingSink::fail_on)
/// return an I/O error instead of recording; `fail_prepare` makes
/// `prepare` fail.
#[derive(Default)]
pub struct RecordingSink {
    log: EventLog,
    failing: HashSet<String>,
    fail_prepare: bool,
}

impl RecordingSink {
    pub fn new(log: EventLog) -> Self {
        Self {
            log,
            ..Self::default()
        }
    }

    pub fn fail_on(mut self, destination: impl Into<String>) -> Self {
        self.failing.insert(destination.into());
        self
    }

    pub fn fail_prepare(mut self) -> Self {
        self.fail_prepare = true;
        self
    }
}

impl DiagnosticSink for RecordingSink {
    fn prepare(&mut self) -> Result<(), DiagnosticError> {
        self.log.push(Event::Prepare);
        if self.fail_prepare {
            return Err(DiagnosticError::Io {
                path: "diags".to_string(),
                source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only"),
            });
        }
        Ok(())
    }

    fn record(
        &mut self,
        _ensemble: &dyn ParticleStorage,
        output: OutputType,
        destination: &str,
    ) -> Result<(), DiagnosticError> {
        if self.failing.contains(destination) {
            return Err(DiagnosticError::Io {
                path: destination.to_string(),
                source: std::io::Error::other("disk full"),
            });
        }
        self.log.push(Event::Record {
            output,
            destination: destination.to_string(),
        });
        Ok(())
    }
}
