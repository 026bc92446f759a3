//! The particle-storage seam the driver, coupler, and diagnostics use.

use beamline_core::{
    Direction, Extent, Frame, MeshError, Particle, ParticleShape, PushError, RefParticle,
    TransformError,
};
use beamline_lattice::LatticeElement;
use beamline_mesh::{ChargeDensity, DomainLayout};

/// A macro-particle ensemble plus its reference particle.
///
/// # Contract
///
/// - The frame tag is ensemble-wide. `transform` is the only operation
///   that changes it, and it does so only from `direction.source()`.
/// - `transform`, `redistribute`, and `push` never change the particle
///   count or any weight.
/// - A failed `transform` or `redistribute` leaves the ensemble as it was.
///
/// `Send` lets a whole simulation move to a worker thread.
pub trait ParticleStorage: Send {
    /// Current frame of every particle.
    fn frame(&self) -> Frame;

    /// Set the deposition shape. Must happen before any grid sizing.
    fn set_particle_shape(&mut self, shape: ParticleShape);

    /// Deposition shape, `None` until set.
    fn particle_shape(&self) -> Option<ParticleShape>;

    /// Number of macro-particles.
    ///
    /// With `local_only`, only particles in tiles owned by this process's
    /// rank are counted; otherwise the global count.
    fn total_particle_count(&self, local_only: bool) -> u64;

    /// Bounding box of all particle positions in the current frame,
    /// `None` for an empty ensemble.
    fn extent(&self) -> Option<Extent>;

    /// Convert every particle to `direction.target()`.
    fn transform(&mut self, direction: Direction) -> Result<(), TransformError>;

    /// Re-tile the particles to match `layout`.
    fn redistribute(&mut self, layout: &DomainLayout) -> Result<(), MeshError>;

    /// Deposit charge density onto every level of `rho`.
    ///
    /// `ratios` are the refinement ratios between consecutive levels.
    fn deposit_charge(&self, rho: &mut ChargeDensity, ratios: &[u32]) -> Result<(), MeshError>;

    /// Apply `element`'s map to every particle and to the reference particle.
    ///
    /// Elements assembled with `nslice > 1` are applied as that many
    /// equal slices.
    ///
    /// # Errors
    ///
    /// - [`PushError::Frame`] outside the transverse-time frame; nothing
    ///   is modified.
    /// - [`PushError::NonFinite`] when a particle leaves the map with a
    ///   non-finite coordinate. The push stops there: particles visited
    ///   before it have already moved, the rest have not, and the
    ///   reference particle is not advanced. The ensemble is no longer
    ///   consistent and the run must be abandoned.
    fn push(&mut self, element: &LatticeElement) -> Result<(), PushError>;

    /// The reference particle.
    fn ref_particle(&self) -> &RefParticle;

    /// Visit every particle, tile by tile.
    fn for_each_particle(&self, f: &mut dyn FnMut(&Particle));
}
