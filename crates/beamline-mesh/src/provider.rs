//! The mesh-provider seam the driver and space-charge coupler talk to.

use beamline_core::{Extent, MeshError};
use smallvec::SmallVec;

use crate::density::ChargeDensity;
use crate::layout::DomainLayout;

/// Refinement ratios between consecutive levels, coarse to fine.
pub type RefinementRatios = SmallVec<[u32; 4]>;

/// Owner of the mesh hierarchy and its charge-density storage.
///
/// Call order within one run:
///
/// 1. `init_from_scratch` once, after the particle shape is known.
/// 2. Per space-charge step: `resize_mesh`, then the particle container
///    redistributes against `layout()`, then deposits into `rho_mut()`.
///
/// `Send` lets a whole simulation move to a worker thread.
pub trait MeshProvider: Send {
    /// Build the initial hierarchy with `guard_cells` guard cells per side.
    fn init_from_scratch(&mut self, guard_cells: u32) -> Result<(), MeshError>;

    /// Fit the domain around `extent` and rebuild the layout.
    ///
    /// Always bumps the layout generation, even if the domain is unchanged.
    fn resize_mesh(&mut self, extent: &Extent) -> Result<(), MeshError>;

    /// Refinement ratios, one per level above level 0.
    fn refinement_ratios(&self) -> RefinementRatios;

    /// Current domain layout.
    fn layout(&self) -> Result<&DomainLayout, MeshError>;

    /// Current charge density.
    fn rho(&self) -> Result<&ChargeDensity, MeshError>;

    /// Mutable charge density, for deposition.
    fn rho_mut(&mut self) -> Result<&mut ChargeDensity, MeshError>;

    /// Whether `init_from_scratch` has completed.
    fn is_initialized(&self) -> bool {
        self.layout().is_ok()
    }
}
