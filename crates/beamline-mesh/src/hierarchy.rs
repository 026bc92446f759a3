//! The concrete mesh hierarchy.

use beamline_core::{Extent, LayoutGeneration, MeshError};
use smallvec::smallvec;

use crate::config::MeshConfig;
use crate::density::{ChargeDensity, LevelData};
use crate::geometry::Geometry;
use crate::layout::DomainLayout;
use crate::provider::{MeshProvider, RefinementRatios};

#[derive(Debug)]
struct MeshState {
    guard: u32,
    layout: DomainLayout,
    rho: ChargeDensity,
}

/// Uniform-ratio mesh hierarchy with a slab decomposition along z.
///
/// Level 0 covers the padded beam extent; each finer level covers the
/// same domain at `ref_ratio` times the resolution.
#[derive(Debug)]
pub struct MeshHierarchy {
    config: MeshConfig,
    state: Option<MeshState>,
}

impl MeshHierarchy {
    /// Create an uninitialized hierarchy.
    ///
    /// # Errors
    ///
    /// Returns [`MeshError::InvalidConfig`] if the config fails validation.
    pub fn new(config: MeshConfig) -> Result<Self, MeshError> {
        config.validate()?;
        Ok(Self {
            config,
            state: None,
        })
    }

    /// The configuration this hierarchy was built with.
    pub fn config(&self) -> &MeshConfig {
        &self.config
    }

    /// Current layout generation, `None` before initialization.
    pub fn generation(&self) -> Option<LayoutGeneration> {
        self.state.as_ref().map(|s| s.layout.generation())
    }

    fn ratios(&self) -> RefinementRatios {
        smallvec![self.config.ref_ratio; self.config.max_level as usize]
    }

    /// Pad `extent` and widen degenerate axes.
    fn padded_domain(&self, extent: &Extent) -> Extent {
        let mut domain = *extent;
        for d in 0..3 {
            let width = extent.width(d).max(self.config.min_width);
            let mid = 0.5 * (extent.lo[d] + extent.hi[d]);
            let half = 0.5 * width * (1.0 + 2.0 * self.config.domain_padding);
            domain.lo[d] = mid - half;
            domain.hi[d] = mid + half;
        }
        domain
    }

    /// Build layout and density for `domain` at `generation`.
    fn build(
        &self,
        domain: &Extent,
        guard: u32,
        generation: LayoutGeneration,
    ) -> Result<MeshState, MeshError> {
        let ratios = self.ratios();
        let mut requested = 0usize;
        let mut n_cells = self.config.n_cells;
        requested += LevelData::node_count(n_cells, guard);
        for &r in &ratios {
            n_cells = n_cells.map(|n| n.saturating_mul(r));
            requested = requested.saturating_add(LevelData::node_count(n_cells, guard));
        }
        if requested > self.config.max_nodes {
            return Err(MeshError::CapacityExceeded {
                requested,
                capacity: self.config.max_nodes,
            });
        }

        let geometry = Geometry::new(domain, self.config.n_cells);
        let layout = DomainLayout::split(geometry, self.config.n_ranks, generation)?;
        let rho = ChargeDensity::allocate(geometry, &ratios, guard, generation);
        Ok(MeshState { guard, layout, rho })
    }
}

impl MeshProvider for MeshHierarchy {
    fn init_from_scratch(&mut self, guard_cells: u32) -> Result<(), MeshError> {
        let state = self.build(
            &self.config.initial_domain,
            guard_cells,
            LayoutGeneration::default().next(),
        )?;
        log::debug!(
            "mesh initialized: {} level(s), {} box(es), {guard_cells} guard cell(s)",
            state.rho.num_levels(),
            state.layout.len()
        );
        self.state = Some(state);
        Ok(())
    }

    fn resize_mesh(&mut self, extent: &Extent) -> Result<(), MeshError> {
        let (guard, generation) = match &self.state {
            Some(s) => (s.guard, s.layout.generation()),
            None => return Err(MeshError::NotInitialized),
        };
        if !extent.is_finite() || (0..3).any(|d| extent.width(d) < 0.0) {
            return Err(MeshError::InvalidExtent {
                reason: format!("lo={:?} hi={:?}", extent.lo, extent.hi),
            });
        }
        let domain = self.padded_domain(extent);
        let state = self.build(&domain, guard, generation.next())?;
        log::trace!(
            "mesh resized to lo={:?} hi={:?}, generation {}",
            domain.lo,
            domain.hi,
            state.layout.generation()
        );
        self.state = Some(state);
        Ok(())
    }

    fn refinement_ratios(&self) -> RefinementRatios {
        self.ratios()
    }

    fn layout(&self) -> Result<&DomainLayout, MeshError> {
        self.state
            .as_ref()
            .map(|s| &s.layout)
            .ok_or(MeshError::NotInitialized)
    }

    fn rho(&self) -> Result<&ChargeDensity, MeshError> {
        self.state
            .as_ref()
            .map(|s| &s.rho)
            .ok_or(MeshError::NotInitialized)
    }

    fn rho_mut(&mut self) -> Result<&mut ChargeDensity, MeshError> {
        self.state
            .as_mut()
            .map(|s| &mut s.rho)
            .ok_or(MeshError::NotInitialized)
    }
}
