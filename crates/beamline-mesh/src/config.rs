//! Mesh configuration.

use beamline_core::{Extent, MeshError};

/// Configuration for [`MeshHierarchy`](crate::MeshHierarchy).
#[derive(Clone, Debug, PartialEq)]
pub struct MeshConfig {
    /// Level-0 cell counts per axis. Default: 16³.
    pub n_cells: [u32; 3],
    /// Number of refined levels above level 0. Default: 0.
    pub max_level: u32,
    /// Refinement ratio between consecutive levels. Default: 2.
    pub ref_ratio: u32,
    /// Number of boxes (one per rank) along the longitudinal axis. Default: 1.
    pub n_ranks: u32,
    /// Fraction of the extent width added on each side when resizing. Default: 0.1.
    pub domain_padding: f64,
    /// Minimum domain width per axis (m), for degenerate extents. Default: 1e-6.
    pub min_width: f64,
    /// Upper bound on total mesh nodes across all levels. Default: 2²⁶.
    pub max_nodes: usize,
    /// Domain used by `init_from_scratch`, before the first resize.
    /// Default: the cube `[-1, 1]³`.
    pub initial_domain: Extent,
}

impl Default for MeshConfig {
    fn default() -> Self {
        Self {
            n_cells: [16, 16, 16],
            max_level: 0,
            ref_ratio: 2,
            n_ranks: 1,
            domain_padding: 0.1,
            min_width: 1e-6,
            max_nodes: 1 << 26,
            initial_domain: Extent {
                lo: [-1.0; 3],
                hi: [1.0; 3],
            },
        }
    }
}

fn invalid(field: &'static str, reason: String) -> MeshError {
    MeshError::InvalidConfig { field, reason }
}

impl MeshConfig {
    /// Check structural invariants.
    ///
    /// # Errors
    ///
    /// Returns [`MeshError::InvalidConfig`] naming the first field that
    /// violates them.
    pub fn validate(&self) -> Result<(), MeshError> {
        if self.n_cells.iter().any(|&n| n == 0) {
            return Err(invalid(
                "n_cells",
                format!("must be positive, got {:?}", self.n_cells),
            ));
        }
        if self.ref_ratio < 2 {
            return Err(invalid(
                "ref_ratio",
                format!("must be at least 2, got {}", self.ref_ratio),
            ));
        }
        if self.n_ranks == 0 {
            return Err(invalid("n_ranks", "must be at least 1".to_string()));
        }
        if self.n_ranks > self.n_cells[2] {
            return Err(invalid(
                "n_ranks",
                format!(
                    "{} exceeds longitudinal cell count {}",
                    self.n_ranks, self.n_cells[2]
                ),
            ));
        }
        if !self.domain_padding.is_finite() || self.domain_padding < 0.0 {
            return Err(invalid(
                "domain_padding",
                format!(
                    "must be finite and non-negative, got {}",
                    self.domain_padding
                ),
            ));
        }
        if !self.min_width.is_finite() || self.min_width <= 0.0 {
            return Err(invalid(
                "min_width",
                format!("must be finite and positive, got {}", self.min_width),
            ));
        }
        if !self.initial_domain.is_finite()
            || (0..3).any(|d| self.initial_domain.width(d) <= 0.0)
        {
            return Err(invalid(
                "initial_domain",
                "must be finite with positive width".to_string(),
            ));
        }
        Ok(())
    }
}
