//! Node-centred charge density, one array per mesh level.

use beamline_core::{LayoutGeneration, MeshError};

use crate::geometry::Geometry;

/// Charge density on one level.
///
/// Nodes run from `-guard` to `n_cells + guard` inclusive on each axis.
#[derive(Clone, Debug, PartialEq)]
pub struct LevelData {
    n_cells: [u32; 3],
    guard: u32,
    data: Vec<f64>,
}

impl LevelData {
    /// Zeroed storage for `n_cells` cells with `guard` guard cells each side.
    pub fn zeroed(n_cells: [u32; 3], guard: u32) -> Self {
        let len = Self::node_count(n_cells, guard);
        Self {
            n_cells,
            guard,
            data: vec![0.0; len],
        }
    }

    /// Nodes needed for a level of this size, guard cells included.
    pub fn node_count(n_cells: [u32; 3], guard: u32) -> usize {
        n_cells
            .iter()
            .map(|&n| (n + 1 + 2 * guard) as usize)
            .product()
    }

    /// Cell counts per axis.
    pub fn n_cells(&self) -> [u32; 3] {
        self.n_cells
    }

    /// Guard cells each side.
    pub fn guard(&self) -> u32 {
        self.guard
    }

    fn flat_index(&self, node: [i64; 3]) -> Option<usize> {
        let g = i64::from(self.guard);
        let mut idx = 0usize;
        for d in 0..3 {
            let extent = i64::from(self.n_cells[d]) + 1 + 2 * g;
            let shifted = node[d] + g;
            if shifted < 0 || shifted >= extent {
                return None;
            }
            idx = idx * extent as usize + shifted as usize;
        }
        Some(idx)
    }

    /// Value at a node, `None` outside the guarded range.
    pub fn get(&self, node: [i64; 3]) -> Option<f64> {
        self.flat_index(node).map(|i| self.data[i])
    }

    /// Accumulate into a node. Returns `false` if the node is outside the
    /// guarded range.
    pub fn add(&mut self, node: [i64; 3], value: f64) -> bool {
        match self.flat_index(node) {
            Some(i) => {
                self.data[i] += value;
                true
            }
            None => false,
        }
    }

    /// Sum over every node, guards included.
    pub fn sum(&self) -> f64 {
        self.data.iter().sum()
    }

    /// Raw node values in `x`-major order.
    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }

    fn zero(&mut self) {
        self.data.iter_mut().for_each(|v| *v = 0.0);
    }
}

/// Charge density over the whole hierarchy.
///
/// Stamped with the layout generation it was allocated for; deposition
/// from tiles of any other generation is rejected.
#[derive(Clone, Debug, PartialEq)]
pub struct ChargeDensity {
    generation: LayoutGeneration,
    base: Geometry,
    levels: Vec<LevelData>,
}

impl ChargeDensity {
    /// Zeroed density with one level per entry in `ratios` plus level 0.
    pub fn allocate(
        base: Geometry,
        ratios: &[u32],
        guard: u32,
        generation: LayoutGeneration,
    ) -> Self {
        let mut levels = Vec::with_capacity(ratios.len() + 1);
        let mut geom = base;
        levels.push(LevelData::zeroed(geom.n_cells, guard));
        for &r in ratios {
            geom = geom.refine(r);
            levels.push(LevelData::zeroed(geom.n_cells, guard));
        }
        Self {
            generation,
            base,
            levels,
        }
    }

    /// Generation the density was allocated for.
    pub fn generation(&self) -> LayoutGeneration {
        self.generation
    }

    /// Level-0 geometry.
    pub fn base_geometry(&self) -> &Geometry {
        &self.base
    }

    /// Number of levels.
    pub fn num_levels(&self) -> usize {
        self.levels.len()
    }

    /// Level data, coarse to fine.
    pub fn levels(&self) -> &[LevelData] {
        &self.levels
    }

    /// Mutable level data.
    pub fn level_mut(&mut self, level: usize) -> Option<&mut LevelData> {
        self.levels.get_mut(level)
    }

    /// Geometry of `level`, derived from level 0 and the refinement ratios.
    ///
    /// Fails if `ratios` does not describe exactly the stored levels.
    pub fn level_geometry(&self, level: usize, ratios: &[u32]) -> Result<Geometry, MeshError> {
        if ratios.len() + 1 != self.levels.len() || level >= self.levels.len() {
            return Err(MeshError::RefinementMismatch {
                levels: self.levels.len(),
                ratios: ratios.len(),
            });
        }
        let geom = ratios[..level]
            .iter()
            .fold(self.base, |g, &r| g.refine(r));
        if geom.n_cells != self.levels[level].n_cells {
            return Err(MeshError::RefinementMismatch {
                levels: self.levels.len(),
                ratios: ratios.len(),
            });
        }
        Ok(geom)
    }

    /// Total deposited charge on `level` (C), guards included.
    pub fn total_charge(&self, level: usize, ratios: &[u32]) -> Result<f64, MeshError> {
        let geom = self.level_geometry(level, ratios)?;
        Ok(self.levels[level].sum() * geom.cell_volume())
    }

    /// Reset every level to zero.
    pub fn clear(&mut self) {
        self.levels.iter_mut().for_each(LevelData::zero);
    }
}
