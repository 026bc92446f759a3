//! Particle tiles: the unit of ownership within the ensemble.

use beamline_core::{BoxId, LayoutGeneration, Particle, RankId};

/// Particles belonging to one box of one layout generation.
///
/// Tiles never hold references into the mesh; the `(box_id, generation)`
/// pair is checked against the live layout whenever the mesh is touched.
#[derive(Clone, Debug, PartialEq)]
pub struct ParticleTile {
    /// Box this tile belongs to.
    pub box_id: BoxId,
    /// Rank owning the box.
    pub rank: RankId,
    /// Layout generation the tile was built against.
    pub generation: LayoutGeneration,
    /// The particles.
    pub particles: Vec<Particle>,
}

impl ParticleTile {
    /// An empty tile.
    pub fn new(box_id: BoxId, rank: RankId, generation: LayoutGeneration) -> Self {
        Self {
            box_id,
            rank,
            generation,
            particles: Vec::new(),
        }
    }

    /// Tile used before any layout exists: box 0, rank 0, generation 0.
    pub fn unassigned(particles: Vec<Particle>) -> Self {
        Self {
            box_id: BoxId(0),
            rank: RankId(0),
            generation: LayoutGeneration::default(),
            particles,
        }
    }

    /// Number of particles.
    pub fn len(&self) -> usize {
        self.particles.len()
    }

    /// Whether the tile holds no particles.
    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }
}
