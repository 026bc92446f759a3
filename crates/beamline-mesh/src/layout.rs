//! Domain decomposition: boxes, their owning ranks, and the layout generation.

use beamline_core::{BoxId, LayoutGeneration, MeshError, RankId};

use crate::geometry::Geometry;

/// One box of the level-0 decomposition.
///
/// Boxes span the full transverse plane and a contiguous range of
/// longitudinal cells `[z_lo, z_hi)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BoxSpec {
    /// Box identifier, dense from zero.
    pub id: BoxId,
    /// Rank that owns the box.
    pub rank: RankId,
    /// First longitudinal cell (inclusive).
    pub z_lo: u32,
    /// Last longitudinal cell (exclusive).
    pub z_hi: u32,
}

/// Assignment of boxes to ranks for one layout generation.
#[derive(Clone, Debug, PartialEq)]
pub struct DomainLayout {
    generation: LayoutGeneration,
    geometry: Geometry,
    boxes: Vec<BoxSpec>,
}

impl DomainLayout {
    /// Cut `geometry` into `n_ranks` boxes along z, one per rank.
    ///
    /// Cells are shared as evenly as possible; the first
    /// `nz % n_ranks` boxes receive one extra cell.
    pub fn split(
        geometry: Geometry,
        n_ranks: u32,
        generation: LayoutGeneration,
    ) -> Result<Self, MeshError> {
        let nz = geometry.n_cells[2];
        if n_ranks == 0 || n_ranks > nz {
            return Err(MeshError::TooManyRanks {
                ranks: n_ranks,
                cells: nz,
            });
        }
        let base = nz / n_ranks;
        let extra = nz % n_ranks;
        let mut boxes = Vec::with_capacity(n_ranks as usize);
        let mut z_lo = 0;
        for b in 0..n_ranks {
            let len = base + u32::from(b < extra);
            boxes.push(BoxSpec {
                id: BoxId(b),
                rank: RankId(b),
                z_lo,
                z_hi: z_lo + len,
            });
            z_lo += len;
        }
        Ok(Self {
            generation,
            geometry,
            boxes,
        })
    }

    /// Generation stamp of this layout.
    pub fn generation(&self) -> LayoutGeneration {
        self.generation
    }

    /// Level-0 geometry the layout was cut from.
    pub fn geometry(&self) -> &Geometry {
        &self.geometry
    }

    /// Boxes in id order.
    pub fn boxes(&self) -> &[BoxSpec] {
        &self.boxes
    }

    /// Number of boxes.
    pub fn len(&self) -> usize {
        self.boxes.len()
    }

    /// Whether the layout has no boxes. Never true for a built layout.
    pub fn is_empty(&self) -> bool {
        self.boxes.is_empty()
    }

    /// Look up a box by id.
    pub fn get(&self, id: BoxId) -> Option<&BoxSpec> {
        self.boxes.get(id.0 as usize)
    }

    /// Box containing a position, or `None` outside the domain.
    ///
    /// Points on the upper face belong to the last cell.
    pub fn locate(&self, p: [f64; 3]) -> Option<BoxId> {
        let hi = self.geometry.hi();
        for d in 0..3 {
            if !(p[d] >= self.geometry.lo[d] && p[d] <= hi[d]) {
                return None;
            }
        }
        let nz = self.geometry.n_cells[2];
        let cell = (self.geometry.cell_coord(p[2], 2).floor() as u32).min(nz - 1);
        // Boxes are sorted by z_lo; binary search on the upper edge.
        let idx = self.boxes.partition_point(|b| b.z_hi <= cell);
        self.boxes.get(idx).map(|b| b.id)
    }
}
