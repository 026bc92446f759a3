//! Level geometry: lower corner, cell size, and cell counts.

use beamline_core::Extent;

/// Geometry of one mesh level.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Geometry {
    /// Lower corner of the domain.
    pub lo: [f64; 3],
    /// Cell size per axis.
    pub dx: [f64; 3],
    /// Cell count per axis.
    pub n_cells: [u32; 3],
}

impl Geometry {
    /// Cover `domain` with `n_cells` cells.
    pub fn new(domain: &Extent, n_cells: [u32; 3]) -> Self {
        let mut dx = [0.0; 3];
        for d in 0..3 {
            dx[d] = domain.width(d) / f64::from(n_cells[d]);
        }
        Self {
            lo: domain.lo,
            dx,
            n_cells,
        }
    }

    /// Upper corner of the domain.
    pub fn hi(&self) -> [f64; 3] {
        let mut hi = [0.0; 3];
        for d in 0..3 {
            hi[d] = self.lo[d] + self.dx[d] * f64::from(self.n_cells[d]);
        }
        hi
    }

    /// Domain as an extent.
    pub fn domain(&self) -> Extent {
        Extent {
            lo: self.lo,
            hi: self.hi(),
        }
    }

    /// Refine by an integer factor, keeping the domain.
    pub fn refine(&self, ratio: u32) -> Self {
        let r = f64::from(ratio);
        Self {
            lo: self.lo,
            dx: [self.dx[0] / r, self.dx[1] / r, self.dx[2] / r],
            n_cells: [
                self.n_cells[0] * ratio,
                self.n_cells[1] * ratio,
                self.n_cells[2] * ratio,
            ],
        }
    }

    /// Position along axis `d` in cell units, measured from the lower corner.
    #[inline]
    pub fn cell_coord(&self, value: f64, d: usize) -> f64 {
        (value - self.lo[d]) / self.dx[d]
    }

    /// Volume of one cell.
    pub fn cell_volume(&self) -> f64 {
        self.dx[0] * self.dx[1] * self.dx[2]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn geometry_covers_domain() {
        let g = Geometry::new(
            &Extent {
                lo: [0.0, -1.0, 2.0],
                hi: [4.0, 1.0, 3.0],
            },
            [4, 2, 10],
        );
        assert_eq!(g.dx, [1.0, 1.0, 0.1]);
        let hi = g.hi();
        assert!((hi[2] - 3.0).abs() < 1e-12);
        assert_eq!(g.cell_coord(2.5, 0), 2.5);
    }

    #[test]
    fn refine_keeps_domain() {
        let g = Geometry::new(
            &Extent {
                lo: [0.0; 3],
                hi: [1.0; 3],
            },
            [4, 4, 4],
        );
        let f = g.refine(2);
        assert_eq!(f.n_cells, [8, 8, 8]);
        assert!((f.hi()[0] - g.hi()[0]).abs() < 1e-12);
        assert!((f.cell_volume() * 8.0 - g.cell_volume()).abs() < 1e-15);
    }
}
