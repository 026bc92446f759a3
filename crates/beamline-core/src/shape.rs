//! B-spline particle shape used for charge deposition.

use std::fmt;

/// Order of the B-spline shape factor a macro-particle deposits with.
///
/// The shape fixes the stencil width, which fixes how many guard cells
/// the mesh needs. It must therefore be known before any grid is built.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ParticleShape {
    /// Cloud-in-cell, order 1.
    Linear,
    /// Triangular-shaped cloud, order 2.
    Quadratic,
    /// Cubic B-spline, order 3.
    Cubic,
}

impl ParticleShape {
    /// Build from a numeric order (1, 2, or 3).
    pub fn from_order(order: u32) -> Option<Self> {
        match order {
            1 => Some(Self::Linear),
            2 => Some(Self::Quadratic),
            3 => Some(Self::Cubic),
            _ => None,
        }
    }

    /// Numeric spline order.
    pub fn order(self) -> u32 {
        match self {
            Self::Linear => 1,
            Self::Quadratic => 2,
            Self::Cubic => 3,
        }
    }

    /// Number of mesh nodes touched per axis.
    pub fn support_width(self) -> u32 {
        self.order() + 1
    }

    /// Guard cells each side of a box needed to hold the full stencil.
    pub fn guard_cells(self) -> u32 {
        self.order().div_ceil(2) + 1
    }

    /// Per-axis deposition weights.
    ///
    /// `xi` is the particle position in cell units. Returns the index of
    /// the first node touched and the weights for `support_width()`
    /// consecutive nodes. The weights sum to one.
    pub fn weights(self, xi: f64) -> (i64, [f64; 4]) {
        let mut w = [0.0; 4];
        match self {
            Self::Linear => {
                let i = xi.floor();
                let f = xi - i;
                w[0] = 1.0 - f;
                w[1] = f;
                (i as i64, w)
            }
            Self::Quadratic => {
                let i = xi.round();
                let f = xi - i;
                w[0] = 0.5 * (0.5 - f).powi(2);
                w[1] = 0.75 - f * f;
                w[2] = 0.5 * (0.5 + f).powi(2);
                (i as i64 - 1, w)
            }
            Self::Cubic => {
                let i = xi.floor();
                let f = xi - i;
                let g = 1.0 - f;
                w[0] = g * g * g / 6.0;
                w[1] = (4.0 - 6.0 * f * f + 3.0 * f * f * f) / 6.0;
                w[2] = (4.0 - 6.0 * g * g + 3.0 * g * g * g) / 6.0;
                w[3] = f * f * f / 6.0;
                (i as i64 - 1, w)
            }
        }
    }
}

impl fmt::Display for ParticleShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "order-{} B-spline", self.order())
    }
}
