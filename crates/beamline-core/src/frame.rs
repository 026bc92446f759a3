//! Coordinate frames and transform directions.

use std::fmt;

/// Coordinate representation shared by the whole ensemble.
///
/// The frame is a property of the ensemble, never of a single particle:
/// between two operations every particle is in the same frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Frame {
    /// Fixed-s coordinates `(x, y, t, px, py, pt)`. Lattice maps act here.
    TransverseTime,
    /// Fixed-t coordinates `(x, y, z, px, py, pz)`. Charge deposition and
    /// field evaluation act here.
    Spatial,
}

impl fmt::Display for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TransverseTime => write!(f, "transverse-time"),
            Self::Spatial => write!(f, "spatial"),
        }
    }
}

/// Direction of a coordinate transform.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Direction {
    /// `(x, y, t)` to `(x, y, z)`.
    TimeToSpatial,
    /// `(x, y, z)` to `(x, y, t)`.
    SpatialToTime,
}

impl Direction {
    /// Frame the ensemble must be in before the transform.
    pub fn source(self) -> Frame {
        match self {
            Self::TimeToSpatial => Frame::TransverseTime,
            Self::SpatialToTime => Frame::Spatial,
        }
    }

    /// Frame the ensemble is in after the transform.
    pub fn target(self) -> Frame {
        match self {
            Self::TimeToSpatial => Frame::Spatial,
            Self::SpatialToTime => Frame::TransverseTime,
        }
    }

    /// The opposite direction.
    pub fn inverse(self) -> Self {
        match self {
            Self::TimeToSpatial => Self::SpatialToTime,
            Self::SpatialToTime => Self::TimeToSpatial,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TimeToSpatial => write!(f, "t->z"),
            Self::SpatialToTime => write!(f, "z->t"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn source_and_target_are_opposite_frames() {
        for dir in [Direction::TimeToSpatial, Direction::SpatialToTime] {
            assert_ne!(dir.source(), dir.target());
            assert_eq!(dir.inverse().source(), dir.target());
            assert_eq!(dir.inverse().target(), dir.source());
        }
    }
}
