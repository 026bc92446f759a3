//! Strongly-typed identifiers for the domain layout.

use std::fmt;

/// Identifies one box of the domain layout.
///
/// `BoxId(n)` is the n-th box of the layout, counted along the
/// longitudinal axis. Particle tiles are keyed by the box they occupy.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BoxId(pub u32);

impl fmt::Display for BoxId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for BoxId {
    fn from(v: u32) -> Self {
        Self(v)
    }
}

/// Identifies the worker that owns a box.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RankId(pub u32);

impl fmt::Display for RankId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for RankId {
    fn from(v: u32) -> Self {
        Self(v)
    }
}

/// Generation counter of a domain layout.
///
/// Incremented every time the mesh is rebuilt or resized. A particle
/// tile stamped with an older generation no longer matches the live
/// layout and must be redistributed before it can be deposited.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct LayoutGeneration(pub u32);

impl LayoutGeneration {
    /// The generation that follows this one.
    pub fn next(self) -> Self {
        Self(self.0.wrapping_add(1))
    }
}

impl fmt::Display for LayoutGeneration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
