//! The closed set of beamline element kinds.

use std::fmt;

use beamline_core::{Particle, RefParticle};

use crate::constf::ConstF;
use crate::drift::Drift;
use crate::multipole::Multipole;
use crate::nonlinear_lens::NonlinearLens;
use crate::quad::Quad;
use crate::sbend::Sbend;

/// A beamline element.
///
/// Each variant supplies a particle map and a reference-particle map and
/// nothing else. Elements are immutable once the lattice is assembled;
/// sub-stepping uses [`slice`](LatticeElement::slice) to derive the map
/// of a fraction of the element.
#[derive(Clone, Debug, PartialEq)]
pub enum LatticeElement {
    /// Field-free drift.
    Drift(Drift),
    /// Thick quadrupole.
    Quad(Quad),
    /// Sector bend.
    Sbend(Sbend),
    /// Constant focusing.
    ConstF(ConstF),
    /// Thin multipole.
    Multipole(Multipole),
    /// Thin nonlinear lens.
    NonlinearLens(NonlinearLens),
}

impl LatticeElement {
    /// Kind name as used in element specs.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Drift(_) => "drift",
            Self::Quad(_) => "quad",
            Self::Sbend(_) => "sbend",
            Self::ConstF(_) => "constf",
            Self::Multipole(_) => "multipole",
            Self::NonlinearLens(_) => "nonlinear_lens",
        }
    }

    /// Path length covered by the element (zero for thin elements).
    pub fn length(&self) -> f64 {
        match self {
            Self::Drift(e) => e.ds,
            Self::Quad(e) => e.ds,
            Self::Sbend(e) => e.ds,
            Self::ConstF(e) => e.ds,
            Self::Multipole(_) | Self::NonlinearLens(_) => 0.0,
        }
    }

    /// Slices requested at assembly (1 for thin elements).
    pub fn nslice(&self) -> u32 {
        match self {
            Self::Drift(e) => e.nslice,
            Self::Quad(e) => e.nslice,
            Self::Sbend(e) => e.nslice,
            Self::ConstF(e) => e.nslice,
            Self::Multipole(_) | Self::NonlinearLens(_) => 1,
        }
    }

    /// The element covering `1/n` of this one.
    ///
    /// Thick elements shorten; thin elements scale their integrated
    /// strength. Applying the slice `n` times reproduces the element.
    /// `n == 0` is treated as 1.
    pub fn slice(&self, n: usize) -> Self {
        let n = n.max(1);
        match self {
            Self::Drift(e) => Self::Drift(e.slice(n)),
            Self::Quad(e) => Self::Quad(e.slice(n)),
            Self::Sbend(e) => Self::Sbend(e.slice(n)),
            Self::ConstF(e) => Self::ConstF(e.slice(n)),
            Self::Multipole(e) => Self::Multipole(e.slice(n)),
            Self::NonlinearLens(e) => Self::NonlinearLens(e.slice(n)),
        }
    }

    /// Apply the element map to one particle in fixed-s coordinates.
    #[inline]
    pub fn push_particle(&self, p: &mut Particle, refpart: &RefParticle) {
        match self {
            Self::Drift(e) => e.push_particle(p, refpart),
            Self::Quad(e) => e.push_particle(p, refpart),
            Self::Sbend(e) => e.push_particle(p, refpart),
            Self::ConstF(e) => e.push_particle(p, refpart),
            Self::Multipole(e) => e.push_particle(p, refpart),
            Self::NonlinearLens(e) => e.push_particle(p, refpart),
        }
    }

    /// Advance the reference particle through the element.
    pub fn push_reference(&self, refpart: &mut RefParticle) {
        match self {
            Self::Drift(e) => e.push_reference(refpart),
            Self::Quad(e) => e.push_reference(refpart),
            Self::Sbend(e) => e.push_reference(refpart),
            Self::ConstF(e) => e.push_reference(refpart),
            Self::Multipole(e) => e.push_reference(refpart),
            Self::NonlinearLens(e) => e.push_reference(refpart),
        }
    }
}

impl fmt::Display for LatticeElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Drift(e) => write!(f, "drift ds={}", e.ds),
            Self::Quad(e) => write!(f, "quad ds={} k={}", e.ds, e.k),
            Self::Sbend(e) => write!(f, "sbend ds={} rc={}", e.ds, e.rc),
            Self::ConstF(e) => write!(
                f,
                "constf ds={} kx={} ky={} kt={}",
                e.ds, e.kx, e.ky, e.kt
            ),
            Self::Multipole(e) => write!(
                f,
                "multipole multipole={} k_normal={} k_skew={}",
                e.order, e.k_normal, e.k_skew
            ),
            Self::NonlinearLens(e) => {
                write!(f, "nonlinear_lens knll={} cnll={}", e.knll, e.cnll)
            }
        }
    }
}

impl From<Drift> for LatticeElement {
    fn from(e: Drift) -> Self {
        Self::Drift(e)
    }
}

impl From<Quad> for LatticeElement {
    fn from(e: Quad) -> Self {
        Self::Quad(e)
    }
}

impl From<Sbend> for LatticeElement {
    fn from(e: Sbend) -> Self {
        Self::Sbend(e)
    }
}

impl From<ConstF> for LatticeElement {
    fn from(e: ConstF) -> Self {
        Self::ConstF(e)
    }
}

impl From<Multipole> for LatticeElement {
    fn from(e: Multipole) -> Self {
        Self::Multipole(e)
    }
}

impl From<NonlinearLens> for LatticeElement {
    fn from(e: NonlinearLens) -> Self {
        Self::NonlinearLens(e)
    }
}
