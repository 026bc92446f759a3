//! Sector bend.
//!
//! Linear map in `(x, px, t, pt)` with dispersion. The bend turns the
//! reference orbit toward −x in the lab x-z plane.

use beamline_core::{Particle, RefParticle};

use crate::transfer::Block2;

/// A sector dipole of arc length `ds` and bending radius `rc`.
#[derive(Clone, Debug, PartialEq)]
pub struct Sbend {
    /// Arc length (m).
    pub ds: f64,
    /// Bending radius (m).
    pub rc: f64,
    /// Slices requested at assembly.
    pub nslice: u32,
}

impl Sbend {
    /// A sector bend with one slice.
    pub fn new(ds: f64, rc: f64) -> Self {
        Self { ds, rc, nslice: 1 }
    }

    /// The map of `1/n` of this bend.
    pub fn slice(&self, n: usize) -> Self {
        Self {
            ds: self.ds / n as f64,
            rc: self.rc,
            nslice: self.nslice,
        }
    }

    /// Bending angle (rad).
    pub fn angle(&self) -> f64 {
        self.ds / self.rc
    }

    /// Push one particle.
    #[inline]
    pub fn push_particle(&self, p: &mut Particle, refpart: &RefParticle) {
        let bg = refpart.beta_gamma();
        let beta = refpart.beta();
        let rc = self.rc;
        let theta = self.angle();
        let (s, c) = theta.sin_cos();

        let (x, px, t, pt) = (p.x, p.px, p.z, p.pz);
        p.x = c * x + rc * s * px - rc / beta * (1.0 - c) * pt;
        p.px = -s / rc * x + c * px - s / beta * pt;
        p.z = s / beta * x + rc / beta * (1.0 - c) * px + t
            + (self.ds / (bg * bg) - rc / (beta * beta) * (theta - s)) * pt;
        (p.y, p.py) = Block2::drift(self.ds).apply(p.y, p.py);
    }

    /// Push the reference particle along the arc.
    pub fn push_reference(&self, refpart: &mut RefParticle) {
        let theta = self.angle();
        let p_perp = (refpart.px * refpart.px + refpart.pz * refpart.pz).sqrt();
        let phi0 = refpart.px.atan2(refpart.pz);
        let phi1 = phi0 - theta;
        let cx = refpart.x - self.rc * phi0.cos();
        let cz = refpart.z + self.rc * phi0.sin();
        refpart.x = cx + self.rc * phi1.cos();
        refpart.z = cz - self.rc * phi1.sin();
        refpart.px = p_perp * phi1.sin();
        refpart.pz = p_perp * phi1.cos();
        refpart.y += self.ds * refpart.py / refpart.beta_gamma();
        refpart.t += self.ds / refpart.beta();
        refpart.s += self.ds;
    }
}
