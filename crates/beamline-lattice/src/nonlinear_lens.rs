//! Thin Danilov–Nagaitsev nonlinear lens.
//!
//! The kick derives from the complex potential of the integrable
//! elliptic lens. Particles approaching the branch points at `x = ±cnll`
//! receive unbounded kicks; the caller's finiteness check catches them.

use beamline_core::{Particle, RefParticle};
use num_complex::Complex64;

/// A thin nonlinear lens with integrated strength `knll` and
/// dimensional parameter `cnll`.
#[derive(Clone, Debug, PartialEq)]
pub struct NonlinearLens {
    /// Integrated strength (m).
    pub knll: f64,
    /// Distance of the singularities from the axis (m).
    pub cnll: f64,
}

impl NonlinearLens {
    /// A thin nonlinear lens.
    pub fn new(knll: f64, cnll: f64) -> Self {
        Self { knll, cnll }
    }

    /// `1/n` of the integrated strength.
    pub fn slice(&self, n: usize) -> Self {
        Self {
            knll: self.knll / n as f64,
            cnll: self.cnll,
        }
    }

    /// Kick one particle.
    #[inline]
    pub fn push_particle(&self, p: &mut Particle, _refpart: &RefParticle) {
        let i = Complex64::i();
        let zeta = Complex64::new(p.x, p.y) / self.cnll;
        let croot = (Complex64::new(1.0, 0.0) - zeta * zeta).sqrt();
        let carcsin = -i * (i * zeta + croot).ln();
        let df = zeta / (croot * croot) + carcsin / (croot * croot * croot);
        let kick = -self.knll / self.cnll;
        p.px += kick * df.re;
        p.py -= kick * df.im;
    }

    /// Thin elements leave the reference particle in place.
    pub fn push_reference(&self, _refpart: &mut RefParticle) {}
}
