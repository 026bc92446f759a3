//! Thick quadrupole.

use beamline_core::{Particle, RefParticle};

use crate::transfer::{advance_straight, apply_longitudinal, Block2};

/// A quadrupole of length `ds` and strength `k`.
///
/// `k > 0` focuses horizontally and defocuses vertically.
#[derive(Clone, Debug, PartialEq)]
pub struct Quad {
    /// Length (m).
    pub ds: f64,
    /// Focusing strength (1/m²).
    pub k: f64,
    /// Slices requested at assembly.
    pub nslice: u32,
}

impl Quad {
    /// A quadrupole with one slice.
    pub fn new(ds: f64, k: f64) -> Self {
        Self { ds, k, nslice: 1 }
    }

    /// The map of `1/n` of this quadrupole.
    pub fn slice(&self, n: usize) -> Self {
        Self {
            ds: self.ds / n as f64,
            k: self.k,
            nslice: self.nslice,
        }
    }

    /// Push one particle.
    #[inline]
    pub fn push_particle(&self, p: &mut Particle, refpart: &RefParticle) {
        let bg = refpart.beta_gamma();
        (p.x, p.px) = Block2::harmonic(self.k, self.ds).apply(p.x, p.px);
        (p.y, p.py) = Block2::harmonic(-self.k, self.ds).apply(p.y, p.py);
        (p.z, p.pz) = apply_longitudinal(&Block2::drift(self.ds), p.z, p.pz, bg * bg);
    }

    /// Push the reference particle.
    pub fn push_reference(&self, refpart: &mut RefParticle) {
        advance_straight(refpart, self.ds);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn positive_k_focuses_x_defocuses_y() {
        let r = RefParticle::default();
        let mut p = Particle::at_origin(0);
        p.x = 1e-3;
        p.y = 1e-3;
        Quad::new(0.5, 2.0).push_particle(&mut p, &r);
        assert!(p.x < 1e-3);
        assert!(p.px < 0.0);
        assert!(p.y > 1e-3);
        assert!(p.py > 0.0);
    }

    #[test]
    fn zero_strength_matches_drift() {
        let r = RefParticle::default();
        let mut a = Particle::at_origin(0);
        a.px = 0.01;
        a.pz = 0.02;
        let mut b = a;
        Quad::new(1.0, 0.0).push_particle(&mut a, &r);
        crate::drift::Drift::new(1.0).push_particle(&mut b, &r);
        assert_eq!(a, b);
    }
}
