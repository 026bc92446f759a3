//! Constant focusing in all three planes.

use beamline_core::{Particle, RefParticle};

use crate::transfer::{advance_straight, apply_longitudinal, Block2};

/// Linear focusing of length `ds` with per-plane wavenumbers.
///
/// A smooth-focusing model of a periodic channel; `kt` acts on the
/// `(t, pt)` plane with the usual 1/(βγ)² longitudinal scaling.
#[derive(Clone, Debug, PartialEq)]
pub struct ConstF {
    /// Length (m).
    pub ds: f64,
    /// Horizontal focusing wavenumber (1/m).
    pub kx: f64,
    /// Vertical focusing wavenumber (1/m).
    pub ky: f64,
    /// Longitudinal focusing wavenumber (1/m).
    pub kt: f64,
    /// Slices requested at assembly.
    pub nslice: u32,
}

impl ConstF {
    /// Constant focusing with one slice.
    pub fn new(ds: f64, kx: f64, ky: f64, kt: f64) -> Self {
        Self {
            ds,
            kx,
            ky,
            kt,
            nslice: 1,
        }
    }

    /// The map of `1/n` of this element.
    pub fn slice(&self, n: usize) -> Self {
        Self {
            ds: self.ds / n as f64,
            ..self.clone()
        }
    }

    /// Push one particle.
    #[inline]
    pub fn push_particle(&self, p: &mut Particle, refpart: &RefParticle) {
        let bg = refpart.beta_gamma();
        (p.x, p.px) = Block2::harmonic(self.kx * self.kx, self.ds).apply(p.x, p.px);
        (p.y, p.py) = Block2::harmonic(self.ky * self.ky, self.ds).apply(p.y, p.py);
        let t_block = Block2::harmonic(self.kt * self.kt, self.ds);
        (p.z, p.pz) = apply_longitudinal(&t_block, p.z, p.pz, bg * bg);
    }

    /// Push the reference particle.
    pub fn push_reference(&self, refpart: &mut RefParticle) {
        advance_straight(refpart, self.ds);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    #[test]
    fn full_period_returns_to_start() {
        let r = RefParticle::default();
        let k = 2.0;
        let mut p = Particle::at_origin(0);
        p.x = 1e-3;
        p.py = 2e-4;
        let start = p;
        ConstF::new(2.0 * PI / k, k, k, 0.0).push_particle(&mut p, &r);
        assert!((p.x - start.x).abs() < 1e-12);
        assert!((p.py - start.py).abs() < 1e-12);
    }

    #[test]
    fn slice_keeps_strengths() {
        let c = ConstF::new(1.0, 1.0, 2.0, 3.0).slice(4);
        assert_eq!(c.ds, 0.25);
        assert_eq!((c.kx, c.ky, c.kt), (1.0, 2.0, 3.0));
    }
}
