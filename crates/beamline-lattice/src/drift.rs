//! Field-free drift.

use beamline_core::{Particle, RefParticle};

use crate::transfer::{advance_straight, apply_longitudinal, Block2};

/// A field-free drift of length `ds`.
#[derive(Clone, Debug, PartialEq)]
pub struct Drift {
    /// Length (m).
    pub ds: f64,
    /// Slices requested at assembly.
    pub nslice: u32,
}

impl Drift {
    /// A drift of length `ds` with one slice.
    pub fn new(ds: f64) -> Self {
        Self { ds, nslice: 1 }
    }

    /// The map of `1/n` of this drift.
    pub fn slice(&self, n: usize) -> Self {
        Self {
            ds: self.ds / n as f64,
            nslice: self.nslice,
        }
    }

    /// Push one particle.
    #[inline]
    pub fn push_particle(&self, p: &mut Particle, refpart: &RefParticle) {
        let bg = refpart.beta_gamma();
        let block = Block2::drift(self.ds);
        (p.x, p.px) = block.apply(p.x, p.px);
        (p.y, p.py) = block.apply(p.y, p.py);
        (p.z, p.pz) = apply_longitudinal(&block, p.z, p.pz, bg * bg);
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
    fn drift_moves_by_angle_times_length() {
        let r = RefParticle::default();
        let mut p = Particle::at_origin(0);
        p.px = 1e-3;
        p.py = -2e-3;
        Drift::new(2.0).push_particle(&mut p, &r);
        assert!((p.x - 2e-3).abs() < 1e-15);
        assert!((p.y + 4e-3).abs() < 1e-15);
        assert_eq!(p.px, 1e-3);
    }

    #[test]
    fn energy_deviation_gives_time_lag() {
        let r = RefParticle::default();
        let bg = r.beta_gamma();
        let mut p = Particle::at_origin(0);
        p.pz = 0.01;
        Drift::new(1.5).push_particle(&mut p, &r);
        assert!((p.z - 1.5 / (bg * bg) * 0.01).abs() < 1e-15);
        assert_eq!(p.pz, 0.01);
    }

    #[test]
    fn slices_compose_to_whole() {
        let r = RefParticle::default();
        let mut whole = Particle::at_origin(0);
        whole.px = 0.1;
        whole.pz = 0.2;
        let mut sliced = whole;
        let d = Drift::new(3.0);
        d.push_particle(&mut whole, &r);
        let s = d.slice(4);
        for _ in 0..4 {
            s.push_particle(&mut sliced, &r);
        }
        assert!((whole.x - sliced.x).abs() < 1e-12);
        assert!((whole.z - sliced.z).abs() < 1e-12);
    }
}
