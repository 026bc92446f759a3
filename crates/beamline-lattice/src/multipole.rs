//! Thin multipole kick.

use beamline_core::{Particle, RefParticle};
use num_complex::Complex64;

/// A zero-length multipole of order `m` (1 dipole, 2 quadrupole, ...).
///
/// The kick is `Δpx − iΔpy = −(kn + i·ks)(x + iy)^(m−1) / (m−1)!`.
#[derive(Clone, Debug, PartialEq)]
pub struct Multipole {
    /// Multipole order, at least 1.
    pub order: u32,
    /// Integrated normal strength.
    pub k_normal: f64,
    /// Integrated skew strength.
    pub k_skew: f64,
}

impl Multipole {
    /// A thin multipole.
    pub fn new(order: u32, k_normal: f64, k_skew: f64) -> Self {
        Self {
            order,
            k_normal,
            k_skew,
        }
    }

    /// `1/n` of the integrated strength.
    pub fn slice(&self, n: usize) -> Self {
        Self {
            order: self.order,
            k_normal: self.k_normal / n as f64,
            k_skew: self.k_skew / n as f64,
        }
    }

    fn factorial(&self) -> f64 {
        (1..self.order).map(f64::from).product()
    }

    /// Kick one particle.
    #[inline]
    pub fn push_particle(&self, p: &mut Particle, _refpart: &RefParticle) {
        let zeta = Complex64::new(p.x, p.y);
        let alpha = Complex64::new(self.k_normal, self.k_skew);
        let power = i32::try_from(self.order.saturating_sub(1)).unwrap_or(i32::MAX);
        let df = alpha * zeta.powi(power) / self.factorial();
        p.px -= df.re;
        p.py += df.im;
    }

    /// Thin elements leave the reference particle in place.
    pub fn push_reference(&self, _refpart: &mut RefParticle) {}
}
