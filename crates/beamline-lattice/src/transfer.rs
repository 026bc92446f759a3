//! Shared linear-map building blocks.

use beamline_core::RefParticle;

/// A 2×2 transfer block acting on one `(u, pu)` plane.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Block2 {
    /// ∂u'/∂u
    pub m11: f64,
    /// ∂u'/∂pu
    pub m12: f64,
    /// ∂pu'/∂u
    pub m21: f64,
    /// ∂pu'/∂pu
    pub m22: f64,
}

impl Block2 {
    /// Map of a plane with focusing strength `k` (1/m²) over length `ds`.
    ///
    /// `k > 0` focuses (cos/sin), `k < 0` defocuses (cosh/sinh),
    /// `k == 0` is a drift.
    pub fn harmonic(k: f64, ds: f64) -> Self {
        if k > 0.0 {
            let w = k.sqrt();
            let (s, c) = (w * ds).sin_cos();
            Self {
                m11: c,
                m12: s / w,
                m21: -w * s,
                m22: c,
            }
        } else if k < 0.0 {
            let w = (-k).sqrt();
            let (s, c) = ((w * ds).sinh(), (w * ds).cosh());
            Self {
                m11: c,
                m12: s / w,
                m21: w * s,
                m22: c,
            }
        } else {
            Self::drift(ds)
        }
    }

    /// Field-free drift over `ds`.
    pub fn drift(ds: f64) -> Self {
        Self {
            m11: 1.0,
            m12: ds,
            m21: 0.0,
            m22: 1.0,
        }
    }

    /// Apply to `(u, pu)`.
    #[inline]
    pub fn apply(&self, u: f64, pu: f64) -> (f64, f64) {
        (
            self.m11 * u + self.m12 * pu,
            self.m21 * u + self.m22 * pu,
        )
    }

    /// Determinant; 1 for every symplectic block.
    pub fn det(&self) -> f64 {
        self.m11 * self.m22 - self.m12 * self.m21
    }
}

/// Apply a longitudinal block in the `(t, pt/(βγ)²)` plane.
///
/// Written this way a zero-strength block reduces to the fixed-s drift
/// `t += ds/(βγ)² · pt`.
#[inline]
pub fn apply_longitudinal(block: &Block2, t: f64, pt: f64, bg2: f64) -> (f64, f64) {
    let (t1, q1) = block.apply(t, pt / bg2);
    (t1, q1 * bg2)
}

/// Advance the reference particle a distance `ds` along its momentum.
pub fn advance_straight(refpart: &mut RefParticle, ds: f64) {
    let bg = refpart.beta_gamma();
    refpart.x += ds * refpart.px / bg;
    refpart.y += ds * refpart.py / bg;
    refpart.z += ds * refpart.pz / bg;
    refpart.t += ds * refpart.gamma() / bg;
    refpart.s += ds;
}
