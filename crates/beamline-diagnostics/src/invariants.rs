//! Danilov–Nagaitsev invariants of the integrable nonlinear lens.
//!
//! Coordinates are first normalised by the lattice functions at the
//! observation point and the lens scale `cn`:
//!
//! ```text
//! xn  = x / (cn·√β)
//! pxn = px·√β / cn + α·x / (cn·√β)
//! ```
//!
//! and similarly for `y`. With elliptic coordinates `u ≥ 1`, `|v| ≤ 1`
//! the two invariants are
//!
//! ```text
//! H = (xn² + yn² + pxn² + pyn²)/2 + tn·(f(u) + g(v)) / (u² − v²)
//! I = (xn·pyn − yn·pxn)² + pxn² + xn² + 2·tn·(v²·f(u) + u²·g(v)) / (u² − v²)
//! ```
//!
//! with `f(u) = u·√(u² − 1)·acosh(u)` and `g(v) = v·√(1 − v²)·(acos(v) − π/2)`.

use std::f64::consts::FRAC_PI_2;

use beamline_core::DiagnosticError;

/// Lattice and lens parameters for the invariant calculation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LensInvariantParams {
    /// Twiss α at the observation point. Default: 0.
    pub alpha: f64,
    /// Twiss β (m) at the observation point. Default: 1.
    pub beta: f64,
    /// Dimensionless lens strength. Default: 0.4.
    pub tn: f64,
    /// Lens scale parameter (m). Default: 0.01.
    pub cn: f64,
}

impl Default for LensInvariantParams {
    fn default() -> Self {
        Self {
            alpha: 0.0,
            beta: 1.0,
            tn: 0.4,
            cn: 0.01,
        }
    }
}

impl LensInvariantParams {
    /// Check that every parameter is finite and `beta`, `cn` are positive.
    ///
    /// # Errors
    ///
    /// Returns [`DiagnosticError::InvalidLensParameter`] for the first
    /// parameter out of range.
    pub fn validate(&self) -> Result<(), DiagnosticError> {
        let named = [
            ("alpha", self.alpha),
            ("beta", self.beta),
            ("tn", self.tn),
            ("cn", self.cn),
        ];
        for (name, value) in named {
            let positive = matches!(name, "beta" | "cn");
            if !value.is_finite() || (positive && value <= 0.0) {
                return Err(DiagnosticError::InvalidLensParameter { name, value });
            }
        }
        Ok(())
    }

    /// `(H, I)` for one particle.
    pub fn invariants(&self, x: f64, y: f64, px: f64, py: f64) -> (f64, f64) {
        let sqrt_beta = self.beta.sqrt();
        let scale = self.cn * sqrt_beta;
        let xn = x / scale;
        let yn = y / scale;
        let pxn = px * sqrt_beta / self.cn + self.alpha * xn;
        let pyn = py * sqrt_beta / self.cn + self.alpha * yn;

        let r_plus = ((xn + 1.0).powi(2) + yn * yn).sqrt();
        let r_minus = ((xn - 1.0).powi(2) + yn * yn).sqrt();
        // Clamp against rounding just outside the elliptic coordinate range.
        let u = (0.5 * (r_plus + r_minus)).max(1.0);
        let v = (0.5 * (r_plus - r_minus)).clamp(-1.0, 1.0);

        let f2u = u * (u * u - 1.0).sqrt() * u.acosh();
        let g2v = v * (1.0 - v * v).sqrt() * (v.acos() - FRAC_PI_2);
        let denom = u * u - v * v;
        let (kick_h, kick_i) = if denom > 0.0 {
            (
                self.tn * (f2u + g2v) / denom,
                2.0 * self.tn * (v * v * f2u + u * u * g2v) / denom,
            )
        } else {
            // u = v = 1 only at the singular points (±1, 0); the potential
            // terms vanish there.
            (0.0, 0.0)
        };

        let h = 0.5 * (xn * xn + yn * yn + pxn * pxn + pyn * pyn) + kick_h;
        let ang = xn * pyn - yn * pxn;
        let i = ang * ang + pxn * pxn + xn * xn + kick_i;
        (h, i)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn origin_has_zero_invariants() {
        let (h, i) = LensInvariantParams::default().invariants(0.0, 0.0, 0.0, 0.0);
        assert_eq!(h, 0.0);
        assert_eq!(i, 0.0);
    }

    #[test]
    fn zero_strength_reduces_to_quadratic_forms() {
        let params = LensInvariantParams {
            tn: 0.0,
            ..LensInvariantParams::default()
        };
        let (x, y, px, py) = (1e-3, -2e-3, 3e-3, 4e-3);
        let (h, i) = params.invariants(x, y, px, py);
        let (xn, yn, pxn, pyn) = (x / 0.01, y / 0.01, px / 0.01, py / 0.01);
        let want_h = 0.5 * (xn * xn + yn * yn + pxn * pxn + pyn * pyn);
        let want_i = (xn * pyn - yn * pxn).powi(2) + pxn * pxn + xn * xn;
        assert!((h - want_h).abs() < 1e-9);
        assert!((i - want_i).abs() < 1e-9);
    }

    #[test]
    fn invariants_are_finite_on_singular_points() {
        let params = LensInvariantParams::default();
        for x in [0.01, -0.01] {
            let (h, i) = params.invariants(x, 0.0, 0.0, 0.0);
            assert!(h.is_finite() && i.is_finite());
        }
    }

    #[test]
    fn h_is_reflection_symmetric() {
        let params = LensInvariantParams::default();
        let (h1, i1) = params.invariants(3e-3, 2e-3, 1e-3, -1e-3);
        let (h2, i2) = params.invariants(-3e-3, -2e-3, -1e-3, 1e-3);
        assert!((h1 - h2).abs() < 1e-12);
        assert!((i1 - i2).abs() < 1e-12);
    }

    #[test]
    fn validate_rejects_bad_params() {
        assert!(LensInvariantParams::default().validate().is_ok());
        let bad = LensInvariantParams {
            cn: 0.0,
            ..LensInvariantParams::default()
        };
        match bad.validate() {
            Err(DiagnosticError::InvalidLensParameter { name: "cn", .. }) => {}
            other => panic!("expected InvalidLensParameter for cn, got {other:?}"),
        }
        let bad = LensInvariantParams {
            alpha: f64::NAN,
            ..LensInvariantParams::default()
        };
        match bad.validate() {
            Err(DiagnosticError::InvalidLensParameter { name: "alpha", .. }) => {}
            other => panic!("expected InvalidLensParameter for alpha, got {other:?}"),
        }
        let bad = LensInvariantParams {
            beta: -1.0,
            ..LensInvariantParams::default()
        };
        assert!(bad.validate().is_err());
    }
}
