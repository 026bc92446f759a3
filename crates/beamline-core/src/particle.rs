//! Macro-particle records, the reference particle, and spatial extents.

/// Elementary charge in Coulomb.
pub const ELEMENTARY_CHARGE: f64 = 1.602_176_634e-19;

/// Electron rest energy in MeV.
pub const ELECTRON_MASS_MEV: f64 = 0.510_998_950;

/// Proton rest energy in MeV.
pub const PROTON_MASS_MEV: f64 = 938.272_088_16;

/// A single macro-particle.
///
/// The three position and three momentum slots are interpreted by the
/// ensemble's [`Frame`](crate::Frame):
///
/// | slot | `TransverseTime` | `Spatial` |
/// |------|------------------|-----------|
/// | `x`, `y` | transverse position (m) | transverse position (m) |
/// | `z` | time lag `c·Δt` (m) | longitudinal offset (m) |
/// | `px`, `py` | momenta / p_ref | momenta / p_ref |
/// | `pz` | energy deviation `pt` | longitudinal momentum deviation |
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Particle {
    /// Stable identifier, assigned at creation.
    pub id: u64,
    /// Horizontal position.
    pub x: f64,
    /// Vertical position.
    pub y: f64,
    /// Longitudinal slot (`t` or `z`, see the type docs).
    pub z: f64,
    /// Horizontal momentum.
    pub px: f64,
    /// Vertical momentum.
    pub py: f64,
    /// Longitudinal momentum slot (`pt` or `pz`).
    pub pz: f64,
    /// Number of physical particles represented by this macro-particle.
    pub weight: f64,
}

impl Particle {
    /// A particle at rest on the reference orbit with unit weight.
    pub fn at_origin(id: u64) -> Self {
        Self {
            id,
            x: 0.0,
            y: 0.0,
            z: 0.0,
            px: 0.0,
            py: 0.0,
            pz: 0.0,
            weight: 1.0,
        }
    }

    /// Position triple `[x, y, z]`.
    pub fn position(&self) -> [f64; 3] {
        [self.x, self.y, self.z]
    }

    /// Whether every coordinate and the weight are finite.
    pub fn is_finite(&self) -> bool {
        [self.x, self.y, self.z, self.px, self.py, self.pz, self.weight]
            .iter()
            .all(|v| v.is_finite())
    }
}

/// The reference particle following the design trajectory.
///
/// Lab-frame quantities: `s` is the integrated path length, `(x, y, z)`
/// the position, `t` the time of flight times `c`, and `(px, py, pz, pt)`
/// the momentum normalized by `m·c` with `pt = -γ`.
#[derive(Clone, Debug, PartialEq)]
pub struct RefParticle {
    /// Path length along the beamline (m).
    pub s: f64,
    /// Lab-frame horizontal position (m).
    pub x: f64,
    /// Lab-frame vertical position (m).
    pub y: f64,
    /// Lab-frame longitudinal position (m).
    pub z: f64,
    /// Time of flight times c (m).
    pub t: f64,
    /// Horizontal momentum / (m c).
    pub px: f64,
    /// Vertical momentum / (m c).
    pub py: f64,
    /// Longitudinal momentum / (m c).
    pub pz: f64,
    /// Negative Lorentz factor.
    pub pt: f64,
    /// Rest energy in MeV.
    pub mass_mev: f64,
    /// Charge in units of the elementary charge.
    pub charge_qe: f64,
}

impl Default for RefParticle {
    /// A 1 GeV proton at the origin.
    fn default() -> Self {
        Self {
            s: 0.0,
            x: 0.0,
            y: 0.0,
            z: 0.0,
            t: 0.0,
            px: 0.0,
            py: 0.0,
            pz: 0.0,
            pt: -1.0,
            mass_mev: PROTON_MASS_MEV,
            charge_qe: 1.0,
        }
        .set_kin_energy_mev(1000.0)
    }
}

impl RefParticle {
    /// Set the charge in units of the elementary charge.
    pub fn set_charge_qe(mut self, charge_qe: f64) -> Self {
        self.charge_qe = charge_qe;
        self
    }

    /// Set the rest energy, keeping the kinetic energy unchanged.
    pub fn set_mass_mev(mut self, mass_mev: f64) -> Self {
        let kin = self.kin_energy_mev();
        self.mass_mev = mass_mev;
        self.set_kin_energy_mev(kin)
    }

    /// Set the kinetic energy. The momentum points along +z.
    pub fn set_kin_energy_mev(mut self, kin_energy_mev: f64) -> Self {
        let gamma = 1.0 + kin_energy_mev / self.mass_mev;
        self.pt = -gamma;
        self.px = 0.0;
        self.py = 0.0;
        self.pz = (gamma * gamma - 1.0).max(0.0).sqrt();
        self
    }

    /// Lorentz factor γ.
    pub fn gamma(&self) -> f64 {
        -self.pt
    }

    /// Normalized momentum βγ.
    pub fn beta_gamma(&self) -> f64 {
        (self.pt * self.pt - 1.0).max(0.0).sqrt()
    }

    /// Normalized velocity β.
    pub fn beta(&self) -> f64 {
        self.beta_gamma() / self.gamma()
    }

    /// Kinetic energy in MeV.
    pub fn kin_energy_mev(&self) -> f64 {
        self.mass_mev * (self.gamma() - 1.0)
    }

    /// Charge in Coulomb.
    pub fn charge_c(&self) -> f64 {
        self.charge_qe * ELEMENTARY_CHARGE
    }

    /// Whether the reference particle is moving and fully finite.
    pub fn is_valid(&self) -> bool {
        let values = [
            self.s,
            self.x,
            self.y,
            self.z,
            self.t,
            self.px,
            self.py,
            self.pz,
            self.pt,
            self.mass_mev,
            self.charge_qe,
        ];
        values.iter().all(|v| v.is_finite()) && self.mass_mev > 0.0 && self.beta_gamma() > 0.0
    }
}

/// Axis-aligned bounding box of a set of positions.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Extent {
    /// Lower corner.
    pub lo: [f64; 3],
    /// Upper corner.
    pub hi: [f64; 3],
}

impl Extent {
    /// Degenerate extent containing a single point.
    pub fn point(p: [f64; 3]) -> Self {
        Self { lo: p, hi: p }
    }

    /// Grow the extent to include `p`.
    pub fn include(&mut self, p: [f64; 3]) {
        for d in 0..3 {
            self.lo[d] = self.lo[d].min(p[d]);
            self.hi[d] = self.hi[d].max(p[d]);
        }
    }

    /// Smallest extent containing both.
    pub fn union(mut self, other: &Extent) -> Self {
        self.include(other.lo);
        self.include(other.hi);
        self
    }

    /// Bounding box of an iterator of points, `None` if it is empty.
    pub fn from_points<I: IntoIterator<Item = [f64; 3]>>(points: I) -> Option<Self> {
        let mut iter = points.into_iter();
        let mut extent = Self::point(iter.next()?);
        for p in iter {
            extent.include(p);
        }
        Some(extent)
    }

    /// Width along axis `d`.
    pub fn width(&self, d: usize) -> f64 {
        self.hi[d] - self.lo[d]
    }

    /// Whether both corners are finite.
    pub fn is_finite(&self) -> bool {
        self.lo.iter().chain(self.hi.iter()).all(|v| v.is_finite())
    }

    /// Whether `p` lies inside the closed box.
    pub fn contains(&self, p: [f64; 3]) -> bool {
        (0..3).all(|d| p[d] >= self.lo[d] && p[d] <= self.hi[d])
    }
}
