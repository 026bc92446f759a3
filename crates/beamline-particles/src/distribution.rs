//! Initial phase-space distributions.
//!
//! Samples are drawn in transverse-time coordinates
//! `(x, y, t, px, py, pt)`. Each plane is generated uncorrelated with unit
//! second moment and then mapped through the usual two-parameter
//! correlation:
//!
//! ```text
//! x  = σx · u / √(1 − μ²)
//! px = σpx · (−μ · u / √(1 − μ²) + pu)
//! ```

use std::error::Error;
use std::f64::consts::TAU;
use std::fmt;

use rand::Rng;

/// Shape of the unit distribution before scaling.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DistributionKind {
    /// Uniform in the 6D unit ball, scaled to unit second moments.
    Waterbag,
    /// Independent normals in all six coordinates.
    Gaussian,
}

/// RMS sizes and correlations of the three phase-space planes.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PhaseSpaceParams {
    /// RMS horizontal size (m).
    pub sigma_x: f64,
    /// RMS vertical size (m).
    pub sigma_y: f64,
    /// RMS time lag (m).
    pub sigma_t: f64,
    /// RMS horizontal momentum.
    pub sigma_px: f64,
    /// RMS vertical momentum.
    pub sigma_py: f64,
    /// RMS energy deviation.
    pub sigma_pt: f64,
    /// x–px correlation, in (−1, 1).
    pub muxpx: f64,
    /// y–py correlation, in (−1, 1).
    pub muypy: f64,
    /// t–pt correlation, in (−1, 1).
    pub mutpt: f64,
}

impl Default for PhaseSpaceParams {
    fn default() -> Self {
        Self {
            sigma_x: 1e-3,
            sigma_y: 1e-3,
            sigma_t: 1e-3,
            sigma_px: 1e-3,
            sigma_py: 1e-3,
            sigma_pt: 1e-3,
            muxpx: 0.0,
            muypy: 0.0,
            mutpt: 0.0,
        }
    }
}

/// Errors from building or sampling a distribution.
#[derive(Clone, Debug, PartialEq)]
pub enum DistributionError {
    /// A size or correlation is out of range.
    InvalidParameter {
        /// Parameter name.
        name: &'static str,
        /// The rejected value.
        value: f64,
    },
    /// The bunch charge or the reference charge cannot produce finite weights.
    InvalidCharge {
        /// Bunch charge (C).
        bunch_charge_c: f64,
        /// Reference particle charge (C).
        particle_charge_c: f64,
    },
    /// Particles can only be added in the transverse-time frame.
    WrongFrame,
}

impl fmt::Display for DistributionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidParameter { name, value } => {
                write!(f, "distribution parameter {name}={value} out of range")
            }
            Self::InvalidCharge {
                bunch_charge_c,
                particle_charge_c,
            } => write!(
                f,
                "cannot weight a {bunch_charge_c} C bunch of {particle_charge_c} C particles"
            ),
            Self::WrongFrame => write!(f, "particles must be added in the transverse-time frame"),
        }
    }
}

impl Error for DistributionError {}

/// A sampleable initial distribution.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Distribution {
    kind: DistributionKind,
    params: PhaseSpaceParams,
}

impl Distribution {
    /// Waterbag with default parameters.
    pub fn waterbag() -> Self {
        Self {
            kind: DistributionKind::Waterbag,
            params: PhaseSpaceParams::default(),
        }
    }

    /// Gaussian with default parameters.
    pub fn gaussian() -> Self {
        Self {
            kind: DistributionKind::Gaussian,
            params: PhaseSpaceParams::default(),
        }
    }

    /// Replace all parameters.
    pub fn with_params(mut self, params: PhaseSpaceParams) -> Self {
        self.params = params;
        self
    }

    /// Set the RMS sizes `(σx, σy, σt)`.
    pub fn sigma(mut self, x: f64, y: f64, t: f64) -> Self {
        self.params.sigma_x = x;
        self.params.sigma_y = y;
        self.params.sigma_t = t;
        self
    }

    /// Set the RMS momenta `(σpx, σpy, σpt)`.
    pub fn sigma_momentum(mut self, px: f64, py: f64, pt: f64) -> Self {
        self.params.sigma_px = px;
        self.params.sigma_py = py;
        self.params.sigma_pt = pt;
        self
    }

    /// Set the plane correlations `(μxpx, μypy, μtpt)`.
    pub fn correlation(mut self, muxpx: f64, muypy: f64, mutpt: f64) -> Self {
        self.params.muxpx = muxpx;
        self.params.muypy = muypy;
        self.params.mutpt = mutpt;
        self
    }

    /// Distribution shape.
    pub fn kind(&self) -> DistributionKind {
        self.kind
    }

    /// Current parameters.
    pub fn params(&self) -> &PhaseSpaceParams {
        &self.params
    }

    /// Check that sizes are finite and non-negative and correlations lie
    /// strictly inside (−1, 1).
    pub fn validate(&self) -> Result<(), DistributionError> {
        let p = &self.params;
        let sigmas = [
            ("sigma_x", p.sigma_x),
            ("sigma_y", p.sigma_y),
            ("sigma_t", p.sigma_t),
            ("sigma_px", p.sigma_px),
            ("sigma_py", p.sigma_py),
            ("sigma_pt", p.sigma_pt),
        ];
        for (name, value) in sigmas {
            if !value.is_finite() || value < 0.0 {
                return Err(DistributionError::InvalidParameter { name, value });
            }
        }
        for (name, value) in [("muxpx", p.muxpx), ("muypy", p.muypy), ("mutpt", p.mutpt)] {
            if !(value.abs() < 1.0) {
                return Err(DistributionError::InvalidParameter { name, value });
            }
        }
        Ok(())
    }

    /// Draw one sample `[x, y, t, px, py, pt]`.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> [f64; 6] {
        let (x, px) = normal_pair(rng);
        let (y, py) = normal_pair(rng);
        let (t, pt) = normal_pair(rng);
        let mut u = [x, y, t, px, py, pt];

        if self.kind == DistributionKind::Waterbag {
            let radius = rng.random::<f64>().powf(1.0 / 6.0);
            let norm = u.iter().map(|v| v * v).sum::<f64>().sqrt();
            // A uniform 6-ball of radius 1 has second moment 1/8 per axis.
            let scale = if norm > 0.0 {
                radius / norm * 8f64.sqrt()
            } else {
                0.0
            };
            u.iter_mut().for_each(|v| *v *= scale);
        }

        let p = &self.params;
        let (x, px) = correlate(u[0], u[3], p.sigma_x, p.sigma_px, p.muxpx);
        let (y, py) = correlate(u[1], u[4], p.sigma_y, p.sigma_py, p.muypy);
        let (t, pt) = correlate(u[2], u[5], p.sigma_t, p.sigma_pt, p.mutpt);
        [x, y, t, px, py, pt]
    }
}

/// Two independent standard normals (Box–Muller).
fn normal_pair<R: Rng + ?Sized>(rng: &mut R) -> (f64, f64) {
    // 1 - U keeps the log argument in (0, 1].
    let u1 = 1.0 - rng.random::<f64>();
    let u2 = rng.random::<f64>();
    let r = (-2.0 * u1.ln()).sqrt();
    (r * (TAU * u2).cos(), r * (TAU * u2).sin())
}

fn correlate(u: f64, pu: f64, sigma: f64, sigma_p: f64, mu: f64) -> (f64, f64) {
    let root = (1.0 - mu * mu).sqrt();
    (sigma * u / root, sigma_p * (-mu * u / root + pu))
}
