//! Element descriptions and their assembly into [`LatticeElement`]s.
//!
//! An [`ElementSpec`] is the untyped form a caller supplies: a kind name
//! plus named numeric parameters. [`ElementSpec::build`] validates it and
//! produces the typed element. Text form, one element per line:
//!
//! ```text
//! quad ds=1.2258333333 k=0.5884 nslice=25
//! ```

use indexmap::IndexMap;

use crate::constf::ConstF;
use crate::drift::Drift;
use crate::element::LatticeElement;
use crate::error::LatticeError;
use crate::multipole::Multipole;
use crate::nonlinear_lens::NonlinearLens;
use crate::quad::Quad;
use crate::sbend::Sbend;

/// Kind names accepted by [`ElementSpec::build`].
pub const KNOWN_KINDS: [&str; 6] = [
    "drift",
    "quad",
    "sbend",
    "constf",
    "multipole",
    "nonlinear_lens",
];

/// Untyped element description.
#[derive(Clone, Debug, PartialEq)]
pub struct ElementSpec {
    kind: String,
    params: IndexMap<String, f64>,
}

impl ElementSpec {
    /// A spec of the given kind with no parameters.
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            params: IndexMap::new(),
        }
    }

    /// Set a parameter, replacing any previous value.
    pub fn with(mut self, name: impl Into<String>, value: f64) -> Self {
        self.params.insert(name.into(), value);
        self
    }

    /// The kind name as given.
    pub fn kind(&self) -> &str {
        &self.kind
    }

    /// A parameter value.
    pub fn get(&self, name: &str) -> Option<f64> {
        self.params.get(name).copied()
    }

    /// Parse the one-line text form `kind key=value ...`.
    ///
    /// Returns a description of the problem on failure; callers that know
    /// the line number wrap it in [`LatticeError::Parse`].
    pub fn parse(line: &str) -> Result<Self, String> {
        let mut tokens = line.split_whitespace();
        let kind = tokens.next().ok_or_else(|| "empty element line".to_string())?;
        let mut spec = Self::new(kind);
        for token in tokens {
            let (key, value) = token
                .split_once('=')
                .ok_or_else(|| format!("expected key=value, got '{token}'"))?;
            if key.is_empty() {
                return Err(format!("empty parameter name in '{token}'"));
            }
            let value: f64 = value
                .parse()
                .map_err(|_| format!("parameter '{key}' has non-numeric value '{value}'"))?;
            if spec.params.contains_key(key) {
                return Err(format!("parameter '{key}' given twice"));
            }
            spec.params.insert(key.to_string(), value);
        }
        Ok(spec)
    }

    /// Validate the parameters and build the typed element.
    pub fn build(&self) -> Result<LatticeElement, LatticeError> {
        let kind = self.kind.to_ascii_lowercase();
        let mut p = Params::new(self, &kind);
        let element = match kind.as_str() {
            "drift" => LatticeElement::Drift(Drift {
                ds: p.length("ds")?,
                nslice: p.nslice()?,
            }),
            "quad" => LatticeElement::Quad(Quad {
                ds: p.length("ds")?,
                k: p.finite("k")?,
                nslice: p.nslice()?,
            }),
            "sbend" => {
                let ds = p.length("ds")?;
                let rc = p.finite("rc")?;
                if rc == 0.0 {
                    return Err(p.invalid("rc", rc, "must be non-zero"));
                }
                LatticeElement::Sbend(Sbend {
                    ds,
                    rc,
                    nslice: p.nslice()?,
                })
            }
            "constf" => LatticeElement::ConstF(ConstF {
                ds: p.length("ds")?,
                kx: p.finite("kx")?,
                ky: p.finite("ky")?,
                kt: p.finite("kt")?,
                nslice: p.nslice()?,
            }),
            "multipole" => {
                let order = p.finite("multipole")?;
                if order < 1.0 || order.fract() != 0.0 || order > 64.0 {
                    return Err(p.invalid("multipole", order, "must be an integer in 1..=64"));
                }
                LatticeElement::Multipole(Multipole {
                    order: order as u32,
                    k_normal: p.finite("k_normal")?,
                    k_skew: p.optional_finite("k_skew", 0.0)?,
                })
            }
            "nonlinear_lens" => {
                let knll = p.finite("knll")?;
                let cnll = p.finite("cnll")?;
                if cnll <= 0.0 {
                    return Err(p.invalid("cnll", cnll, "must be positive"));
                }
                LatticeElement::NonlinearLens(NonlinearLens { knll, cnll })
            }
            _ => return Err(LatticeError::UnknownKind { kind: self.kind.clone() }),
        };
        p.finish()?;
        Ok(element)
    }
}

/// Parameter access that records which names the kind consumed.
struct Params<'a> {
    spec: &'a ElementSpec,
    kind: &'a str,
    consumed: Vec<&'static str>,
}

impl<'a> Params<'a> {
    fn new(spec: &'a ElementSpec, kind: &'a str) -> Self {
        Self {
            spec,
            kind,
            consumed: Vec::new(),
        }
    }

    fn invalid(&self, parameter: &'static str, value: f64, reason: &'static str) -> LatticeError {
        LatticeError::InvalidParameter {
            kind: self.kind.to_string(),
            parameter,
            value,
            reason,
        }
    }

    fn lookup(&mut self, name: &'static str) -> Option<f64> {
        self.consumed.push(name);
        self.spec.get(name)
    }

    fn finite(&mut self, name: &'static str) -> Result<f64, LatticeError> {
        let value = self
            .lookup(name)
            .ok_or_else(|| LatticeError::MissingParameter {
                kind: self.kind.to_string(),
                parameter: name,
            })?;
        if !value.is_finite() {
            return Err(self.invalid(name, value, "must be finite"));
        }
        Ok(value)
    }

    fn optional_finite(&mut self, name: &'static str, default: f64) -> Result<f64, LatticeError> {
        match self.lookup(name) {
            None => Ok(default),
            Some(v) if v.is_finite() => Ok(v),
            Some(v) => Err(self.invalid(name, v, "must be finite")),
        }
    }

    fn length(&mut self, name: &'static str) -> Result<f64, LatticeError> {
        let value = self.finite(name)?;
        if value < 0.0 {
            return Err(self.invalid(name, value, "must be non-negative"));
        }
        Ok(value)
    }

    fn nslice(&mut self) -> Result<u32, LatticeError> {
        let value = self.optional_finite("nslice", 1.0)?;
        if value < 1.0 || value.fract() != 0.0 || value > f64::from(u32::MAX) {
            return Err(self.invalid("nslice", value, "must be a positive integer"));
        }
        Ok(value as u32)
    }

    fn finish(self) -> Result<(), LatticeError> {
        match self
            .spec
            .params
            .keys()
            .find(|k| !self.consumed.iter().any(|c| *c == k.as_str()))
        {
            Some(unknown) => Err(LatticeError::UnknownParameter {
                kind: self.kind.to_string(),
                parameter: unknown.clone(),
            }),
            None => Ok(()),
        }
    }
}
