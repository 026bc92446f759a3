//! Ordered beamline sequences.

use crate::element::LatticeElement;
use crate::error::LatticeError;
use crate::spec::ElementSpec;

/// An ordered sequence of beamline elements.
///
/// Insertion order is traversal order. The driver takes ownership of the
/// lattice and never reorders or mutates it during a run.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Lattice {
    elements: Vec<LatticeElement>,
}

impl Lattice {
    /// An empty lattice.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one element.
    pub fn push(&mut self, element: impl Into<LatticeElement>) {
        self.elements.push(element.into());
    }

    /// Builder-style append.
    pub fn with(mut self, element: impl Into<LatticeElement>) -> Self {
        self.push(element);
        self
    }

    /// Assemble from specs, failing on the first invalid one.
    pub fn from_specs<'a, I>(specs: I) -> Result<Self, LatticeError>
    where
        I: IntoIterator<Item = &'a ElementSpec>,
    {
        let elements = specs
            .into_iter()
            .enumerate()
            .map(|(index, spec)| {
                spec.build().map_err(|e| LatticeError::AtIndex {
                    index,
                    source: Box::new(e),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { elements })
    }

    /// Parse a multi-line lattice description.
    ///
    /// One element per line; blank lines and text after `#` are ignored.
    pub fn parse(text: &str) -> Result<Self, LatticeError> {
        let mut elements = Vec::new();
        for (i, raw) in text.lines().enumerate() {
            let line = raw.split('#').next().unwrap_or("").trim();
            if line.is_empty() {
                continue;
            }
            let element = ElementSpec::parse(line)
                .and_then(|spec| spec.build().map_err(|e| e.to_string()))
                .map_err(|reason| LatticeError::Parse {
                    line: i + 1,
                    reason,
                })?;
            elements.push(element);
        }
        Ok(Self { elements })
    }

    /// Elements in traversal order.
    pub fn iter(&self) -> std::slice::Iter<'_, LatticeElement> {
        self.elements.iter()
    }

    /// Number of elements.
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    /// Whether the lattice has no elements.
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Sum of element lengths.
    pub fn total_length(&self) -> f64 {
        self.elements.iter().map(LatticeElement::length).sum()
    }
}

impl<'a> IntoIterator for &'a Lattice {
    type Item = &'a LatticeElement;
    type IntoIter = std::slice::Iter<'a, LatticeElement>;

    fn into_iter(self) -> Self::IntoIter {
        self.elements.iter()
    }
}

impl FromIterator<LatticeElement> for Lattice {
    fn from_iter<I: IntoIterator<Item = LatticeElement>>(iter: I) -> Self {
        Self {
            elements: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Drift, NonlinearLens, Quad};

    #[test]
    fn order_is_preserved() {
        let lattice = Lattice::new()
            .with(Drift::new(1.0))
            .with(Quad::new(0.5, 1.0))
            .with(NonlinearLens::new(1e-4, 0.01));
        let kinds: Vec<&str> = lattice.iter().map(|e| e.kind()).collect();
        assert_eq!(kinds, ["drift", "quad", "nonlinear_lens"]);
        assert_eq!(lattice.total_length(), 1.5);
    }

    #[test]
    fn from_specs_reports_index() {
        let specs = [
            ElementSpec::new("drift").with("ds", 1.0),
            ElementSpec::new("undulator"),
        ];
        match Lattice::from_specs(&specs) {
            Err(LatticeError::AtIndex { index: 1, source }) => {
                assert!(matches!(*source, LatticeError::UnknownKind { .. }));
            }
            other => panic!("expected AtIndex(1), got {other:?}"),
        }
    }

    #[test]
    fn parse_skips_comments_and_blanks() {
        let text = "\
# FODO cell
drift ds=1.0 nslice=25

quad ds=1.2 k=0.58   # focusing
drift ds=1.0
";
        let lattice = Lattice::parse(text).unwrap();
        assert_eq!(lattice.len(), 3);
        assert_eq!(lattice.iter().next().map(|e| e.nslice()), Some(25));
    }

    #[test]
    fn parse_reports_line_number() {
        match Lattice::parse("drift ds=1\n\nbogus ds=2\n") {
            Err(LatticeError::Parse { line: 3, reason }) => assert!(reason.contains("bogus")),
            other => panic!("expected Parse at line 3, got {other:?}"),
        }
    }
}
