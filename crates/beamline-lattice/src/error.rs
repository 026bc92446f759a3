//! Lattice assembly errors.

use std::error::Error;
use std::fmt;

/// Errors detected while assembling a lattice from element specs.
///
/// All of these are configuration errors: they surface before any
/// stepping begins.
#[derive(Clone, Debug, PartialEq)]
pub enum LatticeError {
    /// The element kind is not one of the supported kinds.
    UnknownKind {
        /// The rejected kind.
        kind: String,
    },
    /// A required parameter is missing.
    MissingParameter {
        /// Element kind.
        kind: String,
        /// Parameter name.
        parameter: &'static str,
    },
    /// A parameter is not recognised by the element kind.
    UnknownParameter {
        /// Element kind.
        kind: String,
        /// Parameter name.
        parameter: String,
    },
    /// A parameter value is out of range.
    InvalidParameter {
        /// Element kind.
        kind: String,
        /// Parameter name.
        parameter: &'static str,
        /// The rejected value.
        value: f64,
        /// Why it was rejected.
        reason: &'static str,
    },
    /// A line of lattice text could not be parsed.
    Parse {
        /// 1-based line number.
        line: usize,
        /// Description of the problem.
        reason: String,
    },
    /// An element at a position in the sequence failed to assemble.
    AtIndex {
        /// Position in the sequence.
        index: usize,
        /// The underlying error.
        source: Box<LatticeError>,
    },
}

impl fmt::Display for LatticeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownKind { kind } => write!(f, "unknown element kind '{kind}'"),
            Self::MissingParameter { kind, parameter } => {
                write!(f, "{kind}: missing parameter '{parameter}'")
            }
            Self::UnknownParameter { kind, parameter } => {
                write!(f, "{kind}: unknown parameter '{parameter}'")
            }
            Self::InvalidParameter {
                kind,
                parameter,
                value,
                reason,
            } => write!(f, "{kind}: {parameter}={value} {reason}"),
            Self::Parse { line, reason } => write!(f, "line {line}: {reason}"),
            Self::AtIndex { index, source } => write!(f, "element {index}: {source}"),
        }
    }
}

impl Error for LatticeError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::AtIndex { source, .. } => Some(source.as_ref()),
            _ => None,
        }
    }
}
