//! Error types shared across the Beamline workspace.
//!
//! Organized by failure class: frame precondition violations, coordinate
//! transform failures, mesh/layout resource failures, push failures, and
//! diagnostic output failures. Configuration errors live with the
//! configuration they validate (`beamline-lattice`, `beamline-engine`).

use std::error::Error;
use std::fmt;

use crate::frame::Frame;
use crate::id::{BoxId, LayoutGeneration};

/// An operation found the ensemble in the wrong coordinate frame.
///
/// This is a logic error: coordinates are never silently reinterpreted.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FrameError {
    /// Name of the operation that was attempted.
    pub operation: &'static str,
    /// Frame the operation requires.
    pub expected: Frame,
    /// Frame the ensemble was actually in.
    pub found: Frame,
}

impl FrameError {
    /// Check `found` against `expected`.
    pub fn check(operation: &'static str, expected: Frame, found: Frame) -> Result<(), Self> {
        if expected == found {
            Ok(())
        } else {
            Err(Self {
                operation,
                expected,
                found,
            })
        }
    }
}

impl fmt::Display for FrameError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} requires the {} frame but the ensemble is in the {} frame",
            self.operation, self.expected, self.found
        )
    }
}

impl Error for FrameError {}

/// Errors from a coordinate transform.
#[derive(Clone, Debug, PartialEq)]
pub enum TransformError {
    /// The ensemble was not in the source frame of the transform.
    Frame(FrameError),
    /// A particle has no physical image in the target frame.
    Unphysical {
        /// Id of the first offending particle.
        particle_id: u64,
        /// What went wrong.
        reason: String,
    },
    /// The reference particle cannot anchor a transform (at rest or
    /// non-finite).
    InvalidReference,
}

impl fmt::Display for TransformError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Frame(e) => write!(f, "{e}"),
            Self::Unphysical {
                particle_id,
                reason,
            } => write!(f, "particle {particle_id} is unphysical: {reason}"),
            Self::InvalidReference => write!(f, "reference particle is not moving"),
        }
    }
}

impl Error for TransformError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Frame(e) => Some(e),
            _ => None,
        }
    }
}

impl From<FrameError> for TransformError {
    fn from(e: FrameError) -> Self {
        Self::Frame(e)
    }
}

/// Errors from mesh construction, resizing, redistribution, or deposition.
#[derive(Clone, Debug, PartialEq)]
pub enum MeshError {
    /// An operation that needs a mesh ran before `init_from_scratch`.
    NotInitialized,
    /// The mesh configuration is structurally invalid.
    InvalidConfig {
        /// The offending `MeshConfig` field.
        field: &'static str,
        /// Description of the violation.
        reason: String,
    },
    /// The requested extent is non-finite.
    InvalidExtent {
        /// Description of the offending extent.
        reason: String,
    },
    /// The layout cannot be cut into the requested number of boxes.
    TooManyRanks {
        /// Requested boxes.
        ranks: u32,
        /// Cells available along the split axis.
        cells: u32,
    },
    /// Total mesh size exceeds the configured capacity.
    CapacityExceeded {
        /// Nodes requested.
        requested: usize,
        /// Maximum nodes permitted.
        capacity: usize,
    },
    /// A particle lies outside the mesh domain.
    ParticleOutsideDomain {
        /// Id of the particle.
        particle_id: u64,
    },
    /// A tile refers to a layout generation that has been replaced.
    StaleLayout {
        /// Box the tile belongs to.
        box_id: BoxId,
        /// Generation the tile was built against.
        tile_generation: LayoutGeneration,
        /// Generation of the live layout.
        live_generation: LayoutGeneration,
    },
    /// Refinement ratios do not match the level count.
    RefinementMismatch {
        /// Levels in the charge density.
        levels: usize,
        /// Ratios supplied.
        ratios: usize,
    },
    /// The particle shape was not set before a shape-dependent operation.
    ShapeUnset,
}

impl fmt::Display for MeshError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotInitialized => write!(f, "mesh has not been initialized"),
            Self::InvalidConfig { field, reason } => {
                write!(f, "invalid mesh config: {field} {reason}")
            }
            Self::InvalidExtent { reason } => write!(f, "invalid extent: {reason}"),
            Self::TooManyRanks { ranks, cells } => {
                write!(f, "cannot split {cells} cells into {ranks} boxes")
            }
            Self::CapacityExceeded {
                requested,
                capacity,
            } => write!(
                f,
                "mesh capacity exceeded: requested {requested} nodes, capacity {capacity}"
            ),
            Self::ParticleOutsideDomain { particle_id } => {
                write!(f, "particle {particle_id} lies outside the mesh domain")
            }
            Self::StaleLayout {
                box_id,
                tile_generation,
                live_generation,
            } => write!(
                f,
                "tile for box {box_id} has layout generation {tile_generation}, live is {live_generation}"
            ),
            Self::RefinementMismatch { levels, ratios } => write!(
                f,
                "{ratios} refinement ratios supplied for {levels} mesh levels"
            ),
            Self::ShapeUnset => write!(f, "particle shape has not been set"),
        }
    }
}

impl Error for MeshError {}

/// Errors from applying a lattice element map.
#[derive(Clone, Debug, PartialEq)]
pub enum PushError {
    /// The ensemble was not in the transverse-time frame.
    Frame(FrameError),
    /// The map produced a non-finite coordinate.
    NonFinite {
        /// Element that produced it.
        element: String,
        /// Id of the first offending particle.
        particle_id: u64,
    },
}

impl fmt::Display for PushError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Frame(e) => write!(f, "{e}"),
            Self::NonFinite {
                element,
                particle_id,
            } => write!(
                f,
                "element '{element}' produced non-finite coordinates for particle {particle_id}"
            ),
        }
    }
}

impl Error for PushError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Frame(e) => Some(e),
            _ => None,
        }
    }
}

impl From<FrameError> for PushError {
    fn from(e: FrameError) -> Self {
        Self::Frame(e)
    }
}

/// Errors from diagnostic output.
#[derive(Debug)]
pub enum DiagnosticError {
    /// Filesystem failure.
    Io {
        /// Path involved.
        path: String,
        /// The underlying I/O error.
        source: std::io::Error,
    },
    /// The destination name is not usable (empty or escapes the root).
    InvalidDestination {
        /// The rejected name.
        destination: String,
    },
    /// A nonlinear lens invariant parameter is out of range.
    InvalidLensParameter {
        /// Parameter name.
        name: &'static str,
        /// The rejected value.
        value: f64,
    },
}

impl fmt::Display for DiagnosticError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io { path, source } => write!(f, "diagnostic I/O on '{path}': {source}"),
            Self::InvalidDestination { destination } => {
                write!(f, "invalid diagnostic destination '{destination}'")
            }
            Self::InvalidLensParameter { name, value } => {
                write!(f, "lens invariant parameter {name} = {value} is out of range")
            }
        }
    }
}

impl Error for DiagnosticError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frame_check_passes_on_match() {
        assert!(FrameError::check("push", Frame::TransverseTime, Frame::TransverseTime).is_ok());
    }

    #[test]
    fn frame_check_reports_both_frames() {
        let err = FrameError::check("push", Frame::TransverseTime, Frame::Spatial).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("push"));
        assert!(msg.contains("transverse-time"));
        assert!(msg.contains("spatial"));
    }

    #[test]
    fn transform_error_chains_frame_error() {
        let frame = FrameError::check("t->z", Frame::TransverseTime, Frame::Spatial).unwrap_err();
        let err = TransformError::from(frame);
        assert!(err.source().is_some());
    }

    #[test]
    fn stale_layout_display() {
        let err = MeshError::StaleLayout {
            box_id: BoxId(2),
            tile_generation: LayoutGeneration(1),
            live_generation: LayoutGeneration(3),
        };
        let msg = err.to_string();
        assert!(msg.contains("box 2"));
        assert!(msg.contains("generation 1"));
    }

    #[test]
    fn diagnostic_io_error_has_source() {
        let err = DiagnosticError::Io {
            path: "diags/x.txt".into(),
            source: std::io::Error::other("disk full"),
        };
        assert!(err.source().is_some());
        assert!(err.to_string().contains("diags/x.txt"));
    }
}
