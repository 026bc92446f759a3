//! Core types for the Beamline beam-dynamics driver.
//!
//! This is the leaf crate with zero internal dependencies. It defines
//! the abstractions shared across the workspace: layout identifiers,
//! coordinate frames, particle records, the particle shape, and the
//! error taxonomy for frame, mesh, push, and diagnostic failures.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod error;
pub mod frame;
pub mod id;
pub mod particle;
pub mod shape;

pub use error::{DiagnosticError, FrameError, MeshError, PushError, TransformError};
pub use frame::{Direction, Frame};
pub use id::{BoxId, LayoutGeneration, RankId};
pub use particle::{Extent, Particle, RefParticle};
pub use shape::ParticleShape;
