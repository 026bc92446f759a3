//! Macro-particle storage for Beamline.
//!
//! [`ParticleContainer`] is the reference [`ParticleStorage`]: particles
//! live in [`ParticleTile`]s, one per box of the current domain layout,
//! and every tile carries the `(BoxId, LayoutGeneration)` it was built
//! against. The ensemble-wide [`Frame`](beamline_core::Frame) tag flips
//! only through [`ParticleStorage::transform`].
//!
//! Initial populations come from a [`Distribution`] sampled with a
//! seeded ChaCha8 generator, so runs are reproducible.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod container;
pub mod deposit;
pub mod distribution;
pub mod storage;
pub mod tile;
pub mod transform;

pub use container::ParticleContainer;
pub use distribution::{Distribution, DistributionError, DistributionKind, PhaseSpaceParams};
pub use storage::ParticleStorage;
pub use tile::ParticleTile;
