//! Mesh hierarchy and domain layout for Beamline.
//!
//! The mesh provider owns everything spatial: the level hierarchy, the
//! charge-density storage, and the domain layout that assigns boxes to
//! ranks. Particles never hold references into it, only
//! `(BoxId, LayoutGeneration)` handles.
//!
//! # Architecture
//!
//! ```text
//! MeshHierarchy (implements MeshProvider)
//! ├── MeshConfig (cells, levels, ranks, padding, capacity)
//! ├── DomainLayout (generation-stamped, one box per rank along z)
//! │   └── Geometry (level-0 lower corner, cell size, cell counts)
//! └── ChargeDensity (generation-stamped, one LevelData per level)
//! ```
//!
//! Every `resize_mesh` produces a new layout generation. Tiles built
//! against an older generation must be redistributed before deposition.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod config;
pub mod density;
pub mod geometry;
pub mod hierarchy;
pub mod layout;
pub mod provider;

pub use config::MeshConfig;
pub use density::{ChargeDensity, LevelData};
pub use geometry::Geometry;
pub use hierarchy::MeshHierarchy;
pub use layout::{BoxSpec, DomainLayout};
pub use provider::{MeshProvider, RefinementRatios};
