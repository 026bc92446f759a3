//! Simulation driver for Beamline.
//!
//! [`Simulation`] owns the ensemble, the mesh provider, the diagnostic
//! sink, and the lattice, all behind their traits. One
//! [`evolve()`](Simulation::evolve) call traverses the lattice once:
//!
//! ```text
//! initial diagnostics
//! for element in lattice:
//!     for step in 0..num_steps:
//!         transform t->z
//!         space charge (if enabled and more than one particle)
//!         transform z->t
//!         push element
//! output diagnostics
//! ```
//!
//! # Lifecycle
//!
//! 1. [`Simulation::new`] validates a [`SimulationConfig`].
//! 2. [`Simulation::initialize`] fixes the particle shape, builds the mesh,
//!    and prepares a clean diagnostics directory. Exactly once.
//! 3. [`Simulation::evolve`] may be called any number of times; each call
//!    continues from the current ensemble state.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod config;
pub mod coupler;
pub mod driver;
pub mod metrics;

pub use config::{ConfigError, SimulationConfig, SpaceChargeConfig};
pub use coupler::{
    CouplingError, CouplingOutcome, FieldSolver, SkipReason, SolverError, SpaceChargeCoupler,
};
pub use driver::{DriverError, Simulation};
pub use metrics::EvolveMetrics;
