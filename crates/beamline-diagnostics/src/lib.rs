//! Diagnostic output for Beamline.
//!
//! A [`DiagnosticSink`] is a write-only observer of the ensemble. The
//! driver records six fixed checkpoints per run, named by
//! [`checkpoint`]:
//!
//! | stage | beam | reference particle | lens invariants |
//! |-------|------|--------------------|-----------------|
//! | initial | `diags/initial_beam.txt` | `diags/initial_ref_particle.txt` | `diags/initial_nonlinear_lens_invariants.txt` |
//! | output | `diags/output_beam.txt` | `diags/output_ref_particle.txt` | `diags/output_nonlinear_lens_invariants.txt` |
//!
//! [`FileDiagnostics`] writes whitespace-separated text tables under
//! its own root directory; [`NullSink`] discards everything.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod checkpoint;
pub mod format;
pub mod invariants;
pub mod sink;

pub use checkpoint::{OutputType, Stage, DIAGS_DIR};
pub use invariants::LensInvariantParams;
pub use sink::{DiagnosticSink, FileDiagnostics, NullSink};
