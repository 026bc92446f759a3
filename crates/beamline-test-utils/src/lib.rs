//! Test utilities and mock types for Beamline development.
//!
//! The recording types wrap real collaborators (or stand in for them)
//! and append an [`Event`] to a shared [`EventLog`] on every call, so a
//! test can assert on the exact order in which the driver touched the
//! ensemble, the mesh, and the diagnostic sink.

#![forbid(unsafe_code)]
#![allow(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod fixtures;
pub mod recording;

pub use recording::{Event, EventLog, RecordingMesh, RecordingSink, RecordingStorage};
