//! Beamline elements and lattice assembly.
//!
//! Each element kind lives in its own module and supplies two maps: one
//! for a macro-particle in fixed-s coordinates, one for the reference
//! particle. [`LatticeElement`] is the closed set of kinds; dispatch is a
//! `match`, so the per-particle loop never goes through a vtable.
//!
//! Lattices are assembled from [`ElementSpec`] descriptions. Unknown kinds
//! and bad parameters are rejected at assembly, never at push time.
//!
//! | Kind | Module | Thick | Parameters |
//! |------|--------|-------|------------|
//! | `drift` | [`drift`] | yes | `ds` |
//! | `quad` | [`quad`] | yes | `ds`, `k` |
//! | `sbend` | [`sbend`] | yes | `ds`, `rc` |
//! | `constf` | [`constf`] | yes | `ds`, `kx`, `ky`, `kt` |
//! | `multipole` | [`multipole`] | no | `multipole`, `k_normal`, `k_skew` |
//! | `nonlinear_lens` | [`nonlinear_lens`] | no | `knll`, `cnll` |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod constf;
pub mod drift;
pub mod element;
pub mod error;
pub mod multipole;
pub mod nonlinear_lens;
pub mod quad;
pub mod sbend;
pub mod sequence;
pub mod spec;
pub mod transfer;

pub use constf::ConstF;
pub use drift::Drift;
pub use element::LatticeElement;
pub use error::LatticeError;
pub use multipole::Multipole;
pub use nonlinear_lens::NonlinearLens;
pub use quad::Quad;
pub use sbend::Sbend;
pub use sequence::Lattice;
pub use spec::ElementSpec;
