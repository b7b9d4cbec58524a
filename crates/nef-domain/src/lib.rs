//! NEF-Pipelines Domain Layer
//!
//! This crate contains the document model and the pure business logic shared by
//! every transcoder. It performs no I/O of its own: text comes in as `&str` and
//! goes out as `String`, and the clock used for provenance is injected.
//!
//! ## Key Concepts
//!
//! - **Entry**: One NEF document, a named data block holding save frames
//! - **Save Frame**: A named, categorized block of scalar tags and loops
//! - **Loop**: A table of named columns and ordered rows
//! - **Provenance**: The `nef_nmr_meta_data` frame recording who touched a document
//! - **Sequence**: Residue tables and the `nef_molecular_system` frame
//!
//! ## Architecture
//!
//! - Document model and STAR text reader/writer in [`document`] and [`star`]
//! - Provenance stamping in [`provenance`]
//! - Residue translation and chain bookkeeping in [`sequence`]

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod document;
pub mod error;
pub mod provenance;
pub mod sequence;
pub mod star;

// Re-exports for convenience
pub use document::{Entry, Loop, SaveFrame, UNKNOWN};
pub use error::{DocumentError, ProvenanceError};
pub use provenance::{stamp, Clock, MetaDataRecord, ProgramIdentity, RunHistoryRow, StampOutcome, SystemClock};
pub use sequence::{MoleculeType, SequenceResidue};
pub use star::StarError;
