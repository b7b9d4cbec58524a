//! Error types for document manipulation

use thiserror::Error;

/// Errors raised while building or mutating a document
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DocumentError {
    /// A row did not have one value per loop column
    #[error("Loop _{category} has {expected} columns but the row has {found} values")]
    RowArity {
        /// Loop category
        category: String,
        /// Number of columns in the loop
        expected: usize,
        /// Number of values supplied
        found: usize,
    },

    /// A column was added to a loop that already holds rows
    #[error("Cannot add tag '{tag}' to loop _{category} after rows have been added")]
    LoopHasRows {
        /// Loop category
        category: String,
        /// Tag that was rejected
        tag: String,
    },
}

/// Errors raised while stamping a document
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ProvenanceError {
    /// The run history already holds the largest representable run number
    #[error("run number {last} in _nef_run_history can't be incremented")]
    RunNumberOverflow {
        /// Largest run number found
        last: u64,
    },
}
