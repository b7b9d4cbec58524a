//! Error types for the CLI application.

use nef_domain::sequence::BadResidue;
use nef_domain::{ProvenanceError, StarError};
use nef_io::IoError;
use std::error::Error as StdError;
use std::fmt::Write;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for CLI operations.
pub type Result<T> = std::result::Result<T, CliError>;

/// Process exit status after a fatal error.
pub const EXIT_ERROR: i32 = 1;

/// CLI-specific errors.
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Input selection or reading failed
    #[error(transparent)]
    Input(#[from] IoError),

    /// NEF text could not be parsed
    #[error("couldn't parse NEF input: {0}")]
    Star(#[from] StarError),

    /// The document could not be stamped
    #[error("couldn't stamp NEF document: {0}")]
    Provenance(#[from] ProvenanceError),

    /// A FASTA file was malformed
    #[error("couldn't read FASTA file {path}: {message}")]
    Fasta {
        /// File being read
        path: PathBuf,
        /// What was wrong
        message: String,
    },

    /// A sequence had a letter with no residue translation
    #[error("couldn't translate sequence {entry_id} to 3 letter codes: {source}")]
    Translation {
        /// Sequence id from the FASTA header
        entry_id: String,
        /// Offending residue
        #[source]
        source: BadResidue,
    },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// TOML parsing error
    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// The text printed to stderr for a fatal error
///
/// With `show_causes` the chain of underlying errors comes first.
pub fn render_report(error: &dyn StdError, show_causes: bool) -> String {
    let mut report = String::new();
    if show_causes {
        let mut cause = error.source();
        while let Some(inner) = cause {
            let _ = writeln!(report, "caused by: {inner}");
            cause = inner.source();
        }
        if !report.is_empty() {
            report.push('\n');
        }
    }
    let _ = writeln!(report, "ERROR: {error}");
    report.push_str("exiting...\n");
    report
}
