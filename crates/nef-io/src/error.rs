//! Error types for input handling

use crate::cache::SourceId;
use thiserror::Error;

/// Result type alias for input operations
pub type Result<T> = std::result::Result<T, IoError>;

/// Errors that can occur while acquiring a stage's input
#[derive(Debug, Error)]
pub enum IoError {
    /// A source could not be opened or read
    #[error("couldn't open stream {source_id} because {source}")]
    UnreadableSource {
        /// The source that failed
        source_id: SourceId,
        /// Underlying I/O failure
        source: std::io::Error,
    },

    /// No pipe file was given and stdin is not usable
    #[error("couldn't read from stdin and no --pipe in args")]
    NoInputAvailable,

    /// Input was required but reading it failed
    #[error("couldn't read from stdin or --pipe file")]
    InputFailed(#[source] Box<IoError>),
}
