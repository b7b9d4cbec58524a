//! NEF-Pipelines I/O Layer
//!
//! Shared input plumbing for every pipeline stage.
//!
//! # Architecture
//!
//! - [`cache`]: reads stdin or a named file at most once per process and replays
//!   the materialized lines to any number of consumers
//! - [`adapter`]: the [`TextSource`] capability (`read`, `read_line`,
//!   `is_readable`) over any iterator of string chunks
//! - [`select`]: decides where a stage's input comes from
//!
//! # Examples
//!
//! ```
//! use nef_io::{StringIteratorReader, TextSource};
//!
//! let mut reader = StringIteratorReader::new(vec!["ab\nc", "d\n"]);
//! assert_eq!(reader.read_line().unwrap(), "ab\n");
//! assert_eq!(reader.read(Some(2)).unwrap(), "cd");
//! ```

#![warn(missing_docs)]

pub mod adapter;
pub mod cache;
pub mod error;
pub mod select;

pub use adapter::{Chunk, StringIteratorReader, TextSource};
pub use cache::{CachedLines, CachedLinesIter, OsOpener, SourceId, SourceOpener, StreamCache};
pub use error::{IoError, Result};
pub use select::{require_input, select_input, Environment, InputPolicy, PipeReader, ProcessEnvironment};
