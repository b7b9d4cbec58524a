//! Replayable cache of input lines
//!
//! Standard input can be read only once and cannot be rewound, yet several
//! consumers in one process may want to look at it (for example a check for
//! "is there piped input at all" followed by the real parse). The cache reads
//! each source once, keeps the lines, and hands out independent replays.

use crate::error::{IoError, Result};
use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::debug;

/// Identity of a cacheable input source
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SourceId {
    /// The process's standard input
    Stdin,
    /// A named file
    File(PathBuf),
}

impl SourceId {
    /// Identity of a named file
    pub fn file(path: impl Into<PathBuf>) -> Self {
        SourceId::File(path.into())
    }
}

impl fmt::Display for SourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceId::Stdin => f.write_str("stdin"),
            SourceId::File(path) => write!(f, "{}", path.display()),
        }
    }
}

/// The materialized lines of a source, each with its original terminator
pub type CachedLines = Arc<[String]>;

/// Opens the OS resource behind a [`SourceId`]
///
/// The cache calls this at most once per identity.
pub trait SourceOpener {
    /// Open the source for buffered reading
    fn open(&self, id: &SourceId) -> io::Result<Box<dyn BufRead + '_>>;
}

/// Opens stdin and files from the file system
#[derive(Debug, Clone, Copy, Default)]
pub struct OsOpener;

impl SourceOpener for OsOpener {
    fn open(&self, id: &SourceId) -> io::Result<Box<dyn BufRead + '_>> {
        match id {
            SourceId::Stdin => Ok(Box::new(io::stdin().lock())),
            SourceId::File(path) => Ok(Box::new(BufReader::new(File::open(path)?))),
        }
    }
}

/// Process-lifetime cache of input lines keyed by source identity
///
/// Created once at startup and passed by reference to whatever needs input.
/// Not thread safe: the pipeline is single threaded and the cache is filled
/// synchronously before any reader sees it.
///
/// # Examples
///
/// ```no_run
/// use nef_io::{SourceId, StreamCache};
///
/// let cache = StreamCache::new();
/// let first = cache.get_cached_lines(&SourceId::Stdin)?;
/// let second = cache.get_cached_lines(&SourceId::Stdin)?;
/// assert_eq!(first, second);
/// # Ok::<(), nef_io::IoError>(())
/// ```
pub struct StreamCache<O = OsOpener> {
    opener: O,
    entries: RefCell<HashMap<SourceId, CachedLines>>,
}

impl StreamCache<OsOpener> {
    /// Create a cache reading from the real stdin and file system
    pub fn new() -> Self {
        Self::with_opener(OsOpener)
    }
}

impl Default for StreamCache<OsOpener> {
    fn default() -> Self {
        Self::new()
    }
}

impl<O: SourceOpener> StreamCache<O> {
    /// Create a cache over a custom opener
    pub fn with_opener(opener: O) -> Self {
        Self {
            opener,
            entries: RefCell::new(HashMap::new()),
        }
    }

    /// The lines of a source, reading it only on the first request
    ///
    /// Later requests for the same identity share the first request's data.
    /// A failed read is not cached.
    pub fn get_cached_lines(&self, id: &SourceId) -> Result<CachedLines> {
        if let Some(lines) = self.entries.borrow().get(id) {
            debug!(source = %id, "input cache hit");
            return Ok(Arc::clone(lines));
        }

        let lines = self.read_all(id)?;
        self.entries.borrow_mut().insert(id.clone(), Arc::clone(&lines));
        Ok(lines)
    }

    /// A fresh replay over a source's lines
    pub fn lines(&self, id: &SourceId) -> Result<CachedLinesIter> {
        Ok(CachedLinesIter::new(self.get_cached_lines(id)?))
    }

    /// The opener this cache reads sources through
    pub fn opener(&self) -> &O {
        &self.opener
    }

    /// Whether a source has already been read
    pub fn is_cached(&self, id: &SourceId) -> bool {
        self.entries.borrow().contains_key(id)
    }

    /// Number of sources read so far
    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    /// True when nothing has been read yet
    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }

    fn read_all(&self, id: &SourceId) -> Result<CachedLines> {
        let unreadable = |source| IoError::UnreadableSource {
            source_id: id.clone(),
            source,
        };

        let mut reader = self.opener.open(id).map_err(unreadable)?;
        let mut lines = Vec::new();
        loop {
            let mut line = String::new();
            if reader.read_line(&mut line).map_err(unreadable)? == 0 {
                break;
            }
            lines.push(line);
        }

        debug!(source = %id, lines = lines.len(), "input cache miss, source read");
        Ok(lines.into())
    }
}

/// An independent replay position over cached lines
#[derive(Debug, Clone)]
pub struct CachedLinesIter {
    lines: CachedLines,
    position: usize,
}

impl CachedLinesIter {
    /// Replay `lines` from the start
    pub fn new(lines: CachedLines) -> Self {
        Self { lines, position: 0 }
    }
}

impl Iterator for CachedLinesIter {
    type Item = String;

    fn next(&mut self) -> Option<String> {
        let line = self.lines.get(self.position)?.clone();
        self.position += 1;
        Some(line)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.lines.len() - self.position;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for CachedLinesIter {}
