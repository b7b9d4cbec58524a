//! Readable text source over an iterator of string chunks

use std::convert::Infallible;
use std::iter::Fuse;

/// A readable text source
///
/// Anything a parser needs to pull text from: the adapter below, or a test
/// double.
pub trait TextSource {
    /// Error raised while pulling more text
    type Error;

    /// Read up to `n` characters, or everything that remains when `n` is `None`
    fn read(&mut self, n: Option<usize>) -> Result<String, Self::Error>;

    /// Read through the next `\n`, or to the end if there is none
    ///
    /// Returns an empty string once nothing remains.
    fn read_line(&mut self) -> Result<String, Self::Error>;

    /// Whether the source can be read from
    fn is_readable(&self) -> bool;

    /// Read everything that remains
    fn read_to_string(&mut self) -> Result<String, Self::Error> {
        self.read(None)
    }

    /// Read the remaining lines, each with its terminator
    fn read_lines(&mut self) -> Result<Vec<String>, Self::Error> {
        let mut lines = Vec::new();
        loop {
            let line = self.read_line()?;
            if line.is_empty() {
                return Ok(lines);
            }
            lines.push(line);
        }
    }
}

/// One item of a chunk iterator
///
/// Plain strings never fail; `Result` items carry the iterator's own error.
pub trait Chunk {
    /// Error carried by a failed pull
    type Error;

    /// The chunk's text or the failure
    fn into_chunk(self) -> Result<String, Self::Error>;
}

impl Chunk for String {
    type Error = Infallible;

    fn into_chunk(self) -> Result<String, Infallible> {
        Ok(self)
    }
}

impl Chunk for &str {
    type Error = Infallible;

    fn into_chunk(self) -> Result<String, Infallible> {
        Ok(self.to_string())
    }
}

impl<E> Chunk for Result<String, E> {
    type Error = E;

    fn into_chunk(self) -> Result<String, E> {
        self
    }
}

/// Adapts an iterator of string chunks to [`TextSource`]
///
/// Keeps a single leftover buffer: the part of the last chunk not yet
/// returned. Characters are never dropped, duplicated or reordered, whatever
/// mix of `read` and `read_line` calls is made. Sizes count characters, not
/// bytes.
///
/// An instance belongs to one consumer; independent consumers of the same
/// data each build their own reader.
#[derive(Debug)]
pub struct StringIteratorReader<I: Iterator> {
    iter: Fuse<I>,
    left: String,
    pos: usize,
}

impl<I> StringIteratorReader<I>
where
    I: Iterator,
    I::Item: Chunk,
{
    /// Wrap a chunk iterator
    pub fn new<T>(chunks: T) -> Self
    where
        T: IntoIterator<IntoIter = I>,
    {
        Self {
            iter: chunks.into_iter().fuse(),
            left: String::new(),
            pos: 0,
        }
    }

    /// Make sure the leftover buffer is non-empty; false once the iterator is exhausted
    fn fill(&mut self) -> Result<bool, <I::Item as Chunk>::Error> {
        while self.pos >= self.left.len() {
            match self.iter.next() {
                Some(chunk) => {
                    self.left = chunk.into_chunk()?;
                    self.pos = 0;
                }
                None => return Ok(false),
            }
        }
        Ok(true)
    }

    /// Move up to `limit` characters from the leftover buffer into `out`
    fn take_into(&mut self, out: &mut String, limit: usize) -> usize {
        let rest = &self.left[self.pos..];
        let mut taken = 0;
        let mut end = rest.len();
        for (index, _) in rest.char_indices() {
            if taken == limit {
                end = index;
                break;
            }
            taken += 1;
        }
        out.push_str(&rest[..end]);
        self.pos += end;
        taken
    }
}

impl<I> TextSource for StringIteratorReader<I>
where
    I: Iterator,
    I::Item: Chunk,
{
    type Error = <I::Item as Chunk>::Error;

    fn read(&mut self, n: Option<usize>) -> Result<String, Self::Error> {
        let mut out = String::new();
        match n {
            None => {
                while self.fill()? {
                    out.push_str(&self.left[self.pos..]);
                    self.pos = self.left.len();
                }
            }
            Some(mut remaining) => {
                while remaining > 0 && self.fill()? {
                    remaining -= self.take_into(&mut out, remaining);
                }
            }
        }
        Ok(out)
    }

    fn read_line(&mut self) -> Result<String, Self::Error> {
        let mut out = String::new();
        while self.fill()? {
            let rest = &self.left[self.pos..];
            match rest.find('\n') {
                Some(index) => {
                    out.push_str(&rest[..=index]);
                    self.pos += index + 1;
                    break;
                }
                None => {
                    out.push_str(rest);
                    self.pos = self.left.len();
                }
            }
        }
        Ok(out)
    }

    fn is_readable(&self) -> bool {
        true
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    fn drain_sized(chunks: &[String], n: usize) -> String {
        let mut reader = StringIteratorReader::new(chunks.to_vec());
        let mut out = String::new();
        loop {
            let piece = reader.read(Some(n)).unwrap();
            if piece.is_empty() {
                return out;
            }
            assert!(piece.chars().count() <= n);
            out.push_str(&piece);
        }
    }

    proptest! {
        /// Property: unlimited reads return exactly the concatenated chunks
        #[test]
        fn test_unlimited_read_round_trip(chunks in prop::collection::vec(".{0,12}", 0..10)) {
            let mut reader = StringIteratorReader::new(chunks.clone());
            let mut out = String::new();
            loop {
                let piece = reader.read(None).unwrap();
                if piece.is_empty() {
                    break;
                }
                out.push_str(&piece);
            }
            prop_assert_eq!(out, chunks.concat());
        }

        /// Property: fixed-size reads give the same text as an unlimited read
        #[test]
        fn test_chunked_equivalence(chunks in prop::collection::vec(".{0,12}", 0..10), n in 1usize..8) {
            prop_assert_eq!(drain_sized(&chunks, n), chunks.concat());
        }

        /// Property: read_line pieces concatenate back to the input, each ending in at most one newline
        #[test]
        fn test_lines_round_trip(chunks in prop::collection::vec("[ab\n]{0,8}", 0..10)) {
            let mut reader = StringIteratorReader::new(chunks.clone());
            let lines = reader.read_lines().unwrap();
            for line in &lines {
                prop_assert!(!line[..line.len() - 1].contains('\n'));
            }
            prop_assert_eq!(lines.concat(), chunks.concat());
        }
    }
}
