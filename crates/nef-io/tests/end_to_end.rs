//! End-to-end input tests: file on disk -> cache -> adapter -> document

use nef_domain::star;
use nef_io::{select_input, Environment, InputPolicy, SourceId, SourceOpener, StreamCache, TextSource};
use std::cell::Cell;
use std::io::{self, BufRead, Cursor, Write};
use tempfile::NamedTempFile;

const THREE_LINES: &str = "data_three\nsave_frame   _frame.sf_category   frame\nsave_\n";

struct Piped;

impl Environment for Piped {
    fn stdin_is_terminal(&self) -> bool {
        false
    }

    fn has_var(&self, _name: &str) -> bool {
        false
    }
}

fn three_line_file() -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(THREE_LINES.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

#[test]
fn test_pipe_file_parses_into_document() {
    let file = three_line_file();
    let cache = StreamCache::new();

    let mut reader = select_input(&cache, Some(file.path()), &InputPolicy::default(), &Piped)
        .unwrap()
        .unwrap();
    let lines = reader.read_lines().unwrap();
    assert_eq!(lines.len(), 3);
    assert_eq!(lines.concat(), THREE_LINES);

    let entry = star::parse(&lines.concat()).unwrap();
    assert_eq!(entry.entry_id, "three");
    assert_eq!(entry.frames().len(), 1);
    assert_eq!(entry.frame("frame").unwrap().category(), "frame");
}

#[test]
fn test_second_consumer_served_from_cache() {
    let file = three_line_file();
    let cache = StreamCache::new();
    let id = SourceId::file(file.path());

    let mut reader = select_input(&cache, Some(file.path()), &InputPolicy::default(), &Piped)
        .unwrap()
        .unwrap();
    let first = reader.read_to_string().unwrap();

    // the file is gone, so only the cache can answer
    let path = file.path().to_path_buf();
    file.close().unwrap();
    assert!(!path.exists());

    let second = cache.get_cached_lines(&id).unwrap();
    assert_eq!(second.concat(), first);
    assert_eq!(second.len(), 3);
}

#[derive(Default)]
struct CountingStdin {
    opens: Cell<usize>,
}

impl SourceOpener for CountingStdin {
    fn open(&self, _id: &SourceId) -> io::Result<Box<dyn BufRead + '_>> {
        self.opens.set(self.opens.get() + 1);
        Ok(Box::new(Cursor::new(THREE_LINES.as_bytes().to_vec())))
    }
}

#[test]
fn test_custom_opener_is_read_once_across_consumers() {
    let cache = StreamCache::with_opener(CountingStdin::default());

    for _ in 0..3 {
        let mut reader = select_input(&cache, None, &InputPolicy::default(), &Piped)
            .unwrap()
            .unwrap();
        assert_eq!(reader.read_to_string().unwrap(), THREE_LINES);
    }

    assert_eq!(cache.opener().opens.get(), 1);
    assert_eq!(cache.len(), 1);
}
