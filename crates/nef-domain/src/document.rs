//! Document model: entries, save frames and loops

use crate::error::DocumentError;
use std::collections::HashMap;
use std::fmt;

/// Marker used for a value that is unknown or not applicable
pub const UNKNOWN: &str = ".";

/// A loop: a table of named columns ("tags") and ordered rows
///
/// The category is stored without its leading underscore, e.g. `nef_sequence`,
/// and tags without the category prefix, e.g. `chain_code`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Loop {
    category: String,
    tags: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl Loop {
    /// Create an empty loop with no columns
    pub fn from_scratch(category: impl Into<String>) -> Self {
        Self {
            category: category.into(),
            tags: Vec::new(),
            rows: Vec::new(),
        }
    }

    /// Loop category without the leading underscore
    pub fn category(&self) -> &str {
        &self.category
    }

    /// Column names in order
    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    /// Rows in order, one value per column
    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    /// Number of rows
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// True when the loop holds no rows
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Add a column
    ///
    /// Columns can only be added while the loop is still empty.
    pub fn add_tag(&mut self, tag: impl Into<String>) -> Result<(), DocumentError> {
        let tag = tag.into();
        if !self.rows.is_empty() {
            return Err(DocumentError::LoopHasRows {
                category: self.category.clone(),
                tag,
            });
        }
        self.tags.push(tag);
        Ok(())
    }

    /// Add several columns in order
    pub fn add_tags<I, S>(&mut self, tags: I) -> Result<(), DocumentError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for tag in tags {
            self.add_tag(tag)?;
        }
        Ok(())
    }

    /// Append a row; it must have exactly one value per column
    pub fn add_row(&mut self, row: Vec<String>) -> Result<(), DocumentError> {
        if row.len() != self.tags.len() {
            return Err(DocumentError::RowArity {
                category: self.category.clone(),
                expected: self.tags.len(),
                found: row.len(),
            });
        }
        self.rows.push(row);
        Ok(())
    }

    /// Append a row built from a tag-to-value map
    ///
    /// Columns missing from the map are filled with [`UNKNOWN`]; keys that are not
    /// columns of the loop are ignored.
    pub fn add_row_from_map(&mut self, data: &HashMap<&str, String>) {
        let row = self
            .tags
            .iter()
            .map(|tag| {
                data.get(tag.as_str())
                    .cloned()
                    .unwrap_or_else(|| UNKNOWN.to_string())
            })
            .collect();
        self.rows.push(row);
    }

    /// Position of a column
    pub fn tag_index(&self, tag: &str) -> Option<usize> {
        self.tags.iter().position(|t| t == tag)
    }

    /// All values of one column, top to bottom
    pub fn column(&self, tag: &str) -> Option<Vec<&str>> {
        let index = self.tag_index(tag)?;
        Some(self.rows.iter().map(|row| row[index].as_str()).collect())
    }
}

/// A named, categorized block of scalar tags and loops
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveFrame {
    name: String,
    category: String,
    tags: Vec<(String, String)>,
    loops: Vec<Loop>,
}

impl SaveFrame {
    /// Create a frame carrying the mandatory `sf_category` and `sf_framecode` tags
    pub fn from_scratch(name: impl Into<String>, category: impl Into<String>) -> Self {
        let name = name.into();
        let category = category.into();
        let tags = vec![
            ("sf_category".to_string(), category.clone()),
            ("sf_framecode".to_string(), name.clone()),
        ];
        Self {
            name,
            category,
            tags,
            loops: Vec::new(),
        }
    }

    /// Create a frame without any tags; used by the STAR reader
    pub(crate) fn empty(name: String, category: String) -> Self {
        Self {
            name,
            category,
            tags: Vec::new(),
            loops: Vec::new(),
        }
    }

    pub(crate) fn set_category(&mut self, category: String) {
        self.category = category;
    }

    /// Frame name (the text after `save_`)
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Frame category, used as the tag prefix
    pub fn category(&self) -> &str {
        &self.category
    }

    /// Scalar tags in order
    pub fn tags(&self) -> &[(String, String)] {
        &self.tags
    }

    /// Loops in order
    pub fn loops(&self) -> &[Loop] {
        &self.loops
    }

    /// Value of a scalar tag
    pub fn tag(&self, name: &str) -> Option<&str> {
        self.tags
            .iter()
            .find(|(tag, _)| tag == name)
            .map(|(_, value)| value.as_str())
    }

    /// Set a scalar tag, updating it in place if present
    pub fn set_tag(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.tags.iter_mut().find(|(tag, _)| *tag == name) {
            Some((_, existing)) => *existing = value,
            None => self.tags.push((name, value)),
        }
    }

    /// Loop with the given category
    pub fn get_loop(&self, category: &str) -> Option<&Loop> {
        self.loops.iter().find(|lp| lp.category == category)
    }

    /// Mutable loop with the given category
    pub fn get_loop_mut(&mut self, category: &str) -> Option<&mut Loop> {
        self.loops.iter_mut().find(|lp| lp.category == category)
    }

    /// Loop with the given category, adding the one built by `make` if absent
    pub fn get_or_insert_loop_with(&mut self, category: &str, make: impl FnOnce() -> Loop) -> &mut Loop {
        let index = match self.loops.iter().position(|lp| lp.category == category) {
            Some(index) => index,
            None => {
                self.loops.push(make());
                self.loops.len() - 1
            }
        };
        &mut self.loops[index]
    }

    /// Add a loop, replacing any loop of the same category
    pub fn add_loop(&mut self, new_loop: Loop) {
        match self.get_loop_mut(&new_loop.category) {
            Some(existing) => *existing = new_loop,
            None => self.loops.push(new_loop),
        }
    }
}

/// One document: a data block holding save frames
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    /// Data block name (the text after `data_`)
    pub entry_id: String,
    frames: Vec<SaveFrame>,
}

impl Entry {
    /// Create an entry with no frames
    pub fn from_scratch(entry_id: impl Into<String>) -> Self {
        Self {
            entry_id: entry_id.into(),
            frames: Vec::new(),
        }
    }

    /// Save frames in order
    pub fn frames(&self) -> &[SaveFrame] {
        &self.frames
    }

    /// Frame by name
    pub fn frame(&self, name: &str) -> Option<&SaveFrame> {
        self.frames.iter().find(|frame| frame.name == name)
    }

    /// Mutable frame by name
    pub fn frame_mut(&mut self, name: &str) -> Option<&mut SaveFrame> {
        self.frames.iter_mut().find(|frame| frame.name == name)
    }

    /// All frames of a category
    pub fn frames_by_category<'a>(&'a self, category: &'a str) -> impl Iterator<Item = &'a SaveFrame> + 'a {
        self.frames.iter().filter(move |frame| frame.category == category)
    }

    /// First frame of a category
    pub fn first_frame_by_category(&self, category: &str) -> Option<&SaveFrame> {
        self.frames.iter().find(|frame| frame.category == category)
    }

    /// First frame of a category, mutably
    pub fn first_frame_by_category_mut(&mut self, category: &str) -> Option<&mut SaveFrame> {
        self.frames.iter_mut().find(|frame| frame.category == category)
    }

    /// Distinct frame categories in order of first appearance
    pub fn category_list(&self) -> Vec<&str> {
        let mut categories: Vec<&str> = Vec::new();
        for frame in &self.frames {
            if !categories.contains(&frame.category.as_str()) {
                categories.push(&frame.category);
            }
        }
        categories
    }

    /// Add a frame, replacing any frame with the same name
    pub fn add_frame(&mut self, frame: SaveFrame) {
        match self.frame_mut(&frame.name) {
            Some(existing) => *existing = frame,
            None => self.frames.push(frame),
        }
    }
}

impl fmt::Display for Entry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        crate::star::write_entry(f, self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn history_loop() -> Loop {
        let mut lp = Loop::from_scratch("nef_run_history");
        lp.add_tags(["run_number", "program_name"]).unwrap();
        lp
    }

    #[test]
    fn test_row_arity_checked() {
        let mut lp = history_loop();
        let err = lp.add_row(vec!["1".to_string()]).unwrap_err();
        assert_eq!(
            err,
            DocumentError::RowArity {
                category: "nef_run_history".to_string(),
                expected: 2,
                found: 1
            }
        );
    }

    #[test]
    fn test_no_tags_after_rows() {
        let mut lp = history_loop();
        lp.add_row(vec!["1".to_string(), "a".to_string()]).unwrap();
        assert!(lp.add_tag("script_name").is_err());
    }

    #[test]
    fn test_row_from_map_fills_unknown() {
        let mut lp = history_loop();
        let mut data = HashMap::new();
        data.insert("program_name", "fasta".to_string());
        data.insert("not_a_column", "ignored".to_string());
        lp.add_row_from_map(&data);

        assert_eq!(lp.rows()[0], vec![".".to_string(), "fasta".to_string()]);
        assert_eq!(lp.column("program_name"), Some(vec!["fasta"]));
        assert_eq!(lp.column("missing"), None);
    }

    #[test]
    fn test_frame_tags_update_in_place() {
        let mut frame = SaveFrame::from_scratch("nef_nmr_meta_data", "nef_nmr_meta_data");
        frame.set_tag("program_name", "a");
        frame.set_tag("program_name", "b");

        assert_eq!(frame.tag("program_name"), Some("b"));
        assert_eq!(frame.tag("sf_framecode"), Some("nef_nmr_meta_data"));
        assert_eq!(frame.tags().len(), 3);
    }

    #[test]
    fn test_add_frame_replaces_same_name() {
        let mut entry = Entry::from_scratch("test");
        entry.add_frame(SaveFrame::from_scratch("one", "cat_a"));
        entry.add_frame(SaveFrame::from_scratch("two", "cat_b"));

        let mut replacement = SaveFrame::from_scratch("one", "cat_a");
        replacement.set_tag("extra", "1");
        entry.add_frame(replacement);

        assert_eq!(entry.frames().len(), 2);
        assert_eq!(entry.frame("one").unwrap().tag("extra"), Some("1"));
        assert_eq!(entry.category_list(), vec!["cat_a", "cat_b"]);
    }
}
