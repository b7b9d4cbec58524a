//! STAR text reader and writer for NEF documents
//!
//! Handles the subset of STAR used by NEF: a single `data_` block holding
//! `save_` frames, scalar `_category.tag value` pairs, `loop_ ... stop_`
//! tables, bare / single-quoted / double-quoted values, `;`-delimited text
//! fields and `#` comments.

use crate::document::{Entry, Loop, SaveFrame};
use crate::error::DocumentError;
use std::fmt;
use std::iter::Peekable;
use std::vec::IntoIter;
use thiserror::Error;

/// Errors raised while reading STAR text
#[derive(Debug, Error, PartialEq, Eq)]
pub enum StarError {
    /// The text held no tokens at all
    #[error("Empty document: expected a data_ block")]
    Empty,

    /// The text does not follow the STAR grammar
    #[error("Malformed NEF at line {line}: {message}")]
    Malformed {
        /// 1-based line number of the offending token
        line: usize,
        /// What was wrong
        message: String,
    },

    /// The parsed content could not be placed in the document model
    #[error(transparent)]
    Document(#[from] DocumentError),
}

/// Result type alias for STAR operations
pub type Result<T> = std::result::Result<T, StarError>;

#[derive(Debug, Clone, PartialEq, Eq)]
struct Token {
    text: String,
    quoted: bool,
    line: usize,
}

impl Token {
    /// Remainder after a reserved-word prefix, for unquoted tokens only
    fn keyword(&self, prefix: &str) -> Option<&str> {
        if self.quoted {
            return None;
        }
        match self.text.get(..prefix.len()) {
            Some(head) if head.eq_ignore_ascii_case(prefix) => Some(&self.text[prefix.len()..]),
            _ => None,
        }
    }

    fn is_tag(&self) -> bool {
        !self.quoted && self.text.starts_with('_')
    }

    fn is_value(&self) -> bool {
        if self.quoted {
            return true;
        }
        !self.is_tag() && RESERVED.iter().all(|word| self.keyword(word).is_none())
    }
}

const RESERVED: [&str; 5] = ["data_", "save_", "loop_", "stop_", "global_"];

fn malformed(line: usize, message: impl Into<String>) -> StarError {
    StarError::Malformed {
        line,
        message: message.into(),
    }
}

fn tokenize(text: &str) -> Result<Vec<Token>> {
    let mut tokens = Vec::new();
    let mut lines = text.lines().enumerate();

    while let Some((index, line)) = lines.next() {
        let line_no = index + 1;

        if let Some(rest) = line.strip_prefix(';') {
            let mut parts: Vec<&str> = Vec::new();
            if !rest.trim().is_empty() {
                parts.push(rest);
            }
            let mut closed = false;
            for (_, inner) in lines.by_ref() {
                if inner.starts_with(';') {
                    closed = true;
                    break;
                }
                parts.push(inner);
            }
            if !closed {
                return Err(malformed(line_no, "text field is not closed by ';'"));
            }
            tokens.push(Token {
                text: parts.join("\n"),
                quoted: true,
                line: line_no,
            });
            continue;
        }

        tokenize_line(line, line_no, &mut tokens)?;
    }

    Ok(tokens)
}

fn tokenize_line(line: &str, line_no: usize, tokens: &mut Vec<Token>) -> Result<()> {
    let chars: Vec<char> = line.chars().collect();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        if c.is_whitespace() {
            i += 1;
            continue;
        }
        if c == '#' {
            break;
        }

        if c == '\'' || c == '"' {
            // a quote only closes the value when followed by whitespace or end of line
            let mut j = i + 1;
            loop {
                if j >= chars.len() {
                    return Err(malformed(line_no, format!("unterminated {} quoted value", c)));
                }
                if chars[j] == c && chars.get(j + 1).map_or(true, |next| next.is_whitespace()) {
                    break;
                }
                j += 1;
            }
            tokens.push(Token {
                text: chars[i + 1..j].iter().collect(),
                quoted: true,
                line: line_no,
            });
            i = j + 1;
        } else {
            let start = i;
            while i < chars.len() && !chars[i].is_whitespace() {
                i += 1;
            }
            tokens.push(Token {
                text: chars[start..i].iter().collect(),
                quoted: false,
                line: line_no,
            });
        }
    }

    Ok(())
}

fn split_tag(token: &Token) -> Result<(String, String)> {
    let body = &token.text[1..];
    match body.split_once('.') {
        Some((category, tag)) if !category.is_empty() && !tag.is_empty() => {
            Ok((category.to_string(), tag.to_string()))
        }
        _ => Err(malformed(
            token.line,
            format!("tag '{}' is not of the form _category.tag", token.text),
        )),
    }
}

/// Parse STAR text into an [`Entry`]
pub fn parse(text: &str) -> Result<Entry> {
    let mut tokens = tokenize(text)?.into_iter().peekable();

    let first = tokens.next().ok_or(StarError::Empty)?;
    let entry_id = first
        .keyword("data_")
        .ok_or_else(|| malformed(first.line, format!("expected a data_ block, found '{}'", first.text)))?;
    let mut entry = Entry::from_scratch(entry_id);

    while let Some(token) = tokens.next() {
        match token.keyword("save_") {
            Some(name) if !name.is_empty() => {
                let frame = parse_frame(name, token.line, &mut tokens)?;
                entry.add_frame(frame);
            }
            _ => {
                return Err(malformed(
                    token.line,
                    format!("expected a save frame, found '{}'", token.text),
                ))
            }
        }
    }

    Ok(entry)
}

fn parse_frame(name: &str, line: usize, tokens: &mut Peekable<IntoIter<Token>>) -> Result<SaveFrame> {
    let mut frame = SaveFrame::empty(name.to_string(), String::new());

    loop {
        let token = tokens
            .next()
            .ok_or_else(|| malformed(line, format!("save frame '{}' is not closed by save_", name)))?;

        if token.keyword("save_") == Some("") {
            break;
        } else if token.keyword("loop_") == Some("") {
            let lp = parse_loop(token.line, tokens)?;
            frame.add_loop(lp);
        } else if token.is_tag() {
            let (category, tag) = split_tag(&token)?;
            let value = match tokens.next() {
                Some(value) if value.is_value() => value.text,
                _ => return Err(malformed(token.line, format!("tag '{}' has no value", token.text))),
            };
            if frame.category().is_empty() {
                frame.set_category(category);
            }
            frame.set_tag(tag, value);
        } else {
            return Err(malformed(
                token.line,
                format!("unexpected '{}' in save frame '{}'", token.text, name),
            ));
        }
    }

    if frame.category().is_empty() {
        return Err(malformed(line, format!("save frame '{}' has no tags", name)));
    }
    Ok(frame)
}

fn parse_loop(line: usize, tokens: &mut Peekable<IntoIter<Token>>) -> Result<Loop> {
    let mut lp: Option<Loop> = None;

    while let Some(token) = tokens.next_if(Token::is_tag) {
        let (category, tag) = split_tag(&token)?;
        let current = lp.get_or_insert_with(|| Loop::from_scratch(category.clone()));
        if current.category() != category {
            return Err(malformed(
                token.line,
                format!("tag '{}' does not belong to loop _{}", token.text, current.category()),
            ));
        }
        current.add_tag(tag)?;
    }

    let mut lp = lp.ok_or_else(|| malformed(line, "loop_ has no tags"))?;

    let mut values = Vec::new();
    loop {
        let token = tokens
            .next()
            .ok_or_else(|| malformed(line, format!("loop _{} is not closed by stop_", lp.category())))?;
        if token.keyword("stop_") == Some("") {
            break;
        }
        if !token.is_value() {
            return Err(malformed(
                token.line,
                format!("unexpected '{}' in loop _{}", token.text, lp.category()),
            ));
        }
        values.push(token.text);
    }

    let columns = lp.tags().len();
    if values.len() % columns != 0 {
        return Err(malformed(
            line,
            format!(
                "loop _{} has {} values which is not a multiple of its {} columns",
                lp.category(),
                values.len(),
                columns
            ),
        ));
    }
    for row in values.chunks(columns) {
        lp.add_row(row.to_vec())?;
    }

    Ok(lp)
}

enum Rendered {
    Inline(String),
    TextField(String),
}

fn render(value: &str) -> Rendered {
    if value.is_empty() {
        return Rendered::Inline("''".to_string());
    }
    if value.contains('\n') {
        return Rendered::TextField(value.to_string());
    }

    let needs_quotes = value.chars().any(char::is_whitespace)
        || value.starts_with(['_', '#', '\'', '"', '$', '[', ';'])
        || RESERVED.iter().any(|word| {
            value
                .get(..word.len())
                .is_some_and(|head| head.eq_ignore_ascii_case(word))
        });

    if !needs_quotes {
        Rendered::Inline(value.to_string())
    } else if !value.contains('\'') {
        Rendered::Inline(format!("'{}'", value))
    } else if !value.contains('"') {
        Rendered::Inline(format!("\"{}\"", value))
    } else {
        Rendered::TextField(value.to_string())
    }
}

/// Write an entry as STAR text
pub fn write_entry(out: &mut impl fmt::Write, entry: &Entry) -> fmt::Result {
    writeln!(out, "data_{}", entry.entry_id)?;
    writeln!(out)?;
    for frame in entry.frames() {
        write_frame(out, frame)?;
    }
    Ok(())
}

/// Render an entry as STAR text
pub fn write(entry: &Entry) -> String {
    entry.to_string()
}

fn write_frame(out: &mut impl fmt::Write, frame: &SaveFrame) -> fmt::Result {
    writeln!(out, "save_{}", frame.name())?;

    let names: Vec<String> = frame
        .tags()
        .iter()
        .map(|(tag, _)| format!("_{}.{}", frame.category(), tag))
        .collect();
    let width = names.iter().map(String::len).max().unwrap_or(0);

    for (name, (_, value)) in names.iter().zip(frame.tags()) {
        match render(value) {
            Rendered::Inline(text) => writeln!(out, "   {:<width$}  {}", name, text, width = width)?,
            Rendered::TextField(text) => writeln!(out, "   {}\n;\n{}\n;", name, text)?,
        }
    }

    for lp in frame.loops() {
        writeln!(out)?;
        write_loop(out, lp)?;
    }

    writeln!(out)?;
    writeln!(out, "save_")?;
    writeln!(out)?;
    Ok(())
}

fn write_loop(out: &mut impl fmt::Write, lp: &Loop) -> fmt::Result {
    writeln!(out, "   loop_")?;
    for tag in lp.tags() {
        writeln!(out, "      _{}.{}", lp.category(), tag)?;
    }
    writeln!(out)?;

    let rendered: Vec<Vec<Rendered>> = lp
        .rows()
        .iter()
        .map(|row| row.iter().map(|value| render(value)).collect())
        .collect();

    let mut widths = vec![0; lp.tags().len()];
    for row in &rendered {
        for (width, value) in widths.iter_mut().zip(row) {
            if let Rendered::Inline(text) = value {
                *width = (*width).max(text.chars().count());
            }
        }
    }

    for row in &rendered {
        let mut line = String::from("    ");
        for (value, width) in row.iter().zip(&widths) {
            match value {
                Rendered::Inline(text) => {
                    line.push_str(&format!(" {:<width$}  ", text, width = *width));
                }
                Rendered::TextField(text) => {
                    writeln!(out, "{}", line.trim_end())?;
                    writeln!(out, ";\n{}\n;", text)?;
                    line = String::from("    ");
                }
            }
        }
        let line = line.trim_end();
        if !line.is_empty() {
            writeln!(out, "{}", line)?;
        }
    }

    writeln!(out)?;
    writeln!(out, "   stop_")?;
    Ok(())
}
