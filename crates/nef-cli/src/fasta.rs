//! FASTA reading for the sequence importer
//!
//! # Format
//!
//! ```text
//! >sequence1 description
//! ACDEFGHIKL
//! MNPQ
//! >sequence2
//! GGGS
//! ```
//!
//! Sequences may wrap over several lines. Blank lines and `;` comment lines
//! are ignored. A trailing `*` terminator is dropped.
//!
//! A header whose description starts with `NEFPLS` may carry the chain code and
//! first residue number of the sequence, e.g. `>test NEFPLS | CHAIN: A | START: -2`.

use crate::error::{CliError, Result};
use std::path::Path;

/// One record as it appears in the file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FastaRecord {
    /// First word of the header
    pub id: String,
    /// Rest of the header
    pub description: String,
    /// One letter codes with line breaks removed
    pub sequence: String,
}

impl FastaRecord {
    /// Header line without the leading `>`
    pub fn definition(&self) -> String {
        if self.description.is_empty() {
            self.id.clone()
        } else {
            format!("{} {}", self.id, self.description)
        }
    }
}

/// Read every record from the lines of one file
pub fn read_records<I>(lines: I, path: &Path) -> Result<Vec<FastaRecord>>
where
    I: IntoIterator<Item = String>,
{
    let mut records: Vec<FastaRecord> = Vec::new();

    for (index, line) in lines.into_iter().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with(';') {
            continue;
        }

        if let Some(header) = line.strip_prefix('>') {
            let header = header.trim();
            let (id, description) = header.split_once(char::is_whitespace).unwrap_or((header, ""));
            if id.is_empty() {
                return Err(fasta_error(path, format!("empty header at line {}", index + 1)));
            }
            records.push(FastaRecord {
                id: id.to_string(),
                description: description.trim().to_string(),
                sequence: String::new(),
            });
            continue;
        }

        let Some(record) = records.last_mut() else {
            return Err(fasta_error(
                path,
                format!("sequence data before the first header at line {}", index + 1),
            ));
        };
        record
            .sequence
            .extend(line.chars().filter(|c| !c.is_whitespace() && *c != '*'));
    }

    Ok(records)
}

fn fasta_error(path: &Path, message: String) -> CliError {
    CliError::Fasta {
        path: path.to_path_buf(),
        message,
    }
}

/// A record interpreted for import
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportedSequence {
    /// Entry id derived from the header
    pub entry_id: String,
    /// Remaining header text
    pub comment: String,
    /// One letter codes
    pub letters: String,
    /// Chain code from a `NEFPLS` header
    pub chain_code: Option<String>,
    /// First residue number from a `NEFPLS` header
    pub start: i64,
}

/// Interpret a record's header
///
/// Three header styles are recognised: `NEFPLS` headers (when `parse_header`
/// is set), PDB style `ID|Chain|Name|Organism (taxid)` headers, and anything
/// else as `id description`.
pub fn interpret(record: FastaRecord, parse_header: bool, path: &Path) -> Result<ImportedSequence> {
    let definition = record.definition();
    let mut chain_code = None;
    let mut start = 1;

    let (entry_id, comment) = if parse_header && record.description.starts_with("NEFPLS") {
        for field in definition.split('|').map(str::trim) {
            let value = field.split_whitespace().last();
            if field.starts_with("CHAIN:") {
                chain_code = value.map(str::to_string);
            } else if field.starts_with("START:") {
                let value = value.unwrap_or_default();
                start = value.parse().map_err(|_| {
                    fasta_error(path, format!("bad START '{}' in header of {}", value, record.id))
                })?;
            }
        }
        (record.id, record.description)
    } else if is_pdb_style(&definition) {
        let (id, rest) = definition.split_once('|').unwrap_or((definition.as_str(), ""));
        (id.to_string(), rest.to_string())
    } else {
        (record.id, record.description)
    };

    Ok(ImportedSequence {
        entry_id,
        comment,
        letters: record.sequence,
        chain_code,
        start,
    })
}

fn is_pdb_style(definition: &str) -> bool {
    let last = definition.split_whitespace().last().unwrap_or_default();
    let taxid = last.strip_prefix('(').and_then(|s| s.strip_suffix(')'));
    definition.matches('|').count() == 3 && taxid.is_some_and(|id| !id.is_empty() && id.chars().all(|c| c.is_ascii_digit()))
}
