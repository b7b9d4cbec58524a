//! Provenance tracking for NEF documents
//!
//! Every pipeline stage stamps the document it emits. The `nef_nmr_meta_data`
//! frame always names the most recent program, while its `nef_run_history`
//! loop records, one row per stamp, the program that ran *before* it.

use crate::document::{Entry, Loop, SaveFrame, UNKNOWN};
use crate::error::ProvenanceError;
use chrono::{DateTime, Local};
use std::collections::HashMap;
use tracing::{debug, info};
use uuid::Uuid;

/// Category (and framecode) of the metadata frame
pub const NEF_META_DATA: &str = "nef_nmr_meta_data";

/// Category of the run history loop
pub const NEF_RUN_HISTORY: &str = "nef_run_history";

/// Value of the `format_name` tag
pub const NEF_FORMAT_NAME: &str = "nmr_exchange_format";

/// Value of the `format_version` tag
pub const NEF_FORMAT_VERSION: &str = "1.1";

const RUN_HISTORY_TAGS: [&str; 4] = ["run_number", "program_name", "program_version", "script_name"];

/// The program stamping a document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgramIdentity {
    /// Program name, e.g. `NEFPipelines`
    pub name: String,
    /// Program version
    pub version: String,
    /// Script or command within the program
    pub script: String,
}

impl ProgramIdentity {
    /// Create a program identity
    pub fn new(name: impl Into<String>, version: impl Into<String>, script: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            script: script.into(),
        }
    }
}

/// Source of wall-clock time for stamping
pub trait Clock {
    /// Current local time
    fn now(&self) -> DateTime<Local>;
}

/// The system clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Local> {
        Local::now()
    }
}

/// One row of the run history
///
/// A `None` field is the unknown marker `.` on the wire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunHistoryRow {
    /// Position in the pipeline; `None` for the placeholder row
    pub run_number: Option<u64>,
    /// Program that ran
    pub program_name: Option<String>,
    /// Its version
    pub program_version: Option<String>,
    /// Its script
    pub script_name: Option<String>,
}

/// Typed view of a document's metadata frame
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetaDataRecord {
    /// Most recent program
    pub program_name: Option<String>,
    /// Most recent program version
    pub program_version: Option<String>,
    /// Most recent script
    pub script_name: Option<String>,
    /// Time of the most recent stamp
    pub creation_time: Option<String>,
    /// Identifier of the most recent stamp
    pub uuid: Option<String>,
    /// Run history rows in order
    pub run_history: Vec<RunHistoryRow>,
}

fn known(value: Option<&str>) -> Option<String> {
    value.filter(|v| *v != UNKNOWN).map(str::to_string)
}

fn cell<'a>(lp: &Loop, row: &'a [String], tag: &str) -> Option<&'a str> {
    lp.tag_index(tag).map(|index| row[index].as_str())
}

impl MetaDataRecord {
    /// Read the metadata frame of an entry, if it has one
    pub fn from_entry(entry: &Entry) -> Option<Self> {
        let frame = entry.first_frame_by_category(NEF_META_DATA)?;

        let run_history = frame
            .get_loop(NEF_RUN_HISTORY)
            .map(|lp| {
                lp.rows()
                    .iter()
                    .map(|row| RunHistoryRow {
                        run_number: cell(lp, row, "run_number").and_then(|v| v.trim().parse().ok()),
                        program_name: known(cell(lp, row, "program_name")),
                        program_version: known(cell(lp, row, "program_version")),
                        script_name: known(cell(lp, row, "script_name")),
                    })
                    .collect()
            })
            .unwrap_or_default();

        Some(Self {
            program_name: known(frame.tag("program_name")),
            program_version: known(frame.tag("program_version")),
            script_name: known(frame.tag("script_name")),
            creation_time: known(frame.tag("creation_time")),
            uuid: known(frame.tag("uuid")),
            run_history,
        })
    }

    /// Run numbers of the rows that have one
    pub fn run_numbers(&self) -> Vec<u64> {
        self.run_history.iter().filter_map(|row| row.run_number).collect()
    }
}

/// What a call to [`stamp`] did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StampOutcome {
    /// The document had no metadata frame and one was created
    Created,
    /// A run history row with this run number was appended
    Appended {
        /// Run number of the new row
        run_number: u64,
    },
}

/// Timestamp written to `creation_time`
///
/// ISO-8601 local time with microseconds, e.g. `2026-10-18T09:15:02.123456`.
pub fn creation_time(clock: &dyn Clock) -> String {
    clock.now().format("%Y-%m-%dT%H:%M:%S%.6f").to_string()
}

/// Identifier written to `uuid`
///
/// Derived from the program name and creation time so that the same stamp
/// always yields the same identifier.
pub fn derive_uuid(program_name: &str, creation_time: &str) -> String {
    let name = format!("{}-{}", program_name, creation_time);
    Uuid::new_v5(&Uuid::NAMESPACE_OID, name.as_bytes()).to_string()
}

/// Build a fresh metadata frame
///
/// The run history holds a single placeholder row of unknown markers.
pub fn create_header_frame(identity: &ProgramIdentity, clock: &dyn Clock) -> SaveFrame {
    let mut frame = SaveFrame::from_scratch(NEF_META_DATA, NEF_META_DATA);
    frame.set_tag("format_name", NEF_FORMAT_NAME);
    frame.set_tag("format_version", NEF_FORMAT_VERSION);
    write_identity(&mut frame, identity, clock);

    let mut history = empty_run_history();
    history.add_row_from_map(&HashMap::new());
    frame.add_loop(history);

    frame
}

fn empty_run_history() -> Loop {
    let mut history = Loop::from_scratch(NEF_RUN_HISTORY);
    for tag in RUN_HISTORY_TAGS {
        // a fresh loop has no rows, so adding columns cannot fail
        let _ = history.add_tag(tag);
    }
    history
}

fn write_identity(frame: &mut SaveFrame, identity: &ProgramIdentity, clock: &dyn Clock) {
    let creation_time = creation_time(clock);
    let uuid = derive_uuid(&identity.name, &creation_time);

    frame.set_tag("program_name", identity.name.as_str());
    frame.set_tag("program_version", identity.version.as_str());
    frame.set_tag("script_name", identity.script.as_str());
    frame.set_tag("creation_time", creation_time);
    frame.set_tag("uuid", uuid);
}

/// Next run number: one past the largest numeric run number, or 1
pub fn next_run_number(history: &Loop) -> Result<u64, ProvenanceError> {
    let last = history
        .column("run_number")
        .into_iter()
        .flatten()
        .filter_map(|value| value.trim().parse::<u64>().ok())
        .max();

    match last {
        None => Ok(1),
        Some(last) => last
            .checked_add(1)
            .ok_or(ProvenanceError::RunNumberOverflow { last }),
    }
}

/// Stamp a document with the program that is processing it
///
/// Creates the metadata frame if the document has none. Otherwise the frame's
/// program fields are overwritten with `identity` and a run history row naming
/// the previous program is appended.
///
/// Fails without touching the document when the run history can't take
/// another row.
pub fn stamp(entry: &mut Entry, identity: &ProgramIdentity, clock: &dyn Clock) -> Result<StampOutcome, ProvenanceError> {
    let Some(frame) = entry.first_frame_by_category_mut(NEF_META_DATA) else {
        info!(program = %identity.name, script = %identity.script, "creating metadata frame");
        entry.add_frame(create_header_frame(identity, clock));
        return Ok(StampOutcome::Created);
    };

    let run_number = match frame.get_loop(NEF_RUN_HISTORY) {
        Some(history) => next_run_number(history)?,
        None => 1,
    };

    let previous = |tag: &str| frame.tag(tag).unwrap_or(UNKNOWN).to_string();
    let last_program = previous("program_name");
    let last_version = previous("program_version");
    let last_script = previous("script_name");

    write_identity(frame, identity, clock);

    let history = frame.get_or_insert_loop_with(NEF_RUN_HISTORY, || {
        debug!("metadata frame has no run history, adding one");
        empty_run_history()
    });

    let mut data = HashMap::new();
    data.insert("run_number", run_number.to_string());
    data.insert("program_name", last_program);
    data.insert("program_version", last_version);
    data.insert("script_name", last_script);
    history.add_row_from_map(&data);

    info!(run_number, program = %identity.name, script = %identity.script, "stamped metadata frame");
    Ok(StampOutcome::Appended { run_number })
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Property: N stamps on a headed document give run numbers 1..=N
        #[test]
        fn test_run_numbers_are_sequential(n in 1usize..20) {
            let mut entry = Entry::from_scratch("test");
            let identity = ProgramIdentity::new("p", "1", "p.rs");
            stamp(&mut entry, &identity, &SystemClock).unwrap();

            for _ in 0..n {
                stamp(&mut entry, &identity, &SystemClock).unwrap();
            }

            let record = MetaDataRecord::from_entry(&entry).unwrap();
            let expected: Vec<u64> = (1..=n as u64).collect();
            prop_assert_eq!(record.run_numbers(), expected);
        }
    }
}
