//! The read-stamp-emit cycle shared by every pipeline stage.
//!
//! A stage reads the NEF document piped into it (or starts a new one), stamps
//! the provenance header, adds its frames and writes the result to stdout.

use crate::config::Config;
use crate::error::Result;
use nef_domain::provenance::{stamp, Clock, ProgramIdentity, StampOutcome};
use nef_domain::{star, Entry, SaveFrame};
use nef_io::{require_input, select_input, Environment, InputPolicy, StreamCache, TextSource};
use std::path::Path;
use tracing::{debug, info};

/// Program name written to the metadata frame
pub const NEF_PIPELINES: &str = "NEFPipelines";

/// Program version written to the metadata frame
pub const NEF_PIPELINES_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Everything a stage needs from the process it runs in.
pub struct Context<'a> {
    /// Process-wide input cache
    pub cache: &'a StreamCache,
    /// Input selection settings
    pub policy: InputPolicy,
    /// Terminal and environment queries
    pub env: &'a dyn Environment,
    /// Time source for stamps
    pub clock: &'a dyn Clock,
    /// Entry name for new documents
    pub entry_name: String,
}

impl<'a> Context<'a> {
    /// Build a context from loaded configuration.
    pub fn new(cache: &'a StreamCache, config: &Config, env: &'a dyn Environment, clock: &'a dyn Clock) -> Self {
        Self {
            cache,
            policy: config.input_policy(),
            env,
            clock,
            entry_name: config.settings.entry_name.clone(),
        }
    }
}

/// Identity of a stage, named after its source file
pub fn identity(source_file: &str) -> ProgramIdentity {
    let script = Path::new(source_file)
        .file_name()
        .map_or_else(|| source_file.to_string(), |name| name.to_string_lossy().into_owned());
    ProgramIdentity::new(NEF_PIPELINES, NEF_PIPELINES_VERSION, script)
}

/// Read the piped document, or start a new one named `entry_name` when there is no input
///
/// Piped input that is empty or only whitespace also starts a new document.
pub fn read_or_create_entry(ctx: &Context<'_>, pipe: Option<&Path>, entry_name: Option<&str>) -> Result<Entry> {
    let text = match select_input(ctx.cache, pipe, &ctx.policy, ctx.env)? {
        Some(mut reader) => reader.read_to_string().unwrap_or_else(|never| match never {}),
        None => String::new(),
    };

    if text.trim().is_empty() {
        let name = entry_name.unwrap_or(&ctx.entry_name);
        debug!(entry = name, "no input document, starting a new entry");
        return Ok(Entry::from_scratch(name));
    }
    Ok(star::parse(&text)?)
}

/// Read the piped document, failing when there is none
pub fn read_entry(ctx: &Context<'_>, pipe: Option<&Path>) -> Result<Entry> {
    let mut reader = require_input(ctx.cache, pipe, &ctx.policy, ctx.env)?;
    let text = reader.read_to_string().unwrap_or_else(|never| match never {});
    Ok(star::parse(&text)?)
}

/// Stamp `entry`, then add `frames`, replacing same-named frames
///
/// A new metadata frame therefore leads the document.
pub fn stamp_and_add_frames(
    entry: &mut Entry,
    frames: Vec<SaveFrame>,
    identity: &ProgramIdentity,
    clock: &dyn Clock,
) -> Result<()> {
    match stamp(entry, identity, clock)? {
        StampOutcome::Created => info!(entry = %entry.entry_id, "header created"),
        StampOutcome::Appended { run_number } => info!(entry = %entry.entry_id, run_number, "run history extended"),
    }
    for frame in frames {
        entry.add_frame(frame);
    }
    Ok(())
}

/// The STAR text a stage writes to stdout
pub fn emit(entry: &Entry) -> String {
    star::write(entry)
}
