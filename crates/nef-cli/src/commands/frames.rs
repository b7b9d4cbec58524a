//! Frames command implementation.

use crate::cli::ListArgs;
use crate::error::Result;
use crate::output::{FrameSummary, Formatter};
use crate::pipeline::{self, Context};

/// Execute the frames list command.
///
/// The input must be present; the listing is not a NEF document and is never stamped.
pub fn execute_frames_list(args: ListArgs, ctx: &Context<'_>, formatter: &Formatter) -> Result<String> {
    let entry = pipeline::read_entry(ctx, args.input.pipe.as_deref())?;
    let frames = FrameSummary::of_entry(&entry);
    formatter.format_frames(&entry.entry_id, &frames)
}
