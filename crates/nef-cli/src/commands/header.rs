//! Header command implementation.

use crate::cli::HeaderArgs;
use crate::error::Result;
use crate::pipeline::{self, Context};

/// Execute the header command.
pub fn execute_header(args: HeaderArgs, ctx: &Context<'_>) -> Result<String> {
    let mut entry = pipeline::read_or_create_entry(ctx, args.input.pipe.as_deref(), args.entry_name.as_deref())?;

    pipeline::stamp_and_add_frames(&mut entry, Vec::new(), &pipeline::identity(file!()), ctx.clock)?;

    Ok(pipeline::emit(&entry))
}
