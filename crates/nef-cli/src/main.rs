//! NEF-Pipelines CLI - pipeline stages for NMR exchange format streams.

use clap::Parser;
use nef_cli::cli::{FastaCommand, FastaImport, FramesCommand};
use nef_cli::error::render_report;
use nef_cli::{commands, logging, Cli, CliError, Command, Config, Context, Formatter, EXIT_ERROR};
use nef_domain::SystemClock;
use nef_io::{ProcessEnvironment, StreamCache};
use std::io::Write;

fn main() {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    let config = match Config::resolve(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => exit_with_error(&e, cli.verbose),
    };

    let show_causes = cli.verbose || config.settings.show_backtrace;
    if let Err(e) = run(cli, &config) {
        exit_with_error(&e, show_causes);
    }
}

fn run(cli: Cli, config: &Config) -> nef_cli::Result<()> {
    let cache = StreamCache::new();
    let ctx = Context::new(&cache, config, &ProcessEnvironment, &SystemClock);

    // Determine color setting
    let color_enabled = !cli.no_color && config.settings.color;

    let output = match cli.command {
        Command::Header(args) => commands::execute_header(args, &ctx)?,
        Command::Fasta {
            command: FastaCommand::Import {
                command: FastaImport::Sequence(args),
            },
        } => commands::execute_fasta_sequence(args, &ctx)?,
        Command::Frames {
            command: FramesCommand::List(args),
        } => {
            let format = args.format.map(Into::into).unwrap_or(config.settings.format);
            let formatter = Formatter::new(format, color_enabled);
            commands::execute_frames_list(args, &ctx, &formatter)?
        }
    };

    // written once the command has succeeded so a failed stage emits nothing
    let mut stdout = std::io::stdout().lock();
    stdout.write_all(output.as_bytes())?;
    if !output.ends_with('\n') {
        stdout.write_all(b"\n")?;
    }
    stdout.flush()?;
    Ok(())
}

fn exit_with_error(error: &CliError, show_causes: bool) -> ! {
    eprint!("{}", render_report(error, show_causes));
    std::process::exit(EXIT_ERROR);
}
