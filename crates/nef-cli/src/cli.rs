//! CLI command definitions and argument parsing.

use clap::{Args, Parser, Subcommand};
use nef_domain::MoleculeType;
use std::path::PathBuf;

/// NEF-Pipelines - read, transform and write NMR exchange format streams.
#[derive(Debug, Parser)]
#[command(name = "nef")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Log debug output and the full cause of any error to stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Configuration file path
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

/// Output format options.
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum CliFormat {
    /// Table format (default)
    Table,
    /// JSON format
    Json,
    /// Quiet format (frame names only)
    Quiet,
}

/// Molecule type of an imported sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum MoleculeTypeArg {
    /// Amino acid sequence
    Protein,
    /// DNA sequence
    Dna,
    /// RNA sequence
    Rna,
}

/// CLI commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Add or update the NEF header and run history
    Header(HeaderArgs),

    /// Read and write FASTA files
    Fasta {
        #[command(subcommand)]
        command: FastaCommand,
    },

    /// Inspect the frames of a NEF stream
    Frames {
        #[command(subcommand)]
        command: FramesCommand,
    },
}

/// FASTA subcommands.
#[derive(Debug, Subcommand)]
pub enum FastaCommand {
    /// Import FASTA data into a NEF stream
    Import {
        #[command(subcommand)]
        command: FastaImport,
    },
}

/// What a FASTA import reads.
#[derive(Debug, Subcommand)]
pub enum FastaImport {
    /// Convert FASTA sequences to a NEF molecular system
    Sequence(SequenceArgs),
}

/// Frame subcommands.
#[derive(Debug, Subcommand)]
pub enum FramesCommand {
    /// List the frames of a NEF stream
    List(ListArgs),
}

/// Where a stage reads its NEF input from.
#[derive(Debug, Clone, Args)]
pub struct InputArgs {
    /// Read NEF data from a file instead of stdin ('-' for stdin)
    #[arg(long, short = 'i', visible_alias = "in")]
    pub pipe: Option<PathBuf>,
}

/// Arguments for the header command.
#[derive(Debug, Args)]
pub struct HeaderArgs {
    #[command(flatten)]
    pub input: InputArgs,

    /// Name of the entry when no input is piped
    #[arg(short, long)]
    pub entry_name: Option<String>,
}

/// Arguments for the fasta import sequence command.
#[derive(Debug, Args)]
pub struct SequenceArgs {
    #[command(flatten)]
    pub input: InputArgs,

    /// Chain codes for the sequences in file order; unused letters A-Z follow
    #[arg(long = "chains", value_delimiter = ',', default_value = "A")]
    pub chain_codes: Vec<String>,

    /// First residue number of each chain
    #[arg(long, value_delimiter = ',', allow_negative_numbers = true)]
    pub starts: Vec<i64>,

    /// Chains whose first residue is not a chain start
    #[arg(long = "no-chain-start", value_delimiter = ',')]
    pub no_chain_starts: Vec<String>,

    /// Chains whose last residue is not a chain end
    #[arg(long = "no-chain-end", value_delimiter = ',')]
    pub no_chain_ends: Vec<String>,

    /// Molecule type of each sequence; a single type applies to all
    #[arg(long = "molecule-type", value_enum, value_delimiter = ',', default_value = "protein")]
    pub molecule_types: Vec<MoleculeTypeArg>,

    /// Ignore NEFPLS chain and start fields in FASTA headers
    #[arg(long)]
    pub no_header: bool,

    /// Name of the entry, defaults to the first sequence's id
    #[arg(short, long)]
    pub entry_name: Option<String>,

    /// FASTA files to read
    #[arg(required = true)]
    pub files: Vec<PathBuf>,
}

/// Arguments for the frames list command.
#[derive(Debug, Args)]
pub struct ListArgs {
    #[command(flatten)]
    pub input: InputArgs,

    /// Output format
    #[arg(short, long, value_enum)]
    pub format: Option<CliFormat>,
}

impl From<CliFormat> for crate::config::OutputFormat {
    fn from(format: CliFormat) -> Self {
        match format {
            CliFormat::Table => crate::config::OutputFormat::Table,
            CliFormat::Json => crate::config::OutputFormat::Json,
            CliFormat::Quiet => crate::config::OutputFormat::Quiet,
        }
    }
}

impl From<MoleculeTypeArg> for MoleculeType {
    fn from(molecule_type: MoleculeTypeArg) -> Self {
        match molecule_type {
            MoleculeTypeArg::Protein => MoleculeType::Protein,
            MoleculeTypeArg::Dna => MoleculeType::Dna,
            MoleculeTypeArg::Rna => MoleculeType::Rna,
        }
    }
}
