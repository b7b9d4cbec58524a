//! NEF-Pipelines CLI library.
//!
//! This library provides the core functionality for the `nef` command-line tool,
//! including configuration management, the read-stamp-emit pipeline shared by
//! all commands, the transcoders themselves, and output formatting.

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod fasta;
pub mod logging;
pub mod output;
pub mod pipeline;

pub use cli::{Cli, Command};
pub use config::Config;
pub use error::{CliError, Result, EXIT_ERROR};
pub use output::Formatter;
pub use pipeline::Context;
