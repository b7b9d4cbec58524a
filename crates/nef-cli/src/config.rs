//! Configuration management for the CLI.

use crate::error::{CliError, Result};
use nef_io::InputPolicy;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// CLI configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Global settings
    #[serde(default)]
    pub settings: Settings,

    /// Input selection settings
    #[serde(default)]
    pub input: InputSettings,
}

/// Global CLI settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Enable colored output
    #[serde(default = "default_true")]
    pub color: bool,

    /// Default output format
    #[serde(default = "default_format")]
    pub format: OutputFormat,

    /// Entry name used when a stage starts a new document
    #[serde(default = "default_entry_name")]
    pub entry_name: String,

    /// Print the cause chain of errors even without --verbose
    #[serde(default)]
    pub show_backtrace: bool,
}

/// Input selection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InputSettings {
    /// Environment variables marking a host that fakes piped stdin
    #[serde(default = "default_interactive_host_vars")]
    pub interactive_host_vars: Vec<String>,
}

/// Output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Table format
    Table,
    /// JSON format
    Json,
    /// Quiet (minimal) format
    Quiet,
}

impl Config {
    /// Get the default configuration file path.
    pub fn path() -> Result<PathBuf> {
        let home = dirs::home_dir().ok_or_else(|| CliError::Config("Could not find home directory".into()))?;
        Ok(home.join(".nef-pipelines").join("config.toml"))
    }

    /// Load configuration from the default path, or defaults if there is no file.
    pub fn load() -> Result<Self> {
        match Self::path() {
            Ok(path) if path.exists() => Self::load_from(&path),
            _ => Ok(Self::default()),
        }
    }

    /// Load configuration from an explicit file, which must exist.
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .map_err(|e| CliError::Config(format!("couldn't read {}: {}", path.display(), e)))?;
        let config: Config = toml::from_str(&contents)?;
        debug!(path = %path.display(), "configuration loaded");
        Ok(config)
    }

    /// Load from `path` when given, otherwise from the default location.
    pub fn resolve(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load_from(path),
            None => Self::load(),
        }
    }

    /// The input selection policy these settings describe.
    pub fn input_policy(&self) -> InputPolicy {
        InputPolicy {
            interactive_host_vars: self.input.interactive_host_vars.clone(),
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            color: true,
            format: OutputFormat::Table,
            entry_name: default_entry_name(),
            show_backtrace: false,
        }
    }
}

impl Default for InputSettings {
    fn default() -> Self {
        Self {
            interactive_host_vars: default_interactive_host_vars(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_format() -> OutputFormat {
    OutputFormat::Table
}

fn default_entry_name() -> String {
    "nef".to_string()
}

fn default_interactive_host_vars() -> Vec<String> {
    InputPolicy::default().interactive_host_vars
}
