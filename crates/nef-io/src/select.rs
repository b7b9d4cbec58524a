//! Input selection for pipeline stages
//!
//! A stage reads from an explicit pipe file when one is given, otherwise from
//! stdin when something is piped into it. An interactive terminal is never
//! waited on.

use crate::adapter::StringIteratorReader;
use crate::cache::{CachedLinesIter, SourceId, SourceOpener, StreamCache};
use crate::error::{IoError, Result};
use std::io::IsTerminal;
use std::path::Path;
use tracing::debug;

/// Reader handed to a stage: the adapter over a cached source
pub type PipeReader = StringIteratorReader<CachedLinesIter>;

/// Path meaning "standard input" when given as a pipe file
pub const STDIN_PATH: &str = "-";

/// What the selector needs to know about the running process
pub trait Environment {
    /// Whether stdin is attached to a terminal
    fn stdin_is_terminal(&self) -> bool;

    /// Whether an environment variable is set
    fn has_var(&self, name: &str) -> bool;
}

/// The real process environment
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnvironment;

impl Environment for ProcessEnvironment {
    fn stdin_is_terminal(&self) -> bool {
        std::io::stdin().is_terminal()
    }

    fn has_var(&self, name: &str) -> bool {
        std::env::var_os(name).is_some()
    }
}

/// Input selection settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputPolicy {
    /// Variables set by debugging hosts that misreport stdin as piped
    pub interactive_host_vars: Vec<String>,
}

impl Default for InputPolicy {
    fn default() -> Self {
        Self {
            interactive_host_vars: vec!["PYCHARM_HOSTED".to_string()],
        }
    }
}

impl InputPolicy {
    /// Whether the process runs under one of the interactive hosts
    pub fn in_interactive_host(&self, env: &dyn Environment) -> bool {
        self.interactive_host_vars.iter().any(|name| env.has_var(name))
    }
}

/// Choose a stage's input
///
/// In order: a non-empty `pipe` path (`-` meaning stdin), then stdin if it is
/// not a terminal and no interactive host is detected. Returns `Ok(None)` when
/// no input is available.
pub fn select_input<O: SourceOpener>(
    cache: &StreamCache<O>,
    pipe: Option<&Path>,
    policy: &InputPolicy,
    env: &dyn Environment,
) -> Result<Option<PipeReader>> {
    let id = match pipe.filter(|path| !path.as_os_str().is_empty()) {
        Some(path) if path == Path::new(STDIN_PATH) => SourceId::Stdin,
        Some(path) => SourceId::file(path),
        None if env.stdin_is_terminal() => {
            debug!("stdin is a terminal, no input selected");
            return Ok(None);
        }
        None if policy.in_interactive_host(env) => {
            debug!("interactive host detected, stdin ignored");
            return Ok(None);
        }
        None => SourceId::Stdin,
    };

    debug!(source = %id, "input selected");
    let lines = cache.lines(&id)?;
    Ok(Some(StringIteratorReader::new(lines)))
}

/// Choose a stage's input, treating "no input" as an error
pub fn require_input<O: SourceOpener>(
    cache: &StreamCache<O>,
    pipe: Option<&Path>,
    policy: &InputPolicy,
    env: &dyn Environment,
) -> Result<PipeReader> {
    match select_input(cache, pipe, policy, env) {
        Ok(Some(reader)) => Ok(reader),
        Ok(None) => Err(IoError::NoInputAvailable),
        Err(e) => Err(IoError::InputFailed(Box::new(e))),
    }
}
