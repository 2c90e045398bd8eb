//! Process Runner Trait
//!
//! Defines the interface used to run external executables (npm and the
//! OneAgent tailoring script).

use async_trait::async_trait;
use std::fmt;
use std::path::PathBuf;

use crate::error::PluginResult;

/// Receives each line a child process writes to stdout or stderr
pub type LineSink = dyn Fn(&str) + Send + Sync;

/// A single executable invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    /// Executable name or path (relative paths resolve against `cwd`)
    pub program: String,
    pub args: Vec<String>,
    pub cwd: Option<PathBuf>,
}

impl Invocation {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            cwd: None,
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn current_dir(mut self, cwd: impl Into<PathBuf>) -> Self {
        self.cwd = Some(cwd.into());
        self
    }
}

impl fmt::Display for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            write!(f, " {}", arg)?;
        }
        Ok(())
    }
}

/// Process runner trait - runs executables to completion
#[async_trait]
pub trait ProcessRunner: Send + Sync {
    /// Resolve the executable of `invocation` without starting it
    fn locate(&self, invocation: &Invocation) -> PluginResult<PathBuf>;

    /// Run `invocation` to completion, streaming its output to `on_line`.
    ///
    /// Fails with `ExecutableNotFound` before spawning anything when the
    /// executable cannot be located, and with `ProcessFailed` on a non-zero
    /// exit.
    async fn run(&self, invocation: &Invocation, on_line: &LineSink) -> PluginResult<()>;
}
