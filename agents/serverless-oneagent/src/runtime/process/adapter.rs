//! Tokio Process Adapter
//!
//! Implementation of ProcessRunner on top of `tokio::process`.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::process::{ExitStatus, Stdio};
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::Command;
use tracing::{debug, warn};

use crate::error::{PluginError, PluginResult};
use crate::runtime::adapter::{Invocation, LineSink, ProcessRunner};

/// Runs executables as child processes of the host
#[derive(Debug, Default, Clone)]
pub struct TokioProcessRunner;

impl TokioProcessRunner {
    pub fn new() -> Self {
        Self
    }

    fn exit_signal(status: &ExitStatus) -> Option<i32> {
        #[cfg(unix)]
        {
            use std::os::unix::process::ExitStatusExt;
            status.signal()
        }
        #[cfg(not(unix))]
        {
            let _ = status;
            None
        }
    }
}

/// Forward every line of `reader` to `on_line` until EOF
async fn pump<R>(reader: Option<R>, program: &str, on_line: &LineSink)
where
    R: AsyncRead + Unpin,
{
    let Some(reader) = reader else {
        return;
    };

    let mut lines = BufReader::new(reader).lines();
    loop {
        match lines.next_line().await {
            Ok(Some(line)) => on_line(&line),
            Ok(None) => break,
            Err(e) => {
                warn!(program = %program, error = %e, "Failed to read process output");
                break;
            }
        }
    }
}

#[async_trait]
impl ProcessRunner for TokioProcessRunner {
    fn locate(&self, invocation: &Invocation) -> PluginResult<PathBuf> {
        let program = Path::new(&invocation.program);

        // bare names are looked up on PATH, anything else is a file path
        if program.components().count() == 1 && !program.is_absolute() {
            return which::which(program)
                .map_err(|_| PluginError::ExecutableNotFound(program.to_path_buf()));
        }

        let resolved = match &invocation.cwd {
            Some(cwd) if program.is_relative() => cwd.join(program),
            _ => program.to_path_buf(),
        };

        if !resolved.is_file() {
            return Err(PluginError::ExecutableNotFound(resolved));
        }

        // the child resolves a relative program against its own working
        // directory, so hand it the path that was checked here
        Ok(std::path::absolute(&resolved)?)
    }

    async fn run(&self, invocation: &Invocation, on_line: &LineSink) -> PluginResult<()> {
        let executable = self.locate(invocation)?;
        debug!(
            program = %executable.display(),
            args = ?invocation.args,
            "Spawning process"
        );

        let mut command = Command::new(&executable);
        command
            .args(&invocation.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        if let Some(cwd) = &invocation.cwd {
            command.current_dir(cwd);
        }

        #[cfg(windows)]
        {
            const CREATE_NO_WINDOW: u32 = 0x0800_0000;
            command.creation_flags(CREATE_NO_WINDOW);
        }

        let mut child = command.spawn().map_err(|source| PluginError::Spawn {
            program: invocation.program.clone(),
            source,
        })?;

        let stdout = child.stdout.take();
        let stderr = child.stderr.take();

        let (_, _, status) = tokio::join!(
            pump(stdout, &invocation.program, on_line),
            pump(stderr, &invocation.program, on_line),
            child.wait(),
        );
        let status = status?;

        if status.success() {
            debug!(program = %invocation.program, "Process exited successfully");
            Ok(())
        } else {
            Err(PluginError::ProcessFailed {
                program: invocation.program.clone(),
                code: status.code(),
                signal: Self::exit_signal(&status),
            })
        }
    }
}
