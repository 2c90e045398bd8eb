//! npm Package Manager
//!
//! Installs and removes the OneAgent module in the service directory.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::debug;

use crate::error::PluginResult;
use crate::runtime::adapter::{Invocation, LineSink, ProcessRunner};

/// Package manager executable
pub const NPM_PROGRAM: &str = "npm";

/// npm commands run through a ProcessRunner
pub struct PackageManager<R: ProcessRunner> {
    runner: Arc<R>,
}

impl<R: ProcessRunner> PackageManager<R> {
    pub fn new(runner: Arc<R>) -> Self {
        Self { runner }
    }

    fn invocation(command: &str, module: &str, cwd: &Path) -> Invocation {
        Invocation::new(NPM_PROGRAM)
            .arg(command)
            .arg(module)
            .current_dir(cwd)
    }

    /// Locate the npm executable
    pub fn setup(&self, cwd: &Path) -> PluginResult<PathBuf> {
        let npm = self.runner.locate(&Invocation::new(NPM_PROGRAM).current_dir(cwd))?;
        debug!(npm = %npm.display(), "npm located");
        Ok(npm)
    }

    /// `npm install <module>`
    pub async fn install(&self, module: &str, cwd: &Path, on_line: &LineSink) -> PluginResult<()> {
        self.runner
            .run(&Self::invocation("install", module, cwd), on_line)
            .await
    }

    /// `npm uninstall <module>`
    pub async fn uninstall(
        &self,
        module: &str,
        cwd: &Path,
        on_line: &LineSink,
    ) -> PluginResult<()> {
        self.runner
            .run(&Self::invocation("uninstall", module, cwd), on_line)
            .await
    }
}
