//! Plugin Errors
//!
//! Error taxonomy for the injection pipelines. Whether an error aborts the
//! deployment or only degrades the package is decided by the pipeline that
//! receives it, not by the variant itself.

use std::path::PathBuf;

/// All errors that can occur while injecting the OneAgent into a deployment
#[derive(Debug, thiserror::Error)]
pub enum PluginError {
    /// The provider runtime does not match `nodejs<major>.<minor>`
    #[error("unsupported Lambda runtime '{0}'")]
    UnsupportedRuntime(String),

    /// The provider does not declare a runtime at all
    #[error("no Lambda runtime configured for provider")]
    MissingRuntime,

    /// The executable to run could not be located
    #[error("executable not found: {}", .0.display())]
    ExecutableNotFound(PathBuf),

    /// The child process could not be started
    #[error("failed to spawn '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// The child process exited unsuccessfully
    #[error("'{program}' exited unsuccessfully (code: {code:?}, signal: {signal:?})")]
    ProcessFailed {
        program: String,
        code: Option<i32>,
        signal: Option<i32>,
    },

    /// Installing the OneAgent module failed
    #[error("npm install of '{module}' failed: {source}")]
    InstallFailed {
        module: String,
        #[source]
        source: Box<PluginError>,
    },

    /// Removing the OneAgent module failed
    #[error("npm uninstall of '{module}' failed: {source}")]
    UninstallFailed {
        module: String,
        #[source]
        source: Box<PluginError>,
    },

    /// The bundler plugin instance or its compilation outputs are unusable
    #[error("bundler compilation outputs unavailable: {0}")]
    BundlerOutputsUnavailable(String),

    /// Generic I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type PluginResult<T> = Result<T, PluginError>;
