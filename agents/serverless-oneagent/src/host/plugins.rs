//! Plugin Manager
//!
//! Live plugin instances loaded by the host. The only collaborator this plugin
//! needs to look into is the bundler, which reports where it wrote each
//! compilation.

use std::path::PathBuf;
use std::sync::Arc;

/// Identifier of the serverless-webpack plugin
pub const BUNDLER_PLUGIN: &str = "serverless-webpack";

/// Output of a single bundler compilation pass
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompilationOutput {
    /// Directory the compiler wrote to, when the bundler reports one
    pub output_directory_path: Option<PathBuf>,
}

impl CompilationOutput {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            output_directory_path: Some(path.into()),
        }
    }
}

/// Bundler collaborator as seen from this plugin
pub trait BundlerInstance: Send + Sync {
    /// Compilation outputs of the last build, `None` if no build stats exist
    fn compilation_outputs(&self) -> Option<Vec<CompilationOutput>>;
}

/// A plugin instance loaded by the host
pub trait PluginInstance: Send + Sync {
    /// Plugin identifier as listed in the service definition
    fn identifier(&self) -> &str;

    /// Bundler view of this instance, if it is one
    fn as_bundler(&self) -> Option<&dyn BundlerInstance> {
        None
    }
}

/// Host-owned list of live plugin instances
#[derive(Default, Clone)]
pub struct PluginManager {
    plugins: Vec<Arc<dyn PluginInstance>>,
}

impl PluginManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a plugin instance
    pub fn register(&mut self, plugin: Arc<dyn PluginInstance>) {
        self.plugins.push(plugin);
    }

    /// First live instance that acts as a bundler
    pub fn find_bundler(&self) -> Option<&dyn BundlerInstance> {
        self.plugins.iter().find_map(|p| p.as_bundler())
    }
}

/// Bundler instance with a fixed set of compilation outputs
#[derive(Debug, Clone, Default)]
pub struct StaticBundler {
    outputs: Option<Vec<CompilationOutput>>,
}

impl StaticBundler {
    pub fn new(outputs: Vec<CompilationOutput>) -> Self {
        Self {
            outputs: Some(outputs),
        }
    }

    /// A bundler that has not produced any build stats
    pub fn without_stats() -> Self {
        Self { outputs: None }
    }
}

impl BundlerInstance for StaticBundler {
    fn compilation_outputs(&self) -> Option<Vec<CompilationOutput>> {
        self.outputs.clone()
    }
}

impl PluginInstance for StaticBundler {
    fn identifier(&self) -> &str {
        BUNDLER_PLUGIN
    }

    fn as_bundler(&self) -> Option<&dyn BundlerInstance> {
        Some(self)
    }
}
