//! Serverless OneAgent Library
//!
//! This crate injects the Dynatrace OneAgent into serverless function
//! packages. It hooks into the deployment tool's packaging lifecycle, installs
//! or force-bundles the OneAgent npm module, tailors it to the Lambda runtime,
//! rewrites function handlers and passes agent options through environment
//! variables.

pub mod agent;
pub mod cli;
pub mod error;
pub mod host;
pub mod runtime;

// Re-exports for convenience
pub use agent::hooks::{HookBinding, HookRegistry, Stage};
pub use agent::plugin::OneAgentPlugin;
pub use agent::state::{DeploymentMode, DeploymentModeState, HookScope};
pub use cli::config::{CommandLineOptions, Config, PluginYamlConfig};
pub use error::{PluginError, PluginResult};
pub use host::console::{HostConsole, PluginLogger, TracingConsole};
pub use host::plugins::{BundlerInstance, CompilationOutput, PluginInstance, PluginManager};
pub use host::service::ServiceDefinition;
pub use host::Host;
pub use runtime::adapter::{Invocation, ProcessRunner};
pub use runtime::process::adapter::TokioProcessRunner;
