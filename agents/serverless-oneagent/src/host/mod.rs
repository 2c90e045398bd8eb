//! Host module
//!
//! Interfaces of the deployment tool that loads and drives this plugin. The
//! host owns all of this state; the plugin only reads and mutates it while a
//! lifecycle event is being handled.

pub mod console;
pub mod plugins;
pub mod service;

use std::path::PathBuf;

use plugins::PluginManager;
use service::ServiceDefinition;

/// Provider this plugin supports
pub const SUPPORTED_PROVIDER: &str = "aws";

/// Host state handed to the plugin on construction and on every event
#[derive(Clone, Default)]
pub struct Host {
    /// Service definition, mutated in place by the plugin
    pub service: ServiceDefinition,

    /// Live plugin instances
    pub plugin_manager: PluginManager,

    /// Directory of the service (where `node_modules` lives)
    pub service_path: PathBuf,
}

impl Host {
    pub fn new(service: ServiceDefinition, service_path: impl Into<PathBuf>) -> Self {
        Self {
            service,
            plugin_manager: PluginManager::new(),
            service_path: service_path.into(),
        }
    }
}
