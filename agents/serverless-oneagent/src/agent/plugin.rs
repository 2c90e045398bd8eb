//! OneAgent Plugin
//!
//! The object the host loads. On construction it resolves its configuration,
//! determines the deployment mode if the plugin list is already known, and
//! registers its lifecycle hooks. The host then calls `fire` for every event.

use std::sync::Arc;
use tracing::debug;

use crate::agent::deploy::DeployPipeline;
use crate::agent::hooks::{HookBinding, HookRegistry, Stage};
use crate::agent::state::{DeploymentMode, DeploymentModeState};
use crate::cli::config::{CommandLineOptions, Config};
use crate::error::PluginResult;
use crate::host::console::{HostConsole, PluginLogger};
use crate::host::{Host, SUPPORTED_PROVIDER};
use crate::runtime::adapter::ProcessRunner;

/// Serverless plugin injecting the Dynatrace OneAgent into the deployment
pub struct OneAgentPlugin<R: ProcessRunner> {
    pipeline: DeployPipeline<R>,
    mode: DeploymentModeState,
    hooks: HookRegistry,
    log: PluginLogger,
}

impl<R: ProcessRunner> OneAgentPlugin<R> {
    /// Create the plugin for `host`
    pub fn new(
        host: &mut Host,
        options: &CommandLineOptions,
        runner: Arc<R>,
        console: Arc<dyn HostConsole>,
    ) -> Self {
        let config = Config::resolve(host.service.oneagent_config(), Some(options));
        let log = PluginLogger::new(console, config.verbose);

        let provider = &host.service.provider.name;
        if !provider.is_empty() && provider != SUPPORTED_PROVIDER {
            log.log(&format!(
                "provider '{}' is not supported, only '{}' functions can be instrumented",
                provider, SUPPORTED_PROVIDER
            ));
        }

        let plugin = Self {
            pipeline: DeployPipeline::new(config, runner, log.clone()),
            mode: DeploymentModeState::new(),
            hooks: HookRegistry::packaging(),
            log,
        };

        if host.service.plugins.is_some() {
            plugin.ensure_mode(host);
        } else {
            debug!("Plugin list not loaded yet, deferring deployment mode detection");
        }

        // serverless-webpack reads its configuration before the first hook fires
        if plugin.mode() == DeploymentMode::BundledPackaging {
            plugin.pipeline.prepare_bundler(&mut host.service);
        }

        for binding in plugin.hooks.bindings() {
            plugin.log.verbose(&format!(
                "installing listener for '{}' in context of {}",
                binding.event, binding.scope
            ));
        }

        plugin
    }

    pub fn config(&self) -> &Config {
        self.pipeline.config()
    }

    pub fn mode(&self) -> DeploymentMode {
        self.mode.current()
    }

    /// Registered hook bindings
    pub fn hooks(&self) -> &[HookBinding] {
        self.hooks.bindings()
    }

    /// Whether a hook is registered for `event`
    pub fn handles(&self, event: &str) -> bool {
        self.hooks.get(event).is_some()
    }

    /// Resolve the deployment mode if still undetermined
    fn ensure_mode(&self, host: &Host) -> DeploymentMode {
        let plugins = host.service.plugins.as_deref().unwrap_or_default();
        let (mode, resolved) = self.mode.resolve(plugins);
        if resolved {
            self.log.verbose(&format!("switching to '{}' mode", mode));
        }
        mode
    }

    /// Handle a host lifecycle event. Returns whether a pipeline stage ran.
    pub async fn fire(&self, event: &str, host: &mut Host) -> PluginResult<bool> {
        let Some(binding) = self.hooks.get(event) else {
            debug!(event = %event, "No listener registered");
            return Ok(false);
        };

        let mode = self.ensure_mode(host);
        if !binding.scope.applies_to(mode) {
            debug!(event = %event, mode = %mode, scope = %binding.scope, "Hook out of scope");
            return Ok(false);
        }

        self.log.verbose(&format!("executing event '{}'", event));
        debug!(event = %event, stage = %binding.stage, "Running pipeline stage");

        match binding.stage {
            Stage::PlainPreProcess => self.pipeline.pre_process_plain(host).await?,
            Stage::PlainPostProcess => self.pipeline.post_process_plain(host).await?,
            Stage::BundledPreProcess => self.pipeline.pre_process_bundled(host).await?,
            Stage::BundledPostProcess => self.pipeline.post_process_bundled(host).await?,
        }

        Ok(true)
    }
}
