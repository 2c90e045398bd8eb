//! Deploy Pipelines
//!
//! Pre- and post-processing of a deployment for both packaging modes.
//!
//! Plain packaging installs the OneAgent module into the service directory
//! before serverless creates the artifacts and removes it again afterwards.
//! Bundled packaging lets serverless-webpack install and bundle the module and
//! only tailors the bundled copies.

use futures_util::future::join_all;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::agent::environment::inject_environment;
use crate::agent::handler::rewrite_handlers;
use crate::agent::tailor::tailor_invocation;
use crate::cli::config::Config;
use crate::error::{PluginError, PluginResult};
use crate::host::console::PluginLogger;
use crate::host::plugins::PluginManager;
use crate::host::service::ServiceDefinition;
use crate::host::Host;
use crate::runtime::adapter::ProcessRunner;
use crate::runtime::npm::PackageManager;

macro_rules! size_penalty {
    () => {
        "things will work, but zip package will contain files not needed for selected Node.js runtime version"
    };
}

/// Appended to tailoring failures in plain packaging
pub const SIZE_PENALTY_MSG: &str = size_penalty!();

/// Reported whenever tailoring had to be skipped or failed
pub const CANNOT_TAILOR_MSG: &str = concat!(
    "could not determine serverless-webpack intermediate files to tailor OneAgent npm module (",
    size_penalty!(),
    ")"
);

/// Deploy pipeline for injecting the OneAgent module
pub struct DeployPipeline<R: ProcessRunner> {
    config: Config,
    runner: Arc<R>,
    npm: PackageManager<R>,
    log: PluginLogger,
}

impl<R: ProcessRunner> DeployPipeline<R> {
    /// Create a new deploy pipeline
    pub fn new(config: Config, runner: Arc<R>, log: PluginLogger) -> Self {
        Self {
            npm: PackageManager::new(runner.clone()),
            config,
            runner,
            log,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Plain packaging, before artifact creation:
    /// install the module, tailor it in place, set the environment.
    pub async fn pre_process_plain(&self, host: &mut Host) -> PluginResult<()> {
        info!(service_path = %host.service_path.display(), "Starting plain pre-processing");

        // Step 1: install, aborts the deployment on failure
        self.install_module(&host.service_path).await?;

        // Step 2: tailor, only costs package size on failure
        let runtime = host.service.provider.runtime.clone();
        match self.tailor_module(runtime.as_deref(), &host.service_path).await {
            Ok(()) => {}
            Err(PluginError::MissingRuntime) => {
                warn!("No runtime configured, skipping tailoring");
                self.log.log(CANNOT_TAILOR_MSG);
            }
            Err(e) => {
                warn!(error = %e, "Tailoring failed, continuing with untailored module");
                self.log.log(&format!(
                    "tailoring OneAgent module failed: {} ({})",
                    e, SIZE_PENALTY_MSG
                ));
            }
        }

        // Step 3: environment
        inject_environment(&self.config, &mut host.service, &self.log);

        debug!("Plain pre-processing finished");
        Ok(())
    }

    /// Plain packaging, after artifact creation:
    /// rewrite handlers, then remove the module from the service directory.
    pub async fn post_process_plain(&self, host: &mut Host) -> PluginResult<()> {
        let rewritten = rewrite_handlers(&mut host.service, &self.log);
        debug!(rewritten, "Handlers rewritten");

        if let Err(e) = self.uninstall_module(&host.service_path).await {
            warn!(error = %e, "Failed to remove OneAgent module from service directory");
        }

        Ok(())
    }

    /// Bundled packaging, before validation:
    /// force-include the module in the bundle, set the environment.
    pub async fn pre_process_bundled(&self, host: &mut Host) -> PluginResult<()> {
        self.prepare_bundler(&mut host.service);
        Ok(())
    }

    /// Make serverless-webpack install and bundle the module and set the
    /// environment
    pub fn prepare_bundler(&self, service: &mut ServiceDefinition) {
        let module = self.config.qualified_module_name();
        if service.ensure_force_include(&module) {
            self.log.verbose(&format!(
                "adding '{}' to custom.webpack.includeModules.forceInclude",
                module
            ));
        }

        inject_environment(&self.config, service, &self.log);
    }

    /// Bundled packaging, after external modules were packed:
    /// tailor every compilation output concurrently, then rewrite handlers.
    pub async fn post_process_bundled(&self, host: &mut Host) -> PluginResult<()> {
        let runtime = host.service.provider.runtime.clone();

        let tailored = match Self::tailoring_targets(&host.plugin_manager) {
            Ok(targets) => {
                let results = join_all(
                    targets
                        .iter()
                        .map(|dir| self.tailor_module(runtime.as_deref(), dir)),
                )
                .await;

                let failures: Vec<PluginError> =
                    results.into_iter().filter_map(Result::err).collect();
                for e in &failures {
                    warn!(error = %e, "Tailoring of a compilation output failed");
                    self.log.verbose(&format!("tailoring OneAgent module failed: {}", e));
                }
                failures.is_empty()
            }
            Err(e) => {
                debug!(error = %e, "Skipping tailoring");
                false
            }
        };

        if !tailored {
            self.log.log(CANNOT_TAILOR_MSG);
        }

        let rewritten = rewrite_handlers(&mut host.service, &self.log);
        debug!(rewritten, "Handlers rewritten");
        Ok(())
    }

    /// Output directories of the bundler's last build. Fails if the bundler is
    /// not loaded, reported no outputs, or any output has no directory.
    fn tailoring_targets(plugins: &PluginManager) -> PluginResult<Vec<PathBuf>> {
        let bundler = plugins.find_bundler().ok_or_else(|| {
            PluginError::BundlerOutputsUnavailable("bundler plugin instance not found".to_string())
        })?;

        let outputs = bundler
            .compilation_outputs()
            .filter(|outputs| !outputs.is_empty())
            .ok_or_else(|| {
                PluginError::BundlerOutputsUnavailable("no compilation outputs".to_string())
            })?;

        outputs
            .into_iter()
            .map(|output| {
                output.output_directory_path.ok_or_else(|| {
                    PluginError::BundlerOutputsUnavailable(
                        "compilation output without output path".to_string(),
                    )
                })
            })
            .collect()
    }

    /// Strip native extensions not matching `runtime` from the module
    /// installed below `module_root`
    pub async fn tailor_module(&self, runtime: Option<&str>, module_root: &Path) -> PluginResult<()> {
        self.log.log(&format!(
            "tailoring OneAgent module in {}",
            module_root.display()
        ));

        let invocation = tailor_invocation(runtime, module_root)?;
        self.log.verbose(&format!("executing {}", invocation));

        let log = self.log.clone();
        let sink = move |line: &str| log.verbose(line);
        self.runner.run(&invocation, &sink).await?;

        self.log.verbose("tailoring OneAgent module succeeded");
        Ok(())
    }

    /// `npm install` the OneAgent module into `service_path`
    pub async fn install_module(&self, service_path: &Path) -> PluginResult<()> {
        let module = self.config.qualified_module_name();
        let wrap = |source: PluginError| PluginError::InstallFailed {
            module: module.clone(),
            source: Box::new(source),
        };

        if let Err(e) = self.npm.setup(service_path) {
            self.log.log(&format!("npm load failed: {}", e));
            return Err(wrap(e));
        }
        self.log.verbose("npm setup");

        self.log.log("Installing Dynatrace oneagent npm module");
        let log = self.log.clone();
        let sink = move |line: &str| log.verbose(line);

        match self.npm.install(&module, service_path, &sink).await {
            Ok(()) => {
                self.log.verbose("npm install succeeded");
                Ok(())
            }
            Err(e) => {
                self.log.log(&format!("npm install failed: {}", e));
                Err(wrap(e))
            }
        }
    }

    /// `npm uninstall` the OneAgent module from `service_path`
    pub async fn uninstall_module(&self, service_path: &Path) -> PluginResult<()> {
        let module = self.config.qualified_module_name();

        self.log.log("Uninstalling Dynatrace oneagent npm module");
        let log = self.log.clone();
        let sink = move |line: &str| log.verbose(line);

        match self.npm.uninstall(&module, service_path, &sink).await {
            Ok(()) => {
                self.log.verbose("npm uninstall succeeded");
                Ok(())
            }
            Err(e) => {
                self.log.log(&format!("npm uninstall failed: {}", e));
                Err(PluginError::UninstallFailed {
                    module,
                    source: Box::new(e),
                })
            }
        }
    }
}
