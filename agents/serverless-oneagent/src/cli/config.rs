//! Configuration module
//!
//! Merges the `custom.serverless-oneagent` block of the service definition with
//! command line overrides into one immutable plugin configuration.

use serde::{Deserialize, Serialize};

/// Name of the OneAgent npm module
pub const ONEAGENT_MODULE: &str = "@dynatrace/oneagent";

/// Options accepted in the service definition
///
/// ```yaml
/// custom:
///   serverless-oneagent:
///     npmModuleVersion: next
///     options: '{"server":"...","tenant":"...","tenanttoken":"..."}'
///     debug: true
///     verbose: true
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PluginYamlConfig {
    /// Version tag of the OneAgent npm module (e.g. `next`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub npm_module_version: Option<String>,

    /// Opaque OneAgent option string
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<String>,

    /// Set `DEBUG=dynatrace` in the deployed function
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub debug: Option<bool>,

    /// Verbose output for this plugin only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub verbose: Option<bool>,
}

/// Command line options as handed over by the host
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandLineOptions {
    #[serde(default)]
    pub v: Option<bool>,

    #[serde(default)]
    pub verbose: Option<bool>,

    #[serde(default, rename = "dt-oneagent-options")]
    pub oneagent_options: Option<String>,

    #[serde(default, rename = "dt-debug")]
    pub debug: Option<bool>,

    #[serde(default, rename = "dt-oneagent-module-version")]
    pub module_version: Option<String>,
}

/// Resolved plugin configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Config {
    /// Extended logging of plugin operations
    pub verbose: bool,

    /// Set `DEBUG=dynatrace` in the deployed function
    pub debug: bool,

    /// OneAgent npm module version tag
    pub npm_module_version: Option<String>,

    /// OneAgent option string, empty when not configured
    pub agent_options: String,
}

fn flag(value: Option<bool>) -> Option<bool> {
    value.filter(|v| *v)
}

fn text(value: Option<&String>) -> Option<&String> {
    value.filter(|v| !v.is_empty())
}

impl Config {
    /// Resolve the configuration field by field: command line, then service
    /// definition, then default. Unset, `false` and empty values all count as
    /// absent.
    pub fn resolve(yaml: Option<&PluginYamlConfig>, options: Option<&CommandLineOptions>) -> Self {
        let default_yaml = PluginYamlConfig::default();
        let default_options = CommandLineOptions::default();
        let yaml = yaml.unwrap_or(&default_yaml);
        let options = options.unwrap_or(&default_options);

        let verbose = flag(options.verbose)
            .or(flag(options.v))
            .or(flag(yaml.verbose))
            .unwrap_or(false);

        let debug = flag(options.debug).or(flag(yaml.debug)).unwrap_or(false);

        let agent_options = text(options.oneagent_options.as_ref())
            .or(text(yaml.options.as_ref()))
            .cloned()
            .unwrap_or_default();

        let npm_module_version = text(options.module_version.as_ref())
            .or(text(yaml.npm_module_version.as_ref()))
            .cloned();

        Self {
            verbose,
            debug,
            npm_module_version,
            agent_options,
        }
    }

    /// Module specifier passed to npm, e.g. `@dynatrace/oneagent@next`
    pub fn qualified_module_name(&self) -> String {
        match &self.npm_module_version {
            Some(version) => format!("{}@{}", ONEAGENT_MODULE, version),
            None => ONEAGENT_MODULE.to_string(),
        }
    }
}
