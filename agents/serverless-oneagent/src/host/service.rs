//! Service Definition
//!
//! Typed view of the parts of the host's service definition this plugin reads
//! and mutates: provider environment, function handlers, the plugin list and
//! the `custom` blocks of this plugin and of serverless-webpack.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

use crate::cli::config::PluginYamlConfig;

/// Provider section of the service definition
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Provider {
    /// Provider name (e.g. `aws`)
    #[serde(default)]
    pub name: String,

    /// Lambda runtime identifier (e.g. `nodejs14.x`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub runtime: Option<String>,

    /// Environment variables of all deployed functions
    #[serde(default)]
    pub environment: BTreeMap<String, String>,
}

/// A deployed function
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionDescriptor {
    /// Entry point in `module.exportedSymbol` form
    pub handler: String,
}

/// `custom.webpack` block read by serverless-webpack
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WebpackConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub include_modules: Option<IncludeModules>,
}

/// `custom.webpack.includeModules` block
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IncludeModules {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub force_include: Option<Vec<String>>,
}

/// `custom` section of the service definition
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Custom {
    #[serde(
        default,
        rename = "serverless-oneagent",
        skip_serializing_if = "Option::is_none"
    )]
    pub oneagent: Option<PluginYamlConfig>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub webpack: Option<WebpackConfig>,
}

/// Host-owned service definition
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceDefinition {
    /// Active plugin identifiers, `None` while the host has not loaded them yet
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plugins: Option<Vec<String>>,

    #[serde(default)]
    pub provider: Provider,

    #[serde(default)]
    pub functions: BTreeMap<String, FunctionDescriptor>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom: Option<Custom>,
}

impl ServiceDefinition {
    /// Load a service manifest from a TOML file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read service manifest: {}", path.display()))?;

        let service: ServiceDefinition = toml::from_str(&content)
            .with_context(|| format!("Failed to parse service manifest: {}", path.display()))?;

        Ok(service)
    }

    /// Render the service manifest as TOML
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).context("Failed to serialize service manifest")
    }

    /// Save the service manifest to a TOML file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = self.to_toml()?;

        std::fs::write(path.as_ref(), content).with_context(|| {
            format!("Failed to write service manifest: {}", path.as_ref().display())
        })?;

        Ok(())
    }

    /// This plugin's block of the `custom` section, if any
    pub fn oneagent_config(&self) -> Option<&PluginYamlConfig> {
        self.custom.as_ref().and_then(|c| c.oneagent.as_ref())
    }

    /// Current `custom.webpack.includeModules.forceInclude` list, if any
    pub fn force_include(&self) -> Option<&[String]> {
        self.custom
            .as_ref()
            .and_then(|c| c.webpack.as_ref())
            .and_then(|w| w.include_modules.as_ref())
            .and_then(|m| m.force_include.as_deref())
    }

    /// Force-include list, created along with every missing intermediate block
    pub fn force_include_mut(&mut self) -> &mut Vec<String> {
        self.custom
            .get_or_insert_with(Custom::default)
            .webpack
            .get_or_insert_with(WebpackConfig::default)
            .include_modules
            .get_or_insert_with(IncludeModules::default)
            .force_include
            .get_or_insert_with(Vec::new)
    }

    /// Add `module` to the force-include list unless it is already present.
    /// Returns true if the list changed.
    pub fn ensure_force_include(&mut self, module: &str) -> bool {
        let list = self.force_include_mut();
        if list.iter().any(|m| m == module) {
            return false;
        }
        list.push(module.to_string());
        true
    }

    /// Set a provider-wide environment variable
    pub fn set_environment(&mut self, key: &str, value: &str) {
        self.provider
            .environment
            .insert(key.to_string(), value.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_force_include_created_when_absent() {
        let mut service = ServiceDefinition::default();
        assert!(service.force_include().is_none());

        assert!(service.ensure_force_include("@dynatrace/oneagent"));
        assert_eq!(
            service.force_include(),
            Some(&["@dynatrace/oneagent".to_string()][..])
        );
    }

    #[test]
    fn test_force_include_appends_once() {
        let mut service = ServiceDefinition::default();
        service.force_include_mut().push("lodash".to_string());

        assert!(service.ensure_force_include("@dynatrace/oneagent"));
        assert!(!service.ensure_force_include("@dynatrace/oneagent"));
        assert_eq!(
            service.force_include().unwrap(),
            &["lodash".to_string(), "@dynatrace/oneagent".to_string()]
        );
    }

    #[test]
    fn test_parse_service_manifest() {
        let manifest = r#"
            plugins = ["serverless-webpack", "serverless-oneagent"]

            [provider]
            name = "aws"
            runtime = "nodejs14.x"

            [functions.hello]
            handler = "index.hello"

            [custom.serverless-oneagent]
            npmModuleVersion = "next"
            debug = true

            [custom.webpack.includeModules]
            forceInclude = ["lodash"]
        "#;

        let service: ServiceDefinition = toml::from_str(manifest).unwrap();
        assert_eq!(service.provider.runtime.as_deref(), Some("nodejs14.x"));
        assert_eq!(service.functions["hello"].handler, "index.hello");
        assert_eq!(
            service.oneagent_config().unwrap().npm_module_version.as_deref(),
            Some("next")
        );
        assert_eq!(service.force_include().unwrap(), &["lodash".to_string()]);
        assert_eq!(service.plugins.as_ref().map(Vec::len), Some(2));
    }

    #[test]
    fn test_save_and_reload_keeps_mutations() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("serverless.toml");

        let mut service = ServiceDefinition::default();
        service.provider.name = "aws".to_string();
        service.set_environment("DT_LAMBDA_OPTIONS", r#"{"server":"x"}"#);
        service.ensure_force_include("@dynatrace/oneagent");
        service.save(&path).unwrap();

        assert_eq!(ServiceDefinition::load(&path).unwrap(), service);
    }

    #[test]
    fn test_load_missing_manifest() {
        let err = ServiceDefinition::load("/nonexistent/serverless.toml").unwrap_err();
        assert!(err.to_string().contains("Failed to read service manifest"));
    }
}
