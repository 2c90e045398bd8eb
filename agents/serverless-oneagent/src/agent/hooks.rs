//! Event Hooks
//!
//! Table of host lifecycle events this plugin listens to. Each binding names
//! the pipeline stage to run and the deployment mode it is scoped to; the host
//! owns dispatch and calls back through `OneAgentPlugin::fire`.

use serde::Serialize;

use crate::agent::state::{DeploymentMode, HookScope};

pub const BEFORE_CREATE_ARTIFACTS: &str = "before:package:createDeploymentArtifacts";
pub const AFTER_CREATE_ARTIFACTS: &str = "after:package:createDeploymentArtifacts";
pub const BEFORE_VALIDATE: &str = "before:aws:common:validate";
pub const AFTER_PACK_EXTERNAL_MODULES: &str = "after:webpack:package:packExternalModules";

/// Order in which the host emits the events above while packaging
pub const PACKAGE_LIFECYCLE: [&str; 4] = [
    BEFORE_VALIDATE,
    BEFORE_CREATE_ARTIFACTS,
    AFTER_PACK_EXTERNAL_MODULES,
    AFTER_CREATE_ARTIFACTS,
];

/// Pipeline stage run by a hook
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Stage {
    PlainPreProcess,
    PlainPostProcess,
    BundledPreProcess,
    BundledPostProcess,
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Stage::PlainPreProcess => write!(f, "plain pre-processing"),
            Stage::PlainPostProcess => write!(f, "plain post-processing"),
            Stage::BundledPreProcess => write!(f, "bundled pre-processing"),
            Stage::BundledPostProcess => write!(f, "bundled post-processing"),
        }
    }
}

/// A lifecycle event bound to a pipeline stage
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HookBinding {
    pub event: String,
    pub stage: Stage,
    pub scope: HookScope,
}

/// Event name to hook binding table
#[derive(Debug, Clone, Default, Serialize)]
pub struct HookRegistry {
    bindings: Vec<HookBinding>,
}

impl HookRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bindings of the two packaging pipelines
    pub fn packaging() -> Self {
        let plain = HookScope::Only(DeploymentMode::PlainPackaging);
        let bundled = HookScope::Only(DeploymentMode::BundledPackaging);

        let mut registry = Self::new();
        registry.define(BEFORE_CREATE_ARTIFACTS, Stage::PlainPreProcess, plain);
        registry.define(AFTER_CREATE_ARTIFACTS, Stage::PlainPostProcess, plain);
        registry.define(BEFORE_VALIDATE, Stage::BundledPreProcess, bundled);
        registry.define(AFTER_PACK_EXTERNAL_MODULES, Stage::BundledPostProcess, bundled);
        registry
    }

    /// Bind `event` to `stage`, replacing an earlier binding of the same event
    pub fn define(&mut self, event: &str, stage: Stage, scope: HookScope) {
        let binding = HookBinding {
            event: event.to_string(),
            stage,
            scope,
        };

        match self.bindings.iter_mut().find(|b| b.event == event) {
            Some(existing) => *existing = binding,
            None => self.bindings.push(binding),
        }
    }

    pub fn get(&self, event: &str) -> Option<&HookBinding> {
        self.bindings.iter().find(|b| b.event == event)
    }

    pub fn bindings(&self) -> &[HookBinding] {
        &self.bindings
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_packaging_bindings() {
        let registry = HookRegistry::packaging();
        assert_eq!(registry.bindings().len(), 4);

        let pre = registry.get(BEFORE_CREATE_ARTIFACTS).unwrap();
        assert_eq!(pre.stage, Stage::PlainPreProcess);
        assert_eq!(pre.scope, HookScope::Only(DeploymentMode::PlainPackaging));

        let post = registry.get(AFTER_PACK_EXTERNAL_MODULES).unwrap();
        assert_eq!(post.stage, Stage::BundledPostProcess);
        assert_eq!(post.scope, HookScope::Only(DeploymentMode::BundledPackaging));

        assert!(registry.get("deploy:deploy").is_none());
    }

    #[test]
    fn test_redefining_an_event_replaces_it() {
        let mut registry = HookRegistry::packaging();
        registry.define(BEFORE_VALIDATE, Stage::BundledPreProcess, HookScope::AnyMode);

        assert_eq!(registry.bindings().len(), 4);
        assert_eq!(registry.get(BEFORE_VALIDATE).unwrap().scope, HookScope::AnyMode);
    }

    #[test]
    fn test_every_bound_event_is_part_of_the_lifecycle() {
        let registry = HookRegistry::packaging();
        for binding in registry.bindings() {
            assert!(PACKAGE_LIFECYCLE.contains(&binding.event.as_str()));
        }
    }
}
