//! Deployment Mode State
//!
//! Provides the deployment mode state machine. The mode starts undetermined and
//! is resolved exactly once, from the list of active plugins, to either plain
//! serverless packaging or serverless-webpack packaging.

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::Serialize;
use std::sync::Arc;

use crate::host::plugins::BUNDLER_PLUGIN;

/// How the deployment package gets built
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DeploymentMode {
    /// Not yet known which packaging strategy is in effect
    Undetermined,
    /// Serverless packages the function itself
    PlainPackaging,
    /// serverless-webpack bundles the function and creates the zip package
    BundledPackaging,
}

impl std::fmt::Display for DeploymentMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DeploymentMode::Undetermined => write!(f, "Undetermined"),
            DeploymentMode::PlainPackaging => write!(f, "PlainPackaging"),
            DeploymentMode::BundledPackaging => write!(f, "BundledPackaging"),
        }
    }
}

/// Deployment modes a hook applies to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum HookScope {
    /// Run regardless of the deployment mode
    AnyMode,
    /// Run only in the given mode
    Only(DeploymentMode),
}

impl HookScope {
    pub fn applies_to(&self, mode: DeploymentMode) -> bool {
        match self {
            HookScope::AnyMode => true,
            HookScope::Only(scope) => *scope == mode,
        }
    }
}

impl std::fmt::Display for HookScope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HookScope::AnyMode => write!(f, "AnyMode"),
            HookScope::Only(mode) => write!(f, "{}", mode),
        }
    }
}

/// Classify the deployment from the active plugin identifiers
pub fn detect_mode(plugins: &[String]) -> DeploymentMode {
    if plugins.iter().any(|p| p == BUNDLER_PLUGIN) {
        DeploymentMode::BundledPackaging
    } else {
        DeploymentMode::PlainPackaging
    }
}

struct ModeStateInner {
    current: DeploymentMode,
    resolved_at: Option<DateTime<Utc>>,
}

/// Shared deployment mode, resolved at most once
#[derive(Clone)]
pub struct DeploymentModeState {
    inner: Arc<RwLock<ModeStateInner>>,
}

impl DeploymentModeState {
    /// Create a new state in Undetermined mode
    pub fn new() -> Self {
        Self {
            inner: Arc::new(RwLock::new(ModeStateInner {
                current: DeploymentMode::Undetermined,
                resolved_at: None,
            })),
        }
    }

    /// Get the current mode
    pub fn current(&self) -> DeploymentMode {
        self.inner.read().current
    }

    /// When the mode was resolved, if it was
    pub fn resolved_at(&self) -> Option<DateTime<Utc>> {
        self.inner.read().resolved_at
    }

    /// Transition to a new mode
    pub fn transition_to(&self, new_mode: DeploymentMode) -> bool {
        let mut inner = self.inner.write();

        if !Self::is_valid_transition(inner.current, new_mode) {
            tracing::warn!(
                from = %inner.current,
                to = %new_mode,
                "Rejected deployment mode transition"
            );
            return false;
        }

        if inner.current != new_mode {
            tracing::info!(from = %inner.current, to = %new_mode, "Deployment mode resolved");
            inner.current = new_mode;
            inner.resolved_at = Some(Utc::now());
        }

        true
    }

    /// Check if a mode transition is valid
    fn is_valid_transition(from: DeploymentMode, to: DeploymentMode) -> bool {
        if from == to {
            return true;
        }

        matches!(
            (from, to),
            (DeploymentMode::Undetermined, DeploymentMode::PlainPackaging)
                | (DeploymentMode::Undetermined, DeploymentMode::BundledPackaging)
        )
    }

    /// Resolve the mode from the plugin list unless already resolved.
    /// Returns the mode in effect and whether this call resolved it.
    pub fn resolve(&self, plugins: &[String]) -> (DeploymentMode, bool) {
        let current = self.current();
        if current != DeploymentMode::Undetermined {
            return (current, false);
        }

        let detected = detect_mode(plugins);
        self.transition_to(detected);
        (self.current(), true)
    }
}

impl Default for DeploymentModeState {
    fn default() -> Self {
        Self::new()
    }
}
