//! Module Tailoring
//!
//! The OneAgent npm module ships native extensions for every supported Node.js
//! version. Its tailoring script removes all but the one matching the Lambda
//! runtime.

use once_cell::sync::Lazy;
use regex::Regex;
use std::path::Path;

use crate::error::{PluginError, PluginResult};
use crate::runtime::adapter::Invocation;

/// Tailoring script, relative to the directory holding `node_modules`
pub const TAILOR_SCRIPT: &str = "node_modules/.bin/dt-oneagent-tailor";

static RUNTIME_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^nodejs([0-9]+)\.[0-9A-Za-z.]+$").expect("valid runtime regex")
});

/// Tailoring flag for a runtime such as `nodejs14.x` (`--AwsLambdaV14`)
pub fn tailoring_flag(runtime: &str) -> PluginResult<String> {
    RUNTIME_PATTERN
        .captures(runtime)
        .and_then(|c| c.get(1))
        .map(|major| format!("--AwsLambdaV{}", major.as_str()))
        .ok_or_else(|| PluginError::UnsupportedRuntime(runtime.to_string()))
}

/// Invocation of the tailoring script for the module installed below `module_root`
pub fn tailor_invocation(runtime: Option<&str>, module_root: &Path) -> PluginResult<Invocation> {
    let runtime = runtime.ok_or(PluginError::MissingRuntime)?;
    let flag = tailoring_flag(runtime)?;

    Ok(Invocation::new(TAILOR_SCRIPT)
        .arg(flag)
        .current_dir(module_root))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flag_encodes_major_version() {
        assert_eq!(tailoring_flag("nodejs14.x").unwrap(), "--AwsLambdaV14");
        assert_eq!(tailoring_flag("nodejs8.10").unwrap(), "--AwsLambdaV8");
        assert_eq!(tailoring_flag("nodejs18.2.1").unwrap(), "--AwsLambdaV18");
    }

    #[test]
    fn test_unsupported_runtimes() {
        for runtime in ["python3.9", "nodejs", "nodejs14", "provided.al2", "java11"] {
            match tailoring_flag(runtime) {
                Err(PluginError::UnsupportedRuntime(r)) => assert_eq!(r, runtime),
                other => panic!("Expected UnsupportedRuntime for {runtime}, got {other:?}"),
            }
        }
    }

    #[test]
    fn test_invocation() {
        let invocation = tailor_invocation(Some("nodejs16.x"), Path::new(".webpack/hello")).unwrap();
        assert_eq!(
            invocation.to_string(),
            "node_modules/.bin/dt-oneagent-tailor --AwsLambdaV16"
        );
        assert_eq!(invocation.cwd.as_deref(), Some(Path::new(".webpack/hello")));
    }

    #[test]
    fn test_missing_runtime() {
        assert!(matches!(
            tailor_invocation(None, Path::new(".")),
            Err(PluginError::MissingRuntime)
        ));
    }
}
