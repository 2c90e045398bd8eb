//! Environment Injection
//!
//! Hands the OneAgent options and debug switch to the deployed functions
//! through provider environment variables.

use crate::cli::config::Config;
use crate::host::console::PluginLogger;
use crate::host::service::ServiceDefinition;

/// Variable carrying the opaque OneAgent option string
pub const OPTIONS_VARIABLE: &str = "DT_LAMBDA_OPTIONS";

pub const DEBUG_VARIABLE: &str = "DEBUG";

pub const DEBUG_VALUE: &str = "dynatrace";

/// Set `DT_LAMBDA_OPTIONS` and `DEBUG` on the provider environment as configured
pub fn inject_environment(config: &Config, service: &mut ServiceDefinition, log: &PluginLogger) {
    if !config.agent_options.is_empty() {
        log.verbose(&format!(
            "adding environment variable {}='{}'",
            OPTIONS_VARIABLE, config.agent_options
        ));
        service.set_environment(OPTIONS_VARIABLE, &config.agent_options);
    }

    if config.debug {
        log.verbose(&format!(
            "adding environment variable {}={}",
            DEBUG_VARIABLE, DEBUG_VALUE
        ));
        service.set_environment(DEBUG_VARIABLE, DEBUG_VALUE);
    }
}
