//! Handler Rewriting
//!
//! Points every function entry point at the OneAgent loader, which loads the
//! agent and then the original handler:
//!
//! ```text
//! index.hello  ->  node_modules/@dynatrace/oneagent/index.index$hello
//! ```

use tracing::debug;

use crate::host::console::PluginLogger;
use crate::host::service::ServiceDefinition;

/// Install location of the OneAgent loader inside the package
pub const HANDLER_PREFIX: &str = "node_modules/@dynatrace/oneagent";

/// Rewrite `module.symbol` into a reference through the OneAgent loader.
/// A reference without `.` is taken as a module with an empty symbol.
pub fn rewrite_handler(reference: &str) -> String {
    let (module, symbol) = reference.split_once('.').unwrap_or((reference, ""));
    format!("{}/index.{}${}", HANDLER_PREFIX, module, symbol)
}

/// Whether `reference` already goes through the OneAgent loader
pub fn is_rewritten(reference: &str) -> bool {
    reference.starts_with(&format!("{}/index.", HANDLER_PREFIX))
}

/// Rewrite the handler of every function in the service.
/// Returns the number of handlers changed.
pub fn rewrite_handlers(service: &mut ServiceDefinition, log: &PluginLogger) -> usize {
    let mut rewritten = 0;

    for (name, function) in service.functions.iter_mut() {
        if is_rewritten(&function.handler) {
            debug!(function = %name, handler = %function.handler, "Handler already rewritten");
            continue;
        }

        let original = std::mem::take(&mut function.handler);
        function.handler = rewrite_handler(&original);
        log.log(&format!(
            "modifying Lambda handler {}: {} -> {}",
            name, original, function.handler
        ));
        rewritten += 1;
    }

    rewritten
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::console::testing::RecordingConsole;
    use crate::host::service::FunctionDescriptor;
    use std::sync::Arc;

    #[test]
    fn test_rewrite_handler() {
        assert_eq!(
            rewrite_handler("index.hello"),
            "node_modules/@dynatrace/oneagent/index.index$hello"
        );
        assert_eq!(
            rewrite_handler("src/api.handler"),
            "node_modules/@dynatrace/oneagent/index.src/api$handler"
        );
    }

    #[test]
    fn test_rewrite_splits_on_first_dot() {
        assert_eq!(
            rewrite_handler("lib.handlers.get"),
            "node_modules/@dynatrace/oneagent/index.lib$handlers.get"
        );
        assert_eq!(
            rewrite_handler("main"),
            "node_modules/@dynatrace/oneagent/index.main$"
        );
    }

    #[test]
    fn test_rewrite_all_functions_once() {
        let console = Arc::new(RecordingConsole::default());
        let log = PluginLogger::new(console.clone(), false);

        let mut service = ServiceDefinition::default();
        for (name, handler) in [("hello", "index.hello"), ("bye", "other.bye")] {
            service.functions.insert(
                name.to_string(),
                FunctionDescriptor {
                    handler: handler.to_string(),
                },
            );
        }

        assert_eq!(rewrite_handlers(&mut service, &log), 2);
        assert_eq!(
            service.functions["hello"].handler,
            "node_modules/@dynatrace/oneagent/index.index$hello"
        );
        assert_eq!(
            service.functions["bye"].handler,
            "node_modules/@dynatrace/oneagent/index.other$bye"
        );
        assert!(console.contains(
            "modifying Lambda handler hello: index.hello -> node_modules/@dynatrace/oneagent/index.index$hello"
        ));

        // a second pass leaves everything alone
        assert_eq!(rewrite_handlers(&mut service, &log), 0);
        assert_eq!(
            service.functions["hello"].handler,
            "node_modules/@dynatrace/oneagent/index.index$hello"
        );
    }
}
