//! Host Console
//!
//! Routes plugin messages to the host's logging facility.

use std::sync::Arc;

/// Prefix of every line this plugin writes
pub const LOG_PREFIX: &str = "[Dynatrace OneAgent] ";

/// The host's logging facility
pub trait HostConsole: Send + Sync {
    fn log(&self, line: &str);
}

/// Console that forwards every line to `tracing`
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingConsole;

impl HostConsole for TracingConsole {
    fn log(&self, line: &str) {
        tracing::info!(target: "serverless", "{}", line);
    }
}

/// Prefixing logger with a verbose-only channel
#[derive(Clone)]
pub struct PluginLogger {
    console: Arc<dyn HostConsole>,
    verbose: bool,
}

impl PluginLogger {
    pub fn new(console: Arc<dyn HostConsole>, verbose: bool) -> Self {
        Self { console, verbose }
    }

    pub fn is_verbose(&self) -> bool {
        self.verbose
    }

    /// Log every non-empty line of `msg`
    pub fn log(&self, msg: &str) {
        for line in msg.lines() {
            let line = line.trim_end_matches('\r');
            if !line.is_empty() {
                self.console.log(&format!("{}{}", LOG_PREFIX, line));
            }
        }
    }

    /// Log only when verbose output is enabled
    pub fn verbose(&self, msg: &str) {
        if self.verbose {
            self.log(msg);
        }
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::HostConsole;
    use parking_lot::Mutex;

    /// Console that keeps every line for assertions
    #[derive(Default)]
    pub struct RecordingConsole {
        lines: Mutex<Vec<String>>,
    }

    impl RecordingConsole {
        pub fn lines(&self) -> Vec<String> {
            self.lines.lock().clone()
        }

        pub fn contains(&self, needle: &str) -> bool {
            self.lines.lock().iter().any(|l| l.contains(needle))
        }
    }

    impl HostConsole for RecordingConsole {
        fn log(&self, line: &str) {
            self.lines.lock().push(line.to_string());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::testing::RecordingConsole;
    use super::*;

    #[test]
    fn test_multiline_messages_are_split_and_prefixed() {
        let console = Arc::new(RecordingConsole::default());
        let logger = PluginLogger::new(console.clone(), false);

        logger.log("first\r\n\nsecond\n");
        assert_eq!(
            console.lines(),
            vec![
                "[Dynatrace OneAgent] first".to_string(),
                "[Dynatrace OneAgent] second".to_string(),
            ]
        );
    }

    #[test]
    fn test_verbose_lines_are_gated() {
        let console = Arc::new(RecordingConsole::default());
        PluginLogger::new(console.clone(), false).verbose("hidden");
        assert!(console.lines().is_empty());

        PluginLogger::new(console.clone(), true).verbose("shown");
        assert_eq!(console.lines().len(), 1);
    }
}
