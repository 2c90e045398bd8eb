//! Shared test doubles for the packaging scenarios

#![allow(dead_code)]

use async_trait::async_trait;
use parking_lot::Mutex;
use std::path::PathBuf;
use std::sync::Arc;

use serverless_oneagent::host::service::FunctionDescriptor;
use serverless_oneagent::runtime::adapter::LineSink;
use serverless_oneagent::{
    CommandLineOptions, Host, HostConsole, Invocation, OneAgentPlugin, PluginError,
    PluginResult, ProcessRunner, ServiceDefinition,
};

/// Console keeping every line
#[derive(Default)]
pub struct RecordingConsole {
    lines: Mutex<Vec<String>>,
}

impl RecordingConsole {
    pub fn contains(&self, needle: &str) -> bool {
        self.lines.lock().iter().any(|l| l.contains(needle))
    }
}

impl HostConsole for RecordingConsole {
    fn log(&self, line: &str) {
        self.lines.lock().push(line.to_string());
    }
}

/// Runner recording invocations, failing those matching a pattern
#[derive(Default)]
pub struct FakeRunner {
    invocations: Mutex<Vec<String>>,
    failing: Mutex<Vec<String>>,
}

impl FakeRunner {
    pub fn fail_on(&self, needle: &str) {
        self.failing.lock().push(needle.to_string());
    }

    pub fn command_lines(&self) -> Vec<String> {
        self.invocations.lock().clone()
    }
}

#[async_trait]
impl ProcessRunner for FakeRunner {
    fn locate(&self, invocation: &Invocation) -> PluginResult<PathBuf> {
        Ok(PathBuf::from(&invocation.program))
    }

    async fn run(&self, invocation: &Invocation, _on_line: &LineSink) -> PluginResult<()> {
        let line = invocation.to_string();
        self.invocations.lock().push(line.clone());

        if self.failing.lock().iter().any(|f| line.contains(f.as_str())) {
            return Err(PluginError::ProcessFailed {
                program: invocation.program.clone(),
                code: Some(1),
                signal: None,
            });
        }
        Ok(())
    }
}

pub struct Scenario {
    pub host: Host,
    pub runner: Arc<FakeRunner>,
    pub console: Arc<RecordingConsole>,
}

impl Scenario {
    /// Service with two functions on nodejs14.x and the given plugins
    pub fn new(plugins: &[&str]) -> Self {
        let mut service = ServiceDefinition::default();
        service.plugins = Some(plugins.iter().map(|p| p.to_string()).collect());
        service.provider.name = "aws".to_string();
        service.provider.runtime = Some("nodejs14.x".to_string());
        for (name, handler) in [("hello", "index.hello"), ("goodbye", "api/bye.handler")] {
            service.functions.insert(
                name.to_string(),
                FunctionDescriptor {
                    handler: handler.to_string(),
                },
            );
        }

        Self {
            host: Host::new(service, "/srv/service"),
            runner: Arc::new(FakeRunner::default()),
            console: Arc::new(RecordingConsole::default()),
        }
    }

    pub fn plugin(&mut self, options: CommandLineOptions) -> OneAgentPlugin<FakeRunner> {
        OneAgentPlugin::new(
            &mut self.host,
            &options,
            self.runner.clone(),
            self.console.clone(),
        )
    }

    pub fn handler(&self, function: &str) -> &str {
        &self.host.service.functions[function].handler
    }
}
