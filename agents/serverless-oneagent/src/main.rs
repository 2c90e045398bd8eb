//! Serverless OneAgent CLI Entry Point
//!
//! Drives the plugin against a service manifest the way the deployment tool
//! would: it loads the manifest, fires lifecycle events and writes the
//! resulting service definition back.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use serverless_oneagent::agent::hooks::PACKAGE_LIFECYCLE;
use serverless_oneagent::host::plugins::{CompilationOutput, StaticBundler};
use serverless_oneagent::{
    CommandLineOptions, Host, OneAgentPlugin, ServiceDefinition, TokioProcessRunner,
    TracingConsole,
};

#[derive(Parser)]
#[command(name = "sls-oneagent")]
#[command(author, version, about = "Inject the Dynatrace OneAgent into a serverless deployment")]
struct Cli {
    /// Path to the service manifest
    #[arg(short, long, default_value = "serverless.toml")]
    config: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// OneAgent options passed to the functions as DT_LAMBDA_OPTIONS
    #[arg(long = "dt-oneagent-options", env = "DT_ONEAGENT_OPTIONS")]
    oneagent_options: Option<String>,

    /// Set DEBUG=dynatrace in the deployed functions
    #[arg(long = "dt-debug")]
    debug: bool,

    /// Version tag of the OneAgent npm module (e.g. next)
    #[arg(long = "dt-oneagent-module-version")]
    module_version: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the lifecycle hooks the plugin listens to
    Hooks {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
    /// Fire a single lifecycle event
    Fire {
        /// Lifecycle event name
        event: String,

        /// Output directory reported by serverless-webpack (repeatable)
        #[arg(long = "webpack-output")]
        webpack_outputs: Vec<PathBuf>,

        /// Print the resulting manifest instead of writing it
        #[arg(long)]
        dry_run: bool,
    },
    /// Fire all packaging lifecycle events in host order
    Package {
        /// Output directory reported by serverless-webpack (repeatable)
        #[arg(long = "webpack-output")]
        webpack_outputs: Vec<PathBuf>,

        /// Print the resulting manifest instead of writing it
        #[arg(long)]
        dry_run: bool,
    },
}

impl Cli {
    fn options(&self) -> CommandLineOptions {
        CommandLineOptions {
            v: None,
            verbose: Some(self.verbose),
            oneagent_options: self.oneagent_options.clone(),
            debug: Some(self.debug),
            module_version: self.module_version.clone(),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    match &cli.command {
        Commands::Hooks { json } => {
            show_hooks(&cli, *json)?;
        }
        Commands::Fire {
            event,
            webpack_outputs,
            dry_run,
        } => {
            run_events(&cli, &[event.as_str()], webpack_outputs, *dry_run).await?;
        }
        Commands::Package {
            webpack_outputs,
            dry_run,
        } => {
            run_events(&cli, &PACKAGE_LIFECYCLE, webpack_outputs, *dry_run).await?;
        }
    }

    Ok(())
}

fn load_host(cli: &Cli, webpack_outputs: &[PathBuf]) -> Result<Host> {
    let service = ServiceDefinition::load(&cli.config)?;
    let service_path = match cli.config.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir.to_path_buf(),
        _ => PathBuf::from("."),
    };

    let mut host = Host::new(service, service_path);
    if !webpack_outputs.is_empty() {
        let outputs = webpack_outputs
            .iter()
            .map(|dir| CompilationOutput::new(dir.clone()))
            .collect();
        host.plugin_manager
            .register(Arc::new(StaticBundler::new(outputs)));
    }

    Ok(host)
}

fn create_plugin(cli: &Cli, host: &mut Host) -> OneAgentPlugin<TokioProcessRunner> {
    OneAgentPlugin::new(
        host,
        &cli.options(),
        Arc::new(TokioProcessRunner::new()),
        Arc::new(TracingConsole),
    )
}

fn show_hooks(cli: &Cli, json: bool) -> Result<()> {
    let mut host = load_host(cli, &[])?;
    let plugin = create_plugin(cli, &mut host);

    if json {
        let table = serde_json::to_string_pretty(plugin.hooks())
            .context("Failed to serialize hook table")?;
        println!("{}", table);
        return Ok(());
    }

    let mode = plugin.mode().to_string();
    println!("Deployment mode: {}", mode.bold());
    for binding in plugin.hooks() {
        let marker = if binding.scope.applies_to(plugin.mode()) {
            "●".green()
        } else {
            "○".dimmed()
        };
        println!(
            "  {} {:<45} {:<18} {}",
            marker,
            binding.event,
            binding.scope.to_string(),
            binding.stage
        );
    }

    Ok(())
}

async fn run_events(
    cli: &Cli,
    events: &[&str],
    webpack_outputs: &[PathBuf],
    dry_run: bool,
) -> Result<()> {
    let mut host = load_host(cli, webpack_outputs)?;
    let plugin = create_plugin(cli, &mut host);

    for event in events {
        let ran = plugin
            .fire(event, &mut host)
            .await
            .with_context(|| format!("Lifecycle event '{}' failed", event))?;
        info!(event = %event, ran, "Lifecycle event handled");
    }

    write_manifest(&host.service, &cli.config, dry_run)
}

fn write_manifest(service: &ServiceDefinition, path: &Path, dry_run: bool) -> Result<()> {
    if dry_run {
        print!("{}", service.to_toml()?);
        return Ok(());
    }

    service.save(path)?;
    info!(path = %path.display(), "Service manifest updated");
    Ok(())
}
