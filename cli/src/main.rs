//! CLI entrypoint for Agent Warden
//!
//! This is the main binary that wires together all layers using
//! dependency injection.

use anyhow::{Context, Result, anyhow, bail};
use clap::Parser;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use warden_application::{AgentLoop, NoTraceSink, RunPipelineUseCase, TraceSink};
use warden_domain::{ExecutionTracer, PriceLookup, Termination};
use warden_infrastructure::{
    ConfigLoader, FileConfig, JsonlTraceSink, OpenAiTransport, builtin_registry,
};
use warden_presentation::{Cli, ConsoleFormatter, OutputFormat};

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    // Diagnostics go to stderr so stdout stays clean for -o json
    let (writer, _log_guard) = tracing_appender::non_blocking(std::io::stderr());
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(cli.log_level()))
        .with_writer(writer)
        .with_target(false)
        .init();

    info!("Starting Agent Warden");

    let mut config = if cli.no_config {
        ConfigLoader::load_defaults()
    } else {
        ConfigLoader::load(cli.config.as_deref())
            .map_err(|e| anyhow!("Failed to load configuration: {}", e))?
    };
    apply_overrides(&cli, &mut config);

    for issue in config.validate() {
        warn!(severity = issue.severity.as_str(), "{}", issue.message());
        eprintln!("config {}: {}", issue.severity.as_str(), issue.message());
    }

    if cli.show_config {
        println!("Configuration sources (in priority order):");
        for source in ConfigLoader::config_sources() {
            println!("  {}", source);
        }
        println!();
        println!("Effective configuration:");
        println!("{}", toml::to_string_pretty(&config)?);
        return Ok(ExitCode::SUCCESS);
    }

    let Some(query) = cli.query.as_deref() else {
        bail!("A query is required. Run with --help for usage.");
    };

    // === Dependency Injection ===
    let registry = Arc::new(builtin_registry(&config.tools).with_context(|| {
        format!(
            "Invalid workspace root {}",
            config.tools.workspace_root.display()
        )
    })?);
    let transport = Arc::new(OpenAiTransport::from_config(&config.transport)?);
    let tracer = Arc::new(ExecutionTracer::new());
    let prices: Arc<dyn PriceLookup> = Arc::new(config.pricing.to_price_table());
    let sink: Arc<dyn TraceSink> = match config
        .logging
        .trace_path()
        .and_then(|path| JsonlTraceSink::open(path))
    {
        Some(sink) => {
            info!(path = %sink.path().display(), "Writing trace events");
            Arc::new(sink)
        }
        None => Arc::new(NoTraceSink),
    };
    let agent_config = config.to_agent_config();

    if cli.pipeline {
        let use_case = RunPipelineUseCase::new(transport, registry, tracer.clone(), agent_config)
            .with_prices(prices)
            .with_trace_sink(sink);
        let stage_count = use_case.profiles().len();
        let output = use_case.execute(query).await;

        let rendered = match (cli.output, cli.quiet) {
            (OutputFormat::Json, _) => {
                format!("{}\n", ConsoleFormatter::format_pipeline_json(&output))
            }
            (OutputFormat::Text, true) => format!("{}\n", output.final_answer),
            (OutputFormat::Text, false) => {
                ConsoleFormatter::format_pipeline(&output, &tracer.traces())
            }
        };
        print!("{}", rendered);

        return Ok(if output.completed(stage_count) {
            ExitCode::SUCCESS
        } else {
            ExitCode::FAILURE
        });
    }

    let mut agent = AgentLoop::new(transport, registry, tracer.clone(), agent_config)
        .with_prices(prices)
        .with_trace_sink(sink);
    let output = agent.run(query).await;

    let rendered = match (cli.output, cli.quiet) {
        (OutputFormat::Json, _) => format!("{}\n", ConsoleFormatter::format_json(&output)),
        (OutputFormat::Text, true) => ConsoleFormatter::format_answer_only(&output),
        (OutputFormat::Text, false) => {
            let trace = tracer.get(&output.trace_id);
            ConsoleFormatter::format(&output, trace.as_ref())
        }
    };
    print!("{}", rendered);

    Ok(if output.termination == Termination::Error {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    })
}

/// Command-line flags take precedence over every config source.
fn apply_overrides(cli: &Cli, config: &mut FileConfig) {
    if let Some(model) = &cli.model {
        config.agent.model = model.clone();
    }
    if let Some(max_steps) = cli.max_steps {
        config.agent.max_steps = max_steps;
    }
    if let Some(root) = &cli.root {
        config.tools.workspace_root = root.clone();
    }
    for scope in &cli.grants {
        if !config.agent.granted_permissions.contains(scope) {
            config.agent.granted_permissions.push(scope.clone());
        }
    }
}
