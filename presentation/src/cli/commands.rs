//! CLI command definitions

use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// Output format for run results
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Answer, cost breakdown and trace summary
    Text,
    /// The run result as JSON
    Json,
}

/// CLI arguments for agent-warden
#[derive(Parser, Debug)]
#[command(name = "agent-warden")]
#[command(
    author,
    version,
    about = "Governed ReAct agent with rate-limited, permission-scoped tools"
)]
#[command(long_about = r#"
Agent Warden runs a ReAct agent: the model reasons, calls tools, observes the
results and repeats until it answers or hits its step ceiling.

Every tool call is governed:
- permission scopes are checked before anything runs (--grant)
- each tool has its own per-minute rate limit
- filesystem tools cannot leave the workspace root (--root)
- repeated calls and repeated outputs stop the run

With --pipeline the query runs through researcher, analyst and writer
specialists, each agent's answer becoming the next agent's query.

Configuration files are loaded from (in priority order):
1. --config <path>       Explicit config file
2. ./warden.toml         Project-level config
3. ~/.config/agent-warden/config.toml   Global config
4. WARDEN_* environment variables (e.g. WARDEN_AGENT__MAX_STEPS=5)

Example:
  agent-warden "What is 17 to the power of 3?"
  agent-warden --grant filesystem:read --root ./data "Which files are in the data folder?"
  agent-warden --pipeline -o json "Summarize the project layout"
"#)]
pub struct Cli {
    /// The query to run
    pub query: Option<String>,

    /// Run the researcher -> analyst -> writer specialist pipeline
    #[arg(long)]
    pub pipeline: bool,

    /// Model id to query (overrides config)
    #[arg(short, long, value_name = "MODEL")]
    pub model: Option<String>,

    /// Step ceiling per agent (overrides config)
    #[arg(long, value_name = "N")]
    pub max_steps: Option<usize>,

    /// Grant a permission scope to the agent (can be specified multiple times)
    #[arg(long = "grant", value_name = "SCOPE")]
    pub grants: Vec<String>,

    /// Workspace root for filesystem tools (overrides config)
    #[arg(long, value_name = "DIR")]
    pub root: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    pub output: OutputFormat,

    /// Verbosity level (-v = info, -vv = debug, -vvv = trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Print only the answer
    #[arg(short, long)]
    pub quiet: bool,

    /// Path to configuration file
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Disable loading of configuration files
    #[arg(long)]
    pub no_config: bool,

    /// Show configuration file locations and the effective config, then exit
    #[arg(long)]
    pub show_config: bool,
}

impl Cli {
    /// Log filter directive for the `-v` count
    pub fn log_level(&self) -> &'static str {
        match self.verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    }
}
