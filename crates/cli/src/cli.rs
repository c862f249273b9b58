//! CLI argument definitions using clap.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Audit Relay - audit-event delivery pipeline
#[derive(Parser, Debug)]
#[command(
    name = "audit-relay",
    author,
    version,
    about = "Audit-event delivery pipeline",
    long_about = "Reliable delivery of security audit events to configured storage backends.\n\n\
                  Loads a declarative sink configuration, consumes audit events as NDJSON, \n\
                  routes them by category and compliance rules, and delivers them with \n\
                  bounded queueing and fallback chaining."
)]
pub struct Cli {
    /// Increase logging verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true, env = "AUDIT_RELAY_VERBOSE")]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Log output format
    #[arg(
        long,
        value_enum,
        default_value = "pretty",
        global = true,
        env = "AUDIT_RELAY_LOG_FORMAT"
    )]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the delivery pipeline
    Run(RunArgs),

    /// Validate configuration file without running
    Validate(ValidateArgs),

    /// Display configuration information
    Info(InfoArgs),
}

/// Arguments for the `run` command
#[derive(Parser, Debug, Clone)]
pub struct RunArgs {
    /// Path to configuration file (TOML or JSON)
    #[arg(short, long, default_value = "audit.toml", env = "AUDIT_RELAY_CONFIG")]
    pub config: PathBuf,

    /// NDJSON event source file; stdin when omitted
    #[arg(short, long, env = "AUDIT_RELAY_EVENTS")]
    pub events: Option<PathBuf>,

    /// Maximum number of events to route (0 = unlimited)
    #[arg(long, default_value = "0", env = "AUDIT_RELAY_MAX_EVENTS")]
    pub max_events: u64,

    /// Validate configuration and exit without running pipeline
    #[arg(long)]
    pub dry_run: bool,

    /// Metrics server port (0 = disabled)
    #[arg(long, default_value = "9000", env = "AUDIT_RELAY_METRICS_PORT")]
    pub metrics_port: u16,

    /// Stats reporting interval in seconds (0 = disabled)
    #[arg(long, default_value = "30", env = "AUDIT_RELAY_STATS_INTERVAL")]
    pub stats_interval: u64,
}

/// Arguments for the `validate` command
#[derive(Parser, Debug)]
pub struct ValidateArgs {
    /// Path to configuration file to validate
    #[arg(short, long, default_value = "audit.toml")]
    pub config: PathBuf,

    /// Output validation result as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `info` command
#[derive(Parser, Debug)]
pub struct InfoArgs {
    /// Path to configuration file
    #[arg(short, long, default_value = "audit.toml")]
    pub config: PathBuf,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,

    /// Show resolved fallback chains
    #[arg(long)]
    pub chains: bool,

    /// Show routing rules
    #[arg(long)]
    pub rules: bool,
}

/// Log output format
#[derive(ValueEnum, Clone, Debug, Default)]
pub enum LogFormat {
    /// JSON structured logging
    Json,
    /// Human-readable pretty format
    #[default]
    Pretty,
    /// Compact single-line format
    Compact,
}
