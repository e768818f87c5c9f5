//! Clap derive structures for the `climate-skill` binary.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// climate-skill -- thermostat control for the voice assistant
#[derive(Debug, Parser)]
#[command(
    name = "climate-skill",
    version,
    about = "Set thermostat setpoints from classified voice intents",
    long_about = "Listens for classified intents on the assistant message bus, replies to\n\
        the requesting client and sends setpoint commands to climate devices.\n\n\
        The `run` command bridges the bus over stdin/stdout as JSON lines.",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Path to the config file
    #[arg(long, short = 'c', env = "PRIVATE_ASSISTANT_CONFIG_PATH", global = true)]
    pub config: Option<PathBuf>,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Log line format on stderr
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum LogFormat {
    /// Human-readable lines
    Text,
    /// One JSON object per line
    Json,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default)
    Table,
    /// Pretty-printed JSON
    Json,
}

// ── Commands ─────────────────────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run the skill, bridging bus messages over stdin/stdout
    Run,

    /// List the climate devices known to the registry
    #[command(alias = "dev")]
    Devices(DevicesArgs),

    /// Validate config, templates and the device registry
    Check(CheckArgs),
}

#[derive(Debug, Args)]
pub struct DevicesArgs {
    /// Output format
    #[arg(long, short = 'o', default_value = "table")]
    pub output: OutputFormat,

    /// Only show devices in this room
    #[arg(long, short = 'r')]
    pub room: Option<String>,
}

#[derive(Debug, Args)]
pub struct CheckArgs {
    /// Also print the effective configuration as TOML
    #[arg(long)]
    pub print_config: bool,
}
