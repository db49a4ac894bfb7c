//! Clap derive structures for the `unimux` binary.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// unimux -- UniFi Network controllers as MCP tools
#[derive(Debug, Parser)]
#[command(
    name = "unimux",
    version,
    about = "Serve UniFi Network controllers to MCP clients over stdio",
    long_about = "An MCP server exposing one or more UniFi Network controllers as tools.\n\n\
        Targets come from a TOML config file or the UNIFI_TARGETS environment\n\
        variable (a JSON array). Without a subcommand, the server speaks MCP\n\
        on stdin/stdout.",
    propagate_version = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Option<Command>,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Path to the config file (overrides UNIMUX_CONFIG and the platform default)
    #[arg(long, short = 'c', global = true)]
    pub config: Option<PathBuf>,

    /// Increase log verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Log line format (logs always go to stderr)
    #[arg(
        long,
        env = "UNIMUX_LOG_FORMAT",
        default_value = "text",
        global = true
    )]
    pub log_format: LogFormat,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum LogFormat {
    /// Compact human-readable lines
    Text,
    /// One JSON object per line
    Json,
}

// ── Commands ─────────────────────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run the MCP server on stdio (default)
    Serve,

    /// List sites on every configured target and print one JSON line each
    Check,
}
