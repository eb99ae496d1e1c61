// src/cli.rs

//! CLI argument parsing using `clap`.

use clap::{Parser, ValueEnum};

/// Command-line arguments for `flowdag`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "flowdag",
    version,
    about = "Run an incremental dataflow board of chat/search programs.",
    long_about = None
)]
pub struct CliArgs {
    /// Path to the board file (TOML).
    ///
    /// Default: `Board.toml` in the current working directory.
    #[arg(long, value_name = "PATH", default_value = "Board.toml")]
    pub board: String,

    /// Run until the board settles (no stale program), then exit.
    #[arg(long)]
    pub once: bool,

    /// Parse + validate, print the board and execution order, run nothing.
    #[arg(long)]
    pub dry_run: bool,

    /// Milliseconds to idle between passes when nothing is stale.
    #[arg(long, value_name = "MS", default_value_t = 50)]
    pub idle_wait_ms: u64,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `FLOWDAG_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}
