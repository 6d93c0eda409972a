//! Command-line interface for netledger.
//!
//! This module provides the CLI structure for the `netledger` binary.

mod commands;
pub mod output;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

pub use commands::{
    ConfigCommand, EventsArgs, ExportCommand, FilterArgs, InspectCommand, OutputFormat,
    ShowCommand, StatsCommand,
};

/// netledger - Inspect captured network requests
///
/// Replays request lifecycle events into a bounded, most-recent-first ledger
/// and lets you filter, summarize, and export what was captured.
#[derive(Debug, Parser)]
#[command(name = "netledger")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to custom configuration file
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Increase verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// The command to execute
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// List captured requests, optionally filtered
    Inspect(InspectCommand),

    /// Print every captured detail of one request as JSON
    Show(ShowCommand),

    /// Summarize captured requests by state
    Stats(StatsCommand),

    /// Write captured requests to a JSON file
    Export(ExportCommand),

    /// View or validate configuration
    #[command(subcommand)]
    Config(ConfigCommand),
}

impl Cli {
    /// Get the verbosity level based on flags.
    #[must_use]
    pub fn verbosity(&self) -> crate::logging::Verbosity {
        if self.quiet {
            crate::logging::Verbosity::Quiet
        } else {
            match self.verbose {
                0 => crate::logging::Verbosity::Normal,
                1 => crate::logging::Verbosity::Verbose,
                _ => crate::logging::Verbosity::Trace,
            }
        }
    }
}
