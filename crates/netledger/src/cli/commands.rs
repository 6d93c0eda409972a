//! CLI command definitions.
//!
//! This module defines the structure of all CLI subcommands.

use std::path::PathBuf;

use clap::{Args, Subcommand, ValueEnum};

use crate::filter::RequestFilter;

/// Arguments shared by every command that replays an event file.
#[derive(Debug, Args)]
pub struct EventsArgs {
    /// Newline-delimited JSON capture events
    #[arg(value_name = "EVENTS")]
    pub events: PathBuf,

    /// Override the ledger capacity
    #[arg(long)]
    pub capacity: Option<usize>,

    /// Keep sensitive headers and body content as captured
    #[arg(long)]
    pub no_redact: bool,
}

/// Filter arguments.
#[derive(Debug, Default, Args)]
pub struct FilterArgs {
    /// URL substring (case-insensitive)
    #[arg(short, long)]
    pub url: Option<String>,

    /// Exact HTTP method, or ALL
    #[arg(short, long)]
    pub method: Option<String>,

    /// Exact resource type, or ALL
    #[arg(short = 't', long = "type", value_name = "TYPE")]
    pub resource_type: Option<String>,

    /// Status substring (e.g. 4, 200, Pending, ERROR)
    #[arg(short, long)]
    pub status: Option<String>,
}

impl From<FilterArgs> for RequestFilter {
    fn from(args: FilterArgs) -> Self {
        Self {
            url: args.url,
            method: args.method,
            resource_type: args.resource_type,
            status: args.status,
        }
    }
}

/// Inspect command arguments.
#[derive(Debug, Args)]
pub struct InspectCommand {
    /// Event input
    #[command(flatten)]
    pub input: EventsArgs,

    /// Filters
    #[command(flatten)]
    pub filter: FilterArgs,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub format: OutputFormat,
}

/// Show command arguments.
#[derive(Debug, Args)]
pub struct ShowCommand {
    /// Event input
    #[command(flatten)]
    pub input: EventsArgs,

    /// Id of the request to show
    #[arg(value_name = "ID")]
    pub id: String,
}

/// Stats command arguments.
#[derive(Debug, Args)]
pub struct StatsCommand {
    /// Event input
    #[command(flatten)]
    pub input: EventsArgs,

    /// Output as JSON
    #[arg(short, long)]
    pub json: bool,
}

/// Export command arguments.
#[derive(Debug, Args)]
pub struct ExportCommand {
    /// Event input
    #[command(flatten)]
    pub input: EventsArgs,

    /// Filters
    #[command(flatten)]
    pub filter: FilterArgs,

    /// Directory to write the snapshot to
    #[arg(short, long, value_name = "DIR")]
    pub out: Option<PathBuf>,
}

/// Configuration commands.
#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration
    Show {
        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Show the configuration file path
    Path,

    /// Validate configuration
    Validate {
        /// Path to configuration file to validate
        #[arg(short, long)]
        file: Option<PathBuf>,
    },
}

/// Output format for commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// One line per request
    Plain,
    /// Aligned columns
    #[default]
    Table,
    /// JSON output
    Json,
}
