//! `netledger` - CLI for the request ledger
//!
//! Replays captured request events into a ledger and prints, summarizes, or
//! exports the result.

#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tracing::warn;

use netledger::cli::output::{render_plain, render_stats, render_table, request_count};
use netledger::cli::{
    Cli, Command, ConfigCommand, EventsArgs, ExportCommand, InspectCommand, OutputFormat,
    ShowCommand, StatsCommand,
};
use netledger::privacy::Redactor;
use netledger::{
    export, init_logging, CaptureSource, Config, JsonLinesSource, Ledger, LedgerHandle,
    LedgerService,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbosity());

    let config = Config::load_from(cli.config.clone())?;

    match cli.command {
        Command::Inspect(cmd) => handle_inspect(&config, cmd).await,
        Command::Show(cmd) => handle_show(&config, &cmd).await,
        Command::Stats(cmd) => handle_stats(&config, &cmd).await,
        Command::Export(cmd) => handle_export(&config, cmd).await,
        Command::Config(cmd) => handle_config(&config, cmd),
    }
}

/// Start a ledger service and replay the event file into it.
async fn replay(config: &Config, input: &EventsArgs) -> anyhow::Result<LedgerHandle> {
    let capacity = input.capacity.unwrap_or(config.ledger.capacity);
    let (_task, handle) = LedgerService::spawn(Ledger::new(capacity), &config.service);

    let mut source = JsonLinesSource::open(&input.events)
        .await
        .with_context(|| format!("reading events from {}", input.events.display()))?;
    if !input.no_redact {
        source = source.with_redactor(Arc::new(Redactor::with_config(&config.privacy)));
    }

    let stats = source.run(handle.capture_sender()).await?;
    if stats.rejected > 0 {
        warn!(
            rejected = stats.rejected,
            "Some lines were not valid capture events"
        );
    }
    Ok(handle)
}

async fn handle_inspect(config: &Config, cmd: InspectCommand) -> anyhow::Result<()> {
    let handle = replay(config, &cmd.input).await?;
    let records = handle.query(cmd.filter.into()).await?;

    match cmd.format {
        OutputFormat::Json => println!("{}", export::to_json(&records)?),
        OutputFormat::Plain => print!("{}", render_plain(&records)),
        OutputFormat::Table => print!("{}", render_table(&records)),
    }
    Ok(())
}

async fn handle_show(config: &Config, cmd: &ShowCommand) -> anyhow::Result<()> {
    let handle = replay(config, &cmd.input).await?;
    let Some(record) = handle.get(cmd.id.as_str()).await? else {
        anyhow::bail!("No request with id {} in the ledger", cmd.id);
    };

    println!("{}", export::record_to_json(&record)?);
    Ok(())
}

async fn handle_stats(config: &Config, cmd: &StatsCommand) -> anyhow::Result<()> {
    let handle = replay(config, &cmd.input).await?;
    let stats = handle.stats().await?;

    if cmd.json {
        println!("{}", serde_json::to_string_pretty(&stats)?);
    } else {
        print!("{}", render_stats(&stats));
    }
    Ok(())
}

async fn handle_export(config: &Config, cmd: ExportCommand) -> anyhow::Result<()> {
    let handle = replay(config, &cmd.input).await?;
    let records = handle.query(cmd.filter.into()).await?;

    let dir = cmd.out.unwrap_or_else(|| config.export_dir());
    let path = export::export_snapshot(&records, &dir)?;
    println!(
        "Exported {} to {}",
        request_count(records.len()),
        path.display()
    );
    Ok(())
}

fn handle_config(config: &Config, cmd: ConfigCommand) -> anyhow::Result<()> {
    match cmd {
        ConfigCommand::Show { json } => {
            if json {
                println!("{}", serde_json::to_string_pretty(config)?);
            } else {
                println!("Current Configuration");
                println!("=====================");
                println!();
                println!("[Ledger]");
                println!("  Capacity:           {}", config.ledger.capacity);
                println!();
                println!("[Service]");
                println!("  Event buffer:       {}", config.service.event_buffer);
                println!("  Command buffer:     {}", config.service.command_buffer);
                println!();
                println!("[Privacy]");
                println!("  Redaction:          {}", config.privacy.redaction_enabled);
                println!(
                    "  Sensitive headers:  {}",
                    config.privacy.sensitive_headers.join(", ")
                );
                println!("  Built-in patterns:  {}", config.privacy.builtin_patterns);
                println!("  Custom patterns:    {}", config.privacy.body_patterns.len());
                println!();
                println!("[Export]");
                println!("  Directory:          {}", config.export_dir().display());
            }
        }
        ConfigCommand::Path => {
            println!("{}", Config::default_config_path().display());
        }
        ConfigCommand::Validate { file } => {
            let path = file.unwrap_or_else(Config::default_config_path);
            println!("Validating configuration: {}", path.display());
            match Config::load_from(Some(path)) {
                Ok(_) => println!("Configuration is valid."),
                Err(e) => println!("Configuration error: {e}"),
            }
        }
    }
    Ok(())
}
