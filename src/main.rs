use anyhow::{Context, Result};
use chess_history::chess::config::{Config, RunArgs};
use chess_history::chess::{BatchSummary, FileHistoryStore, FileSource, GameBatch, ingest, log};
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::fs;
use std::io::{self, Write};
use std::path::Path;
use tracing::info;

#[derive(Debug, Parser)]
#[command(name = "chess-history", version, about = "Normalize PGN exports into a game history")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Normalize the input and print the (merged) game batch as JSON
    Ingest(RunArgs),
    /// Normalize the input and print a per-speed summary of the (merged) batch
    Summary(RunArgs),
}

fn run_batch(config: &Config) -> Result<GameBatch> {
    let source = FileSource::new(config.input.clone(), config.compression);

    let batch = match &config.history {
        Some(path) => {
            let mut store = FileHistoryStore::new(path);
            ingest(&source, Some(&mut store), &config.player, &config.site, config.dedup)
                .with_context(|| format!("failed to update history {}", path.display()))?
        }
        None => ingest::<_, FileHistoryStore>(
            &source,
            None,
            &config.player,
            &config.site,
            config.dedup,
        )
        .with_context(|| format!("failed to read games from '{}'", config.input))?,
    };
    Ok(batch)
}

fn emit<T: Serialize>(value: &T, output: Option<&Path>) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("failed to serialize output")?;
    match output {
        Some(path) => {
            fs::write(path, json).with_context(|| format!("failed to write {}", path.display()))?;
            info!(path = %path.display(), "wrote output");
        }
        None => {
            let mut stdout = io::stdout().lock();
            writeln!(stdout, "{json}").context("failed to write to stdout")?;
        }
    }
    Ok(())
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Ingest(args) => {
            let config = Config::from_args(args)?;
            let batch = run_batch(&config)?;
            emit(&batch, config.output.as_deref())
        }
        Command::Summary(args) => {
            let config = Config::from_args(args)?;
            let batch = run_batch(&config)?;
            emit(&BatchSummary::from_batch(&batch), config.output.as_deref())
        }
    }
}

fn main() -> Result<()> {
    log::init();

    run(Cli::parse())
}
