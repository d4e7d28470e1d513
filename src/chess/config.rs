//! Run configuration: command-line flags, then environment, then an optional TOML file, then
//! built-in defaults.

use super::error::{Error, Result};
use super::history::DedupPolicy;
use super::source::CompressionMode;
use clap::Args;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_SITE: &str = "lichess";

/// Flags shared by every subcommand. Each also reads a `CHESS_*` environment variable.
#[derive(Debug, Clone, Default, Args)]
pub struct RunArgs {
    /// Tracked player's username
    #[arg(long, env = "CHESS_PLAYER")]
    pub player: Option<String>,

    /// Site label used in the batch and in fallback game ids
    #[arg(long, env = "CHESS_SITE")]
    pub site: Option<String>,

    /// PGN file or glob pattern
    #[arg(long, short, env = "CHESS_INPUT")]
    pub input: Option<String>,

    /// Input compression ('zstd' or 'none'); inferred from a .zst extension when omitted
    #[arg(long)]
    pub compression: Option<String>,

    /// History JSON document to merge into
    #[arg(long, env = "CHESS_HISTORY")]
    pub history: Option<PathBuf>,

    /// Write output here instead of stdout
    #[arg(long, short, env = "CHESS_OUTPUT")]
    pub output: Option<PathBuf>,

    /// History deduplication: 'full' (whole-record equality) or 'id'
    #[arg(long)]
    pub dedup: Option<String>,

    /// TOML file with defaults for any of the above
    #[arg(long)]
    pub config: Option<PathBuf>,
}

/// Keys accepted in the TOML file.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    pub player: Option<String>,
    pub site: Option<String>,
    pub input: Option<String>,
    pub compression: Option<String>,
    pub history: Option<PathBuf>,
    pub output: Option<PathBuf>,
    pub dedup: Option<String>,
}

impl FileConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
        Self::parse(&raw).map_err(|e| Error::Config(format!("{}: {e}", path.display())))
    }

    pub fn parse(raw: &str) -> std::result::Result<Self, toml::de::Error> {
        toml::from_str(raw)
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub player: String,
    pub site: String,
    pub input: String,
    pub compression: Option<CompressionMode>,
    pub history: Option<PathBuf>,
    pub output: Option<PathBuf>,
    pub dedup: DedupPolicy,
}

pub fn parse_dedup(raw: &str) -> Result<DedupPolicy> {
    match raw.trim().to_lowercase().as_str() {
        "full" | "equality" => Ok(DedupPolicy::FullEquality),
        "id" => Ok(DedupPolicy::by_id()),
        other => Err(Error::Config(format!(
            "unknown dedup policy '{other}' (expected 'full' or 'id')"
        ))),
    }
}

fn missing(what: &str) -> Error {
    Error::Config(what.to_string())
}

impl Config {
    /// Resolves flags against the `--config` file, if one was given.
    pub fn from_args(args: RunArgs) -> Result<Self> {
        let file = match &args.config {
            Some(path) => FileConfig::load(path)?,
            None => FileConfig::default(),
        };
        Self::resolve(args, file)
    }

    pub fn resolve(args: RunArgs, file: FileConfig) -> Result<Self> {
        let player = args
            .player
            .or(file.player)
            .filter(|p| !p.trim().is_empty())
            .ok_or_else(|| missing("a player is required (--player or CHESS_PLAYER)"))?;
        let input = args
            .input
            .or(file.input)
            .filter(|i| !i.trim().is_empty())
            .ok_or_else(|| missing("an input is required (--input or CHESS_INPUT)"))?;

        let compression = args
            .compression
            .or(file.compression)
            .map(|raw| CompressionMode::parse(&raw))
            .transpose()?;
        let dedup = args
            .dedup
            .or(file.dedup)
            .map(|raw| parse_dedup(&raw))
            .transpose()?
            .unwrap_or_default();

        Ok(Self {
            player: player.trim().to_string(),
            site: args
                .site
                .or(file.site)
                .unwrap_or_else(|| DEFAULT_SITE.to_string()),
            input,
            compression,
            history: args.history.or(file.history),
            output: args.output.or(file.output),
            dedup,
        })
    }
}
