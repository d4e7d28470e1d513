use super::error::{Error, Result};
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::debug;
use zstd::stream::read::Decoder as ZstdDecoder;

/// Supplies the raw multi-game export for a player.
pub trait GameSource {
    fn fetch(&self, player: &str) -> Result<String>;
}

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum CompressionMode {
    #[default]
    Plain,
    Zstd,
}

impl CompressionMode {
    pub fn parse(raw: &str) -> Result<Self> {
        let normalized = raw.trim();
        if normalized.eq_ignore_ascii_case("zstd") {
            Ok(Self::Zstd)
        } else if normalized.eq_ignore_ascii_case("none")
            || normalized.eq_ignore_ascii_case("plain")
        {
            Ok(Self::Plain)
        } else {
            Err(Error::Compression(format!(
                "Invalid compression value '{normalized}'. Supported values: 'zstd' or 'none'."
            )))
        }
    }

    /// Mode implied by a file extension.
    pub fn for_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("zst") => Self::Zstd,
            _ => Self::Plain,
        }
    }
}

/// PGN exports stored locally: a single path or a glob pattern.
#[derive(Debug, Clone)]
pub struct FileSource {
    pattern: String,
    compression: Option<CompressionMode>,
}

impl FileSource {
    /// `compression` of `None` picks the mode per file from its extension.
    pub fn new(pattern: impl Into<String>, compression: Option<CompressionMode>) -> Self {
        Self {
            pattern: pattern.into(),
            compression,
        }
    }

    /// Matching files in sorted order.
    pub fn paths(&self) -> Result<Vec<PathBuf>> {
        let pattern = &self.pattern;
        let mut paths: Vec<PathBuf> = if pattern.contains('*') || pattern.contains('?') {
            glob::glob(pattern)?.filter_map(|entry| entry.ok()).collect()
        } else {
            vec![PathBuf::from(pattern)]
        };
        paths.sort();

        if paths.is_empty() {
            return Err(Error::NoInput(pattern.clone()));
        }
        Ok(paths)
    }

    fn read_path(&self, path: &Path) -> Result<String> {
        let file = File::open(path).map_err(|e| Error::io(path, e))?;
        let compression = self
            .compression
            .unwrap_or_else(|| CompressionMode::for_path(path));

        let mut reader: Box<dyn Read> = match compression {
            CompressionMode::Plain => Box::new(file),
            CompressionMode::Zstd => Box::new(ZstdDecoder::new(file).map_err(|e| {
                Error::Compression(format!(
                    "Failed to initialize zstd decoder for '{}': {}",
                    path.display(),
                    e
                ))
            })?),
        };

        let mut text = String::new();
        reader
            .read_to_string(&mut text)
            .map_err(|e| Error::io(path, e))?;
        Ok(text)
    }
}

impl GameSource for FileSource {
    /// Files are joined with a blank line so games from different files stay separable.
    fn fetch(&self, player: &str) -> Result<String> {
        let mut combined = String::new();
        for path in self.paths()? {
            let text = self.read_path(&path)?;
            debug!(player, path = %path.display(), bytes = text.len(), "read PGN input");

            let text = text.trim();
            if text.is_empty() {
                continue;
            }
            if !combined.is_empty() {
                combined.push_str("\n\n");
            }
            combined.push_str(text);
        }
        Ok(combined)
    }
}

/// Fixed text, for callers that already hold the export in memory.
#[derive(Debug, Clone, Default)]
pub struct TextSource(pub String);

impl GameSource for TextSource {
    fn fetch(&self, _player: &str) -> Result<String> {
        Ok(self.0.clone())
    }
}
