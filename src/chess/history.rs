//! Cross-run accumulation of game batches.
//!
//! The merge itself is pure ([`merge_batches`]); persistence goes through the
//! [`HistoryStore`] port so callers decide where the history lives. At most one writer may
//! use a store at a time.

use super::error::{Error, Result};
use super::types::{ChessGame, GameBatch};
use chrono::{DateTime, Utc};
use std::collections::{HashMap, HashSet};
use std::fs::{self, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use tracing::{info, instrument};

/// Combines two records sharing an `id`: `(previous, incoming) -> kept`.
pub type GameReducer = fn(ChessGame, ChessGame) -> ChessGame;

/// How the union of old and new games is deduplicated.
#[derive(Clone, Copy, Default)]
pub enum DedupPolicy {
    /// Two records are the same entry only when every field matches. A game fetched again
    /// with revised metadata is kept twice.
    #[default]
    FullEquality,
    /// Records are keyed by `id`; collisions are resolved by the reducer.
    ById(GameReducer),
}

impl DedupPolicy {
    /// Id-keyed policy using [`prefer_more_complete`].
    pub fn by_id() -> Self {
        Self::ById(prefer_more_complete)
    }
}

impl std::fmt::Debug for DedupPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::FullEquality => f.write_str("FullEquality"),
            Self::ById(_) => f.write_str("ById"),
        }
    }
}

/// Keeps the record with more known fields; on a tie the one with a start time, then the
/// incoming one.
pub fn prefer_more_complete(previous: ChessGame, incoming: ChessGame) -> ChessGame {
    let (old_score, new_score) = (previous.completeness(), incoming.completeness());
    if new_score != old_score {
        return if new_score > old_score { incoming } else { previous };
    }

    if incoming.started_at.is_none() && previous.started_at.is_some() {
        previous
    } else {
        incoming
    }
}

fn dedup_full_equality(games: Vec<ChessGame>) -> Vec<ChessGame> {
    let keep: Vec<bool> = {
        let mut seen = HashSet::with_capacity(games.len());
        games.iter().map(|game| seen.insert(game)).collect()
    };

    games
        .into_iter()
        .zip(keep)
        .filter_map(|(game, keep)| keep.then_some(game))
        .collect()
}

fn dedup_by_id(
    incoming: Vec<ChessGame>,
    previous: Vec<ChessGame>,
    reducer: GameReducer,
) -> Vec<ChessGame> {
    let mut slots: Vec<Option<ChessGame>> = Vec::with_capacity(incoming.len() + previous.len());
    let mut index: HashMap<String, usize> = HashMap::with_capacity(slots.capacity());

    for game in incoming {
        match index.get(&game.id) {
            Some(&i) => {
                if let Some(existing) = slots[i].take() {
                    slots[i] = Some(reducer(existing, game));
                }
            }
            None => {
                index.insert(game.id.clone(), slots.len());
                slots.push(Some(game));
            }
        }
    }

    for game in previous {
        match index.get(&game.id) {
            Some(&i) => {
                if let Some(existing) = slots[i].take() {
                    slots[i] = Some(reducer(game, existing));
                }
            }
            None => {
                index.insert(game.id.clone(), slots.len());
                slots.push(Some(game));
            }
        }
    }

    slots.into_iter().flatten().collect()
}

/// Unions `incoming` with `previous` under `policy`.
///
/// Without prior history the incoming batch is returned as is. Otherwise incoming games come
/// first, followed by prior games not already present; player and site come from `incoming`.
pub fn merge_batches(
    previous: Option<GameBatch>,
    incoming: GameBatch,
    policy: DedupPolicy,
) -> GameBatch {
    let Some(previous) = previous else {
        return incoming;
    };

    let GameBatch {
        player,
        site,
        games,
    } = incoming;

    let games = match policy {
        DedupPolicy::FullEquality => {
            let mut all = games;
            all.extend(previous.games);
            dedup_full_equality(all)
        }
        DedupPolicy::ById(reducer) => dedup_by_id(games, previous.games, reducer),
    };

    GameBatch {
        player,
        site,
        games,
    }
}

/// Durable home of the accumulated history.
pub trait HistoryStore {
    /// Current history, `None` when nothing has been stored yet.
    fn load(&self) -> Result<Option<GameBatch>>;

    /// Copies the current history aside and returns where it went, `None` when there was
    /// nothing to copy.
    fn backup(&mut self) -> Result<Option<String>>;

    fn save(&mut self, batch: &GameBatch) -> Result<()>;
}

/// Merges `incoming` into the stored history, backing up the previous document first, and
/// returns the merged batch. Any store failure aborts the merge.
#[instrument(skip_all, fields(player = %incoming.player, site = %incoming.site))]
pub fn merge_into_history<S: HistoryStore + ?Sized>(
    store: &mut S,
    incoming: GameBatch,
    policy: DedupPolicy,
) -> Result<GameBatch> {
    let previous = store.load()?;
    let previous_len = previous.as_ref().map_or(0, GameBatch::len);
    let incoming_len = incoming.len();

    let merged = merge_batches(previous, incoming, policy);

    let backup = store.backup()?;
    store.save(&merged)?;

    info!(
        previous = previous_len,
        incoming = incoming_len,
        merged = merged.len(),
        added = merged.len().saturating_sub(previous_len),
        ?policy,
        backup = backup.as_deref().unwrap_or("none"),
        "merged game history"
    );
    Ok(merged)
}

/// Backup location for `path` taken at `at`: `<stem>.<YYYYMMDDTHHMMSS.mmmZ>.<ext>` beside it.
pub fn backup_path(path: &Path, at: DateTime<Utc>) -> PathBuf {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "history".to_string());
    let ext = path
        .extension()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "json".to_string());
    let stamp = at.format("%Y%m%dT%H%M%S%.3fZ");

    path.with_file_name(format!("{stem}.{stamp}.{ext}"))
}

/// `base` with `-<n>` inserted before its extension, for backups taken within the same
/// millisecond.
pub fn numbered_backup_path(base: &Path, n: u32) -> PathBuf {
    let stem = base
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    match base.extension() {
        Some(ext) => base.with_file_name(format!("{stem}-{n}.{}", ext.to_string_lossy())),
        None => base.with_file_name(format!("{stem}-{n}")),
    }
}

/// Creates a backup file that did not exist before, numbering the name on collision.
fn create_backup_file(base: &Path) -> Result<(PathBuf, fs::File)> {
    let mut candidate = base.to_path_buf();
    let mut n = 0u32;
    loop {
        match OpenOptions::new().write(true).create_new(true).open(&candidate) {
            Ok(file) => return Ok((candidate, file)),
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
                n += 1;
                candidate = numbered_backup_path(base, n);
            }
            Err(e) => return Err(Error::io(&candidate, e)),
        }
    }
}

/// History kept as one pretty-printed JSON document.
#[derive(Debug, Clone)]
pub struct FileHistoryStore {
    path: PathBuf,
}

impl FileHistoryStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temporary_path(&self) -> PathBuf {
        let name = self
            .path
            .file_name()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "history.json".to_string());
        self.path
            .with_file_name(format!(".{name}.tmp-{}", std::process::id()))
    }

    /// Copies the current document to a fresh backup stamped `at`. Earlier backups are never
    /// overwritten.
    pub fn backup_at(&self, at: DateTime<Utc>) -> Result<Option<PathBuf>> {
        if !self.path.exists() {
            return Ok(None);
        }

        let mut source = fs::File::open(&self.path).map_err(|e| Error::io(&self.path, e))?;
        let (target, mut file) = create_backup_file(&backup_path(&self.path, at))?;
        io::copy(&mut source, &mut file).map_err(|e| Error::io(&target, e))?;
        file.sync_all().map_err(|e| Error::io(&target, e))?;
        Ok(Some(target))
    }
}

impl HistoryStore for FileHistoryStore {
    fn load(&self) -> Result<Option<GameBatch>> {
        if !self.path.exists() {
            return Ok(None);
        }

        let raw = fs::read_to_string(&self.path).map_err(|e| Error::io(&self.path, e))?;
        let batch = serde_json::from_str(&raw).map_err(|source| Error::CorruptStore {
            path: self.path.clone(),
            source,
        })?;
        Ok(Some(batch))
    }

    fn backup(&mut self) -> Result<Option<String>> {
        let target = self.backup_at(Utc::now())?;
        Ok(target.map(|path| path.display().to_string()))
    }

    fn save(&mut self, batch: &GameBatch) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
        }

        let bytes = serde_json::to_vec_pretty(batch)?;
        let temp_path = self.temporary_path();
        fs::write(&temp_path, bytes).map_err(|e| Error::io(&temp_path, e))?;
        if let Err(e) = fs::rename(&temp_path, &self.path) {
            let _ = fs::remove_file(&temp_path);
            return Err(Error::io(&self.path, e));
        }
        Ok(())
    }
}

/// In-process store; backups are kept in memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryHistoryStore {
    current: Option<GameBatch>,
    backups: Vec<GameBatch>,
}

impl MemoryHistoryStore {
    pub fn with_history(batch: GameBatch) -> Self {
        Self {
            current: Some(batch),
            backups: Vec::new(),
        }
    }

    pub fn current(&self) -> Option<&GameBatch> {
        self.current.as_ref()
    }

    pub fn backups(&self) -> &[GameBatch] {
        &self.backups
    }
}

impl HistoryStore for MemoryHistoryStore {
    fn load(&self) -> Result<Option<GameBatch>> {
        Ok(self.current.clone())
    }

    fn backup(&mut self) -> Result<Option<String>> {
        let Some(current) = &self.current else {
            return Ok(None);
        };
        self.backups.push(current.clone());
        Ok(Some(format!("memory#{}", self.backups.len())))
    }

    fn save(&mut self, batch: &GameBatch) -> Result<()> {
        self.current = Some(batch.clone());
        Ok(())
    }
}
