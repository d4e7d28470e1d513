use super::batch::assemble_batch;
use super::error::Result;
use super::history::{DedupPolicy, HistoryStore, merge_into_history};
use super::source::GameSource;
use super::types::GameBatch;

/// Fetches the player's export, assembles it, and merges it into `store` when one is given.
///
/// Fetch and store failures end the run; field-level problems never do.
pub fn ingest<S, H>(
    source: &S,
    store: Option<&mut H>,
    player: &str,
    site: &str,
    policy: DedupPolicy,
) -> Result<GameBatch>
where
    S: GameSource + ?Sized,
    H: HistoryStore + ?Sized,
{
    let text = source.fetch(player)?;
    let batch = assemble_batch(player, site, &text);

    match store {
        Some(store) => merge_into_history(store, batch, policy),
        None => Ok(batch),
    }
}
