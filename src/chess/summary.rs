use super::moves::count_plies;
use super::types::{ChessGame, GameBatch, GameResult, Speed};
use serde::Serialize;
use std::collections::BTreeMap;

/// Win/loss/draw tally.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Record {
    pub games: usize,
    pub wins: usize,
    pub losses: usize,
    pub draws: usize,
    pub unknown: usize,
}

impl Record {
    fn add(&mut self, result: GameResult) {
        self.games += 1;
        match result {
            GameResult::Win => self.wins += 1,
            GameResult::Loss => self.losses += 1,
            GameResult::Draw => self.draws += 1,
            GameResult::Unknown => self.unknown += 1,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SpeedSummary {
    #[serde(flatten)]
    pub record: Record,
    /// Tracked player's most recent known rating at this speed.
    pub current_rating: Option<u32>,
}

/// Overview of a batch from the tracked player's perspective.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchSummary {
    pub player: String,
    pub site: String,
    #[serde(flatten)]
    pub record: Record,
    pub by_speed: BTreeMap<Speed, SpeedSummary>,
    pub average_plies: Option<f64>,
}

// Most recent first: games with a start time by descending time, then the rest in batch order.
fn recency_order(games: &[ChessGame]) -> Vec<&ChessGame> {
    let mut ordered: Vec<(usize, &ChessGame)> = games.iter().enumerate().collect();
    ordered.sort_by(|(li, left), (ri, right)| {
        match (&left.started_at, &right.started_at) {
            (Some(l), Some(r)) => r.cmp(l),
            (Some(_), None) => std::cmp::Ordering::Less,
            (None, Some(_)) => std::cmp::Ordering::Greater,
            (None, None) => std::cmp::Ordering::Equal,
        }
        .then_with(|| li.cmp(ri))
    });
    ordered.into_iter().map(|(_, game)| game).collect()
}

impl BatchSummary {
    pub fn from_batch(batch: &GameBatch) -> Self {
        let mut summary = BatchSummary {
            player: batch.player.clone(),
            site: batch.site.clone(),
            ..Default::default()
        };

        let mut plies_total = 0u64;
        let mut plies_games = 0u64;

        for game in recency_order(&batch.games) {
            summary.record.add(game.result);

            let speed = summary.by_speed.entry(game.speed).or_default();
            speed.record.add(game.result);
            if speed.current_rating.is_none() {
                speed.current_rating = game.player_rating;
            }

            if let Some(plies) = count_plies(&game.pgn) {
                plies_total += u64::from(plies);
                plies_games += 1;
            }
        }

        if plies_games > 0 {
            summary.average_plies = Some(plies_total as f64 / plies_games as f64);
        }
        summary
    }

    /// Most recent known rating at `speed`.
    pub fn current_rating(&self, speed: Speed) -> Option<u32> {
        self.by_speed.get(&speed).and_then(|s| s.current_rating)
    }
}
