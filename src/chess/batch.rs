use super::error::ErrorAccumulator;
use super::headers::GameHeaders;
use super::normalize::{
    is_rated, player_side, resolve_color, resolve_id, resolve_opening, resolve_opponent,
    resolve_ratings, resolve_result, started_at,
};
use super::segment::{Segmenter, TextSegmenter};
use super::timecontrol::{infer_speed, normalize_time_control};
use super::types::{ChessGame, GameBatch, Speed, UNKNOWN};
use tracing::{debug, info, warn};

/// Builds one game record from a single block. `position` is 1-based within the batch.
///
/// Never fails; unresolved fields degrade and the reasons are appended to `diagnostics`.
pub fn normalize_game(
    player: &str,
    site: &str,
    position: usize,
    block: &str,
    diagnostics: &mut ErrorAccumulator,
) -> ChessGame {
    let headers = GameHeaders::parse(block);
    let white = headers.get("White");
    let black = headers.get("Black");
    let event = headers.get("Event");
    let time_control = headers.get("TimeControl");

    if player_side(player, white, black).is_none() {
        diagnostics.push(&format!(
            "Player '{player}' is neither White ({}) nor Black ({}); assuming White",
            white.unwrap_or("?"),
            black.unwrap_or("?")
        ));
    }
    let color = resolve_color(player, white, black);
    let (player_rating, opponent_rating) = resolve_ratings(&headers, color, diagnostics);

    ChessGame {
        id: resolve_id(&headers, site, position, diagnostics),
        rated: is_rated(event),
        time_control: normalize_time_control(time_control).unwrap_or_else(|| UNKNOWN.to_string()),
        speed: infer_speed(event, time_control).unwrap_or(Speed::Unknown),
        color,
        result: resolve_result(headers.get("Result"), color),
        opponent: resolve_opponent(&headers, color),
        player_rating,
        opponent_rating,
        opening: resolve_opening(&headers),
        pgn: block.to_string(),
        started_at: started_at(headers.get("UTCDate"), headers.get("UTCTime"), diagnostics),
    }
}

/// Segments `text` with `segmenter` and normalizes every block, in order.
///
/// Every block yields exactly one game; an input without blocks yields an empty batch.
pub fn assemble_batch_with<S: Segmenter + ?Sized>(
    segmenter: &S,
    player: &str,
    site: &str,
    text: &str,
) -> GameBatch {
    let blocks = segmenter.segment(text);
    debug!(blocks = blocks.len(), "segmented PGN input");

    let mut batch = GameBatch::new(player, site);
    batch.games.reserve(blocks.len());

    let mut degraded = 0usize;
    for (idx, block) in blocks.iter().enumerate() {
        let mut diagnostics = ErrorAccumulator::default();
        let game = normalize_game(player, site, idx + 1, block, &mut diagnostics);
        if let Some(message) = diagnostics.take() {
            degraded += 1;
            warn!(game = %game.id, position = idx + 1, "{message}");
        }
        batch.games.push(game);
    }

    info!(
        player,
        site,
        games = batch.len(),
        degraded,
        "assembled game batch"
    );
    batch
}

/// [`assemble_batch_with`] using the default [`TextSegmenter`].
pub fn assemble_batch(player: &str, site: &str, text: &str) -> GameBatch {
    assemble_batch_with(&TextSegmenter, player, site, text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chess::types::{Color, GameResult};

    const LICHESS_GAME: &str = r#"[Event "Rated Blitz game"]
[Site "https://lichess.org/q7ZvsdUF"]
[Date "2024.03.15"]
[White "alice"]
[Black "Bob"]
[Result "0-1"]
[UTCDate "2024.03.15"]
[UTCTime "18:04:59"]
[WhiteElo "1500"]
[BlackElo "1620"]
[ECO "C20"]
[Opening "King's Pawn Game"]
[TimeControl "180+2"]

1. e4 e5 2. Qh5 Nc6 3. Bc4 Nf6 4. Qxf7# 0-1"#;

    #[test]
    fn test_normalize_full_game_from_black_side() {
        let mut diag = ErrorAccumulator::default();
        let game = normalize_game("bob", "lichess", 1, LICHESS_GAME, &mut diag);

        assert_eq!(game.id, "q7ZvsdUF");
        assert!(game.rated);
        assert_eq!(game.time_control, "3+2");
        assert_eq!(game.speed, Speed::Blitz);
        assert_eq!(game.color, Color::Black);
        assert_eq!(game.result, GameResult::Win);
        assert_eq!(game.opponent, "alice");
        assert_eq!(game.player_rating, Some(1620));
        assert_eq!(game.opponent_rating, Some(1500));
        assert_eq!(game.opening.as_deref(), Some("King's Pawn Game"));
        assert_eq!(game.started_at.as_deref(), Some("2024-03-15T18:04:59Z"));
        assert_eq!(game.pgn, LICHESS_GAME);
        assert!(diag.is_empty());
    }

    #[test]
    fn test_missing_time_control_and_ratings() {
        let block = "[White \"me\"]\n[Black \"you\"]\n[Result \"1-0\"]\n\n1. e4 1-0";
        let mut diag = ErrorAccumulator::default();
        let game = normalize_game("me", "chess.com", 1, block, &mut diag);

        assert_eq!(game.time_control, "unknown");
        assert_eq!(game.speed, Speed::Unknown);
        assert_eq!(game.player_rating, None);
        assert_eq!(game.opponent_rating, None);
        assert_eq!(game.result, GameResult::Win);
        assert_eq!(game.started_at, None);
    }

    #[test]
    fn test_unknown_player_is_flagged_and_defaults_to_white() {
        let mut diag = ErrorAccumulator::default();
        let game = normalize_game("carol", "lichess", 1, LICHESS_GAME, &mut diag);

        assert_eq!(game.color, Color::White);
        assert_eq!(game.result, GameResult::Loss);
        assert_eq!(game.opponent, "Bob");
        assert!(diag.take().unwrap().contains("neither White (alice) nor Black (Bob)"));
    }

    #[test]
    fn test_tagless_block_still_yields_a_game() {
        let mut diag = ErrorAccumulator::default();
        let game = normalize_game("me", "lichess", 4, "1. e4 e5 *", &mut diag);

        assert_eq!(game.id, "lichess:4");
        assert!(!game.rated);
        assert_eq!(game.opponent, "unknown");
        assert_eq!(game.result, GameResult::Unknown);
        assert_eq!(game.pgn, "1. e4 e5 *");
        assert!(!diag.is_empty());
    }

    #[test]
    fn test_assemble_preserves_order_and_count() {
        let text = format!(
            "{LICHESS_GAME}\n\n[Event \"Casual Rapid game\"]\n[White \"bob\"]\n[Black \"dave\"]\n[Result \"1/2-1/2\"]\n\n1. d4 d5 1/2-1/2\n\n[Event \"Live Chess\"]\n[White \"erin\"]\n[Black \"bob\"]\n\n1. c4 *\n"
        );
        let batch = assemble_batch("bob", "lichess", &text);

        assert_eq!(batch.player, "bob");
        assert_eq!(batch.site, "lichess");
        assert_eq!(batch.len(), 3);
        assert_eq!(batch.games[0].id, "q7ZvsdUF");
        assert_eq!(batch.games[1].id, "lichess:2");
        assert_eq!(batch.games[1].result, GameResult::Draw);
        assert_eq!(batch.games[1].speed, Speed::Rapid);
        assert!(!batch.games[1].rated);
        assert_eq!(batch.games[2].id, "lichess:3");
        assert_eq!(batch.games[2].color, Color::Black);
        assert_eq!(batch.games[2].result, GameResult::Unknown);
    }

    #[test]
    fn test_assemble_empty_input() {
        let batch = assemble_batch("bob", "lichess", "");
        assert!(batch.is_empty());
        assert_eq!(batch.player, "bob");
    }
}
