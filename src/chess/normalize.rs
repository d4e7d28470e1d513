//! Pure conversions from raw tag values to canonical game fields.
//!
//! Every function is total: missing or malformed input degrades to an absent value or a
//! default, optionally noting what happened in an [`ErrorAccumulator`].

use super::error::ErrorAccumulator;
use super::headers::GameHeaders;
use super::types::{Color, GameResult, UNKNOWN};
use chrono::{NaiveDate, NaiveTime};

/// Side whose name matches `player` (case-insensitive), if any.
pub fn player_side(player: &str, white: Option<&str>, black: Option<&str>) -> Option<Color> {
    let player = player.trim();
    let matches = |name: Option<&str>| {
        name.is_some_and(|n| n.trim().to_lowercase() == player.to_lowercase())
    };

    if matches(white) {
        Some(Color::White)
    } else if matches(black) {
        Some(Color::Black)
    } else {
        None
    }
}

/// Tracked player's color; a name found on neither side resolves to White.
pub fn resolve_color(player: &str, white: Option<&str>, black: Option<&str>) -> Color {
    player_side(player, white, black).unwrap_or(Color::White)
}

pub fn resolve_result(result: Option<&str>, color: Color) -> GameResult {
    match result.map(str::trim) {
        Some("1-0") if color == Color::White => GameResult::Win,
        Some("1-0") => GameResult::Loss,
        Some("0-1") if color == Color::Black => GameResult::Win,
        Some("0-1") => GameResult::Loss,
        Some("1/2-1/2") => GameResult::Draw,
        _ => GameResult::Unknown,
    }
}

fn parse_rating(raw: Option<&str>, label: &str, diagnostics: &mut ErrorAccumulator) -> Option<u32> {
    let s = raw?.trim();
    if s.is_empty() || s == "?" || s == "-" {
        return None;
    }
    match s.parse::<u32>() {
        Ok(v) => Some(v),
        Err(_) => {
            diagnostics.push(&format!("Conversion error: {label}='{s}'"));
            None
        }
    }
}

/// `(player_rating, opponent_rating)` picked from the Elo tags by side.
pub fn resolve_ratings(
    headers: &GameHeaders,
    color: Color,
    diagnostics: &mut ErrorAccumulator,
) -> (Option<u32>, Option<u32>) {
    let white = parse_rating(headers.get("WhiteElo"), "WhiteElo", diagnostics);
    let black = parse_rating(headers.get("BlackElo"), "BlackElo", diagnostics);
    match color {
        Color::White => (white, black),
        Color::Black => (black, white),
    }
}

pub fn resolve_opponent(headers: &GameHeaders, color: Color) -> String {
    let tag = match color {
        Color::White => "Black",
        Color::Black => "White",
    };
    headers.get(tag).unwrap_or(UNKNOWN).to_string()
}

/// Opening name, falling back to the ECO code.
pub fn resolve_opening(headers: &GameHeaders) -> Option<String> {
    headers
        .get("Opening")
        .or_else(|| headers.get("ECO"))
        .map(str::to_string)
}

/// Heuristic rated flag from the event description.
pub fn is_rated(event: Option<&str>) -> bool {
    event.is_some_and(|e| e.to_lowercase().contains("rated"))
}

/// `"YYYY-MM-DDTHH:MM:SSZ"` from `UTCDate` (`YYYY.MM.DD`) and `UTCTime` (`HH:MM:SS...`).
///
/// Both tags are required; the legacy `Date` tag is never consulted.
pub fn started_at(
    utc_date: Option<&str>,
    utc_time: Option<&str>,
    diagnostics: &mut ErrorAccumulator,
) -> Option<String> {
    let date_raw = utc_date?.trim();
    let time_raw = utc_time?.trim();
    if date_raw.is_empty() || time_raw.len() < 8 {
        return None;
    }

    let date = match NaiveDate::parse_from_str(date_raw, "%Y.%m.%d") {
        Ok(d) => d,
        Err(e) => {
            diagnostics.push(&format!("Conversion error: UTCDate='{date_raw}' (chrono: {e})"));
            return None;
        }
    };

    let time_prefix = time_raw.get(..8)?;
    let time = match NaiveTime::parse_from_str(time_prefix, "%H:%M:%S") {
        Ok(t) => t,
        Err(e) => {
            diagnostics.push(&format!("Conversion error: UTCTime='{time_raw}' (chrono: {e})"));
            return None;
        }
    };

    Some(format!(
        "{}T{}Z",
        date.format("%Y-%m-%d"),
        time.format("%H:%M:%S")
    ))
}

fn id_from_url(url: &str) -> Option<String> {
    let url = url.trim();
    let url = url.split(['?', '#']).next()?;
    let url = url.strip_suffix('/').unwrap_or(url);
    let path = url.split_once("://").map_or(url, |(_, rest)| rest);

    let (_, last) = path.rsplit_once('/')?;
    (!last.is_empty()).then(|| last.to_string())
}

/// Stable game identity: final path segment of the `Link` tag, or of `Site` when it holds a
/// URL. Falls back to `"<site>:<position>"` with a 1-based position in the batch.
pub fn resolve_id(
    headers: &GameHeaders,
    site: &str,
    position: usize,
    diagnostics: &mut ErrorAccumulator,
) -> String {
    let from_link = headers.get("Link").and_then(id_from_url);
    let from_site = || {
        headers
            .get("Site")
            .filter(|s| s.contains("://"))
            .and_then(id_from_url)
    };

    match from_link.or_else(from_site) {
        Some(id) => id,
        None => {
            let fallback = format!("{site}:{position}");
            diagnostics.push(&format!("No game link, using id '{fallback}'"));
            fallback
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers(pairs: &[(&str, &str)]) -> GameHeaders {
        pairs.iter().copied().collect()
    }

    #[test]
    fn test_color_matches_case_insensitively() {
        assert_eq!(resolve_color("Alice", Some("alice"), Some("bob")), Color::White);
        assert_eq!(resolve_color("BOB", Some("alice"), Some("Bob")), Color::Black);
    }

    #[test]
    fn test_color_defaults_to_white_when_absent() {
        assert_eq!(player_side("carol", Some("alice"), Some("bob")), None);
        assert_eq!(resolve_color("carol", Some("alice"), Some("bob")), Color::White);
        assert_eq!(resolve_color("carol", None, None), Color::White);
    }

    #[test]
    fn test_result_from_white_perspective() {
        assert_eq!(resolve_result(Some("1-0"), Color::White), GameResult::Win);
        assert_eq!(resolve_result(Some("0-1"), Color::White), GameResult::Loss);
    }

    #[test]
    fn test_result_from_black_perspective() {
        assert_eq!(resolve_result(Some("1-0"), Color::Black), GameResult::Loss);
        assert_eq!(resolve_result(Some("0-1"), Color::Black), GameResult::Win);
    }

    #[test]
    fn test_draw_regardless_of_color() {
        assert_eq!(resolve_result(Some("1/2-1/2"), Color::White), GameResult::Draw);
        assert_eq!(resolve_result(Some("1/2-1/2"), Color::Black), GameResult::Draw);
    }

    #[test]
    fn test_unfinished_or_missing_result() {
        assert_eq!(resolve_result(Some("*"), Color::White), GameResult::Unknown);
        assert_eq!(resolve_result(None, Color::Black), GameResult::Unknown);
        assert_eq!(resolve_result(Some("1-1"), Color::White), GameResult::Unknown);
    }

    #[test]
    fn test_ratings_follow_color() {
        let h = headers(&[("WhiteElo", "1500"), ("BlackElo", "1620")]);
        let mut diag = ErrorAccumulator::default();

        assert_eq!(resolve_ratings(&h, Color::White, &mut diag), (Some(1500), Some(1620)));
        assert_eq!(resolve_ratings(&h, Color::Black, &mut diag), (Some(1620), Some(1500)));
        assert!(diag.is_empty());
    }

    #[test]
    fn test_ratings_absent_on_bad_or_missing_tags() {
        let h = headers(&[("WhiteElo", "abc"), ("BlackElo", "?")]);
        let mut diag = ErrorAccumulator::default();

        assert_eq!(resolve_ratings(&h, Color::White, &mut diag), (None, None));
        assert_eq!(diag.take().as_deref(), Some("Conversion error: WhiteElo='abc'"));

        let empty = GameHeaders::default();
        assert_eq!(resolve_ratings(&empty, Color::Black, &mut diag), (None, None));
        assert!(diag.is_empty());
    }

    #[test]
    fn test_opponent_is_other_side() {
        let h = headers(&[("White", "alice"), ("Black", "bob")]);
        assert_eq!(resolve_opponent(&h, Color::White), "bob");
        assert_eq!(resolve_opponent(&h, Color::Black), "alice");
        assert_eq!(resolve_opponent(&GameHeaders::default(), Color::White), "unknown");
    }

    #[test]
    fn test_opening_prefers_name_over_eco() {
        let both = headers(&[("ECO", "C20"), ("Opening", "King's Pawn Game")]);
        assert_eq!(resolve_opening(&both).as_deref(), Some("King's Pawn Game"));

        let eco_only = headers(&[("ECO", "C20")]);
        assert_eq!(resolve_opening(&eco_only).as_deref(), Some("C20"));

        assert_eq!(resolve_opening(&GameHeaders::default()), None);
    }

    #[test]
    fn test_rated_flag() {
        assert!(is_rated(Some("Rated Blitz game")));
        assert!(is_rated(Some("RATED")));
        assert!(!is_rated(Some("Casual Blitz game")));
        assert!(!is_rated(Some("Live Chess")));
        assert!(!is_rated(None));
    }

    #[test]
    fn test_started_at_requires_both_tags() {
        let mut diag = ErrorAccumulator::default();
        assert_eq!(
            started_at(Some("2024.03.15"), Some("18:04:59"), &mut diag).as_deref(),
            Some("2024-03-15T18:04:59Z")
        );
        assert_eq!(started_at(Some("2024.03.15"), None, &mut diag), None);
        assert_eq!(started_at(None, Some("18:04:59"), &mut diag), None);
        assert!(diag.is_empty());
    }

    #[test]
    fn test_started_at_uses_time_prefix() {
        let mut diag = ErrorAccumulator::default();
        assert_eq!(
            started_at(Some("2024.03.15"), Some("18:04:59.123"), &mut diag).as_deref(),
            Some("2024-03-15T18:04:59Z")
        );
        assert_eq!(started_at(Some("2024.03.15"), Some("18:04"), &mut diag), None);
    }

    #[test]
    fn test_started_at_invalid_values_record_diagnostics() {
        let mut diag = ErrorAccumulator::default();
        assert_eq!(started_at(Some("????.??.??"), Some("18:04:59"), &mut diag), None);
        assert!(diag.take().unwrap().contains("UTCDate='????.??.??'"));

        assert_eq!(started_at(Some("2024.03.15"), Some("25:61:00"), &mut diag), None);
        assert!(diag.take().unwrap().contains("UTCTime='25:61:00'"));
    }

    #[test]
    fn test_started_at_canonicalizes_calendar_dates() {
        let mut diag = ErrorAccumulator::default();
        assert_eq!(
            started_at(Some("2024.3.5"), Some("09:07:01"), &mut diag).as_deref(),
            Some("2024-03-05T09:07:01Z")
        );
        assert!(diag.is_empty());

        assert_eq!(started_at(Some("2023.02.29"), Some("09:07:01"), &mut diag), None);
        assert!(diag.take().unwrap().contains("UTCDate='2023.02.29'"));
    }

    #[test]
    fn test_id_from_link() {
        let h = headers(&[("Link", "https://site.example/abc123")]);
        let mut diag = ErrorAccumulator::default();
        assert_eq!(resolve_id(&h, "lichess", 1, &mut diag), "abc123");
        assert!(diag.is_empty());
    }

    #[test]
    fn test_id_strips_trailing_slash_and_query() {
        let h = headers(&[("Link", "https://www.chess.com/game/live/987654/?tab=review")]);
        let mut diag = ErrorAccumulator::default();
        assert_eq!(resolve_id(&h, "chess.com", 1, &mut diag), "987654");

        let h = headers(&[("Link", "https://site.example/xyz/")]);
        assert_eq!(resolve_id(&h, "chess.com", 1, &mut diag), "xyz");
    }

    #[test]
    fn test_id_from_site_url() {
        let h = headers(&[("Site", "https://lichess.org/q7ZvsdUF")]);
        let mut diag = ErrorAccumulator::default();
        assert_eq!(resolve_id(&h, "lichess", 1, &mut diag), "q7ZvsdUF");
    }

    #[test]
    fn test_id_fallback_uses_site_and_position() {
        let h = headers(&[("Site", "Chess.com"), ("Link", "")]);
        let mut diag = ErrorAccumulator::default();
        assert_eq!(resolve_id(&h, "chess.com", 3, &mut diag), "chess.com:3");
        assert!(diag.take().unwrap().contains("chess.com:3"));

        assert_eq!(
            resolve_id(&GameHeaders::default(), "lichess", 7, &mut diag),
            "lichess:7"
        );
    }

    #[test]
    fn test_id_fallback_when_url_has_no_path() {
        let h = headers(&[("Link", "https://site.example/")]);
        let mut diag = ErrorAccumulator::default();
        assert_eq!(resolve_id(&h, "site", 2, &mut diag), "site:2");
    }
}
