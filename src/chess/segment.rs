use regex::Regex;
use std::sync::LazyLock;

/// Tag every exported game opens with.
pub const TAG_BLOCK_OPENER: &str = "[Event ";

// A blank line (optionally holding stray spaces) followed by a new tag block.
static GAME_BOUNDARY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n[ \t]*\n\s*\[Event ").expect("valid boundary regex"));

/// Splits a multi-game export into per-game text blocks.
pub trait Segmenter {
    fn segment(&self, text: &str) -> Vec<String>;
}

/// Textual boundary heuristic: games are separated by a blank line and each opens with
/// `[Event `. Not a grammar-aware parse.
#[derive(Debug, Clone, Copy, Default)]
pub struct TextSegmenter;

impl Segmenter for TextSegmenter {
    fn segment(&self, text: &str) -> Vec<String> {
        segment_games(text)
    }
}

/// Splits `text` into game blocks in input order.
///
/// Line endings are normalized to `\n`, every block after the first gets its consumed opener
/// back, and blank fragments are dropped. Blocks are trimmed of surrounding whitespace.
pub fn segment_games(text: &str) -> Vec<String> {
    let normalized = text.replace("\r\n", "\n");

    GAME_BOUNDARY
        .split(&normalized)
        .enumerate()
        .filter_map(|(idx, fragment)| {
            let fragment = fragment.trim();
            if fragment.is_empty() {
                return None;
            }
            Some(if idx == 0 {
                fragment.to_string()
            } else {
                format!("{TAG_BLOCK_OPENER}{fragment}")
            })
        })
        .collect()
}
