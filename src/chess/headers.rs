use regex::Regex;
use std::collections::HashMap;
use std::sync::LazyLock;

static TAG_PAIR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"\[(\w+)\s+"([^"]*)"\]"#).expect("valid tag regex"));

/// Tag name to tag value for one game block.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GameHeaders(HashMap<String, String>);

impl GameHeaders {
    /// Extracts every `[Name "Value"]` pair from `block`.
    ///
    /// Malformed lines are skipped; a repeated tag keeps its last value. Never fails.
    pub fn parse(block: &str) -> Self {
        let mut tags = HashMap::new();
        for caps in TAG_PAIR.captures_iter(block) {
            tags.insert(caps[1].to_string(), caps[2].to_string());
        }
        Self(tags)
    }

    /// Raw tag value, including blank values.
    pub fn raw(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    /// Tag value trimmed, with blank values treated as missing.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.raw(key).map(str::trim).filter(|v| !v.is_empty())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for GameHeaders {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}
