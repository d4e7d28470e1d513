use super::types::Speed;

/// `TimeControl` tag split into its numeric parts (`"<base>+<increment>"`, seconds).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeControl {
    pub base_seconds: u32,
    pub increment_seconds: Option<u32>,
}

impl TimeControl {
    pub fn parse(raw: &str) -> Option<Self> {
        let input = raw.trim();
        let (base, increment) = match input.split_once('+') {
            Some((base, inc)) => (base.trim(), Some(inc.trim())),
            None => (input, None),
        };

        let base_seconds = base.parse().ok()?;
        let increment_seconds = match increment {
            Some(inc) => Some(inc.parse().ok()?),
            None => None,
        };

        Some(Self {
            base_seconds,
            increment_seconds,
        })
    }

}

/// Rewrites whole-minute bases as `"<minutes>+<increment>"`.
///
/// Anything else that is non-blank passes through unchanged (`"45+0"`, `"-"`, `"1/259200"`).
/// Blank or missing input yields `None`.
pub fn normalize_time_control(raw: Option<&str>) -> Option<String> {
    let input = raw?.trim();
    if input.is_empty() {
        return None;
    }

    match TimeControl::parse(input) {
        Some(tc) if tc.base_seconds.is_multiple_of(60) => Some(format!(
            "{}+{}",
            tc.base_seconds / 60,
            tc.increment_seconds.unwrap_or(0)
        )),
        _ => Some(input.to_string()),
    }
}

/// Case-insensitive match of a named speed inside the event description, in
/// bullet, blitz, rapid, classical priority.
pub fn speed_from_event(event: &str) -> Option<Speed> {
    let event = event.to_lowercase();
    Speed::NAMED
        .into_iter()
        .find(|speed| event.contains(speed.as_str()))
}

pub fn speed_from_base_minutes(minutes: f64) -> Speed {
    if minutes < 3.0 {
        Speed::Bullet
    } else if minutes <= 8.0 {
        Speed::Blitz
    } else if minutes <= 25.0 {
        Speed::Rapid
    } else {
        Speed::Classical
    }
}

/// Leading base of a normalized time control, read as minutes.
///
/// Pass-through values keep their raw number, so `"45+0"` reads as 45.
pub fn normalized_base_minutes(normalized: &str) -> Option<u32> {
    let end = normalized
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(normalized.len());
    normalized[..end].parse().ok()
}

/// Event description first, then the base minutes of the normalized `TimeControl` tag.
pub fn infer_speed(event: Option<&str>, time_control: Option<&str>) -> Option<Speed> {
    if let Some(speed) = event.and_then(speed_from_event) {
        return Some(speed);
    }

    let normalized = normalize_time_control(time_control)?;
    let minutes = normalized_base_minutes(&normalized)?;
    Some(speed_from_base_minutes(f64::from(minutes)))
}
