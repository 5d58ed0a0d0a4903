// src/domain/address.rs
use regex::Regex;
use std::sync::OnceLock;

static FLOOR_PATTERNS: OnceLock<Vec<Regex>> = OnceLock::new();

/// Ordered by precision: the "3 tr" abbreviation is how the portal writes
/// floors, the spelled-out "vån"/"våning" forms show up in free-text
/// registry addresses. First pattern that matches wins.
fn floor_patterns() -> &'static [Regex] {
    FLOOR_PATTERNS.get_or_init(|| {
        vec![
            Regex::new(r"(\d{1,2})\s?tr").unwrap(),
            Regex::new(r"vån(?:ing)?\.?\s?(\d{1,2})").unwrap(),
        ]
    })
}

#[derive(Debug, Clone, Copy)]
pub(crate) struct FloorToken {
    pub floor: i64,
    /// Byte range of the matched substring, for stripping it out.
    pub start: usize,
    pub end: usize,
}

/// Scans `text` for a floor indicator. Absence is common and is simply `None`.
pub(crate) fn find_floor(text: &str) -> Option<FloorToken> {
    for pattern in floor_patterns() {
        if let Some(caps) = pattern.captures(text) {
            let whole = caps.get(0)?;
            // An unparseable digit run counts as "not found" and falls
            // through to the next pattern.
            if let Some(floor) = caps.get(1).and_then(|d| d.as_str().parse::<i64>().ok()) {
                return Some(FloorToken {
                    floor,
                    start: whole.start(),
                    end: whole.end(),
                });
            }
        }
    }
    None
}

/// Splits a raw portal address into a clean street line and an optional floor.
///
/// Everything after the first comma is a locality suffix and is dropped. The
/// floor token is searched in the street line first and stripped when found;
/// if the street line has none, the unsplit original is scanned too, since
/// some listings put "3 tr" after the comma.
pub fn normalize(raw: &str) -> (String, Option<i64>) {
    let working = raw.split(',').next().unwrap_or(raw).trim();

    if let Some(token) = find_floor(working) {
        let mut stripped = String::with_capacity(working.len());
        stripped.push_str(&working[..token.start]);
        stripped.push_str(&working[token.end..]);
        return (tidy(&stripped), Some(token.floor));
    }

    let floor = find_floor(raw).map(|token| token.floor);
    (working.to_string(), floor)
}

/// Collapses runs of whitespace left behind by token stripping.
fn tidy(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}
