use chrono::{Datelike, NaiveDate, NaiveDateTime, Timelike};
use serde::Serialize;
use tracing::debug;

use crate::clock::Clock;

/// Display format used for normalized reservation times
pub const NORMALIZED_TIME_FORMAT: &str = "%Y-%m-%d %H:%M";

// One accepted textual layout for a reservation time
struct Layout {
    format: &'static str,
    has_year: bool,
    has_time: bool,
}

// Tried in order; the first layout that consumes the whole input wins
const LAYOUTS: [Layout; 5] = [
    Layout {
        format: "%Y-%m-%d %H:%M",
        has_year: true,
        has_time: true,
    },
    Layout {
        format: "%Y-%m-%d",
        has_year: true,
        has_time: false,
    },
    Layout {
        format: "%m-%d %H:%M",
        has_year: false,
        has_time: true,
    },
    Layout {
        format: "%Y.%m.%d %H:%M",
        has_year: true,
        has_time: true,
    },
    Layout {
        format: "%Y.%m.%d",
        has_year: true,
        has_time: false,
    },
];

/// Outcome of parsing a human-entered reservation time.
///
/// `Defaulted` carries the clock's current time and is produced whenever no
/// layout matched. Callers that only need a value use [`TimeParse::timestamp`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "timestamp", rename_all = "snake_case")]
pub enum TimeParse {
    Parsed(NaiveDateTime),
    Defaulted(NaiveDateTime),
}

impl TimeParse {
    pub fn timestamp(&self) -> NaiveDateTime {
        match self {
            TimeParse::Parsed(ts) | TimeParse::Defaulted(ts) => *ts,
        }
    }

    pub fn is_defaulted(&self) -> bool {
        matches!(self, TimeParse::Defaulted(_))
    }

    /// Timestamp rendered as `YYYY-MM-DD HH:MM`
    pub fn normalized_text(&self) -> String {
        self.timestamp().format(NORMALIZED_TIME_FORMAT).to_string()
    }
}

/// Parse a free-form reservation time.
///
/// Never fails: input matching none of the accepted layouts yields
/// `TimeParse::Defaulted(clock.now())`. Missing years and missing times of
/// day are filled from a single clock reading taken at the start of the call.
pub fn parse_reservation_time(input: &str, clock: &dyn Clock) -> TimeParse {
    let now = clock.now();
    let trimmed = input.trim();

    for layout in &LAYOUTS {
        if let Some(parsed) = try_layout(layout, trimmed, now) {
            debug!(
                "Parsed reservation time '{}' with layout '{}' as {}",
                trimmed, layout.format, parsed
            );
            return TimeParse::Parsed(parsed);
        }
    }

    debug!(
        "No layout matched reservation time '{}', defaulting to {}",
        trimmed, now
    );
    TimeParse::Defaulted(now)
}

fn try_layout(layout: &Layout, input: &str, now: NaiveDateTime) -> Option<NaiveDateTime> {
    if layout.has_year && !has_four_digit_year(input) {
        return None;
    }

    match (layout.has_year, layout.has_time) {
        (true, true) => NaiveDateTime::parse_from_str(input, layout.format).ok(),
        (true, false) => NaiveDate::parse_from_str(input, layout.format)
            .ok()?
            .and_hms_opt(now.hour(), now.minute(), 0),
        (false, true) => {
            // chrono cannot build a date without a year, so supply the current one up front
            let with_year = format!("{} {}", now.year(), input);
            let format = format!("%Y {}", layout.format);
            NaiveDateTime::parse_from_str(&with_year, &format).ok()
        }
        (false, false) => None,
    }
}

// The year field must be exactly four digits, as typed in a booking form
fn has_four_digit_year(input: &str) -> bool {
    let head = input
        .split(|c: char| c == '-' || c == '.')
        .next()
        .unwrap_or_default();
    head.len() == 4 && head.chars().all(|c| c.is_ascii_digit())
}
