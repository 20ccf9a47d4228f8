//! Time-of-day parsing and interval arithmetic.
//!
//! Session times travel as text, `"08:00 - 09:40"`, with an optional
//! `(online)` tag on each endpoint: `"08:00 (online) - 09:40 (online)"`.
//! Parsing is lenient about the separator (`08.00` is accepted) and strict
//! about everything else; any failure yields `None`, which callers treat as
//! an invalid (conflicting) range rather than as midnight.
//!
//! # Interval Model
//! Ranges are half-open `[start, end)`: a session ending at 10:00 and one
//! starting at 10:00 do not overlap.

use chrono::{NaiveTime, Timelike};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Marker attached to online time labels.
pub const ONLINE_TAG: &str = "(online)";

/// Minutes of teaching per credit hour (SKS).
pub const MINUTES_PER_CREDIT: i64 = 50;

/// Separator between the two endpoints of a time range text.
pub const RANGE_SEPARATOR: &str = " - ";

/// Parses a time label into a time of day and its online flag.
///
/// Strips the `(online)` marker (case-insensitive) and any other trailing
/// parenthetical, normalizes `.` to `:`, and keeps only the first two
/// digits of the minute field.
///
/// # Examples
/// ```
/// use u_timetable::models::parse_time;
///
/// let (t, online) = parse_time("08.00 (online)").unwrap();
/// assert_eq!(t.to_string(), "08:00:00");
/// assert!(online);
/// assert!(parse_time("25:00").is_none());
/// ```
pub fn parse_time(text: &str) -> Option<(NaiveTime, bool)> {
    let text = text.trim();
    let online = is_online_text(text);
    let normalized = strip_parenthetical(text).trim().replace('.', ":");

    let mut parts = normalized.split(':');
    let hours = parse_field(parts.next()?)?;
    let minute_text: String = parts.next()?.trim().chars().take(2).collect();
    let minutes = parse_field(&minute_text)?;

    NaiveTime::from_hms_opt(hours, minutes, 0).map(|t| (t, online))
}

/// Whether a label carries the `(online)` marker.
pub fn is_online_text(text: &str) -> bool {
    text.to_lowercase().contains(ONLINE_TAG)
}

/// Whether both labels parse and `start < end`.
pub fn is_valid_range(start: &str, end: &str) -> bool {
    match (parse_time(start), parse_time(end)) {
        (Some((s, _)), Some((e, _))) => s < e,
        _ => false,
    }
}

/// Half-open overlap test: `[s1, e1)` and `[s2, e2)` share some instant.
#[inline]
pub fn overlaps<T: PartialOrd>(s1: T, e1: T, s2: T, e2: T) -> bool {
    !(e1 <= s2 || s1 >= e2)
}

/// Whether `[start, end)` lasts `hours` credit hours, within one minute.
pub fn is_valid_for_credit_hours(start: NaiveTime, end: NaiveTime, hours: u32) -> bool {
    let duration = (end - start).num_seconds() as f64 / 60.0;
    (duration - (i64::from(hours) * MINUTES_PER_CREDIT) as f64).abs() < 1.0
}

/// End time of a session starting at `start` lasting `hours` credit hours.
///
/// Returns `None` when the session would run past midnight.
pub fn end_time_for(start: NaiveTime, hours: u32) -> Option<NaiveTime> {
    let minutes = (start.hour() * 60 + start.minute())
        .saturating_add(hours.saturating_mul(MINUTES_PER_CREDIT as u32));
    NaiveTime::from_hms_opt(minutes / 60, minutes % 60, 0)
}

/// Formats a time as `HH:MM`, with the online marker when requested.
pub fn format_label(time: NaiveTime, online: bool) -> String {
    if online {
        format!("{} {}", time.format("%H:%M"), ONLINE_TAG)
    } else {
        time.format("%H:%M").to_string()
    }
}

/// Removes everything from the first `(` to the last `)`.
fn strip_parenthetical(text: &str) -> String {
    if let Some(open) = text.find('(') {
        if let Some(close) = text.rfind(')') {
            if close > open {
                let mut out = String::with_capacity(text.len());
                out.push_str(&text[..open]);
                out.push_str(&text[close + 1..]);
                return out;
            }
        }
    }
    text.to_string()
}

fn parse_field(text: &str) -> Option<u32> {
    let text = text.trim();
    if text.is_empty() || text.len() > 2 || !text.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    text.parse().ok()
}

/// A parsed session time range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeRange {
    /// Start of the range (inclusive).
    pub start: NaiveTime,
    /// End of the range (exclusive).
    pub end: NaiveTime,
    /// Whether the start label carried the online marker.
    pub online: bool,
}

impl TimeRange {
    /// Creates a range from parsed endpoints.
    pub fn new(start: NaiveTime, end: NaiveTime, online: bool) -> Self {
        Self { start, end, online }
    }

    /// Parses `"<start> - <end>"` text.
    ///
    /// Returns `None` unless the text has exactly two endpoints and both
    /// parse. Ordering is not checked here; see [`TimeRange::is_valid`].
    pub fn parse(text: &str) -> Option<Self> {
        let mut parts = text.split(RANGE_SEPARATOR);
        let start = parts.next()?;
        let end = parts.next()?;
        if parts.next().is_some() {
            return None;
        }
        let (start, online) = parse_time(start)?;
        let (end, _) = parse_time(end)?;
        Some(Self { start, end, online })
    }

    /// Whether `start < end`.
    pub fn is_valid(&self) -> bool {
        self.start < self.end
    }

    /// Half-open overlap with another range.
    pub fn overlaps(&self, other: &TimeRange) -> bool {
        overlaps(self.start, self.end, other.start, other.end)
    }

    /// Half-open overlap with a window.
    pub fn overlaps_window(&self, window: &TimeWindow) -> bool {
        overlaps(self.start, self.end, window.start, window.end)
    }

    /// Whether this range lies entirely inside `window`.
    pub fn within(&self, window: &TimeWindow) -> bool {
        self.start >= window.start && self.end <= window.end
    }

    /// Duration in whole minutes.
    pub fn duration_minutes(&self) -> i64 {
        (self.end - self.start).num_minutes()
    }

    /// Canonical text form, tagging both endpoints when online.
    pub fn to_text(&self) -> String {
        format!(
            "{}{}{}",
            format_label(self.start, self.online),
            RANGE_SEPARATOR,
            format_label(self.end, self.online)
        )
    }
}

/// A fixed window of the day, e.g. an institutional break.
///
/// Serialized as `{ start = "12:00", end = "13:00" }`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeWindow {
    /// Window start (inclusive).
    #[serde(with = "hhmm")]
    pub start: NaiveTime,
    /// Window end (exclusive).
    #[serde(with = "hhmm")]
    pub end: NaiveTime,
}

impl TimeWindow {
    /// Creates a window from hour/minute pairs.
    ///
    /// Out-of-range components clamp to midnight; windows are built from
    /// constants and configuration, both validated elsewhere.
    pub fn hm(start_h: u32, start_m: u32, end_h: u32, end_m: u32) -> Self {
        Self {
            start: NaiveTime::from_hms_opt(start_h, start_m, 0).unwrap_or(NaiveTime::MIN),
            end: NaiveTime::from_hms_opt(end_h, end_m, 0).unwrap_or(NaiveTime::MIN),
        }
    }

    /// Parses a window from two labels. Requires `start < end`.
    pub fn parse(start: &str, end: &str) -> Option<Self> {
        let (start, _) = parse_time(start)?;
        let (end, _) = parse_time(end)?;
        (start < end).then_some(Self { start, end })
    }
}

impl fmt::Display for TimeWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.start.format("%H:%M"), self.end.format("%H:%M"))
    }
}

mod hhmm {
    use chrono::NaiveTime;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(time: &NaiveTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&time.format("%H:%M").to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveTime, D::Error> {
        let text = String::deserialize(deserializer)?;
        super::parse_time(&text)
            .map(|(t, _)| t)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid time '{text}'")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn t(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    #[test]
    fn test_parse_time_variants() {
        assert_eq!(parse_time("08:00"), Some((t(8, 0), false)));
        assert_eq!(parse_time("8:05"), Some((t(8, 5), false)));
        assert_eq!(parse_time("13.30"), Some((t(13, 30), false)));
        assert_eq!(parse_time("09:409"), Some((t(9, 40), false)));
        assert_eq!(parse_time(" 10:00 (Online) "), Some((t(10, 0), true)));
        assert_eq!(parse_time("10:00 (ruang A)"), Some((t(10, 0), false)));
    }

    #[test]
    fn test_parse_time_rejects_malformed() {
        assert!(parse_time("").is_none());
        assert!(parse_time("0800").is_none());
        assert!(parse_time("24:00").is_none());
        assert!(parse_time("12:60").is_none());
        assert!(parse_time("ab:cd").is_none());
        assert!(parse_time("-1:00").is_none());
    }

    #[test]
    fn test_valid_range() {
        assert!(is_valid_range("08:00", "08:50"));
        assert!(!is_valid_range("08:50", "08:00"));
        assert!(!is_valid_range("08:00", "08:00"));
        assert!(!is_valid_range("08:00", "later"));
    }

    #[test]
    fn test_overlap_half_open() {
        assert!(overlaps(t(8, 0), t(9, 40), t(9, 0), t(10, 0)));
        assert!(!overlaps(t(8, 0), t(10, 0), t(10, 0), t(11, 0)));
        assert!(!overlaps(t(10, 0), t(11, 0), t(8, 0), t(10, 0)));
        // containment
        assert!(overlaps(t(8, 0), t(12, 0), t(9, 0), t(10, 0)));
    }

    #[test]
    fn test_time_range_parse_and_text() {
        let r = TimeRange::parse("08:00 (online) - 09:40 (online)").unwrap();
        assert!(r.online);
        assert_eq!(r.duration_minutes(), 100);
        assert_eq!(r.to_text(), "08:00 (online) - 09:40 (online)");

        let r = TimeRange::parse("12:15 - 12:45").unwrap();
        assert!(!r.online);
        assert!(r.is_valid());

        assert!(TimeRange::parse("08:00").is_none());
        assert!(TimeRange::parse("08:00 - 09:00 - 10:00").is_none());
        assert!(!TimeRange::parse("10:00 - 09:00").unwrap().is_valid());
    }

    #[test]
    fn test_credit_hour_duration() {
        assert!(is_valid_for_credit_hours(t(8, 0), t(9, 40), 2));
        assert!(!is_valid_for_credit_hours(t(8, 0), t(9, 40), 1));
        assert!(!is_valid_for_credit_hours(t(8, 0), t(9, 41), 2));
        assert_eq!(end_time_for(t(13, 0), 3), Some(t(15, 30)));
        assert_eq!(end_time_for(t(23, 30), 1), None);
    }

    #[test]
    fn test_window_display_and_serde() {
        let w = TimeWindow::hm(12, 0, 13, 0);
        assert_eq!(w.to_string(), "12:00-13:00");
        let json = serde_json::to_string(&w).unwrap();
        assert_eq!(json, r#"{"start":"12:00","end":"13:00"}"#);
        let back: TimeWindow = serde_json::from_str(&json).unwrap();
        assert_eq!(back, w);
        assert!(TimeWindow::parse("13:00", "12:00").is_none());
    }

    proptest! {
        #[test]
        fn prop_overlap_symmetric(a in 0u32..1440, la in 1u32..300, b in 0u32..1440, lb in 1u32..300) {
            let (s1, e1, s2, e2) = (a, a + la, b, b + lb);
            prop_assert_eq!(overlaps(s1, e1, s2, e2), overlaps(s2, e2, s1, e1));
        }

        #[test]
        fn prop_touching_ranges_do_not_overlap(a in 0u32..1000, la in 1u32..200, lb in 1u32..200) {
            let b = a + la;
            prop_assert!(!overlaps(a, b, b, b + lb));
            prop_assert!(!overlaps(b, b + lb, a, b));
        }
    }
}
