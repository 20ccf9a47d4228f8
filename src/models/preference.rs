//! Lecturer preferences and personal breaks.
//!
//! Preferences restrict when a lecturer may teach: which days, which days
//! must be online, and which windows of the day are acceptable for offline
//! and online teaching. A lecturer without an entry is unrestricted.
//!
//! Personal breaks are stored separately, keyed by `"lecturer|day"`, and
//! apply to both online and offline sessions.
//!
//! Nothing here is validated on write; see
//! [`validate_preferences`](crate::validation::validate_preferences).

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::time::RANGE_SEPARATOR;
use super::{Day, TimeRange, TimeWindow};

/// Scheduling preferences of a single lecturer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LecturerPreference {
    /// Days the lecturer can teach. Empty = any day.
    pub available_days: Vec<Day>,
    /// Days on which every session must be online.
    pub online_days: Vec<Day>,
    /// Acceptable `(start, end)` windows for offline sessions (at most two).
    pub preferred_offline: Vec<(String, String)>,
    /// Acceptable `(start, end)` windows for online sessions (at most two).
    pub preferred_online: Vec<(String, String)>,
    /// Also observe the extended institutional breaks.
    pub use_additional_breaks: bool,
}

impl LecturerPreference {
    /// Creates an unrestricted preference.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the available days.
    pub fn with_available_days(mut self, days: impl IntoIterator<Item = Day>) -> Self {
        self.available_days = days.into_iter().collect();
        self
    }

    /// Sets the forced-online days.
    pub fn with_online_days(mut self, days: impl IntoIterator<Item = Day>) -> Self {
        self.online_days = days.into_iter().collect();
        self
    }

    /// Adds a preferred offline window.
    pub fn with_offline_window(mut self, start: impl Into<String>, end: impl Into<String>) -> Self {
        self.preferred_offline.push((start.into(), end.into()));
        self
    }

    /// Adds a preferred online window.
    pub fn with_online_window(mut self, start: impl Into<String>, end: impl Into<String>) -> Self {
        self.preferred_online.push((start.into(), end.into()));
        self
    }

    /// Opts in to the extended institutional breaks.
    pub fn with_additional_breaks(mut self, enabled: bool) -> Self {
        self.use_additional_breaks = enabled;
        self
    }

    /// Whether the lecturer can teach on `day`.
    pub fn is_day_available(&self, day: Day) -> bool {
        self.available_days.is_empty() || self.available_days.contains(&day)
    }

    /// Whether sessions on `day` must be online.
    pub fn forces_online(&self, day: Day) -> bool {
        self.online_days.contains(&day)
    }

    /// Whether any preferred window is set, online or offline.
    pub fn has_time_preferences(&self) -> bool {
        !self.preferred_offline.is_empty() || !self.preferred_online.is_empty()
    }

    /// Preferred windows for the given delivery mode.
    pub fn preferred_windows(&self, online: bool) -> &[(String, String)] {
        if online {
            &self.preferred_online
        } else {
            &self.preferred_offline
        }
    }

    /// Whether `range` satisfies the time preferences for its delivery mode.
    ///
    /// An empty window list for the mode accepts everything; otherwise the
    /// range must lie fully inside one parseable window.
    pub fn accepts_time(&self, range: &TimeRange, online: bool) -> bool {
        let windows = self.preferred_windows(online);
        windows.is_empty()
            || windows
                .iter()
                .filter_map(|(start, end)| TimeWindow::parse(start, end))
                .any(|w| range.within(&w))
    }
}

/// Per-lecturer preferences and personal breaks.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PreferenceStore {
    preferences: HashMap<String, LecturerPreference>,
    breaks: HashMap<String, Vec<String>>,
}

/// Key under which a lecturer's breaks for a day are stored.
pub fn break_key(lecturer: &str, day: Day) -> String {
    format!("{lecturer}|{day}")
}

impl PreferenceStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the preference of a lecturer.
    pub fn set_preference(&mut self, lecturer: impl Into<String>, preference: LecturerPreference) {
        self.preferences.insert(lecturer.into(), preference);
    }

    /// Preference of a lecturer, if registered.
    pub fn preference(&self, lecturer: &str) -> Option<&LecturerPreference> {
        self.preferences.get(lecturer)
    }

    /// All registered preferences.
    pub fn preferences(&self) -> impl Iterator<Item = (&String, &LecturerPreference)> {
        self.preferences.iter()
    }

    /// Registers a personal break as `"start - end"` text.
    pub fn add_break(&mut self, lecturer: &str, day: Day, start: &str, end: &str) {
        self.breaks
            .entry(break_key(lecturer, day))
            .or_default()
            .push(format!("{start}{RANGE_SEPARATOR}{end}"));
    }

    /// Personal break texts of a lecturer on a day.
    pub fn breaks_for(&self, lecturer: &str, day: Day) -> &[String] {
        self.breaks
            .get(&break_key(lecturer, day))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Days the lecturer can teach (all weekdays when unrestricted).
    pub fn valid_days(&self, lecturer: &str) -> Vec<Day> {
        match self.preference(lecturer) {
            Some(p) if !p.available_days.is_empty() => p.available_days.clone(),
            _ => Day::ALL.to_vec(),
        }
    }

    /// Whether `lecturer` must teach online on `day`.
    pub fn is_forced_online(&self, lecturer: &str, day: Day) -> bool {
        self.preference(lecturer)
            .is_some_and(|p| p.forces_online(day))
    }

    /// Whether `lecturer` opted in to the extended breaks.
    pub fn uses_additional_breaks(&self, lecturer: &str) -> bool {
        self.preference(lecturer)
            .is_some_and(|p| p.use_additional_breaks)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unrestricted_lecturer() {
        let store = PreferenceStore::new();
        assert_eq!(store.valid_days("anyone"), Day::ALL.to_vec());
        assert!(!store.is_forced_online("anyone", Day::Monday));
        assert!(store.breaks_for("anyone", Day::Monday).is_empty());
    }

    #[test]
    fn test_available_and_online_days() {
        let mut store = PreferenceStore::new();
        store.set_preference(
            "Dr. B",
            LecturerPreference::new()
                .with_available_days([Day::Monday, Day::Wednesday])
                .with_online_days([Day::Wednesday]),
        );

        let pref = store.preference("Dr. B").unwrap();
        assert!(pref.is_day_available(Day::Monday));
        assert!(!pref.is_day_available(Day::Tuesday));
        assert_eq!(store.valid_days("Dr. B"), vec![Day::Monday, Day::Wednesday]);
        assert!(store.is_forced_online("Dr. B", Day::Wednesday));
        assert!(!store.is_forced_online("Dr. B", Day::Monday));
    }

    #[test]
    fn test_accepts_time_per_mode() {
        let pref = LecturerPreference::new().with_offline_window("08:00", "12:00");
        let morning = TimeRange::parse("08:00 - 09:40").unwrap();
        let afternoon = TimeRange::parse("13:00 - 14:40").unwrap();

        assert!(pref.accepts_time(&morning, false));
        assert!(!pref.accepts_time(&afternoon, false));
        // no online windows: any online time is fine
        assert!(pref.accepts_time(&afternoon, true));
    }

    #[test]
    fn test_malformed_window_never_matches() {
        let pref = LecturerPreference::new().with_offline_window("noon", "13:00");
        let range = TimeRange::parse("12:00 - 12:50").unwrap();
        assert!(!pref.accepts_time(&range, false));
    }

    #[test]
    fn test_breaks_keyed_by_lecturer_and_day() {
        let mut store = PreferenceStore::new();
        store.add_break("Dr. C", Day::Tuesday, "10:00", "11:00");
        store.add_break("Dr. C", Day::Tuesday, "15:00", "15:30");

        assert_eq!(
            store.breaks_for("Dr. C", Day::Tuesday),
            &["10:00 - 11:00".to_string(), "15:00 - 15:30".to_string()]
        );
        assert!(store.breaks_for("Dr. C", Day::Monday).is_empty());
        assert_eq!(break_key("Dr. C", Day::Tuesday), "Dr. C|Selasa");
    }
}
