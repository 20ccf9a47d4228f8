//! Time-slot catalog.
//!
//! Enumerates every start/end interval a session may occupy: for 1 to 4
//! credit hours, starting on each full hour from 08:00, and ending before
//! 21:00. Each interval exists in an offline and an online variant. Three
//! extra online-only evening slots are added on top.
//!
//! The catalog is generated once and never changes; the scheduler filters
//! it per session by credit hours and delivery mode.

use chrono::NaiveTime;

use crate::models::time::{format_label, is_valid_for_credit_hours, MINUTES_PER_CREDIT};
use crate::models::TimeRange;

/// First start hour of the operating window.
pub const OPENING_HOUR: u32 = 8;

/// Closing hour; regular slots must end before it.
pub const CLOSING_HOUR: u32 = 21;

/// Largest session length generated, in credit hours.
pub const MAX_CREDIT_HOURS: u32 = 4;

/// Online-only slots outside the hourly grid (start h:m, end h:m).
const EXTRA_ONLINE_SLOTS: [(u32, u32, u32, u32); 3] =
    [(15, 30, 17, 10), (17, 40, 19, 20), (19, 30, 21, 10)];

/// A bookable interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeSlot {
    /// Slot start.
    pub start: NaiveTime,
    /// Slot end.
    pub end: NaiveTime,
    /// Online variant.
    pub online: bool,
}

impl TimeSlot {
    fn from_hm(start_h: u32, start_m: u32, end_h: u32, end_m: u32, online: bool) -> Option<Self> {
        Some(Self {
            start: NaiveTime::from_hms_opt(start_h, start_m, 0)?,
            end: NaiveTime::from_hms_opt(end_h, end_m, 0)?,
            online,
        })
    }

    /// Start label, e.g. `"08:00"` or `"08:00 (online)"`.
    pub fn start_label(&self) -> String {
        format_label(self.start, self.online)
    }

    /// End label.
    pub fn end_label(&self) -> String {
        format_label(self.end, self.online)
    }

    /// The slot as a session time range.
    pub fn range(&self) -> TimeRange {
        TimeRange::new(self.start, self.end, self.online)
    }

    /// Length in minutes.
    pub fn duration_minutes(&self) -> i64 {
        (self.end - self.start).num_minutes()
    }

    /// Whether the slot lasts exactly `hours` credit hours (±1 minute).
    pub fn fits_credit_hours(&self, hours: u32) -> bool {
        is_valid_for_credit_hours(self.start, self.end, hours)
    }
}

/// Immutable catalog of all bookable slots, sorted by start then end.
///
/// # Example
/// ```
/// use u_timetable::catalog::TimeSlotCatalog;
///
/// let catalog = TimeSlotCatalog::new();
/// let two_hour_offline = catalog.matching(2, false);
/// assert!(two_hour_offline.iter().all(|s| s.duration_minutes() == 100));
/// assert_eq!(two_hour_offline[0].start_label(), "08:00");
/// ```
#[derive(Debug, Clone)]
pub struct TimeSlotCatalog {
    slots: Vec<TimeSlot>,
}

impl TimeSlotCatalog {
    /// Generates the catalog.
    pub fn new() -> Self {
        let mut slots: Vec<TimeSlot> = Vec::new();

        for credit_hours in 1..=MAX_CREDIT_HOURS {
            for hour in OPENING_HOUR..CLOSING_HOUR {
                let total = hour * 60 + credit_hours * MINUTES_PER_CREDIT as u32;
                let (end_h, end_m) = (total / 60, total % 60);
                if end_h >= CLOSING_HOUR {
                    continue;
                }
                for online in [false, true] {
                    if let Some(slot) = TimeSlot::from_hm(hour, 0, end_h, end_m, online) {
                        if !slots.contains(&slot) {
                            slots.push(slot);
                        }
                    }
                }
            }
        }

        slots.extend(
            EXTRA_ONLINE_SLOTS
                .iter()
                .filter_map(|&(sh, sm, eh, em)| TimeSlot::from_hm(sh, sm, eh, em, true)),
        );

        // stable: offline before online for equal intervals
        slots.sort_by_key(|s| (s.start, s.end));

        Self { slots }
    }

    /// All slots.
    pub fn slots(&self) -> &[TimeSlot] {
        &self.slots
    }

    /// Number of slots.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Whether the catalog is empty.
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Slots lasting `credit_hours` with the requested delivery mode.
    pub fn matching(&self, credit_hours: u32, online: bool) -> Vec<&TimeSlot> {
        self.slots
            .iter()
            .filter(|s| s.online == online && s.fits_credit_hours(credit_hours))
            .collect()
    }
}

impl Default for TimeSlotCatalog {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_catalog_size() {
        // 13 + 12 + 11 + 10 intervals, twice, plus 3 extra online slots
        let catalog = TimeSlotCatalog::new();
        assert_eq!(catalog.len(), 95);
    }

    #[test]
    fn test_sorted_by_start_then_end() {
        let catalog = TimeSlotCatalog::new();
        for pair in catalog.slots().windows(2) {
            assert!((pair[0].start, pair[0].end) <= (pair[1].start, pair[1].end));
        }
        let first = &catalog.slots()[0];
        assert_eq!(first.start_label(), "08:00");
        assert_eq!(first.end_label(), "08:50");
        assert!(!first.online);
        assert!(catalog.slots()[1].online);
    }

    #[test]
    fn test_no_regular_slot_reaches_closing() {
        let catalog = TimeSlotCatalog::new();
        let late: Vec<_> = catalog
            .slots()
            .iter()
            .filter(|s| s.end >= NaiveTime::from_hms_opt(21, 0, 0).unwrap())
            .collect();
        assert_eq!(late.len(), 1);
        assert!(late[0].online);
        assert_eq!(late[0].start_label(), "19:30 (online)");
    }

    #[test]
    fn test_two_credit_slots_are_100_minutes() {
        let catalog = TimeSlotCatalog::new();
        let offline = catalog.matching(2, false);
        let online = catalog.matching(2, true);
        assert_eq!(offline.len(), 12);
        assert_eq!(online.len(), 15);
        assert!(offline.iter().chain(online.iter()).all(|s| s.duration_minutes() == 100));
    }

    #[test]
    fn test_no_slots_for_unknown_lengths() {
        let catalog = TimeSlotCatalog::new();
        assert!(catalog.matching(0, false).is_empty());
        assert!(catalog.matching(5, true).is_empty());
    }

    #[test]
    fn test_slot_range_text() {
        let catalog = TimeSlotCatalog::new();
        let slot = catalog.matching(3, true)[0];
        assert_eq!(slot.range().to_text(), "08:00 (online) - 10:30 (online)");
    }

    proptest! {
        #[test]
        fn prop_slot_matches_only_its_credit_hours(k in 1u32..=4, other in 0u32..10, idx in 0usize..50) {
            let catalog = TimeSlotCatalog::new();
            let slots = catalog.matching(k, idx % 2 == 0);
            let slot = slots[idx % slots.len()];
            prop_assert!(slot.fits_credit_hours(k));
            if other != k {
                prop_assert!(!slot.fits_credit_hours(other));
            }
        }
    }
}
