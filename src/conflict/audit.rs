//! Whole-timetable conflict audit and best-effort repair.
//!
//! The audit is a pairwise O(n²) scan in session order, so auditing an
//! unchanged timetable twice yields identical reports.
//!
//! Repair only tries two moves:
//! - a lecturer double-booking is fixed by moving one side to another
//!   weekday (week order), with a fresh room for offline sessions;
//! - an offline session on a forced-online day is switched to online.
//!
//! Anything else is left for manual editing.

use log::{debug, info};
use rand::Rng;
use std::fmt;

use crate::allocator::RoomRequest;
use crate::models::time::format_label;
use crate::models::{Day, RoomAssignment, Session, SessionId, TimeRange, TimeWindow};
use crate::timetable::Timetable;

/// Category of an audited conflict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConflictKind {
    /// Same lecturer, overlapping sessions.
    Lecturer,
    /// Same room, overlapping sessions.
    Room,
    /// More students than room seats.
    Capacity,
    /// Same class, overlapping sessions.
    Class,
    /// Session overlaps an institutional or personal break.
    BreakTime,
    /// Offline session on a forced-online day.
    OnlineDay,
    /// Session on a day the lecturer is unavailable.
    DayUnavailable,
    /// Session outside the lecturer's preferred windows.
    UndesiredTime,
}

impl ConflictKind {
    /// Display label.
    pub fn label(self) -> &'static str {
        match self {
            Self::Lecturer => "Dosen ganda",
            Self::Room => "Ruangan ganda",
            Self::Capacity => "Kapasitas ruangan terlampaui",
            Self::Class => "Kelas ganda",
            Self::BreakTime => "Waktu istirahat",
            Self::OnlineDay => "Hari online tidak menggunakan ruang online",
            Self::DayUnavailable => "Hari tidak tersedia",
            Self::UndesiredTime => "Waktu tidak diinginkan",
        }
    }

    /// Whether this is a lecturer-preference violation.
    pub fn is_preference(self) -> bool {
        matches!(self, Self::DayUnavailable | Self::UndesiredTime)
    }
}

/// One audited conflict.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConflictEntry {
    pub kind: ConflictKind,
    /// Lecturer, room or class the conflict is about.
    pub entity: String,
    pub day: Day,
    /// Overlap window for pairwise conflicts, the session time otherwise.
    pub window: String,
    /// Offending session (the earlier one for pairs).
    pub first: SessionId,
    /// The other session of a pairwise conflict.
    pub second: Option<SessionId>,
}

impl fmt::Display for ConflictEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {} ({} {})",
            self.kind.label(),
            self.entity,
            self.day,
            self.window
        )
    }
}

/// Result of an audit, entries in discovery order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConflictReport {
    entries: Vec<ConflictEntry>,
}

impl ConflictReport {
    /// All entries.
    pub fn entries(&self) -> &[ConflictEntry] {
        &self.entries
    }

    /// Entries of one kind.
    pub fn of_kind(&self, kind: ConflictKind) -> impl Iterator<Item = &ConflictEntry> {
        self.entries.iter().filter(move |e| e.kind == kind)
    }

    /// Preference violations of either kind.
    pub fn preference(&self) -> impl Iterator<Item = &ConflictEntry> {
        self.entries.iter().filter(|e| e.kind.is_preference())
    }

    /// Number of entries of one kind.
    pub fn count(&self, kind: ConflictKind) -> usize {
        self.of_kind(kind).count()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Audits and repairs whole timetables.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConflictAuditor;

impl ConflictAuditor {
    pub fn new() -> Self {
        Self
    }

    /// Lists every conflict in the timetable.
    ///
    /// Sessions without a day or a valid time range are skipped.
    pub fn audit(&self, timetable: &Timetable) -> ConflictReport {
        let sessions = timetable.sessions();
        let prefs = timetable.preferences();
        let config = timetable.config();
        let placed: Vec<(&Session, Day, TimeRange)> = sessions
            .iter()
            .filter_map(|s| Some((s, s.day?, s.time_range().filter(TimeRange::is_valid)?)))
            .collect();

        let mut entries = Vec::new();
        for (i, &(s, day, range)) in placed.iter().enumerate() {
            let later = &placed[i + 1..];
            let mut pair = |kind: ConflictKind, entity: &str, same: &dyn Fn(&Session) -> bool| {
                for &(o, o_day, o_range) in later {
                    if o_day == day && same(o) && range.overlaps(&o_range) {
                        entries.push(ConflictEntry {
                            kind,
                            entity: entity.to_string(),
                            day,
                            window: overlap_window(&range, &o_range).to_string(),
                            first: s.id,
                            second: Some(o.id),
                        });
                    }
                }
            };

            pair(ConflictKind::Lecturer, &s.lecturer, &|o: &Session| o.lecturer == s.lecturer);
            if let Some(room) = s.room.room_name() {
                pair(ConflictKind::Room, room, &|o: &Session| o.room == s.room);
            }
            pair(ConflictKind::Class, &s.class_code, &|o: &Session| o.class_code == s.class_code);

            let mut single = |kind: ConflictKind, entity: &str| {
                entries.push(ConflictEntry {
                    kind,
                    entity: entity.to_string(),
                    day,
                    window: s.time.clone(),
                    first: s.id,
                    second: None,
                });
            };

            if let Some(room) = s.room.room_name() {
                let capacity = timetable.rooms().capacity(room).unwrap_or(0);
                if s.headcount > capacity {
                    single(ConflictKind::Capacity, room);
                }
            }

            let online = s.is_online();
            let institutional = !online
                && config
                    .breaks_for(prefs.uses_additional_breaks(&s.lecturer))
                    .any(|w| range.overlaps_window(w));
            let personal = prefs
                .breaks_for(&s.lecturer, day)
                .iter()
                .filter_map(|b| TimeRange::parse(b).filter(TimeRange::is_valid))
                .any(|b| range.overlaps(&b));
            if institutional || personal {
                single(ConflictKind::BreakTime, &s.lecturer);
            }

            if let Some(pref) = prefs.preference(&s.lecturer) {
                if pref.forces_online(day) && !online {
                    single(ConflictKind::OnlineDay, &s.lecturer);
                }
                if !pref.is_day_available(day) {
                    single(ConflictKind::DayUnavailable, &s.lecturer);
                }
                if !pref.preferred_windows(online).is_empty() && !pref.accepts_time(&range, online) {
                    single(ConflictKind::UndesiredTime, &s.lecturer);
                }
            }
        }

        info!("Audit found {} conflicts in {} sessions", entries.len(), sessions.len());
        ConflictReport { entries }
    }

    /// Other weekdays on which the entry's first session would be
    /// conflict-free if only its day changed. Empty for non-lecturer entries.
    pub fn suggest_days(&self, timetable: &Timetable, entry: &ConflictEntry) -> Vec<Day> {
        if entry.kind != ConflictKind::Lecturer {
            return Vec::new();
        }
        let Some(session) = timetable.get(entry.first) else {
            return Vec::new();
        };
        let checker = timetable.checker();
        Day::ALL
            .into_iter()
            .filter(|&d| d != entry.day)
            .filter(|&d| {
                let mut moved = session.clone();
                moved.day = Some(d);
                !checker.is_conflict(&moved, timetable.sessions(), true)
            })
            .collect()
    }

    /// Repairs what it can and returns the number of conflicts fixed.
    ///
    /// Fixed sessions are never moved. Each fix is applied as an edit, so
    /// a moved session gets a new id and becomes manual.
    pub fn auto_resolve<R: Rng + ?Sized>(&self, timetable: &mut Timetable, rng: &mut R) -> usize {
        let report = self.audit(timetable);
        let mut resolved = 0;

        for entry in report.of_kind(ConflictKind::Lecturer) {
            for id in std::iter::once(entry.first).chain(entry.second) {
                let Some(candidate) = self.day_move(timetable, id, entry.day, rng) else {
                    continue;
                };
                if timetable.edit_session(id, candidate).is_some() {
                    debug!("Moved session {id} off {} to resolve a lecturer clash", entry.day);
                    resolved += 1;
                    break;
                }
            }
        }

        for entry in report.of_kind(ConflictKind::OnlineDay) {
            let Some(session) = timetable.get(entry.first).filter(|s| !s.fixed) else {
                continue;
            };
            let Some(range) = session.time_range() else {
                continue;
            };
            let mut candidate = session.clone();
            candidate.time = TimeRange::new(range.start, range.end, true).to_text();
            candidate.room = RoomAssignment::Online;
            if timetable.checker().is_conflict(&candidate, timetable.sessions(), true) {
                continue;
            }
            if timetable.edit_session(entry.first, candidate).is_some() {
                resolved += 1;
            }
        }

        info!("Auto-resolve fixed {resolved} of {} conflicts", report.len());
        resolved
    }

    /// A conflict-free copy of session `id` on another weekday, if any.
    fn day_move<R: Rng + ?Sized>(
        &self,
        timetable: &Timetable,
        id: SessionId,
        current: Day,
        rng: &mut R,
    ) -> Option<Session> {
        let session = timetable.get(id).filter(|s| !s.fixed)?;
        let range = session.time_range()?;
        let sessions = timetable.sessions();
        let checker = timetable.checker();

        // an earlier fix may already have cleared this pair
        if !checker.is_conflict(session, sessions, true) {
            return None;
        }

        let department = session.department();
        let start = format_label(range.start, range.online);
        let end = format_label(range.end, range.online);

        for day in Day::ALL.into_iter().filter(|&d| d != current) {
            let mut candidate = session.clone();
            candidate.day = Some(day);
            if session.room.room_name().is_some() {
                let request = RoomRequest::new(&department, day, &start, &end, session.headcount)
                    .with_lecturer(&session.lecturer)
                    .excluding(id);
                let Some(room) = timetable.allocator().available_room(&request, sessions, rng) else {
                    continue;
                };
                let online = room.is_online();
                candidate.place(day, &TimeRange::new(range.start, range.end, online), room);
            }
            if !checker.is_conflict(&candidate, sessions, true) {
                return Some(candidate);
            }
        }
        None
    }
}

fn overlap_window(a: &TimeRange, b: &TimeRange) -> TimeWindow {
    TimeWindow {
        start: a.start.max(b.start),
        end: a.end.min(b.end),
    }
}
