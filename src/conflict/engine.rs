//! Feasibility and diagnosis of a single session placement.
//!
//! [`ConflictChecker::is_conflict`] is the feasibility oracle used by the
//! scheduler: it stops at the first violated rule.
//! [`ConflictChecker::conflict_reasons`] runs the same rules without
//! stopping and names every violation, for reporting.
//!
//! # Rules
//! 1. Lecturer double-booking (same lecturer, day, overlapping time).
//! 2. Room double-booking and room capacity (offline rooms only).
//! 3. Class double-booking, online or not.
//! 4. Institutional breaks (offline only; extended breaks on opt-in).
//! 5. Personal lecturer breaks for the session's day.
//! 6. Lecturer preferences: available days, forced-online days, preferred
//!    time windows for the session's delivery mode.

use std::fmt;

use crate::config::Config;
use crate::models::{Day, PreferenceStore, RoomPool, Session, TimeRange, TimeWindow};

/// A violated placement rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConflictReason {
    /// The session has no time range.
    MissingTime,
    /// The session has a time range but no day.
    MissingDay,
    /// The time range is malformed or not increasing.
    InvalidTime,
    /// The lecturer teaches another session at an overlapping time.
    LecturerClash { subject: String, class_code: String },
    /// The room seats fewer students than enrolled.
    RoomCapacity { room: String, capacity: u32 },
    /// The room hosts another session at an overlapping time.
    RoomClash { subject: String, class_code: String },
    /// The class attends another session at an overlapping time.
    ClassClash { subject: String },
    /// An offline session overlaps an institutional break.
    InstitutionalBreak(TimeWindow),
    /// The session overlaps one of the lecturer's personal breaks.
    LecturerBreak(TimeWindow),
    /// The lecturer is not available on this day.
    DayUnavailable(Day),
    /// The day is a forced-online day but the session is offline.
    OnlineDayOffline(Day),
    /// The time falls outside every preferred window for the mode.
    PreferredTime,
    /// The lecturer's preferences leave no day to schedule on.
    NoAvailableDay,
    /// No pooled room was free and large enough for the drawn slot.
    NoFreeRoom {
        /// Seats needed.
        headcount: u32,
    },
}

impl fmt::Display for ConflictReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingTime => f.write_str("Jadwal belum diisi waktu"),
            Self::MissingDay => f.write_str("Jadwal belum diisi hari"),
            Self::InvalidTime => f.write_str("Format waktu tidak valid"),
            Self::LecturerClash {
                subject,
                class_code,
            } => write!(
                f,
                "Konflik dengan dosen di jadwal {subject} (kelas {class_code})"
            ),
            Self::RoomCapacity { room, capacity } => {
                write!(f, "Kapasitas ruangan {room} ({capacity}) terlampaui")
            }
            Self::RoomClash {
                subject,
                class_code,
            } => write!(
                f,
                "Konflik ruangan dengan jadwal {subject} (kelas {class_code})"
            ),
            Self::ClassClash { subject } => write!(f, "Konflik kelas dengan jadwal {subject}"),
            Self::InstitutionalBreak(w) => {
                write!(f, "Tumpang tindih dengan waktu istirahat ({w})")
            }
            Self::LecturerBreak(w) => {
                write!(f, "Tumpang tindih dengan waktu istirahat dosen ({w})")
            }
            Self::DayUnavailable(day) => write!(f, "Hari {day} tidak tersedia untuk dosen ini"),
            Self::OnlineDayOffline(day) => {
                write!(f, "Hari {day} harus online tetapi jadwal offline")
            }
            Self::PreferredTime => f.write_str("Waktu tidak sesuai preferensi dosen"),
            Self::NoAvailableDay => {
                f.write_str("Tidak ada hari yang tersedia (dari preferensi dosen)")
            }
            Self::NoFreeRoom { headcount } => {
                write!(f, "Tidak ada ruangan kosong untuk {headcount} mahasiswa")
            }
        }
    }
}

/// Collects findings, optionally stopping after the first.
struct Findings {
    reasons: Vec<ConflictReason>,
    first_only: bool,
}

impl Findings {
    /// Records a reason; returns `true` when evaluation should stop.
    fn push(&mut self, reason: ConflictReason) -> bool {
        self.reasons.push(reason);
        self.first_only
    }
}

macro_rules! report {
    ($findings:ident, $reason:expr) => {
        if $findings.push($reason) {
            return $findings.reasons;
        }
    };
}

/// Read-only view of the rules a placement must satisfy.
///
/// Borrowed from a [`Timetable`](crate::timetable::Timetable) for the
/// duration of a check; owns nothing.
#[derive(Debug, Clone, Copy)]
pub struct ConflictChecker<'a> {
    preferences: &'a PreferenceStore,
    rooms: &'a RoomPool,
    config: &'a Config,
}

impl<'a> ConflictChecker<'a> {
    /// Creates a checker over the given rule data.
    pub fn new(preferences: &'a PreferenceStore, rooms: &'a RoomPool, config: &'a Config) -> Self {
        Self {
            preferences,
            rooms,
            config,
        }
    }

    /// Whether `session` is infeasible against `all`.
    ///
    /// Sessions without a valid time range are always infeasible. Room
    /// occupancy and capacity are only checked when `check_room_capacity`
    /// is set. `session` itself may be in `all`; it is skipped by id.
    pub fn is_conflict(&self, session: &Session, all: &[Session], check_room_capacity: bool) -> bool {
        !self.evaluate(session, all, true, check_room_capacity).is_empty()
    }

    /// Every rule `session` violates against `all`, in rule order.
    pub fn conflict_reasons(&self, session: &Session, all: &[Session]) -> Vec<ConflictReason> {
        self.evaluate(session, all, false, true)
    }

    fn evaluate(
        &self,
        session: &Session,
        all: &[Session],
        first_only: bool,
        room_checks: bool,
    ) -> Vec<ConflictReason> {
        if session.time.is_empty() {
            return vec![ConflictReason::MissingTime];
        }
        let Some(range) = session.time_range().filter(TimeRange::is_valid) else {
            return vec![ConflictReason::InvalidTime];
        };
        let Some(day) = session.day else {
            return vec![ConflictReason::MissingDay];
        };

        let mut findings = Findings {
            reasons: Vec::new(),
            first_only,
        };
        let preference = self.preferences.preference(&session.lecturer);
        let online = session.is_online();

        for other in clashing(session, all, day, &range, |o| o.lecturer == session.lecturer) {
            report!(
                findings,
                ConflictReason::LecturerClash {
                    subject: other.subject.clone(),
                    class_code: other.class_code.clone(),
                }
            );
        }

        if let Some(room) = session.room.room_name().filter(|_| room_checks) {
            let capacity = self.rooms.capacity(room).unwrap_or(0);
            if session.headcount > capacity {
                report!(
                    findings,
                    ConflictReason::RoomCapacity {
                        room: room.to_string(),
                        capacity,
                    }
                );
            }
            for other in clashing(session, all, day, &range, |o| o.room == session.room) {
                report!(
                    findings,
                    ConflictReason::RoomClash {
                        subject: other.subject.clone(),
                        class_code: other.class_code.clone(),
                    }
                );
            }
        }

        for other in clashing(session, all, day, &range, |o| o.class_code == session.class_code) {
            report!(
                findings,
                ConflictReason::ClassClash {
                    subject: other.subject.clone(),
                }
            );
        }

        if !online {
            let extended = preference.is_some_and(|p| p.use_additional_breaks);
            for window in self.config.breaks_for(extended) {
                if range.overlaps_window(window) {
                    report!(findings, ConflictReason::InstitutionalBreak(*window));
                }
            }
        }

        for text in self.preferences.breaks_for(&session.lecturer, day) {
            let Some(window) = TimeRange::parse(text)
                .and_then(|b| b.is_valid().then(|| TimeWindow { start: b.start, end: b.end }))
            else {
                continue;
            };
            if range.overlaps_window(&window) {
                report!(findings, ConflictReason::LecturerBreak(window));
            }
        }

        if let Some(pref) = preference {
            if !pref.is_day_available(day) {
                report!(findings, ConflictReason::DayUnavailable(day));
            }
            if pref.forces_online(day) && !online {
                report!(findings, ConflictReason::OnlineDayOffline(day));
            }
            if pref.has_time_preferences() && !pref.accepts_time(&range, online) {
                report!(findings, ConflictReason::PreferredTime);
            }
        }

        findings.reasons
    }
}

/// Other placed sessions on `day` overlapping `range` that satisfy `same`.
fn clashing<'s>(
    session: &'s Session,
    all: &'s [Session],
    day: Day,
    range: &'s TimeRange,
    same: impl Fn(&Session) -> bool + 's,
) -> impl Iterator<Item = &'s Session> + 's {
    all.iter().filter(move |other| {
        other.id != session.id
            && other.day == Some(day)
            && same(other)
            && other.time_range().is_some_and(|r| r.overlaps(range))
    })
}
