//! The timetable: one owned collection of sessions plus the rule data
//! (preferences, breaks, rooms, configuration) that governs them.
//!
//! Every scheduling, auditing and editing pass works on a `&mut Timetable`,
//! which gives it exclusive access for its duration. Sessions are addressed
//! by [`SessionId`]; an edit replaces a session with a new one (new id)
//! rather than mutating it, so ids held by callers never silently change
//! meaning.

use log::{debug, info, warn};
use std::io::{Read, Write};

use crate::allocator::RoomAllocator;
use crate::catalog::TimeSlotCatalog;
use crate::config::Config;
use crate::conflict::{ConflictChecker, ConflictReason};
use crate::error::Result;
use crate::io::{self, ExportRow, ImportRow, RoomRecord, TimetableSnapshot};
use crate::models::time::{end_time_for, format_label};
use crate::models::{
    parse_time, Day, LecturerPreference, PreferenceStore, RoomPool, Session, SessionId, TimeRange,
};
use crate::validation;

/// Course timetable state.
///
/// # Example
/// ```
/// use u_timetable::io::ImportRow;
/// use u_timetable::models::{Day, Room, RoomPool, Session};
/// use u_timetable::Timetable;
///
/// let mut tt = Timetable::new().with_rooms(RoomPool::from_rooms(vec![
///     Room::new("R301").with_floor(3).with_capacity(40),
/// ]));
/// tt.import_rows(vec![ImportRow::new("Dr. A", "Basis Data", "TI-2A").with_credit_hours(2)]);
///
/// let manual = Session::new("Dr. A", "Praktikum", "TI-2A")
///     .with_day(Day::Monday)
///     .with_time("08:00 - 09:40")
///     .with_room("R301");
/// let id = tt.add_manual_session(manual);
///
/// assert_eq!(tt.sessions().len(), 2);
/// assert!(tt.conflict_reasons(id).unwrap().is_empty());
/// assert!(tt.remove_session(id));
/// assert!(!tt.remove_session(id));
/// ```
#[derive(Debug, Clone)]
pub struct Timetable {
    sessions: Vec<Session>,
    next_id: u64,
    lecturers: Vec<String>,
    subjects: Vec<String>,
    classes: Vec<String>,
    preferences: PreferenceStore,
    rooms: RoomPool,
    config: Config,
    catalog: TimeSlotCatalog,
}

/// Disjoint borrows of a timetable for passes that mutate sessions while
/// reading the rules.
pub(crate) struct Workspace<'a> {
    pub sessions: &'a mut Vec<Session>,
    pub preferences: &'a PreferenceStore,
    pub catalog: &'a TimeSlotCatalog,
    pub checker: ConflictChecker<'a>,
    pub allocator: RoomAllocator<'a>,
}

impl Default for Timetable {
    fn default() -> Self {
        Self::new()
    }
}

impl Timetable {
    /// Creates an empty timetable with the default configuration.
    pub fn new() -> Self {
        Self::with_config(Config::default())
    }

    /// Creates an empty timetable.
    pub fn with_config(config: Config) -> Self {
        Self {
            sessions: Vec::new(),
            next_id: 1,
            lecturers: Vec::new(),
            subjects: Vec::new(),
            classes: Vec::new(),
            preferences: PreferenceStore::new(),
            rooms: RoomPool::new(),
            config,
            catalog: TimeSlotCatalog::new(),
        }
    }

    /// Sets the room pool.
    pub fn with_rooms(mut self, rooms: RoomPool) -> Self {
        self.rooms = rooms;
        self
    }

    /// Sets the preference store.
    pub fn with_preferences(mut self, preferences: PreferenceStore) -> Self {
        self.preferences = preferences;
        self
    }

    // ======================== Accessors ========================

    /// All sessions in insertion order.
    pub fn sessions(&self) -> &[Session] {
        &self.sessions
    }

    /// Looks up a session.
    pub fn get(&self, id: SessionId) -> Option<&Session> {
        self.sessions.iter().find(|s| s.id == id)
    }

    /// Configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Room pool.
    pub fn rooms(&self) -> &RoomPool {
        &self.rooms
    }

    /// Preferences and personal breaks.
    pub fn preferences(&self) -> &PreferenceStore {
        &self.preferences
    }

    /// Time-slot catalog.
    pub fn catalog(&self) -> &TimeSlotCatalog {
        &self.catalog
    }

    /// Known lecturer names.
    pub fn lecturers(&self) -> &[String] {
        &self.lecturers
    }

    /// Known subject names.
    pub fn subjects(&self) -> &[String] {
        &self.subjects
    }

    /// Known class codes.
    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    /// Conflict checker over this timetable's rules.
    pub fn checker(&self) -> ConflictChecker<'_> {
        ConflictChecker::new(&self.preferences, &self.rooms, &self.config)
    }

    /// Room allocator over this timetable's rooms.
    pub fn allocator(&self) -> RoomAllocator<'_> {
        RoomAllocator::new(&self.rooms, &self.preferences, &self.config)
    }

    /// Every rule the session currently violates, `None` if unknown.
    pub fn conflict_reasons(&self, id: SessionId) -> Option<Vec<ConflictReason>> {
        let session = self.get(id)?;
        Some(self.checker().conflict_reasons(session, &self.sessions))
    }

    /// Sessions taught by a lecturer.
    pub fn lecturer_sessions(&self, lecturer: &str) -> Vec<&Session> {
        self.sessions
            .iter()
            .filter(|s| s.lecturer == lecturer)
            .collect()
    }

    pub(crate) fn index_of(&self, id: SessionId) -> Option<usize> {
        self.sessions.iter().position(|s| s.id == id)
    }

    pub(crate) fn workspace(&mut self) -> Workspace<'_> {
        let Self {
            ref mut sessions,
            ref preferences,
            ref rooms,
            ref config,
            ref catalog,
            ..
        } = *self;
        Workspace {
            sessions,
            preferences,
            catalog,
            checker: ConflictChecker::new(preferences, rooms, config),
            allocator: RoomAllocator::new(rooms, preferences, config),
        }
    }

    // ======================== Mutation ========================

    /// Adds a hand-entered session and returns its id.
    ///
    /// Imported origins become manual (keeping the row back-reference),
    /// online sessions get online-tagged times, and unseen names are
    /// registered.
    pub fn add_manual_session(&mut self, mut session: Session) -> SessionId {
        session.origin = session.origin.after_edit();
        if session.is_online() {
            session.time = tag_online(&session.time);
        }
        let id = self.insert(session);
        debug!("Manual session {id} added");
        id
    }

    /// Removes a session. Returns `false` if it is not present.
    pub fn remove_session(&mut self, id: SessionId) -> bool {
        match self.index_of(id) {
            Some(idx) => {
                self.sessions.remove(idx);
                true
            }
            None => false,
        }
    }

    /// Replaces a session with `replacement`.
    ///
    /// The replacement is inserted as a new manual session that keeps the
    /// import row of the old one. Returns its id, or `None` when `id` is
    /// not present.
    pub fn edit_session(&mut self, id: SessionId, mut replacement: Session) -> Option<SessionId> {
        let idx = self.index_of(id)?;
        let old = self.sessions.remove(idx);
        replacement.origin = old.origin.after_edit();
        if replacement.is_online() {
            replacement.time = tag_online(&replacement.time);
        }
        let new_id = self.insert(replacement);
        debug!("Session {id} replaced by {new_id}");
        Some(new_id)
    }

    /// Flips the fixed flag; returns the new value, `None` if not present.
    pub fn toggle_fixed(&mut self, id: SessionId) -> Option<bool> {
        let idx = self.index_of(id)?;
        let session = &mut self.sessions[idx];
        session.fixed = !session.fixed;
        Some(session.fixed)
    }

    /// Registers a personal break for a lecturer on a day.
    pub fn add_lecturer_break(&mut self, lecturer: &str, day: Day, start: &str, end: &str) {
        self.preferences.add_break(lecturer, day, start, end);
    }

    /// Replaces a lecturer's preferences. Duplicate days are dropped.
    pub fn set_lecturer_preference(&mut self, lecturer: impl Into<String>, mut preference: LecturerPreference) {
        dedup_days(&mut preference.available_days);
        dedup_days(&mut preference.online_days);
        self.preferences.set_preference(lecturer, preference);
    }

    /// Human-readable problems in the stored preferences.
    pub fn validate_preferences(&self) -> Vec<String> {
        validation::validate_preferences(&self.preferences)
            .into_iter()
            .map(|e| e.message)
            .collect()
    }

    // ======================== Import / Export ========================

    /// Replaces all sessions and name lists with the given rows.
    ///
    /// Rows without a lecturer or subject are skipped. Returns the number
    /// of sessions created.
    pub fn import_rows(&mut self, rows: impl IntoIterator<Item = ImportRow>) -> usize {
        self.sessions.clear();
        self.lecturers.clear();
        self.subjects.clear();
        self.classes.clear();

        let mut imported = 0;
        for (row_idx, row) in rows.into_iter().enumerate() {
            if !row.is_complete() {
                warn!("Import row {row_idx} has no lecturer or subject; skipped");
                continue;
            }
            self.insert(row.to_session(row_idx));
            imported += 1;
        }
        info!("Imported {imported} sessions");
        imported
    }

    /// Reads a JSON array of rows and imports it.
    pub fn import_rows_json<R: Read>(&mut self, reader: R) -> Result<usize> {
        let rows = io::read_rows_json(reader)?;
        Ok(self.import_rows(rows))
    }

    /// Replaces the room pool. Returns the number of rooms kept.
    pub fn load_rooms(&mut self, records: &[RoomRecord]) -> usize {
        self.rooms = io::room_pool(records, self.config.default_room_capacity);
        info!("Loaded {} rooms", self.rooms.len());
        self.rooms.len()
    }

    /// Reads a JSON room list and loads it.
    pub fn load_rooms_json<R: Read>(&mut self, reader: R) -> Result<usize> {
        let records = io::read_rooms_json(reader)?;
        Ok(self.load_rooms(&records))
    }

    /// Export rows for every session.
    pub fn export_rows(&self) -> Vec<ExportRow> {
        self.sessions.iter().map(ExportRow::from).collect()
    }

    /// Export rows for one lecturer.
    pub fn lecturer_export_rows(&self, lecturer: &str) -> Vec<ExportRow> {
        self.lecturer_sessions(lecturer)
            .into_iter()
            .map(ExportRow::from)
            .collect()
    }

    // ======================== Persistence ========================

    /// Whole-state snapshot.
    pub fn snapshot(&self) -> TimetableSnapshot {
        TimetableSnapshot {
            sessions: self.sessions.clone(),
            lecturers: self.lecturers.clone(),
            subjects: self.subjects.clone(),
            classes: self.classes.clone(),
            preferences: self.preferences.clone(),
            rooms: self.rooms.clone(),
            next_id: self.next_id,
        }
    }

    /// Rebuilds a timetable from a snapshot.
    pub fn from_snapshot(snapshot: TimetableSnapshot, config: Config) -> Self {
        let max_id = snapshot.sessions.iter().map(|s| s.id.0).max().unwrap_or(0);
        Self {
            next_id: snapshot.next_id.max(max_id.saturating_add(1)),
            sessions: snapshot.sessions,
            lecturers: snapshot.lecturers,
            subjects: snapshot.subjects,
            classes: snapshot.classes,
            preferences: snapshot.preferences,
            rooms: snapshot.rooms,
            config,
            catalog: TimeSlotCatalog::new(),
        }
    }

    /// Saves the whole state as JSON.
    pub fn save_json<W: Write>(&self, writer: W) -> Result<()> {
        self.snapshot().write_json(writer)
    }

    /// Loads a whole state saved by [`save_json`](Self::save_json).
    pub fn load_json<R: Read>(reader: R, config: Config) -> Result<Self> {
        let snapshot = TimetableSnapshot::read_json(reader)?;
        Ok(Self::from_snapshot(snapshot, config))
    }

    fn insert(&mut self, mut session: Session) -> SessionId {
        let id = SessionId(self.next_id);
        self.next_id += 1;
        session.id = id;
        register(&mut self.lecturers, &session.lecturer);
        register(&mut self.subjects, &session.subject);
        register(&mut self.classes, &session.class_code);
        self.sessions.push(session);
        id
    }
}

/// End label for a manual entry: `start + credit_hours x 50 min`.
///
/// Keeps the online marker of `start`. `None` when `start` does not parse
/// or the session would run past midnight.
pub fn end_label_for(start: &str, credit_hours: u32) -> Option<String> {
    let (time, online) = parse_time(start)?;
    end_time_for(time, credit_hours).map(|end| format_label(end, online))
}

fn register(names: &mut Vec<String>, name: &str) {
    if !name.is_empty() && !names.iter().any(|n| n == name) {
        names.push(name.to_string());
    }
}

fn dedup_days(days: &mut Vec<Day>) {
    let mut seen = Vec::with_capacity(days.len());
    days.retain(|d| {
        if seen.contains(d) {
            false
        } else {
            seen.push(*d);
            true
        }
    });
}

/// Online-tags both endpoints of a parseable time text.
fn tag_online(time: &str) -> String {
    match TimeRange::parse(time) {
        Some(range) => TimeRange::new(range.start, range.end, true).to_text(),
        None => time.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Origin, Room, RoomAssignment};

    fn timetable() -> Timetable {
        let mut tt = Timetable::new().with_rooms(RoomPool::from_rooms(vec![
            Room::new("R301").with_floor(3).with_capacity(40),
            Room::new("R401").with_floor(4).with_capacity(30),
        ]));
        tt.import_rows(vec![
            ImportRow::new("Dr. A", "Basis Data", "TI-2A").with_credit_hours(3),
            ImportRow::new("", "Orphan", "TI-2A"),
            ImportRow::new("Dr. B", "Statistika", "SI-1A").with_credit_hours(2),
        ]);
        tt
    }

    #[test]
    fn test_import_skips_incomplete_rows() {
        let tt = timetable();
        assert_eq!(tt.sessions().len(), 2);
        assert_eq!(tt.sessions()[1].origin, Origin::Imported { row: 2 });
        assert_eq!(tt.lecturers(), &["Dr. A".to_string(), "Dr. B".to_string()]);
        assert!(tt.sessions().iter().all(|s| !s.is_placed() && !s.fixed));
    }

    #[test]
    fn test_import_json() {
        let mut tt = Timetable::new();
        let n = tt
            .import_rows_json(r#"[{"dosen":"Dr. C","mata_kuliah":"AI","kelas":"TI-3A","sks":2}]"#.as_bytes())
            .unwrap();
        assert_eq!(n, 1);
        assert_eq!(tt.subjects(), &["AI".to_string()]);
    }

    #[test]
    fn test_manual_add_registers_names() {
        let mut tt = timetable();
        tt.add_manual_session(Session::new("Dr. Z", "Kalkulus", "DK-1A"));
        assert!(tt.lecturers().contains(&"Dr. Z".to_string()));
        assert!(tt.subjects().contains(&"Kalkulus".to_string()));
        assert!(tt.classes().contains(&"DK-1A".to_string()));
    }

    #[test]
    fn test_manual_online_session_gets_tagged_time() {
        let mut tt = timetable();
        let id = tt.add_manual_session(
            Session::new("Dr. A", "Seminar", "TI-2A")
                .with_day(Day::Friday)
                .with_time("13:00 - 14:40")
                .with_room(RoomAssignment::Online),
        );
        assert_eq!(tt.get(id).unwrap().time, "13:00 (online) - 14:40 (online)");
    }

    #[test]
    fn test_edit_keeps_import_row() {
        let mut tt = timetable();
        let old = tt.sessions()[0].id;
        let replacement = tt.sessions()[0].clone().with_day(Day::Monday).with_time("08:00 - 10:30");
        let new_id = tt.edit_session(old, replacement).unwrap();

        assert_ne!(new_id, old);
        assert!(tt.get(old).is_none());
        assert_eq!(tt.get(new_id).unwrap().origin, Origin::Manual { import_row: Some(0) });
        assert!(tt.edit_session(old, Session::new("a", "b", "c")).is_none());
    }

    #[test]
    fn test_toggle_fixed() {
        let mut tt = timetable();
        let id = tt.sessions()[0].id;
        assert_eq!(tt.toggle_fixed(id), Some(true));
        assert_eq!(tt.toggle_fixed(id), Some(false));
        assert_eq!(tt.toggle_fixed(SessionId(999)), None);
    }

    #[test]
    fn test_lecturer_break_applies_by_day() {
        let mut tt = timetable();
        tt.add_lecturer_break("Dr. A", Day::Monday, "10:00", "11:00");
        let id = tt.add_manual_session(
            Session::new("Dr. A", "Praktikum", "TI-2B")
                .with_day(Day::Monday)
                .with_time("09:00 (online) - 10:40 (online)")
                .with_room(RoomAssignment::Online),
        );
        let reasons = tt.conflict_reasons(id).unwrap();
        assert!(matches!(reasons.as_slice(), [ConflictReason::LecturerBreak(_)]));

        let other_day = tt.get(id).unwrap().clone().with_day(Day::Tuesday);
        let id = tt.edit_session(id, other_day).unwrap();
        assert!(tt.conflict_reasons(id).unwrap().is_empty());
    }

    #[test]
    fn test_preference_days_deduplicated() {
        let mut tt = timetable();
        tt.set_lecturer_preference(
            "Dr. A",
            LecturerPreference::new().with_available_days([Day::Monday, Day::Monday, Day::Friday]),
        );
        assert_eq!(
            tt.preferences().valid_days("Dr. A"),
            vec![Day::Monday, Day::Friday]
        );
    }

    #[test]
    fn test_validate_preferences_messages() {
        let mut tt = timetable();
        tt.set_lecturer_preference(
            "Dr. A",
            LecturerPreference::new()
                .with_available_days([Day::Monday])
                .with_online_days([Day::Friday]),
        );
        let problems = tt.validate_preferences();
        assert_eq!(problems.len(), 1);
        assert!(problems[0].contains("Jumat"));
    }

    #[test]
    fn test_lecturer_view_and_export() {
        let tt = timetable();
        assert_eq!(tt.lecturer_sessions("Dr. B").len(), 1);
        let rows = tt.lecturer_export_rows("Dr. B");
        assert_eq!(rows[0].subject, "Statistika");
        assert_eq!(tt.export_rows().len(), 2);
    }

    #[test]
    fn test_load_rooms_json() {
        let mut tt = Timetable::new();
        let kept = tt
            .load_rooms_json(r#"[{"nama":"R101","lantai":1},{"nama":"Online"}]"#.as_bytes())
            .unwrap();
        assert_eq!(kept, 1);
        assert_eq!(tt.rooms().capacity("R101"), Some(30));
    }

    #[test]
    fn test_snapshot_round_trip() {
        let mut tt = timetable();
        tt.add_lecturer_break("Dr. A", Day::Monday, "10:00", "11:00");
        tt.set_lecturer_preference("Dr. B", LecturerPreference::new().with_online_days([Day::Friday]));
        let first = tt.sessions()[0].id;
        tt.toggle_fixed(first);

        let mut buf = Vec::new();
        tt.save_json(&mut buf).unwrap();
        let mut loaded = Timetable::load_json(buf.as_slice(), Config::default()).unwrap();

        assert_eq!(loaded.snapshot(), tt.snapshot());
        assert!(loaded.get(first).unwrap().fixed);
        // ids keep increasing after a reload
        let id = loaded.add_manual_session(Session::new("Dr. A", "X", "TI-1A"));
        assert!(tt.sessions().iter().all(|s| s.id < id));
    }

    #[test]
    fn test_end_label_for() {
        assert_eq!(end_label_for("08:00", 3).as_deref(), Some("10:30"));
        assert_eq!(end_label_for("13:00 (online)", 2).as_deref(), Some("14:40 (online)"));
        assert_eq!(end_label_for("later", 2), None);
    }
}
