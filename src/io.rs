//! Plain records exchanged with loaders, exporters and persistence.
//!
//! The engine never reads spreadsheets or files itself; collaborators hand
//! it [`ImportRow`]s and [`RoomRecord`]s and receive [`ExportRow`]s or a
//! whole [`TimetableSnapshot`]. JSON helpers are provided for the record
//! shapes that have a canonical JSON form.

use serde::{Deserialize, Serialize};
use std::io::{Read, Write};

use crate::error::{Error, Result};
use crate::models::{Origin, PreferenceStore, Room, RoomPool, Session};

/// Column order of exported rows.
pub const EXPORT_HEADERS: [&str; 9] = [
    "Day",
    "Subject",
    "Class",
    "Room",
    "Time",
    "Credit-Hours",
    "Semester",
    "Lecturer",
    "Headcount",
];

/// One course-mapping row from an import source.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ImportRow {
    #[serde(alias = "dosen", default)]
    pub lecturer: String,
    #[serde(alias = "mata_kuliah", default)]
    pub subject: String,
    #[serde(alias = "kelas", default)]
    pub class_code: String,
    #[serde(alias = "sks", default)]
    pub credit_hours: u32,
    #[serde(default)]
    pub semester: u32,
    #[serde(alias = "jumlah_mahasiswa", default)]
    pub headcount: u32,
}

impl ImportRow {
    /// Creates a row with zero credit hours, semester and headcount.
    pub fn new(
        lecturer: impl Into<String>,
        subject: impl Into<String>,
        class_code: impl Into<String>,
    ) -> Self {
        Self {
            lecturer: lecturer.into(),
            subject: subject.into(),
            class_code: class_code.into(),
            ..Self::default()
        }
    }

    /// Sets credit hours.
    pub fn with_credit_hours(mut self, credit_hours: u32) -> Self {
        self.credit_hours = credit_hours;
        self
    }

    /// Sets the semester.
    pub fn with_semester(mut self, semester: u32) -> Self {
        self.semester = semester;
        self
    }

    /// Sets the headcount.
    pub fn with_headcount(mut self, headcount: u32) -> Self {
        self.headcount = headcount;
        self
    }

    /// Whether the row names both a lecturer and a subject.
    pub fn is_complete(&self) -> bool {
        !self.lecturer.trim().is_empty() && !self.subject.trim().is_empty()
    }

    /// Unplaced imported session for this row.
    pub fn to_session(&self, row: usize) -> Session {
        Session::new(self.lecturer.trim(), self.subject.trim(), self.class_code.trim())
            .with_credit_hours(self.credit_hours)
            .with_semester(self.semester)
            .with_headcount(self.headcount)
            .with_origin(Origin::Imported { row })
    }
}

/// One entry of a room list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoomRecord {
    #[serde(alias = "nama")]
    pub name: String,
    #[serde(alias = "lantai", default)]
    pub floor: Option<i32>,
    #[serde(alias = "kapasitas", default)]
    pub capacity: Option<u32>,
}

impl RoomRecord {
    /// Room for this record, using `default_capacity` when none is given.
    pub fn to_room(&self, default_capacity: u32) -> Room {
        let mut room = Room::new(self.name.trim()).with_capacity(self.capacity.unwrap_or(default_capacity));
        room.floor = self.floor;
        room
    }
}

/// One exported timetable row, in [`EXPORT_HEADERS`] order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportRow {
    pub day: String,
    pub subject: String,
    pub class_code: String,
    pub room: String,
    pub time: String,
    pub credit_hours: u32,
    pub semester: u32,
    pub lecturer: String,
    pub headcount: u32,
    /// Import row the session came from, for writing back into the same template.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub source_row: Option<usize>,
}

impl From<&Session> for ExportRow {
    fn from(session: &Session) -> Self {
        Self {
            day: session.day.map(|d| d.to_string()).unwrap_or_default(),
            subject: session.subject.clone(),
            class_code: session.class_code.clone(),
            room: session.room.label().to_string(),
            time: session.time.clone(),
            credit_hours: session.credit_hours,
            semester: session.semester,
            lecturer: session.lecturer.clone(),
            headcount: session.headcount,
            source_row: session.origin.import_row(),
        }
    }
}

impl ExportRow {
    /// Cell values in header order.
    pub fn to_record(&self) -> [String; 9] {
        [
            self.day.clone(),
            self.subject.clone(),
            self.class_code.clone(),
            self.room.clone(),
            self.time.clone(),
            self.credit_hours.to_string(),
            self.semester.to_string(),
            self.lecturer.clone(),
            self.headcount.to_string(),
        ]
    }
}

/// Whole engine state, saved and loaded atomically.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimetableSnapshot {
    pub sessions: Vec<Session>,
    pub lecturers: Vec<String>,
    pub subjects: Vec<String>,
    pub classes: Vec<String>,
    pub preferences: PreferenceStore,
    pub rooms: RoomPool,
    pub next_id: u64,
}

impl TimetableSnapshot {
    /// Writes the snapshot as JSON.
    pub fn write_json<W: Write>(&self, writer: W) -> Result<()> {
        serde_json::to_writer_pretty(writer, self)?;
        Ok(())
    }

    /// Reads a snapshot from JSON.
    pub fn read_json<R: Read>(reader: R) -> Result<Self> {
        Ok(serde_json::from_reader(reader)?)
    }
}

/// Reads import rows from a JSON array.
pub fn read_rows_json<R: Read>(reader: R) -> Result<Vec<ImportRow>> {
    let value: serde_json::Value = serde_json::from_reader(reader)?;
    let serde_json::Value::Array(items) = value else {
        return Err(Error::Load("expected a JSON array of rows".into()));
    };
    items
        .into_iter()
        .map(|v| serde_json::from_value(v).map_err(Error::from))
        .collect()
}

/// Reads a room list from a JSON array.
///
/// Online placeholder entries are kept here and dropped when the records
/// become a [`RoomPool`].
pub fn read_rooms_json<R: Read>(reader: R) -> Result<Vec<RoomRecord>> {
    let value: serde_json::Value = serde_json::from_reader(reader)?;
    let serde_json::Value::Array(items) = value else {
        return Err(Error::Load("expected a JSON array of rooms".into()));
    };
    items
        .into_iter()
        .map(|v| serde_json::from_value(v).map_err(Error::from))
        .collect()
}

/// Room pool from records; entries named like "online" are discarded.
pub fn room_pool(records: &[RoomRecord], default_capacity: u32) -> RoomPool {
    RoomPool::from_rooms(records.iter().map(|r| r.to_room(default_capacity)))
}

/// Writes export rows as a JSON array of header-keyed objects.
pub fn write_export_json<W: Write>(writer: W, rows: &[ExportRow]) -> Result<()> {
    let objects: Vec<serde_json::Map<String, serde_json::Value>> = rows
        .iter()
        .map(|row| {
            EXPORT_HEADERS
                .iter()
                .zip(row.to_record())
                .map(|(h, v)| (h.to_string(), serde_json::Value::String(v)))
                .collect()
        })
        .collect();
    serde_json::to_writer_pretty(writer, &objects)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Day, SessionId};

    #[test]
    fn test_rows_accept_both_key_sets() {
        let json = r#"[
            {"dosen": "Dr. A", "mata_kuliah": "Basis Data", "kelas": "TI-2A", "sks": 3, "semester": 2},
            {"lecturer": "Dr. B", "subject": "Statistika", "class_code": "SI-1A", "credit_hours": 2, "headcount": 40}
        ]"#;
        let rows = read_rows_json(json.as_bytes()).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].credit_hours, 3);
        assert_eq!(rows[0].headcount, 0);
        assert_eq!(rows[1].headcount, 40);
        assert!(rows.iter().all(ImportRow::is_complete));
    }

    #[test]
    fn test_rows_reject_non_array() {
        assert!(matches!(read_rows_json(&b"{}"[..]), Err(Error::Load(_))));
        assert!(matches!(read_rows_json(&b"not json"[..]), Err(Error::Json(_))));
    }

    #[test]
    fn test_row_to_session() {
        let s = ImportRow::new(" Dr. A ", "Basis Data", "TI-2A")
            .with_credit_hours(3)
            .to_session(7);
        assert_eq!(s.lecturer, "Dr. A");
        assert_eq!(s.origin, Origin::Imported { row: 7 });
        assert!(!s.is_placed());
        assert!(!s.fixed);
    }

    #[test]
    fn test_rooms_skip_online_and_default_capacity() {
        let json = r#"[
            {"nama": "R301", "lantai": 3, "kapasitas": 40},
            {"name": "Lab 5", "floor": 5},
            {"nama": "Ruang ONLINE"}
        ]"#;
        let records = read_rooms_json(json.as_bytes()).unwrap();
        assert_eq!(records.len(), 3);
        let pool = room_pool(&records, 30);
        assert_eq!(pool.len(), 2);
        let lab = pool.get("Lab 5").unwrap();
        assert_eq!(lab.capacity, 30);
        assert_eq!(lab.floor, Some(5));
    }

    #[test]
    fn test_export_row_order() {
        let mut s = Session::new("Dr. A", "Basis Data", "TI-2A")
            .with_day(Day::Tuesday)
            .with_time("08:00 - 09:40")
            .with_room("R301")
            .with_credit_hours(2)
            .with_semester(3)
            .with_headcount(25);
        s.id = SessionId(1);
        let row = ExportRow::from(&s);
        assert_eq!(
            row.to_record(),
            ["Selasa", "Basis Data", "TI-2A", "R301", "08:00 - 09:40", "2", "3", "Dr. A", "25"]
                .map(String::from)
        );

        let mut out = Vec::new();
        write_export_json(&mut out, &[row]).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("\"Credit-Hours\": \"2\""));
    }

    #[test]
    fn test_unplaced_export_is_blank() {
        let row = ExportRow::from(&Session::new("Dr. A", "X", "TI-1A"));
        assert_eq!(row.day, "");
        assert_eq!(row.room, "");
        assert_eq!(row.time, "");
    }
}
