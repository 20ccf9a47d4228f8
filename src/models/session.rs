//! Session model.
//!
//! A session is one teaching occurrence: a lecturer teaching a subject to a
//! class section. Placement fields (day, time, room) start empty and are
//! filled by the scheduler or by manual entry.
//!
//! # Identity
//! Sessions are compared by [`SessionId`], assigned by the owning
//! [`Timetable`](crate::timetable::Timetable). Two sessions with identical
//! fields are still different sessions, and a session never conflicts with
//! itself.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::{Day, TimeRange};

/// Room label marking online delivery.
pub const ONLINE_ROOM: &str = "Online";

/// Department used when a class code is too short to derive one.
pub const DEFAULT_DEPARTMENT: &str = "default";

/// Stable session identifier within a timetable.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct SessionId(pub u64);

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Where a session is held.
///
/// Serialized as the plain room label: `""`, `"Online"` or the room name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum RoomAssignment {
    /// No room yet.
    #[default]
    Unassigned,
    /// Online delivery; exempt from room capacity and institutional breaks.
    Online,
    /// A physical room, by name.
    Room(String),
}

impl RoomAssignment {
    /// Interprets a room label.
    pub fn from_label(label: &str) -> Self {
        match label.trim() {
            "" => Self::Unassigned,
            ONLINE_ROOM => Self::Online,
            name => Self::Room(name.to_string()),
        }
    }

    /// Label as stored and exported.
    pub fn label(&self) -> &str {
        match self {
            Self::Unassigned => "",
            Self::Online => ONLINE_ROOM,
            Self::Room(name) => name,
        }
    }

    /// Whether this is online delivery.
    #[inline]
    pub fn is_online(&self) -> bool {
        matches!(self, Self::Online)
    }

    /// Whether any room (or online) is assigned.
    #[inline]
    pub fn is_assigned(&self) -> bool {
        !matches!(self, Self::Unassigned)
    }

    /// Physical room name, if any.
    pub fn room_name(&self) -> Option<&str> {
        match self {
            Self::Room(name) => Some(name.as_str()),
            _ => None,
        }
    }
}

impl From<String> for RoomAssignment {
    fn from(label: String) -> Self {
        Self::from_label(&label)
    }
}

impl From<RoomAssignment> for String {
    fn from(room: RoomAssignment) -> Self {
        room.label().to_string()
    }
}

impl From<&str> for RoomAssignment {
    fn from(label: &str) -> Self {
        Self::from_label(label)
    }
}

/// How a session entered the timetable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Origin {
    /// Created from an import row.
    Imported {
        /// Position of the source row, used when re-exporting into the
        /// same template.
        row: usize,
    },
    /// Entered or edited by hand.
    Manual {
        /// Source row of the imported session this one replaced, if any.
        import_row: Option<usize>,
    },
}

impl Default for Origin {
    fn default() -> Self {
        Origin::Manual { import_row: None }
    }
}

impl Origin {
    /// The import row this session traces back to.
    pub fn import_row(&self) -> Option<usize> {
        match *self {
            Origin::Imported { row } => Some(row),
            Origin::Manual { import_row } => import_row,
        }
    }

    /// Origin after an edit: always manual, keeping the import back-reference.
    pub fn after_edit(&self) -> Origin {
        Origin::Manual {
            import_row: self.import_row(),
        }
    }
}

/// One teaching occurrence (lecturer x subject x class section).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    /// Identity within the owning timetable.
    pub id: SessionId,
    /// Lecturer name.
    pub lecturer: String,
    /// Subject name.
    pub subject: String,
    /// Class section code (e.g. "TI-2A"); its first two characters name the department.
    pub class_code: String,
    /// Teaching day. `None` while unplaced.
    pub day: Option<Day>,
    /// Time range text (`"08:00 - 09:40"`). Empty while unplaced.
    pub time: String,
    /// Credit hours (SKS); each is 50 minutes.
    pub credit_hours: u32,
    /// Semester number.
    pub semester: u32,
    /// Room assignment.
    pub room: RoomAssignment,
    /// Number of enrolled students.
    pub headcount: u32,
    /// Provenance.
    pub origin: Origin,
    /// Exempt from automated (re)placement.
    pub fixed: bool,
}

impl Session {
    /// Creates an unplaced, manually entered session.
    pub fn new(
        lecturer: impl Into<String>,
        subject: impl Into<String>,
        class_code: impl Into<String>,
    ) -> Self {
        Self {
            id: SessionId::default(),
            lecturer: lecturer.into(),
            subject: subject.into(),
            class_code: class_code.into(),
            day: None,
            time: String::new(),
            credit_hours: 0,
            semester: 0,
            room: RoomAssignment::Unassigned,
            headcount: 0,
            origin: Origin::default(),
            fixed: false,
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

    /// Sets the day.
    pub fn with_day(mut self, day: Day) -> Self {
        self.day = Some(day);
        self
    }

    /// Sets the raw time range text.
    pub fn with_time(mut self, time: impl Into<String>) -> Self {
        self.time = time.into();
        self
    }

    /// Sets the room from a label or assignment.
    pub fn with_room(mut self, room: impl Into<RoomAssignment>) -> Self {
        self.room = room.into();
        self
    }

    /// Sets the origin.
    pub fn with_origin(mut self, origin: Origin) -> Self {
        self.origin = origin;
        self
    }

    /// Marks the session as fixed.
    pub fn with_fixed(mut self, fixed: bool) -> Self {
        self.fixed = fixed;
        self
    }

    /// Parsed time range, `None` when empty or malformed.
    pub fn time_range(&self) -> Option<TimeRange> {
        if self.time.is_empty() {
            None
        } else {
            TimeRange::parse(&self.time)
        }
    }

    /// Whether both day and time are set.
    pub fn is_placed(&self) -> bool {
        self.day.is_some() && !self.time.is_empty()
    }

    /// Whether the session is held online.
    #[inline]
    pub fn is_online(&self) -> bool {
        self.room.is_online()
    }

    /// Sets day, time and room in one step.
    pub fn place(&mut self, day: Day, range: &TimeRange, room: RoomAssignment) {
        self.day = Some(day);
        self.time = range.to_text();
        self.room = room;
    }

    /// Clears day, time and room.
    pub fn clear_placement(&mut self) {
        self.day = None;
        self.time.clear();
        self.room = RoomAssignment::Unassigned;
    }

    /// Department code: the first two characters of the class code, or
    /// `"default"` when the code is shorter.
    pub fn department(&self) -> String {
        if self.class_code.chars().count() >= 2 {
            self.class_code.chars().take(2).collect()
        } else {
            DEFAULT_DEPARTMENT.to_string()
        }
    }
}
