//! Timetabling domain models.
//!
//! Provides the plain data records the engine works on: sessions, rooms,
//! lecturer preferences, teaching days and time ranges.
//!
//! # Domain Mappings
//!
//! | u-timetable | Campus term | Generic scheduling |
//! |-------------|-------------|--------------------|
//! | Session | Jadwal (lecture slot) | Activity |
//! | Room | Ruangan | Resource |
//! | LecturerPreference | Preferensi dosen | Calendar / time constraint |
//! | TimeRange | Jam | Time window |

mod day;
mod preference;
mod room;
mod session;
pub mod time;

pub use day::{Day, ParseDayError};
pub use preference::{break_key, LecturerPreference, PreferenceStore};
pub use room::{Room, RoomPool, DEFAULT_ROOM_CAPACITY};
pub use session::{
    Origin, RoomAssignment, Session, SessionId, DEFAULT_DEPARTMENT, ONLINE_ROOM,
};
pub use time::{
    is_online_text, is_valid_for_credit_hours, is_valid_range, overlaps, parse_time, TimeRange,
    TimeWindow,
};
