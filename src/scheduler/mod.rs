//! Timetable builders and KPI evaluation.
//!
//! Provides the randomized placement scheduler, the room passes that run
//! over an already-timed timetable, and timetable quality metrics.
//!
//! # Algorithm
//!
//! `RandomizedScheduler` draws day, delivery mode, slot and room at random
//! and keeps the first candidate the conflict checker accepts, within a
//! bounded attempt budget per session. It is fast and reproducible with a
//! seeded generator, but not optimal.
//!
//! # KPI
//!
//! `TimetableKpi` reports placement counts, online share and per-room
//! weekly utilization.

mod kpi;
mod randomized;
mod rooms;

pub use kpi::TimetableKpi;
pub use randomized::{FailedPlacement, RandomizedScheduler, ScheduleOutcome};
pub use rooms::{fill_empty_rooms, reassign_all_rooms};
