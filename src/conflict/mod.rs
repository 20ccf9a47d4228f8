//! Conflict detection.
//!
//! - [`ConflictChecker`]: feasibility and diagnosis of one placement
//!   against the rest of the timetable.
//! - [`ConflictAuditor`]: pairwise scan of a whole timetable, with a
//!   best-effort repair pass.

mod audit;
mod engine;

pub use audit::{ConflictAuditor, ConflictEntry, ConflictKind, ConflictReport};
pub use engine::{ConflictChecker, ConflictReason};
