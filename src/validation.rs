//! Input validation for timetabling data.
//!
//! Checks lecturer preferences, imported rows and room pools before
//! scheduling. Detects:
//! - Online days outside a lecturer's available days
//! - Malformed or excess preferred time windows
//! - Import rows missing a lecturer or subject, or with unusable credit hours
//! - Duplicate room names and seatless rooms
//!
//! Nothing here is enforced on write; callers decide what to do with the
//! reported problems.

use std::collections::HashSet;

use crate::catalog::MAX_CREDIT_HOURS;
use crate::io::ImportRow;
use crate::models::{PreferenceStore, RoomPool, TimeWindow};

/// Most preferred windows a lecturer may list per delivery mode.
pub const MAX_PREFERRED_WINDOWS: usize = 2;

/// Validation result.
pub type ValidationResult = Result<(), Vec<ValidationError>>;

/// A validation error.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationError {
    /// Error category.
    pub kind: ValidationErrorKind,
    /// Human-readable description.
    pub message: String,
}

/// Categories of validation errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationErrorKind {
    /// An online day is not among the lecturer's available days.
    OnlineDayUnavailable,
    /// A preferred window does not parse or does not end after it starts.
    InvalidTimeWindow,
    /// More preferred windows than allowed.
    TooManyWindows,
    /// An import row lacks a lecturer or subject.
    MissingField,
    /// Credit hours outside `1..=MAX_CREDIT_HOURS`.
    InvalidCreditHours,
    /// Two rooms share a name.
    DuplicateRoom,
    /// A room has no seats.
    ZeroCapacity,
}

impl ValidationError {
    fn new(kind: ValidationErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

/// Validates every stored lecturer preference.
///
/// Lecturers are visited in name order so the output is stable. Every
/// online day missing from the available days is flagged, so a lecturer
/// with online days but no available days gets one error per online day.
pub fn validate_preferences(store: &PreferenceStore) -> Vec<ValidationError> {
    let mut entries: Vec<_> = store.preferences().collect();
    entries.sort_by(|a, b| a.0.cmp(b.0));

    let mut errors = Vec::new();
    for (lecturer, pref) in entries {
        for day in pref.online_days.iter().filter(|d| !pref.available_days.contains(d)) {
            errors.push(ValidationError::new(
                ValidationErrorKind::OnlineDayUnavailable,
                format!("{lecturer}: Hari {day} didefinisikan sebagai online tetapi tidak tersedia"),
            ));
        }

        for (mode, windows) in [("offline", &pref.preferred_offline), ("online", &pref.preferred_online)] {
            if windows.len() > MAX_PREFERRED_WINDOWS {
                errors.push(ValidationError::new(
                    ValidationErrorKind::TooManyWindows,
                    format!(
                        "{lecturer}: Terlalu banyak waktu {mode} preferensi ({} > {MAX_PREFERRED_WINDOWS})",
                        windows.len()
                    ),
                ));
            }
            for (start, end) in windows {
                if TimeWindow::parse(start, end).is_none() {
                    errors.push(ValidationError::new(
                        ValidationErrorKind::InvalidTimeWindow,
                        format!("{lecturer}: Waktu {mode} preferensi tidak valid ({start} - {end})"),
                    ));
                }
            }
        }
    }
    errors
}

/// Validates import rows. Row numbers in messages are 1-based.
pub fn validate_rows(rows: &[ImportRow]) -> ValidationResult {
    let mut errors = Vec::new();
    for (i, row) in rows.iter().enumerate() {
        let n = i + 1;
        if !row.is_complete() {
            errors.push(ValidationError::new(
                ValidationErrorKind::MissingField,
                format!("Row {n}: lecturer and subject are required"),
            ));
        }
        if row.credit_hours == 0 || row.credit_hours > MAX_CREDIT_HOURS {
            errors.push(ValidationError::new(
                ValidationErrorKind::InvalidCreditHours,
                format!(
                    "Row {n}: credit hours {} outside 1..={MAX_CREDIT_HOURS}",
                    row.credit_hours
                ),
            ));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Validates a room pool.
pub fn validate_rooms(pool: &RoomPool) -> ValidationResult {
    let mut errors = Vec::new();
    let mut names = HashSet::new();
    for room in pool.rooms() {
        if !names.insert(room.name.as_str()) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateRoom,
                format!("Duplicate room: {}", room.name),
            ));
        }
        if room.capacity == 0 {
            errors.push(ValidationError::new(
                ValidationErrorKind::ZeroCapacity,
                format!("Room '{}' has no capacity", room.name),
            ));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
