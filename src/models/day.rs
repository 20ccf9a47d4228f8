//! Teaching days.
//!
//! The working week runs Monday to Friday. Days are displayed and
//! serialized with their Indonesian names (`Senin` .. `Jumat`), which is
//! what imported spreadsheets and stored snapshots contain.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A teaching day of the five-day week.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Day {
    #[serde(rename = "Senin")]
    Monday,
    #[serde(rename = "Selasa")]
    Tuesday,
    #[serde(rename = "Rabu")]
    Wednesday,
    #[serde(rename = "Kamis")]
    Thursday,
    #[serde(rename = "Jumat")]
    Friday,
}

impl Day {
    /// All teaching days in week order.
    pub const ALL: [Day; 5] = [
        Day::Monday,
        Day::Tuesday,
        Day::Wednesday,
        Day::Thursday,
        Day::Friday,
    ];

    /// Display label (`"Senin"` for Monday, etc.).
    pub fn label(self) -> &'static str {
        match self {
            Day::Monday => "Senin",
            Day::Tuesday => "Selasa",
            Day::Wednesday => "Rabu",
            Day::Thursday => "Kamis",
            Day::Friday => "Jumat",
        }
    }
}

impl fmt::Display for Day {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Error returned when a day name is not a teaching day.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseDayError(pub String);

impl fmt::Display for ParseDayError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown teaching day '{}'", self.0)
    }
}

impl std::error::Error for ParseDayError {}

impl FromStr for Day {
    type Err = ParseDayError;

    /// Accepts Indonesian and English names, case-insensitive.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "senin" | "monday" => Ok(Day::Monday),
            "selasa" | "tuesday" => Ok(Day::Tuesday),
            "rabu" | "wednesday" => Ok(Day::Wednesday),
            "kamis" | "thursday" => Ok(Day::Thursday),
            "jumat" | "friday" => Ok(Day::Friday),
            _ => Err(ParseDayError(s.to_string())),
        }
    }
}
