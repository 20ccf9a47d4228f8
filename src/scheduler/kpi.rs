//! Timetable quality metrics (KPIs).
//!
//! # Metrics
//!
//! | Metric | Definition |
//! |--------|-----------|
//! | Placement rate | Placed sessions / all sessions |
//! | Online share | Online sessions / placed sessions |
//! | Room utilization | Booked minutes / weekly window (5 days x 08:00-21:00) |

use std::collections::HashMap;

use crate::catalog::{CLOSING_HOUR, OPENING_HOUR};
use crate::timetable::Timetable;

/// Bookable minutes per room per week.
const WEEKLY_MINUTES: i64 = 5 * (CLOSING_HOUR - OPENING_HOUR) as i64 * 60;

/// Timetable performance indicators.
#[derive(Debug, Clone)]
pub struct TimetableKpi {
    /// All sessions.
    pub total: usize,
    /// Sessions with day and time.
    pub placed: usize,
    /// Sessions missing day or time.
    pub unplaced: usize,
    /// Placed sessions held online.
    pub online: usize,
    /// Placed sessions held in a room or not yet roomed.
    pub offline: usize,
    /// Sessions exempt from rescheduling.
    pub fixed: usize,
    /// Per-room utilization (0.0..1.0); every pooled room is listed.
    pub room_utilization: HashMap<String, f64>,
    /// Mean room utilization.
    pub avg_room_utilization: f64,
}

impl TimetableKpi {
    /// Computes KPIs for a timetable.
    pub fn calculate(timetable: &Timetable) -> Self {
        let sessions = timetable.sessions();
        let mut booked: HashMap<String, i64> = timetable
            .rooms()
            .rooms()
            .iter()
            .map(|r| (r.name.clone(), 0))
            .collect();

        let (mut placed, mut online, mut fixed) = (0, 0, 0);
        for s in sessions {
            if s.fixed {
                fixed += 1;
            }
            if !s.is_placed() {
                continue;
            }
            placed += 1;
            if s.is_online() {
                online += 1;
            }
            if let (Some(room), Some(range)) = (s.room.room_name(), s.time_range()) {
                if range.is_valid() {
                    *booked.entry(room.to_string()).or_insert(0) += range.duration_minutes();
                }
            }
        }

        let room_utilization: HashMap<String, f64> = booked
            .into_iter()
            .map(|(room, minutes)| (room, minutes as f64 / WEEKLY_MINUTES as f64))
            .collect();
        let avg_room_utilization = if room_utilization.is_empty() {
            0.0
        } else {
            room_utilization.values().sum::<f64>() / room_utilization.len() as f64
        };

        Self {
            total: sessions.len(),
            placed,
            unplaced: sessions.len() - placed,
            online,
            offline: placed - online,
            fixed,
            room_utilization,
            avg_room_utilization,
        }
    }

    /// Fraction of sessions placed (1.0 for an empty timetable).
    pub fn placement_rate(&self) -> f64 {
        if self.total == 0 {
            1.0
        } else {
            self.placed as f64 / self.total as f64
        }
    }

    /// Whether the timetable meets the given quality thresholds.
    pub fn meets_thresholds(&self, min_placement_rate: f64, min_utilization: f64) -> bool {
        self.placement_rate() >= min_placement_rate && self.avg_room_utilization >= min_utilization
    }
}
