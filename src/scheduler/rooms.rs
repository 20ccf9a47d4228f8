//! Room passes over an already-timed timetable.
//!
//! Both passes visit sessions by headcount, largest first, so big classes
//! get first pick of the big rooms.

use log::{debug, info};
use rand::Rng;
use std::cmp::Reverse;

use crate::allocator::RoomRequest;
use crate::models::time::format_label;
use crate::models::{is_online_text, Day, RoomAssignment, Session};
use crate::timetable::Timetable;

/// Assigns a room to every session that has none.
///
/// Online-tagged times and forced-online days get `Online`. Other sessions
/// need a day and a valid time; they get a room from the allocator or,
/// failing that, the first free room with enough seats. Returns the number
/// of sessions that received a room.
pub fn fill_empty_rooms<R: Rng + ?Sized>(timetable: &mut Timetable, rng: &mut R) -> usize {
    let mut ws = timetable.workspace();
    let order = by_headcount(ws.sessions.as_slice(), |s| !s.room.is_assigned());

    let mut filled = 0;
    for idx in order {
        let session = &ws.sessions[idx];
        let forced = session
            .day
            .is_some_and(|d| ws.preferences.is_forced_online(&session.lecturer, d));
        let room = if is_online_text(&session.time) || forced {
            Some(RoomAssignment::Online)
        } else {
            let Some(labels) = Labels::of(session) else {
                continue;
            };
            let request = labels.request(session);
            let sessions = ws.sessions.as_slice();
            ws.allocator
                .available_room(&request, sessions, rng)
                .or_else(|| ws.allocator.first_free_room(&request, sessions))
        };

        if let Some(room) = room {
            debug!("Session {} gets room {}", ws.sessions[idx].id, room.label());
            ws.sessions[idx].room = room;
            filled += 1;
        }
    }
    info!("Filled {filled} empty rooms");
    filled
}

/// Re-draws the room of every placed, offline, non-fixed session.
///
/// A session keeps its room when the allocator finds nothing free.
/// Returns the number of sessions whose room changed.
pub fn reassign_all_rooms<R: Rng + ?Sized>(timetable: &mut Timetable, rng: &mut R) -> usize {
    let mut ws = timetable.workspace();
    let order = by_headcount(ws.sessions.as_slice(), |s| !s.is_online() && !s.fixed);

    let mut changed = 0;
    for idx in order {
        let session = &ws.sessions[idx];
        let Some(labels) = Labels::of(session) else {
            continue;
        };
        let request = labels.request(session);
        let Some(room) = ws.allocator.available_room(&request, ws.sessions.as_slice(), rng) else {
            continue;
        };
        if room != ws.sessions[idx].room {
            ws.sessions[idx].room = room;
            changed += 1;
        }
    }
    info!("Reassigned {changed} rooms");
    changed
}

/// Indices of sessions matching `keep`, largest headcount first.
fn by_headcount(sessions: &[Session], keep: impl Fn(&Session) -> bool) -> Vec<usize> {
    let mut order: Vec<usize> = sessions
        .iter()
        .enumerate()
        .filter(|(_, s)| keep(s))
        .map(|(i, _)| i)
        .collect();
    order.sort_by_key(|&i| Reverse(sessions[i].headcount));
    order
}

/// Owned labels a room request borrows from.
struct Labels {
    day: Day,
    department: String,
    start: String,
    end: String,
}

impl Labels {
    fn of(session: &Session) -> Option<Self> {
        let day = session.day?;
        let range = session.time_range().filter(|r| r.is_valid())?;
        Some(Self {
            day,
            department: session.department(),
            start: format_label(range.start, range.online),
            end: format_label(range.end, range.online),
        })
    }

    fn request<'r>(&'r self, session: &'r Session) -> RoomRequest<'r> {
        RoomRequest::new(&self.department, self.day, &self.start, &self.end, session.headcount)
            .with_lecturer(&session.lecturer)
            .excluding(session.id)
    }
}
