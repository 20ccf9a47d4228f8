//! Randomized retry scheduler.
//!
//! # Algorithm
//!
//! 1. Collect sessions missing a day or time that are not fixed.
//! 2. Sort them by credit hours, largest first.
//! 3. For each session, up to `max_attempts` times:
//!    pick a day the lecturer can teach, pick online or offline (forced
//!    online days win, otherwise a Bernoulli draw), pick a catalog slot of
//!    the right length, find a room for offline slots, and keep the
//!    placement if the conflict checker accepts it.
//! 4. A session that exhausts its attempts stays unplaced and is reported
//!    with the reasons its last candidate was rejected. A candidate that
//!    found no room is checked with its room left empty, plus
//!    [`ConflictReason::NoFreeRoom`].
//!
//! `max_attempts` and the online ratio are read from the timetable's
//! [`Config`] unless the scheduler overrides them.
//!
//! This is a heuristic: it does not search the assignment space and may
//! leave sessions unplaced even when a full timetable exists.
//!
//! # Complexity
//! O(n * a * n) where n = sessions, a = attempt budget (each attempt runs a
//! linear conflict check).

use log::{debug, info, trace};
use rand::seq::IndexedRandom;
use rand::Rng;
use std::cmp::Reverse;

use crate::allocator::RoomRequest;
use crate::config::{clamp_ratio, Config};
use crate::conflict::ConflictReason;
use crate::models::{Day, RoomAssignment, Session, SessionId};
use crate::timetable::{Timetable, Workspace};

/// A session the scheduler could not place.
#[derive(Debug, Clone, PartialEq)]
pub struct FailedPlacement {
    pub session: SessionId,
    /// Why the last candidate placement was rejected.
    pub reasons: Vec<ConflictReason>,
}

/// Result of a scheduling run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScheduleOutcome {
    /// Sessions placed by this run.
    pub scheduled: usize,
    /// Sessions left unplaced.
    pub failed: Vec<FailedPlacement>,
}

impl ScheduleOutcome {
    /// Number of sessions left unplaced.
    pub fn failure_count(&self) -> usize {
        self.failed.len()
    }

    /// Whether every attempted session was placed.
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Per-session placement state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AttemptState {
    /// `n` attempts made so far.
    Attempting(u32),
    Scheduled,
    Failed,
}

/// Outcome of a single attempt.
enum Attempt {
    /// Accepted by the conflict checker.
    Placed(Session),
    /// Rejected; kept for failure reporting.
    Rejected(Session),
    /// Day and slot drawn, but no room was free. The room is left empty.
    NoRoom(Session),
    /// No slot could be drawn.
    NoCandidate,
}

/// Attempt budget resolved for one run.
#[derive(Debug, Clone, Copy)]
struct Budget {
    max_attempts: u32,
    online_ratio: f64,
}

/// Randomized retry scheduler.
///
/// The attempt budget and online ratio come from the timetable's
/// [`Config`] unless set on the scheduler itself.
///
/// # Example
///
/// ```
/// use rand::rngs::StdRng;
/// use rand::SeedableRng;
/// use u_timetable::io::ImportRow;
/// use u_timetable::models::{Room, RoomPool};
/// use u_timetable::scheduler::RandomizedScheduler;
/// use u_timetable::Timetable;
///
/// let mut tt = Timetable::new().with_rooms(RoomPool::from_rooms(vec![
///     Room::new("R301").with_floor(3).with_capacity(40),
/// ]));
/// tt.import_rows(vec![
///     ImportRow::new("Dr. A", "Basis Data", "TI-2A").with_credit_hours(3),
///     ImportRow::new("Dr. A", "Jaringan", "TI-2B").with_credit_hours(2),
/// ]);
///
/// let mut rng = StdRng::seed_from_u64(42);
/// let outcome = RandomizedScheduler::new().schedule(&mut tt, &mut rng);
/// assert_eq!(outcome.scheduled, 2);
/// assert!(tt.sessions().iter().all(|s| s.is_placed()));
/// ```
#[derive(Debug, Clone, Default)]
pub struct RandomizedScheduler {
    max_attempts: Option<u32>,
    online_ratio: Option<f64>,
}

impl RandomizedScheduler {
    /// Creates a scheduler that follows the timetable's configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a scheduler pinned to a configuration's budget and ratio,
    /// whatever the timetable's own configuration says.
    pub fn from_config(config: &Config) -> Self {
        Self::new()
            .with_max_attempts(config.max_attempts)
            .with_online_ratio(config.online_ratio)
    }

    /// Sets the per-session attempt budget.
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = Some(max_attempts);
        self
    }

    /// Sets the probability of online delivery, clamped to `[0, 1]`.
    pub fn with_online_ratio(mut self, ratio: f64) -> Self {
        self.online_ratio = Some(clamp_ratio(ratio));
        self
    }

    fn budget(&self, config: &Config) -> Budget {
        Budget {
            max_attempts: self.max_attempts.unwrap_or(config.max_attempts),
            online_ratio: clamp_ratio(self.online_ratio.unwrap_or(config.online_ratio)),
        }
    }

    /// Places every unplaced, non-fixed session.
    pub fn schedule<R: Rng + ?Sized>(&self, timetable: &mut Timetable, rng: &mut R) -> ScheduleOutcome {
        let budget = self.budget(timetable.config());
        let mut ws = timetable.workspace();

        let mut worklist: Vec<usize> = ws
            .sessions
            .iter()
            .enumerate()
            .filter(|(_, s)| !s.is_placed() && !s.fixed)
            .map(|(i, _)| i)
            .collect();
        let mut outcome = ScheduleOutcome::default();
        if worklist.is_empty() {
            return outcome;
        }
        worklist.sort_by_key(|&i| Reverse(ws.sessions[i].credit_hours));
        info!(
            "Scheduling {} sessions ({} attempts each, online ratio {})",
            worklist.len(),
            budget.max_attempts,
            budget.online_ratio
        );

        for idx in worklist {
            match self.place_session(&ws, budget, idx, rng) {
                Ok(placed) => {
                    debug!(
                        "Session {} placed on {:?} {} in {}",
                        placed.id,
                        placed.day,
                        placed.time,
                        placed.room.label()
                    );
                    ws.sessions[idx] = placed;
                    outcome.scheduled += 1;
                }
                Err(reasons) => {
                    let session = &mut ws.sessions[idx];
                    session.clear_placement();
                    debug!("Session {} ({}) not placed", session.id, session.subject);
                    outcome.failed.push(FailedPlacement {
                        session: session.id,
                        reasons,
                    });
                }
            }
        }

        info!(
            "Scheduling done: {} placed, {} failed",
            outcome.scheduled,
            outcome.failure_count()
        );
        outcome
    }

    /// Clears every non-fixed session, then schedules them all again.
    pub fn reshuffle<R: Rng + ?Sized>(&self, timetable: &mut Timetable, rng: &mut R) -> ScheduleOutcome {
        let mut ws = timetable.workspace();
        let mut cleared = 0;
        for session in ws.sessions.iter_mut().filter(|s| !s.fixed) {
            session.clear_placement();
            cleared += 1;
        }
        info!("Reshuffle cleared {cleared} sessions");
        self.schedule(timetable, rng)
    }

    /// Runs the attempt state machine for one session.
    fn place_session<R: Rng + ?Sized>(
        &self,
        ws: &Workspace<'_>,
        budget: Budget,
        idx: usize,
        rng: &mut R,
    ) -> Result<Session, Vec<ConflictReason>> {
        let session = &ws.sessions[idx];
        let days = ws.preferences.valid_days(&session.lecturer);
        if days.is_empty() {
            return Err(vec![ConflictReason::NoAvailableDay]);
        }

        let mut placed: Option<Session> = None;
        // last drawn day and slot, and whether it lacked a room
        let mut last: Option<(Session, bool)> = None;
        let mut state = AttemptState::Attempting(0);
        loop {
            state = match state {
                AttemptState::Attempting(n) if n >= budget.max_attempts => AttemptState::Failed,
                AttemptState::Attempting(n) => {
                    match self.attempt(ws, budget, session, &days, rng) {
                        Attempt::Placed(candidate) => {
                            placed = Some(candidate);
                            AttemptState::Scheduled
                        }
                        Attempt::Rejected(candidate) => {
                            trace!("Session {} attempt {n} rejected", session.id);
                            last = Some((candidate, false));
                            AttemptState::Attempting(n + 1)
                        }
                        Attempt::NoRoom(candidate) => {
                            trace!("Session {} attempt {n} found no room", session.id);
                            last = Some((candidate, true));
                            AttemptState::Attempting(n + 1)
                        }
                        Attempt::NoCandidate => AttemptState::Attempting(n + 1),
                    }
                }
                AttemptState::Scheduled | AttemptState::Failed => break,
            };
        }

        if let Some(candidate) = placed {
            return Ok(candidate);
        }
        let sessions = ws.sessions.as_slice();
        match last {
            Some((candidate, no_room)) => {
                let mut reasons = ws.checker.conflict_reasons(&candidate, sessions);
                if no_room {
                    reasons.push(ConflictReason::NoFreeRoom {
                        headcount: candidate.headcount,
                    });
                }
                Err(reasons)
            }
            // nothing was ever drawn
            None => Err(ws.checker.conflict_reasons(session, sessions)),
        }
    }

    fn attempt<R: Rng + ?Sized>(
        &self,
        ws: &Workspace<'_>,
        budget: Budget,
        session: &Session,
        days: &[Day],
        rng: &mut R,
    ) -> Attempt {
        let Some(&day) = days.choose(rng) else {
            return Attempt::NoCandidate;
        };
        let online = ws.preferences.is_forced_online(&session.lecturer, day)
            || rng.random_bool(budget.online_ratio);

        let slots = ws.catalog.matching(session.credit_hours, online);
        let Some(slot) = slots.choose(rng) else {
            return Attempt::NoCandidate;
        };

        let room = if online {
            RoomAssignment::Online
        } else {
            let department = session.department();
            let (start, end) = (slot.start_label(), slot.end_label());
            let request = RoomRequest::new(&department, day, &start, &end, session.headcount)
                .with_lecturer(&session.lecturer)
                .excluding(session.id);
            match ws.allocator.available_room(&request, ws.sessions.as_slice(), rng) {
                Some(room) => room,
                None => {
                    let mut candidate = session.clone();
                    candidate.place(day, &slot.range(), RoomAssignment::Unassigned);
                    return Attempt::NoRoom(candidate);
                }
            }
        };

        let mut candidate = session.clone();
        let mut range = slot.range();
        range.online = room.is_online();
        candidate.place(day, &range, room);

        if ws.checker.is_conflict(&candidate, ws.sessions.as_slice(), !online) {
            Attempt::Rejected(candidate)
        } else {
            Attempt::Placed(candidate)
        }
    }
}
