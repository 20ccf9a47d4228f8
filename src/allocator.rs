//! Room allocation.
//!
//! Picks a free room for an offline session in two passes: first among
//! rooms on the department's preferred floors, then among every room with
//! enough seats. Within a pass rooms are tried in random order, so ties
//! between equally good rooms are broken by the supplied random source;
//! seed it for reproducible results.
//!
//! Online slots, and days a lecturer must teach online, short-circuit to
//! [`RoomAssignment::Online`] without looking at rooms.

use log::trace;
use rand::seq::SliceRandom;
use rand::Rng;

use crate::config::Config;
use crate::models::{parse_time, Day, PreferenceStore, Room, RoomAssignment, RoomPool, Session, SessionId, TimeRange};

/// What a room is needed for.
#[derive(Debug, Clone)]
pub struct RoomRequest<'r> {
    /// Department code, used for floor preferences.
    pub department: &'r str,
    /// Teaching day.
    pub day: Day,
    /// Start label (may carry the online marker).
    pub start: &'r str,
    /// End label.
    pub end: &'r str,
    /// Seats needed.
    pub headcount: u32,
    /// Lecturer whose forced-online days apply. When absent, the
    /// department code is looked up instead.
    pub lecturer: Option<&'r str>,
    /// Session to ignore when checking occupancy (the one being re-roomed).
    pub exclude: Option<SessionId>,
}

impl<'r> RoomRequest<'r> {
    /// Creates a request.
    pub fn new(department: &'r str, day: Day, start: &'r str, end: &'r str, headcount: u32) -> Self {
        Self {
            department,
            day,
            start,
            end,
            headcount,
            lecturer: None,
            exclude: None,
        }
    }

    /// Sets the lecturer.
    pub fn with_lecturer(mut self, lecturer: &'r str) -> Self {
        self.lecturer = Some(lecturer);
        self
    }

    /// Ignores a session's own booking.
    pub fn excluding(mut self, id: SessionId) -> Self {
        self.exclude = Some(id);
        self
    }
}

/// Chooses rooms against the current bookings.
#[derive(Debug, Clone, Copy)]
pub struct RoomAllocator<'a> {
    rooms: &'a RoomPool,
    preferences: &'a PreferenceStore,
    config: &'a Config,
}

impl<'a> RoomAllocator<'a> {
    /// Creates an allocator over a room pool.
    pub fn new(rooms: &'a RoomPool, preferences: &'a PreferenceStore, config: &'a Config) -> Self {
        Self {
            rooms,
            preferences,
            config,
        }
    }

    /// Finds a room for `request` given the sessions already booked.
    ///
    /// Returns `Online` for online slots and forced-online days, a free
    /// room otherwise, or `None` when the times are malformed or every
    /// suitable room is taken.
    pub fn available_room<R: Rng + ?Sized>(
        &self,
        request: &RoomRequest<'_>,
        sessions: &[Session],
        rng: &mut R,
    ) -> Option<RoomAssignment> {
        let start = parse_time(request.start);
        if start.is_some_and(|(_, online)| online) {
            return Some(RoomAssignment::Online);
        }
        let ((start, _), (end, _)) = (start?, parse_time(request.end)?);

        let forced_by = request.lecturer.unwrap_or(request.department);
        if self.preferences.is_forced_online(forced_by, request.day) {
            return Some(RoomAssignment::Online);
        }

        let range = TimeRange::new(start, end, false);
        let floors = self.config.preferred_floors(request.department);

        let mut candidates: Vec<&Room> = self
            .rooms
            .rooms()
            .iter()
            .filter(|r| r.fits(request.headcount))
            .collect();
        candidates.shuffle(rng);

        let preferred = candidates
            .iter()
            .filter(|r| r.floor.is_some_and(|f| floors.contains(&f)))
            .find(|r| is_free(r, request, &range, sessions));
        let chosen = preferred.or_else(|| {
            candidates
                .iter()
                .find(|r| is_free(r, request, &range, sessions))
        });

        match chosen {
            Some(room) => {
                trace!(
                    "Room {} chosen for {} {} on {}",
                    room.name,
                    request.department,
                    range.to_text(),
                    request.day
                );
                Some(RoomAssignment::Room(room.name.clone()))
            }
            None => None,
        }
    }

    /// First capacity-sufficient free room in pool order, ignoring floors.
    pub fn first_free_room(
        &self,
        request: &RoomRequest<'_>,
        sessions: &[Session],
    ) -> Option<RoomAssignment> {
        let (start, _) = parse_time(request.start)?;
        let (end, _) = parse_time(request.end)?;
        let range = TimeRange::new(start, end, false);
        self.rooms
            .rooms()
            .iter()
            .filter(|r| r.fits(request.headcount))
            .find(|r| is_free(r, request, &range, sessions))
            .map(|r| RoomAssignment::Room(r.name.clone()))
    }
}

/// Whether no booked session occupies `room` during `range` on the request's day.
fn is_free(room: &Room, request: &RoomRequest<'_>, range: &TimeRange, sessions: &[Session]) -> bool {
    !sessions.iter().any(|s| {
        Some(s.id) != request.exclude
            && s.day == Some(request.day)
            && s.room.room_name() == Some(room.name.as_str())
            && s.time_range().is_some_and(|r| r.overlaps(range))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::LecturerPreference;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn pool() -> RoomPool {
        RoomPool::from_rooms(vec![
            Room::new("R101").with_floor(1).with_capacity(60),
            Room::new("R301").with_floor(3).with_capacity(40),
            Room::new("R302").with_floor(3).with_capacity(20),
            Room::new("R501").with_floor(5).with_capacity(40),
        ])
    }

    fn booked(id: u64, room: &str, day: Day, time: &str) -> Session {
        let mut s = Session::new("L", "S", "XX-1")
            .with_day(day)
            .with_time(time)
            .with_room(room);
        s.id = SessionId(id);
        s
    }

    #[test]
    fn test_prefers_department_floor() {
        let rooms = pool();
        let prefs = PreferenceStore::new();
        let config = Config::default();
        let alloc = RoomAllocator::new(&rooms, &prefs, &config);
        let department = Session::new("L", "S", "TI-2B").department();

        for seed in 0..20 {
            let mut rng = StdRng::seed_from_u64(seed);
            // TI prefers floors 3 and 4; R302 is too small
            let req = RoomRequest::new(&department, Day::Monday, "08:00", "09:40", 30);
            assert_eq!(
                alloc.available_room(&req, &[], &mut rng),
                Some(RoomAssignment::Room("R301".into()))
            );
        }
    }

    #[test]
    fn test_configured_department_floor() {
        let rooms = pool();
        let prefs = PreferenceStore::new();
        let config = Config::default().with_department_floors("DK", vec![5]);
        let alloc = RoomAllocator::new(&rooms, &prefs, &config);
        let department = Session::new("L", "S", "DKV-3").department();

        for seed in 0..20 {
            let mut rng = StdRng::seed_from_u64(seed);
            let req = RoomRequest::new(&department, Day::Monday, "08:00", "09:40", 30);
            assert_eq!(
                alloc.available_room(&req, &[], &mut rng),
                Some(RoomAssignment::Room("R501".into()))
            );
        }
    }

    #[test]
    fn test_falls_back_to_any_floor() {
        let rooms = pool();
        let prefs = PreferenceStore::new();
        let config = Config::default();
        let alloc = RoomAllocator::new(&rooms, &prefs, &config);
        let sessions = vec![
            booked(1, "R301", Day::Monday, "08:00 - 08:50"),
            booked(2, "R501", Day::Monday, "09:00 - 09:50"),
        ];

        let mut rng = StdRng::seed_from_u64(1);
        let req = RoomRequest::new("TI", Day::Monday, "08:00", "09:40", 30);
        // R301 is taken and R302 is too small, so only R101 is left
        assert_eq!(
            alloc.available_room(&req, &sessions, &mut rng),
            Some(RoomAssignment::Room("R101".into()))
        );
    }

    #[test]
    fn test_skips_overlapping_bookings() {
        let rooms = pool();
        let prefs = PreferenceStore::new();
        let config = Config::default();
        let alloc = RoomAllocator::new(&rooms, &prefs, &config);
        let sessions = vec![
            booked(1, "R301", Day::Monday, "08:00 - 09:40"),
            booked(2, "R501", Day::Monday, "09:00 - 09:50"),
        ];

        let mut rng = StdRng::seed_from_u64(3);
        let req = RoomRequest::new("TI", Day::Monday, "09:00", "09:50", 30);
        assert_eq!(
            alloc.available_room(&req, &sessions, &mut rng),
            Some(RoomAssignment::Room("R101".into()))
        );

        // touching booking leaves the room free
        let req = RoomRequest::new("TI", Day::Monday, "09:40", "10:30", 30);
        assert_eq!(
            alloc.available_room(&req, &sessions, &mut rng),
            Some(RoomAssignment::Room("R301".into()))
        );
    }

    #[test]
    fn test_exhausted_returns_none() {
        let rooms = RoomPool::from_rooms(vec![Room::new("Only").with_floor(3).with_capacity(10)]);
        let prefs = PreferenceStore::new();
        let config = Config::default();
        let alloc = RoomAllocator::new(&rooms, &prefs, &config);
        let mut rng = StdRng::seed_from_u64(0);

        let too_big = RoomRequest::new("TI", Day::Monday, "08:00", "08:50", 11);
        assert_eq!(alloc.available_room(&too_big, &[], &mut rng), None);

        let sessions = vec![booked(1, "Only", Day::Monday, "08:00 - 08:50")];
        let taken = RoomRequest::new("TI", Day::Monday, "08:00", "08:50", 5);
        assert_eq!(alloc.available_room(&taken, &sessions, &mut rng), None);

        // its own booking does not block re-rooming
        let own = taken.clone().excluding(SessionId(1));
        assert_eq!(
            alloc.available_room(&own, &sessions, &mut rng),
            Some(RoomAssignment::Room("Only".into()))
        );
    }

    #[test]
    fn test_online_slot_and_forced_day() {
        let rooms = pool();
        let mut prefs = PreferenceStore::new();
        prefs.set_preference(
            "Dr. O",
            LecturerPreference::new().with_online_days([Day::Friday]),
        );
        let config = Config::default();
        let alloc = RoomAllocator::new(&rooms, &prefs, &config);
        let mut rng = StdRng::seed_from_u64(0);

        let online = RoomRequest::new("TI", Day::Monday, "08:00 (online)", "08:50 (online)", 500);
        assert_eq!(alloc.available_room(&online, &[], &mut rng), Some(RoomAssignment::Online));

        let forced = RoomRequest::new("TI", Day::Friday, "08:00", "08:50", 10).with_lecturer("Dr. O");
        assert_eq!(alloc.available_room(&forced, &[], &mut rng), Some(RoomAssignment::Online));

        let other_day = RoomRequest::new("TI", Day::Monday, "08:00", "08:50", 10).with_lecturer("Dr. O");
        assert!(matches!(
            alloc.available_room(&other_day, &[], &mut rng),
            Some(RoomAssignment::Room(_))
        ));
    }

    #[test]
    fn test_malformed_times() {
        let rooms = pool();
        let prefs = PreferenceStore::new();
        let config = Config::default();
        let alloc = RoomAllocator::new(&rooms, &prefs, &config);
        let mut rng = StdRng::seed_from_u64(0);
        let req = RoomRequest::new("TI", Day::Monday, "soon", "08:50", 10);
        assert_eq!(alloc.available_room(&req, &[], &mut rng), None);
    }

    #[test]
    fn test_first_free_room_in_pool_order() {
        let rooms = pool();
        let prefs = PreferenceStore::new();
        let config = Config::default();
        let alloc = RoomAllocator::new(&rooms, &prefs, &config);
        let sessions = vec![booked(1, "R101", Day::Monday, "08:00 - 08:50")];
        let req = RoomRequest::new("TI", Day::Monday, "08:00", "08:50", 15);
        assert_eq!(
            alloc.first_free_room(&req, &sessions),
            Some(RoomAssignment::Room("R301".into()))
        );
    }
}
