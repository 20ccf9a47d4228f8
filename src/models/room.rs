//! Room model.
//!
//! Rooms are the physical spaces offline sessions are held in. Each room
//! has a floor (used for department floor preferences) and a seating
//! capacity. The pool is immutable for the duration of a scheduling run.

use log::warn;
use serde::{Deserialize, Serialize};

/// Seating capacity assumed when a room record omits it.
pub const DEFAULT_ROOM_CAPACITY: u32 = 30;

/// A physical room.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Room {
    /// Room name as shown on the timetable (unique within a pool).
    pub name: String,
    /// Building floor, when known.
    pub floor: Option<i32>,
    /// Number of seats.
    pub capacity: u32,
}

impl Room {
    /// Creates a room with the default capacity and no floor.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            floor: None,
            capacity: DEFAULT_ROOM_CAPACITY,
        }
    }

    /// Sets the floor.
    pub fn with_floor(mut self, floor: i32) -> Self {
        self.floor = Some(floor);
        self
    }

    /// Sets the capacity.
    pub fn with_capacity(mut self, capacity: u32) -> Self {
        self.capacity = capacity;
        self
    }

    /// Whether the room seats `headcount` people.
    #[inline]
    pub fn fits(&self, headcount: u32) -> bool {
        self.capacity >= headcount
    }

    /// Whether this is a pseudo-room standing for online delivery.
    pub fn is_online_placeholder(&self) -> bool {
        self.name.to_lowercase().contains("online")
    }
}

/// The set of rooms available to the allocator.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RoomPool {
    rooms: Vec<Room>,
}

impl RoomPool {
    /// Creates an empty pool.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a pool, discarding online placeholder entries.
    pub fn from_rooms(rooms: impl IntoIterator<Item = Room>) -> Self {
        let rooms = rooms
            .into_iter()
            .filter(|r| {
                if r.is_online_placeholder() {
                    warn!("Discarding online placeholder room '{}'", r.name);
                    false
                } else {
                    true
                }
            })
            .collect();
        Self { rooms }
    }

    /// Adds a room (placeholder rooms are ignored).
    pub fn with_room(mut self, room: Room) -> Self {
        if !room.is_online_placeholder() {
            self.rooms.push(room);
        }
        self
    }

    /// All rooms in load order.
    pub fn rooms(&self) -> &[Room] {
        &self.rooms
    }

    /// Looks up a room by name.
    pub fn get(&self, name: &str) -> Option<&Room> {
        self.rooms.iter().find(|r| r.name == name)
    }

    /// Capacity of the named room, `None` if the room is unknown.
    pub fn capacity(&self, name: &str) -> Option<u32> {
        self.get(name).map(|r| r.capacity)
    }

    /// Number of rooms.
    pub fn len(&self) -> usize {
        self.rooms.len()
    }

    /// Whether the pool has no rooms.
    pub fn is_empty(&self) -> bool {
        self.rooms.is_empty()
    }
}
