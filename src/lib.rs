//! Course timetabling engine.
//!
//! Places lecture sessions (lecturer x subject x class) onto weekdays, time
//! slots and rooms while respecting lecturer, room and class double
//! bookings, room capacity, institutional breaks and lecturer preferences.
//!
//! # Modules
//!
//! - **`models`**: Domain types: `Session`, `Room`, `LecturerPreference`,
//!   `Day`, `TimeRange`
//! - **`catalog`**: Every start/end slot a session may occupy
//! - **`conflict`**: Per-placement feasibility checks and whole-timetable audits
//! - **`allocator`**: Free-room search with preferred floors
//! - **`scheduler`**: Randomized placement, room passes, KPIs
//! - **`timetable`**: The owned timetable state and its mutation API
//! - **`io`**: Import rows, room records, export rows, snapshots
//! - **`validation`**: Preference, row and room-pool checks
//!
//! # Example
//!
//! ```
//! use u_timetable::io::ImportRow;
//! use u_timetable::models::{Room, RoomPool};
//! use u_timetable::scheduler::RandomizedScheduler;
//! use u_timetable::{Config, Timetable};
//!
//! let config = Config::new().with_seed(7).with_max_attempts(50);
//! let mut rng = config.rng();
//! let mut tt = Timetable::with_config(config)
//!     .with_rooms(RoomPool::from_rooms(vec![Room::new("R301").with_floor(3).with_capacity(40)]));
//! tt.import_rows(vec![ImportRow::new("Dr. A", "Algoritma", "TI-1A").with_credit_hours(2)]);
//!
//! // attempt budget and online ratio come from the timetable's config
//! let outcome = RandomizedScheduler::default().schedule(&mut tt, &mut rng);
//! assert!(outcome.is_complete());
//! ```

pub mod allocator;
pub mod catalog;
pub mod config;
pub mod conflict;
pub mod error;
pub mod io;
pub mod models;
pub mod scheduler;
pub mod timetable;
pub mod validation;

pub use config::Config;
pub use error::{Error, Result};
pub use timetable::Timetable;
