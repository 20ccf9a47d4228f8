//! Engine configuration.
//!
//! Every field has a default matching campus policy, so an empty TOML
//! document is a valid configuration:
//!
//! ```toml
//! max_attempts = 200
//! online_ratio = 0.2
//! seed = 42
//!
//! [[breaks]]
//! start = "12:00"
//! end = "13:00"
//!
//! [department_floors]
//! TI = [3, 4]
//! default = [3, 4, 5]
//! ```

use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::error::{Error, Result};
use crate::models::{TimeWindow, DEFAULT_DEPARTMENT, DEFAULT_ROOM_CAPACITY};

/// Default per-session attempt budget.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 200;

/// Default probability that an unconstrained session is placed online.
pub const DEFAULT_ONLINE_RATIO: f64 = 0.2;

/// Clamps an online ratio to `[0, 1]`; NaN becomes 0.
pub(crate) fn clamp_ratio(ratio: f64) -> f64 {
    if ratio.is_nan() {
        0.0
    } else {
        ratio.clamp(0.0, 1.0)
    }
}

/// Engine configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Randomized placement attempts per session before giving up.
    pub max_attempts: u32,
    /// Probability of online delivery when no forced-online day applies.
    pub online_ratio: f64,
    /// Institutional breaks, observed by every offline session.
    pub breaks: Vec<TimeWindow>,
    /// Extended breaks, observed only by lecturers who opt in.
    pub additional_breaks: Vec<TimeWindow>,
    /// Department code → preferred floors. The `"default"` entry applies
    /// to unlisted departments.
    pub department_floors: HashMap<String, Vec<i32>>,
    /// Capacity assumed for room records without one.
    pub default_room_capacity: u32,
    /// Seed for reproducible runs; `None` seeds from the OS.
    pub seed: Option<u64>,
}

impl Default for Config {
    fn default() -> Self {
        let department_floors = [
            ("TI", vec![3, 4]),
            ("SI", vec![3, 4]),
            ("DKV", vec![5]),
            (DEFAULT_DEPARTMENT, vec![3, 4, 5]),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect();

        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            online_ratio: DEFAULT_ONLINE_RATIO,
            breaks: vec![TimeWindow::hm(12, 0, 13, 0), TimeWindow::hm(18, 0, 19, 0)],
            additional_breaks: vec![TimeWindow::hm(12, 11, 12, 59), TimeWindow::hm(19, 10, 19, 59)],
            department_floors,
            default_room_capacity: DEFAULT_ROOM_CAPACITY,
            seed: None,
        }
    }
}

impl Config {
    /// Creates the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a TOML document; missing fields take their defaults.
    ///
    /// Rejects an online ratio outside `[0, 1]` and breaks that do not end
    /// after they start.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: Self = toml::from_str(text)?;
        config.check()?;
        Ok(config)
    }

    fn check(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.online_ratio) {
            return Err(Error::ConfigValue(format!(
                "online_ratio {} outside [0, 1]",
                self.online_ratio
            )));
        }
        if let Some(window) = self
            .breaks
            .iter()
            .chain(&self.additional_breaks)
            .find(|w| w.start >= w.end)
        {
            return Err(Error::ConfigValue(format!(
                "break {window} does not end after it starts"
            )));
        }
        Ok(())
    }

    /// Sets the attempt budget.
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    /// Sets the online ratio, clamped to `[0, 1]`.
    pub fn with_online_ratio(mut self, ratio: f64) -> Self {
        self.online_ratio = clamp_ratio(ratio);
        self
    }

    /// Sets the seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Replaces the institutional breaks.
    pub fn with_breaks(mut self, breaks: Vec<TimeWindow>) -> Self {
        self.breaks = breaks;
        self
    }

    /// Sets the preferred floors of a department.
    pub fn with_department_floors(mut self, department: impl Into<String>, floors: Vec<i32>) -> Self {
        self.department_floors.insert(department.into(), floors);
        self
    }

    /// Preferred floors of a department, falling back to the default entry.
    pub fn preferred_floors(&self, department: &str) -> &[i32] {
        self.department_floors
            .get(department)
            .or_else(|| self.department_floors.get(DEFAULT_DEPARTMENT))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Breaks that apply to a lecturer, extended ones included on opt-in.
    pub fn breaks_for(&self, use_additional: bool) -> impl Iterator<Item = &TimeWindow> {
        let extra: &[TimeWindow] = if use_additional {
            &self.additional_breaks
        } else {
            &[]
        };
        self.breaks.iter().chain(extra.iter())
    }

    /// Random source for a run: seeded when `seed` is set.
    pub fn rng(&self) -> StdRng {
        match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        }
    }
}
