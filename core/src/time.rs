//! Minute-precision wall-clock arithmetic over `HH:MM` values.
//!
//! RULE: adding wraps at midnight, subtracting clamps at 00:00.
//! The asymmetry is load-bearing: existing exported schedules were
//! produced with it, and the date is never carried along with the time.

use crate::{
    error::{ScheduleError, ScheduleResult},
    types::{Minutes, MINUTES_PER_DAY},
};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::{fmt, str::FromStr};

/// A time of day, stored as minutes since midnight (0..1440).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct ClockTime(u16);

impl ClockTime {
    /// Build from hour and minute. Returns None when out of range.
    pub fn from_hm(hour: u32, minute: u32) -> Option<Self> {
        if hour < 24 && minute < 60 {
            Some(Self((hour * 60 + minute) as u16))
        } else {
            None
        }
    }

    pub fn hour(self) -> u32 {
        u32::from(self.0) / 60
    }

    pub fn minute(self) -> u32 {
        u32::from(self.0) % 60
    }

    pub fn minutes_since_midnight(self) -> u32 {
        u32::from(self.0)
    }

    /// `(self + minutes) mod 24h`. 23:50 + 20 is 00:10.
    pub fn add_minutes(self, minutes: Minutes) -> Self {
        let total = (u64::from(self.0) + u64::from(minutes)) % u64::from(MINUTES_PER_DAY);
        Self(total as u16)
    }

    /// `max(self - minutes, 00:00)`. Never wraps to the previous day.
    pub fn subtract_minutes(self, minutes: Minutes) -> Self {
        let total = i64::from(self.0) - i64::from(minutes);
        Self(total.max(0) as u16)
    }

    /// The later of two times by `compare_time`.
    pub fn max_of(self, other: Self) -> Self {
        if compare_time(self, other) >= 0 {
            self
        } else {
            other
        }
    }
}

/// Signed difference `a - b` in minutes. Zero means equal.
pub fn compare_time(a: ClockTime, b: ClockTime) -> i32 {
    i32::from(a.0) - i32::from(b.0)
}

impl fmt::Display for ClockTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour(), self.minute())
    }
}

impl FromStr for ClockTime {
    type Err = ScheduleError;

    fn from_str(s: &str) -> ScheduleResult<Self> {
        let invalid = || ScheduleError::InvalidTime { value: s.to_string() };
        let (h, m) = s.trim().split_once(':').ok_or_else(invalid)?;
        if h.is_empty() || h.len() > 2 || m.len() != 2 {
            return Err(invalid());
        }
        let hour: u32 = h.parse().map_err(|_| invalid())?;
        let minute: u32 = m.parse().map_err(|_| invalid())?;
        Self::from_hm(hour, minute).ok_or_else(invalid)
    }
}

impl From<chrono::NaiveTime> for ClockTime {
    fn from(t: chrono::NaiveTime) -> Self {
        use chrono::Timelike;
        Self((t.hour() * 60 + t.minute()) as u16)
    }
}

impl From<ClockTime> for chrono::NaiveTime {
    fn from(t: ClockTime) -> Self {
        chrono::NaiveTime::from_hms_opt(t.hour(), t.minute(), 0).unwrap_or_default()
    }
}

impl Serialize for ClockTime {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ClockTime {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}
