//! crewplan-core — per-staff, per-day schedule generation for field
//! service crews, with a week aggregator, CSV export and a SQLite
//! directory store.

pub mod config;
pub mod day_schedule;
pub mod durations;
pub mod error;
pub mod export;
pub mod geo;
pub mod locator;
pub mod model;
pub mod planner;
pub mod rng;
pub mod shift;
pub mod store;
pub mod time;
pub mod types;
pub mod week_schedule;

pub use config::ScheduleConfig;
pub use error::{ScheduleError, ScheduleResult};
pub use model::{EntryType, Job, ScheduleEntry, StaffMember};
pub use planner::WeekPlanner;
pub use time::ClockTime;
pub use week_schedule::{DayOutcome, ScheduleKey, WeekSchedule};
