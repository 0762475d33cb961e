//! Shared primitive types used across the scheduling core.

/// A stable, unique identifier for a staff member or job document.
pub type EntityId = String;

/// Identifier of one persisted schedule run.
pub type RunId = String;

/// A whole number of minutes (durations, travel times).
pub type Minutes = u32;

/// Minutes in one day. Clock arithmetic wraps at this value.
pub const MINUTES_PER_DAY: u32 = 24 * 60;

pub const DAYS_PER_WEEK: u32 = 7;
