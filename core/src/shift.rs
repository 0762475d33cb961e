//! Late/normal shift resolution.
//!
//! An explicit `workingLateShift` on the staff record always wins.
//! Without one, every staff member follows the same global rotation:
//! odd weeks since the anchor are late weeks. There is no per-group
//! offset.

use crate::{config::ShiftConfig, model::StaffMember, time::ClockTime, types::DAYS_PER_WEEK};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct ShiftPolicy {
    pub is_late:   bool,
    pub shift_end: ClockTime,
}

/// Whole weeks from the rotation anchor to `date`, floored. Dates
/// before the anchor give negative week numbers.
pub fn rotation_week(date: NaiveDate, shifts: &ShiftConfig) -> i64 {
    let days = (date - shifts.rotation_anchor).num_days();
    days.div_euclid(i64::from(DAYS_PER_WEEK))
}

pub fn is_late_shift_week(date: NaiveDate, shifts: &ShiftConfig) -> bool {
    rotation_week(date, shifts).rem_euclid(2) == 1
}

pub fn resolve_shift(staff: &StaffMember, date: NaiveDate, shifts: &ShiftConfig) -> ShiftPolicy {
    let is_late = staff
        .late_shift_override()
        .unwrap_or_else(|| is_late_shift_week(date, shifts));
    ShiftPolicy {
        is_late,
        shift_end: if is_late { shifts.late_end } else { shifts.normal_end },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn rotation_alternates_weekly_from_anchor() {
        let shifts = ShiftConfig::default();
        assert!(!is_late_shift_week(d(2024, 1, 1), &shifts));
        assert!(!is_late_shift_week(d(2024, 1, 7), &shifts));
        assert!(is_late_shift_week(d(2024, 1, 8), &shifts));
        assert!(is_late_shift_week(d(2024, 1, 14), &shifts));
        assert!(!is_late_shift_week(d(2024, 1, 15), &shifts));
    }

    #[test]
    fn weeks_before_anchor_keep_alternating() {
        let shifts = ShiftConfig::default();
        assert_eq!(rotation_week(d(2023, 12, 31), &shifts), -1);
        assert!(is_late_shift_week(d(2023, 12, 31), &shifts));
        assert!(!is_late_shift_week(d(2023, 12, 24), &shifts));
    }
}
