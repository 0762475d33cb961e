//! Week aggregation: every schedulable staff member × the seven days
//! of the Monday-start week containing a reference date.
//!
//! RULE: the batch never fails. Each (staff, day) cell records its own
//! outcome, and a failed cell is logged and reads back as an empty day.

use crate::{
    config::ScheduleConfig,
    day_schedule::{build_indexed_day, JobIndex},
    locator::CoordinateLocator,
    model::{Job, ScheduleEntry, StaffMember},
    types::{EntityId, DAYS_PER_WEEK},
};
use chrono::{Datelike, Days, NaiveDate};
use std::{collections::{BTreeMap, HashMap}, fmt};

/// Identifies one cell. Displays as `{staffId}-{yyyy-MM-dd}`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ScheduleKey {
    pub staff_id: EntityId,
    pub date:     NaiveDate,
}

impl ScheduleKey {
    pub fn new(staff_id: impl Into<EntityId>, date: NaiveDate) -> Self {
        Self { staff_id: staff_id.into(), date }
    }
}

impl fmt::Display for ScheduleKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.staff_id, self.date.format("%Y-%m-%d"))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum DayOutcome {
    Built(Vec<ScheduleEntry>),
    Failed { reason: String },
}

impl DayOutcome {
    /// Entries for display; empty for a failed day.
    pub fn entries(&self) -> &[ScheduleEntry] {
        match self {
            DayOutcome::Built(entries) => entries,
            DayOutcome::Failed { .. }  => &[],
        }
    }

    pub fn is_built(&self) -> bool {
        matches!(self, DayOutcome::Built(_))
    }
}

/// Monday of the week containing `date`.
pub fn week_start(date: NaiveDate) -> NaiveDate {
    let back = u64::from(date.weekday().num_days_from_monday());
    date.checked_sub_days(Days::new(back)).unwrap_or(date)
}

/// The seven dates starting at `start`. Dates past the calendar's
/// range are dropped with a warning.
pub fn week_days(start: NaiveDate) -> Vec<NaiveDate> {
    (0..u64::from(DAYS_PER_WEEK))
        .filter_map(|offset| {
            let day = start.checked_add_days(Days::new(offset));
            if day.is_none() {
                log::warn!("week starting {start}: day +{offset} is out of range, skipped");
            }
            day
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq)]
pub struct WeekSchedule {
    pub week_start: NaiveDate,
    cells:          BTreeMap<ScheduleKey, DayOutcome>,
}

impl WeekSchedule {
    pub fn new(week_start: NaiveDate) -> Self {
        Self { week_start, cells: BTreeMap::new() }
    }

    pub fn insert(&mut self, key: ScheduleKey, outcome: DayOutcome) {
        self.cells.insert(key, outcome);
    }

    pub fn days(&self) -> Vec<NaiveDate> {
        week_days(self.week_start)
    }

    pub fn outcome(&self, staff_id: &str, date: NaiveDate) -> Option<&DayOutcome> {
        self.cells.get(&ScheduleKey::new(staff_id, date))
    }

    /// Entries for one cell; empty when the cell is missing or failed.
    pub fn entries(&self, staff_id: &str, date: NaiveDate) -> &[ScheduleEntry] {
        match self.outcome(staff_id, date) {
            Some(outcome) => outcome.entries(),
            None => &[],
        }
    }

    /// Cells in (staff id, date) order.
    pub fn cells(&self) -> impl Iterator<Item = (&ScheduleKey, &DayOutcome)> {
        self.cells.iter()
    }

    pub fn failures(&self) -> impl Iterator<Item = (&ScheduleKey, &str)> {
        self.cells.iter().filter_map(|(key, outcome)| match outcome {
            DayOutcome::Failed { reason } => Some((key, reason.as_str())),
            DayOutcome::Built(_)          => None,
        })
    }

    pub fn staff_ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.cells.keys().map(|k| k.staff_id.as_str()).collect();
        ids.dedup();
        ids
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// The flat `"staffId-yyyy-MM-dd" -> entries` map the presentation
    /// layer consumes. Failed cells map to an empty list.
    pub fn to_key_map(&self) -> HashMap<String, Vec<ScheduleEntry>> {
        self.cells
            .iter()
            .map(|(key, outcome)| (key.to_string(), outcome.entries().to_vec()))
            .collect()
    }
}

/// Build every (staff, day) cell for the week containing `reference_date`.
/// Only staff with role `staff` are scheduled.
pub fn build_week_schedules(
    staff: &[StaffMember],
    jobs: &[Job],
    reference_date: NaiveDate,
    locator: &mut dyn CoordinateLocator,
    config: &ScheduleConfig,
) -> WeekSchedule {
    let mut week = WeekSchedule::new(week_start(reference_date));
    let days = week.days();
    let index = JobIndex::build(jobs, config);

    for member in staff.iter().filter(|s| s.is_schedulable()) {
        let Some(staff_id) = member.id.as_deref().filter(|id| !id.trim().is_empty()) else {
            log::warn!("skipping staff record {:?} with no id", member.display_name());
            continue;
        };
        for &date in &days {
            let outcome = match build_indexed_day(member, date, &index, locator, config) {
                Ok(entries) => DayOutcome::Built(entries),
                Err(e) => {
                    log::warn!(
                        "schedule for {} on {date} failed: {e}",
                        member.display_name()
                    );
                    DayOutcome::Failed { reason: e.to_string() }
                }
            };
            week.insert(ScheduleKey::new(staff_id, date), outcome);
        }
    }

    let failed = week.failures().count();
    log::debug!(
        "week {} built: {} cells, {failed} failed",
        week.week_start,
        week.len()
    );
    week
}
