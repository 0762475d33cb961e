//! The day schedule builder — one staff member, one date.
//!
//! OUTPUT ORDER (fixed, never re-sorted):
//!   1. base   — day start at the staff member's depot
//!   2. per job, ascending by due time (ties keep input order):
//!        travel — optional, positioned travel minutes before the job
//!        job    — at the job's due time
//!   3. end    — the later of the last job's finish and the shift end
//!
//! Times wrap at midnight (see time.rs), so the list is not
//! guaranteed to be monotonic in `time`. The list order is the truth.

use crate::{
    config::ScheduleConfig,
    error::{ScheduleError, ScheduleResult},
    geo::{estimate_travel_time, City},
    locator::CoordinateLocator,
    model::{Job, ScheduleEntry, StaffMember},
    shift::resolve_shift,
    time::ClockTime,
};
use chrono::{NaiveDate, NaiveTime};
use std::collections::HashMap;

pub const UNNAMED_JOB: &str = "Unnamed Job";
pub const NO_ADDRESS: &str = "Address not specified";

/// A job that passed validation, with its due date already parsed.
pub(crate) struct PlannedJob<'a> {
    job:      &'a Job,
    id:       &'a str,
    due_time: NaiveTime,
}

impl PlannedJob<'_> {
    fn slot(&self) -> ClockTime {
        ClockTime::from(self.due_time)
    }

    fn address(&self) -> &str {
        self.job.address().unwrap_or(NO_ADDRESS)
    }

    fn title(&self) -> &str {
        self.job
            .title
            .as_deref()
            .filter(|t| !t.is_empty())
            .unwrap_or(UNNAMED_JOB)
    }
}

/// Jobs bucketed by assignee and due date, each bucket sorted by due
/// time. Every due date is parsed once, when the index is built.
pub(crate) struct JobIndex<'a> {
    by_staff: HashMap<&'a str, HashMap<NaiveDate, Vec<PlannedJob<'a>>>>,
}

impl<'a> JobIndex<'a> {
    /// Unassigned and undated jobs are left out. Jobs with no id or an
    /// unreadable due date are skipped with a warning.
    pub(crate) fn build(jobs: impl IntoIterator<Item = &'a Job>, config: &ScheduleConfig) -> Self {
        let mut by_staff: HashMap<&'a str, HashMap<NaiveDate, Vec<PlannedJob<'a>>>> = HashMap::new();
        for job in jobs {
            let Some(staff_id) = job.assigned_to.as_deref() else {
                continue;
            };
            let due = match job.due() {
                Ok(Some(due)) => due,
                Ok(None) => continue,
                Err(e) => {
                    log::warn!(
                        "skipping job {} for staff {staff_id}: {e}",
                        job.id.as_deref().unwrap_or("<no id>")
                    );
                    continue;
                }
            };
            let Some(id) = job.id.as_deref().filter(|id| !id.is_empty()) else {
                log::warn!("skipping job with no id for staff {staff_id} on {}", due.date);
                continue;
            };
            let due_time = due
                .time
                .unwrap_or_else(|| config.shifts.default_job_time.into());
            by_staff
                .entry(staff_id)
                .or_default()
                .entry(due.date)
                .or_default()
                .push(PlannedJob { job, id, due_time });
        }
        for bucket in by_staff.values_mut().flat_map(HashMap::values_mut) {
            // Stable: equal due times keep their input order.
            bucket.sort_by_key(|p| p.due_time);
        }
        Self { by_staff }
    }

    pub(crate) fn for_day(&self, staff_id: &str, date: NaiveDate) -> &[PlannedJob<'a>] {
        match self.by_staff.get(staff_id).and_then(|days| days.get(&date)) {
            Some(bucket) => bucket.as_slice(),
            None => &[],
        }
    }
}

fn staff_id(staff: &StaffMember) -> ScheduleResult<&str> {
    let id = staff
        .id
        .as_deref()
        .filter(|id| !id.trim().is_empty())
        .ok_or_else(|| ScheduleError::MalformedStaff { reason: "missing id".into() })?;
    if staff.name.as_deref().map_or(true, |n| n.trim().is_empty()) {
        return Err(ScheduleError::MalformedStaff {
            reason: format!("staff {id} has no name"),
        });
    }
    Ok(id)
}

/// Build the ordered day plan for `staff` on `date`.
///
/// Errors only for a malformed staff record or a locator failure;
/// bad individual jobs are dropped and the rest of the day still builds.
pub fn build_day_schedule(
    staff: &StaffMember,
    date: NaiveDate,
    jobs: &[Job],
    locator: &mut dyn CoordinateLocator,
    config: &ScheduleConfig,
) -> ScheduleResult<Vec<ScheduleEntry>> {
    let staff_id = staff_id(staff)?;
    let own_jobs = jobs
        .iter()
        .filter(|job| job.assigned_to.as_deref() == Some(staff_id));
    let index = JobIndex::build(own_jobs, config);
    plan_day(staff, staff_id, date, index.for_day(staff_id, date), locator, config)
}

/// As [`build_day_schedule`], over jobs indexed once for the whole week.
pub(crate) fn build_indexed_day(
    staff: &StaffMember,
    date: NaiveDate,
    index: &JobIndex<'_>,
    locator: &mut dyn CoordinateLocator,
    config: &ScheduleConfig,
) -> ScheduleResult<Vec<ScheduleEntry>> {
    let staff_id = staff_id(staff)?;
    plan_day(staff, staff_id, date, index.for_day(staff_id, date), locator, config)
}

fn plan_day(
    staff: &StaffMember,
    staff_id: &str,
    date: NaiveDate,
    day_jobs: &[PlannedJob<'_>],
    locator: &mut dyn CoordinateLocator,
    config: &ScheduleConfig,
) -> ScheduleResult<Vec<ScheduleEntry>> {
    let city = City::resolve(staff.city_name());
    let base = config.bases.for_city(city);
    let shift = resolve_shift(staff, date, &config.shifts);

    let mut entries = Vec::with_capacity(day_jobs.len() * 2 + 2);
    entries.push(ScheduleEntry::base(config.shifts.day_start, city.name(), base));

    let mut current_time: Option<ClockTime> = None;
    let mut current_position = base.coordinates;

    for planned in day_jobs {
        let destination = locator.destination(planned.job)?;
        let travel_minutes = estimate_travel_time(&current_position, &destination, &config.travel);
        let job_time = planned.slot();

        if travel_minutes > 0 {
            entries.push(ScheduleEntry::travel(
                job_time.subtract_minutes(travel_minutes),
                planned.address(),
                travel_minutes,
            ));
        }

        let duration = config.durations.job_duration(planned.job.category.as_deref());
        entries.push(ScheduleEntry::job(
            job_time,
            planned.id.to_string(),
            planned.address(),
            planned.title(),
            duration,
        ));

        current_time = Some(job_time.add_minutes(duration));
        current_position = locator.departure(planned.job, destination)?;
    }

    let end_time = current_time
        .unwrap_or(config.shifts.day_start)
        .max_of(shift.shift_end);
    entries.push(ScheduleEntry::end(end_time, shift.is_late));

    log::debug!(
        "day built: staff={staff_id} date={date} jobs={} late={} end={end_time} locator={}",
        day_jobs.len(),
        shift.is_late,
        locator.name()
    );

    Ok(entries)
}
