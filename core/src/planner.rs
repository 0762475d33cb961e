//! The week planner — configuration plus a locator, wired once.
//!
//! Callers that only need a single week can use the free functions in
//! day_schedule.rs and week_schedule.rs directly; the planner keeps the
//! locator's state (the random stream in parity mode) across calls.

use crate::{
    config::ScheduleConfig,
    day_schedule::build_day_schedule,
    error::ScheduleResult,
    export::export_week_csv,
    locator::{self, CoordinateLocator},
    model::{Job, ScheduleEntry, StaffMember},
    week_schedule::{build_week_schedules, WeekSchedule},
};
use chrono::NaiveDate;

pub struct WeekPlanner {
    config:  ScheduleConfig,
    locator: Box<dyn CoordinateLocator>,
}

impl WeekPlanner {
    /// Build a planner with the locator selected by `config.locator`.
    pub fn new(config: ScheduleConfig) -> Self {
        let locator = locator::from_config(&config.locator);
        Self::with_locator(config, locator)
    }

    /// A config that fails validation is still accepted: the travel
    /// estimator orders swapped bounds itself.
    pub fn with_locator(config: ScheduleConfig, locator: Box<dyn CoordinateLocator>) -> Self {
        if let Err(e) = config.validate() {
            log::warn!("planner config: {e}; using the bounds in ascending order");
        }
        Self { config, locator }
    }

    pub fn config(&self) -> &ScheduleConfig {
        &self.config
    }

    pub fn locator_name(&self) -> &'static str {
        self.locator.name()
    }

    pub fn build_day(
        &mut self,
        staff: &StaffMember,
        date: NaiveDate,
        jobs: &[Job],
    ) -> ScheduleResult<Vec<ScheduleEntry>> {
        build_day_schedule(staff, date, jobs, self.locator.as_mut(), &self.config)
    }

    pub fn build_week(
        &mut self,
        staff: &[StaffMember],
        jobs: &[Job],
        reference_date: NaiveDate,
    ) -> WeekSchedule {
        build_week_schedules(staff, jobs, reference_date, self.locator.as_mut(), &self.config)
    }

    pub fn export_csv(&self, staff_id: &str, week: &WeekSchedule) -> String {
        export_week_csv(staff_id, week, week.week_start)
    }
}

impl Default for WeekPlanner {
    fn default() -> Self { Self::new(ScheduleConfig::default()) }
}
