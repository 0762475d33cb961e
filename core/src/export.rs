//! CSV export of one staff member's week.
//!
//! Format is fixed by existing consumers: a header row, then one row
//! per entry, days in week order and entries in list order. Location
//! and description are always double-quoted; every other field is bare.
//! Lines are joined with `\n` and there is no trailing newline.

use crate::week_schedule::{week_days, WeekSchedule};
use chrono::NaiveDate;

pub const CSV_HEADER: &str = "Date,Time,Type,Location,Description,Duration (minutes)";

/// Wrap in double quotes, doubling any embedded quote.
fn quoted(field: &str) -> String {
    format!("\"{}\"", field.replace('"', "\"\""))
}

pub fn export_week_csv(staff_id: &str, week: &WeekSchedule, week_start: NaiveDate) -> String {
    let mut lines = vec![CSV_HEADER.to_string()];
    for date in week_days(week_start) {
        let day = date.format("%Y-%m-%d");
        for entry in week.entries(staff_id, date) {
            lines.push(format!(
                "{day},{},{},{},{},{}",
                entry.time,
                entry.kind.as_str(),
                quoted(&entry.location),
                quoted(&entry.description),
                entry.estimated_duration.unwrap_or(0),
            ));
        }
    }
    lines.join("\n")
}
