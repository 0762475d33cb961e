//! CSV export tests.

use chrono::NaiveDate;
use crewplan_core::{
    export::{export_week_csv, CSV_HEADER},
    model::StaffLocation,
    Job, StaffMember, WeekPlanner,
};

fn week_start() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 3, 4).unwrap()
}

fn member(id: &str) -> StaffMember {
    StaffMember {
        id: Some(id.into()),
        name: Some(format!("Staff {id}")),
        role: Some("staff".into()),
        location: Some(StaffLocation { city: Some("Johannesburg".into()) }),
        schedule: None,
    }
}

fn jobs() -> Vec<Job> {
    vec![
        Job {
            id: Some("j1".into()),
            assigned_to: Some("s1".into()),
            due_date: Some("2024-03-04T08:00:00Z".into()),
            category: Some("Leak Detection".into()),
            risk_address: Some("12 Oak Ave, Rosebank".into()),
            legacy_risk_address: None,
            title: Some(r#"Leak at "the cottage""#.into()),
        },
        Job {
            id: Some("j2".into()),
            assigned_to: Some("s1".into()),
            due_date: Some("2024-03-08T13:00:00Z".into()),
            category: Some("Camera Inspection".into()),
            risk_address: Some("3 Pine Rd".into()),
            legacy_risk_address: None,
            title: None,
        },
        Job {
            id: Some("j3".into()),
            assigned_to: Some("s2".into()),
            due_date: Some("2024-03-04T08:00:00Z".into()),
            category: None,
            risk_address: None,
            legacy_risk_address: None,
            title: None,
        },
    ]
}

/// Field split that honours double-quoted fields.
fn split_row(row: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut chars = row.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '"' if in_quotes && chars.peek() == Some(&'"') => {
                current.push('"');
                chars.next();
            }
            '"' => in_quotes = !in_quotes,
            ',' if !in_quotes => fields.push(std::mem::take(&mut current)),
            _ => current.push(c),
        }
    }
    fields.push(current);
    fields
}

/// N entries across the week export as N+1 lines, with location and
/// description quoted on every row.
#[test]
fn csv_has_header_plus_one_line_per_entry() {
    let mut planner = WeekPlanner::default();
    let week = planner.build_week(&[member("s1"), member("s2")], &jobs(), week_start());

    let total: usize = week
        .days()
        .iter()
        .map(|&day| week.entries("s1", day).len())
        .sum();
    // 7 days of base+end, plus travel+job on two days.
    assert_eq!(total, 18);

    let csv = export_week_csv("s1", &week, week_start());
    let lines: Vec<&str> = csv.split('\n').collect();
    assert_eq!(lines.len(), total + 1);
    assert_eq!(lines[0], CSV_HEADER);
    assert!(!csv.ends_with('\n'));

    for line in &lines[1..] {
        let fields = split_row(line);
        assert_eq!(fields.len(), 6, "row {line:?}");
        // Columns 4 and 5 are quoted in the raw text.
        let raw_location = format!(",\"{}\",", fields[3].replace('"', "\"\""));
        assert!(line.contains(&raw_location), "location not quoted in {line:?}");
        assert!(line.ends_with(&format!("\",{}", fields[5])), "description not quoted in {line:?}");
        assert!(fields[5].parse::<u32>().is_ok());
    }
}

#[test]
fn rows_follow_day_then_list_order() {
    let mut planner = WeekPlanner::default();
    let week = planner.build_week(&[member("s1")], &jobs(), week_start());
    let csv = planner.export_csv("s1", &week);
    let rows: Vec<Vec<String>> = csv.lines().skip(1).map(split_row).collect();

    let monday: Vec<(&str, &str)> = rows
        .iter()
        .filter(|r| r[0] == "2024-03-04")
        .map(|r| (r[1].as_str(), r[2].as_str()))
        .collect();
    assert_eq!(monday.len(), 4);
    assert_eq!(monday[0], ("05:00", "base"));
    assert_eq!(monday[1].1, "travel");
    assert_eq!(monday[2], ("08:00", "job"));
    // 2024-03-04 is in an odd rotation week: late shift.
    assert_eq!(monday[3], ("19:00", "end"));

    let dates: Vec<&str> = rows.iter().map(|r| r[0].as_str()).collect();
    let mut sorted = dates.clone();
    sorted.sort();
    assert_eq!(dates, sorted, "days must appear in week order");

    let leak = rows.iter().find(|r| r[2] == "job" && r[0] == "2024-03-04").unwrap();
    assert_eq!(leak[4], r#"Leak at "the cottage""#);
    assert_eq!(leak[5], "120");
    let base = &rows[0];
    assert_eq!(base[5], "0", "base rows carry no duration");
}

#[test]
fn unknown_staff_exports_header_only() {
    let mut planner = WeekPlanner::default();
    let week = planner.build_week(&[member("s1")], &jobs(), week_start());
    assert_eq!(export_week_csv("ghost", &week, week_start()), CSV_HEADER);
}
