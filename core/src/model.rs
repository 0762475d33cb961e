//! Directory documents (staff, jobs) and the schedule entries built from them.
//!
//! Staff and job records arrive already deserialized from the document
//! store, so every field is optional here. Validation happens where a
//! field is consumed, and a bad record costs one unit of work, never
//! the batch.

use crate::{
    config::BaseLocation,
    error::{ScheduleError, ScheduleResult},
    geo::Coordinates,
    time::ClockTime,
    types::{EntityId, Minutes},
};
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use serde::{de::DeserializeOwned, Deserialize, Serialize};

pub const STAFF_ROLE: &str = "staff";

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StaffLocation {
    #[serde(default)]
    pub city: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StaffSchedule {
    /// Explicit late-shift override. None means follow the rotation.
    #[serde(default)]
    pub working_late_shift: Option<bool>,
    #[serde(default)]
    pub shift_start_time:   Option<String>,
    #[serde(default)]
    pub shift_end_time:     Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StaffMember {
    #[serde(default, alias = "_id")]
    pub id:       Option<EntityId>,
    #[serde(default)]
    pub name:     Option<String>,
    #[serde(default)]
    pub role:     Option<String>,
    #[serde(default)]
    pub location: Option<StaffLocation>,
    #[serde(default)]
    pub schedule: Option<StaffSchedule>,
}

impl StaffMember {
    pub fn is_schedulable(&self) -> bool {
        self.role.as_deref() == Some(STAFF_ROLE)
    }

    pub fn city_name(&self) -> Option<&str> {
        self.location.as_ref().and_then(|l| l.city.as_deref())
    }

    pub fn late_shift_override(&self) -> Option<bool> {
        self.schedule.as_ref().and_then(|s| s.working_late_shift)
    }

    /// Name for log lines; never fails.
    pub fn display_name(&self) -> &str {
        self.name
            .as_deref()
            .or(self.id.as_deref())
            .unwrap_or("<unnamed staff>")
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Job {
    #[serde(default, alias = "_id")]
    pub id:           Option<EntityId>,
    #[serde(default)]
    pub assigned_to:  Option<EntityId>,
    #[serde(default)]
    pub due_date:     Option<String>,
    #[serde(default)]
    pub category:     Option<String>,
    #[serde(default)]
    pub risk_address: Option<String>,
    /// Pre-migration spelling. Some documents carry both keys.
    #[serde(default, rename = "RiskAddress", skip_serializing_if = "Option::is_none")]
    pub legacy_risk_address: Option<String>,
    #[serde(default)]
    pub title:        Option<String>,
}

/// Where a job falls: its calendar date and, when the due date carries
/// one, its time of day (UTC, full precision for ordering).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DueSlot {
    pub date: NaiveDate,
    pub time: Option<NaiveTime>,
}

impl Job {
    /// `riskAddress` when set, else the legacy `RiskAddress`.
    pub fn address(&self) -> Option<&str> {
        [self.risk_address.as_deref(), self.legacy_risk_address.as_deref()]
            .into_iter()
            .flatten()
            .find(|a| !a.is_empty())
    }

    /// Parse `due_date`. Ok(None) when the job has no due date.
    ///
    /// Accepts RFC 3339 timestamps (normalised to UTC), naive
    /// `YYYY-MM-DDTHH:MM[:SS]` timestamps and bare `YYYY-MM-DD` dates.
    pub fn due(&self) -> ScheduleResult<Option<DueSlot>> {
        let Some(raw) = self.due_date.as_deref().map(str::trim) else {
            return Ok(None);
        };
        if raw.is_empty() {
            return Ok(None);
        }
        if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
            return Ok(Some(DueSlot::at(ts.with_timezone(&Utc).naive_utc())));
        }
        for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M:%S"] {
            if let Ok(ts) = NaiveDateTime::parse_from_str(raw, fmt) {
                return Ok(Some(DueSlot::at(ts)));
            }
        }
        if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
            return Ok(Some(DueSlot { date, time: None }));
        }
        Err(ScheduleError::InvalidDate { value: raw.to_string() })
    }
}

impl DueSlot {
    fn at(ts: NaiveDateTime) -> Self {
        Self {
            date: ts.date(),
            time: Some(ts.time()),
        }
    }
}

/// Read a JSON array of directory documents one element at a time.
/// An element that does not fit `T` is skipped with a warning; only
/// input that is not an array at all is an error.
pub fn documents_from_json<T: DeserializeOwned>(content: &str, kind: &str) -> ScheduleResult<Vec<T>> {
    let values: Vec<serde_json::Value> = serde_json::from_str(content)?;
    Ok(values
        .into_iter()
        .enumerate()
        .filter_map(|(index, value)| match serde_json::from_value(value) {
            Ok(doc) => Some(doc),
            Err(e) => {
                log::warn!("skipping unreadable {kind} document #{index}: {e}");
                None
            }
        })
        .collect())
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum EntryType {
    Base,
    Travel,
    Job,
    End,
}

impl EntryType {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntryType::Base   => "base",
            EntryType::Travel => "travel",
            EntryType::Job    => "job",
            EntryType::End    => "end",
        }
    }
}

/// One line of a staff member's day plan.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleEntry {
    pub time:        ClockTime,
    #[serde(rename = "type")]
    pub kind:        EntryType,
    pub location:    String,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub job_id:      Option<EntityId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimated_duration: Option<Minutes>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coordinates: Option<Coordinates>,
}

impl ScheduleEntry {
    pub fn base(time: ClockTime, city: &str, base: &BaseLocation) -> Self {
        Self {
            time,
            kind:               EntryType::Base,
            location:           base.address.clone(),
            description:        format!("Start of day at {city} base"),
            job_id:             None,
            estimated_duration: None,
            coordinates:        Some(base.coordinates),
        }
    }

    pub fn travel(time: ClockTime, destination: &str, minutes: Minutes) -> Self {
        Self {
            time,
            kind:               EntryType::Travel,
            location:           format!("En route to {destination}"),
            description:        format!("Travel ({minutes} min)"),
            job_id:             None,
            estimated_duration: Some(minutes),
            coordinates:        None,
        }
    }

    pub fn job(time: ClockTime, job_id: EntityId, address: &str, title: &str, minutes: Minutes) -> Self {
        Self {
            time,
            kind:               EntryType::Job,
            location:           address.to_string(),
            description:        title.to_string(),
            job_id:             Some(job_id),
            estimated_duration: Some(minutes),
            coordinates:        None,
        }
    }

    pub fn end(time: ClockTime, is_late: bool) -> Self {
        let description = if is_late {
            "Late shift ends"
        } else {
            "Normal shift ends"
        };
        Self {
            time,
            kind:               EntryType::End,
            location:           "End of shift".into(),
            description:        description.into(),
            job_id:             None,
            estimated_duration: None,
            coordinates:        None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn job_due(raw: &str) -> Job {
        Job { due_date: Some(raw.into()), ..Job::default() }
    }

    #[test]
    fn rfc3339_due_dates_normalise_to_utc() {
        let slot = job_due("2024-03-05T01:30:00+02:00").due().unwrap().unwrap();
        assert_eq!(slot.date, NaiveDate::from_ymd_opt(2024, 3, 4).unwrap());
        assert_eq!(ClockTime::from(slot.time.unwrap()).to_string(), "23:30");
    }

    #[test]
    fn date_only_due_dates_have_no_time() {
        let slot = job_due("2024-03-04").due().unwrap().unwrap();
        assert_eq!(slot.time, None);
    }

    #[test]
    fn garbage_due_date_is_an_error_and_missing_is_none() {
        assert!(job_due("next tuesday").due().is_err());
        assert_eq!(Job::default().due().unwrap(), None);
    }

    #[test]
    fn documents_accept_mongo_ids_and_legacy_address_casing() {
        let job: Job = serde_json::from_str(
            r#"{ "_id": "j9", "assignedTo": "s1", "RiskAddress": "7 Vine St" }"#,
        )
        .unwrap();
        assert_eq!(job.id.as_deref(), Some("j9"));
        assert_eq!(job.address(), Some("7 Vine St"));

        let staff: StaffMember = serde_json::from_str(
            r#"{ "_id": "s1", "name": "Thabo", "role": "staff",
                 "schedule": { "workingLateShift": true } }"#,
        )
        .unwrap();
        assert!(staff.is_schedulable());
        assert_eq!(staff.late_shift_override(), Some(true));
    }

    #[test]
    fn both_address_spellings_prefer_the_current_key() {
        let job: Job = serde_json::from_str(
            r#"{ "_id": "j1", "riskAddress": "1 New Rd", "RiskAddress": "1 Old Rd" }"#,
        )
        .unwrap();
        assert_eq!(job.address(), Some("1 New Rd"));

        let blank: Job = serde_json::from_str(
            r#"{ "_id": "j2", "riskAddress": "", "RiskAddress": "2 Old Rd" }"#,
        )
        .unwrap();
        assert_eq!(blank.address(), Some("2 Old Rd"));

        let json = serde_json::to_value(Job { id: Some("j3".into()), ..Job::default() }).unwrap();
        assert!(json.get("RiskAddress").is_none());
    }

    #[test]
    fn unreadable_documents_are_skipped_one_by_one() {
        let content = r#"[
            { "_id": "j1", "assignedTo": "s1", "riskAddress": "1 New Rd", "RiskAddress": "1 Old Rd" },
            { "_id": "j2", "assignedTo": "s1", "dueDate": 1709539200000 },
            { "_id": "j3", "assignedTo": "s1", "dueDate": "2024-03-04T09:00:00Z" }
        ]"#;
        let jobs: Vec<Job> = documents_from_json(content, "job").unwrap();
        let ids: Vec<_> = jobs.iter().filter_map(|j| j.id.as_deref()).collect();
        assert_eq!(ids, vec!["j1", "j3"]);

        assert!(documents_from_json::<Job>(r#"{ "_id": "j1" }"#, "job").is_err());
    }

    #[test]
    fn entries_serialise_with_camel_case_and_sparse_fields() {
        let entry = ScheduleEntry::job(
            ClockTime::from_hm(8, 0).unwrap(),
            "j1".into(),
            "1 Main Rd",
            "Fix leak",
            120,
        );
        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["type"], "job");
        assert_eq!(json["time"], "08:00");
        assert_eq!(json["jobId"], "j1");
        assert_eq!(json["estimatedDuration"], 120);
        assert!(json.get("coordinates").is_none());
    }
}
