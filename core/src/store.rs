//! SQLite persistence layer.
//!
//! RULE: Only store.rs talks to the database.
//! The planner never executes SQL; callers load the directory from
//! here, build a week, and optionally hand the result back to save.

use crate::{
    error::{ScheduleError, ScheduleResult},
    model::{Job, ScheduleEntry, StaffMember},
    types::RunId,
    week_schedule::{DayOutcome, ScheduleKey, WeekSchedule},
};
use chrono::NaiveDate;
use rusqlite::{params, Connection, OptionalExtension};
use std::collections::BTreeMap;

const DAY_FORMAT: &str = "%Y-%m-%d";

pub struct ScheduleStore {
    conn: Connection,
}

/// A fresh, globally unique run id.
pub fn new_run_id() -> RunId {
    format!("run-{}", uuid::Uuid::new_v4())
}

fn parse_day(raw: &str) -> ScheduleResult<NaiveDate> {
    NaiveDate::parse_from_str(raw, DAY_FORMAT)
        .map_err(|_| ScheduleError::InvalidDate { value: raw.to_string() })
}

impl ScheduleStore {
    /// Open (or create) the directory database at `path`.
    pub fn open(path: &str) -> ScheduleResult<Self> {
        let conn = Connection::open(path)?;
        conn.execute_batch("PRAGMA journal_mode=WAL;")?;
        conn.execute_batch("PRAGMA foreign_keys=ON;")?;
        Ok(Self { conn })
    }

    /// Open an in-memory database (used in tests).
    pub fn in_memory() -> ScheduleResult<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys=ON;")?;
        Ok(Self { conn })
    }

    /// Apply all schema migrations in order.
    pub fn migrate(&self) -> ScheduleResult<()> {
        self.conn.execute_batch(include_str!("../../migrations/001_directory.sql"))?;
        Ok(())
    }

    // ── Directory ──────────────────────────────────────────────

    pub fn upsert_staff(&self, staff: &StaffMember) -> ScheduleResult<()> {
        let id = staff.id.as_deref().ok_or_else(|| ScheduleError::MalformedStaff {
            reason: "cannot store a staff record with no id".into(),
        })?;
        self.conn.execute(
            "INSERT INTO staff (id, payload) VALUES (?1, ?2)
             ON CONFLICT(id) DO UPDATE SET payload = excluded.payload",
            params![id, serde_json::to_string(staff)?],
        )?;
        Ok(())
    }

    pub fn upsert_job(&self, job: &Job) -> ScheduleResult<()> {
        let id = job
            .id
            .as_deref()
            .ok_or_else(|| anyhow::anyhow!("cannot store a job document with no id"))?;
        self.conn.execute(
            "INSERT INTO job (id, assigned_to, payload) VALUES (?1, ?2, ?3)
             ON CONFLICT(id) DO UPDATE SET
                 assigned_to = excluded.assigned_to,
                 payload     = excluded.payload",
            params![id, job.assigned_to, serde_json::to_string(job)?],
        )?;
        Ok(())
    }

    /// All staff documents, ordered by id. A payload that no longer
    /// parses is skipped with a warning.
    pub fn load_staff(&self) -> ScheduleResult<Vec<StaffMember>> {
        let payloads = self.payloads("SELECT id, payload FROM staff ORDER BY id ASC")?;
        Ok(payloads
            .into_iter()
            .filter_map(|(id, payload)| match serde_json::from_str(&payload) {
                Ok(staff) => Some(staff),
                Err(e) => {
                    log::warn!("store: skipping unreadable staff document {id}: {e}");
                    None
                }
            })
            .collect())
    }

    /// All job documents, ordered by id.
    pub fn load_jobs(&self) -> ScheduleResult<Vec<Job>> {
        let payloads = self.payloads("SELECT id, payload FROM job ORDER BY id ASC")?;
        Ok(payloads
            .into_iter()
            .filter_map(|(id, payload)| match serde_json::from_str(&payload) {
                Ok(job) => Some(job),
                Err(e) => {
                    log::warn!("store: skipping unreadable job document {id}: {e}");
                    None
                }
            })
            .collect())
    }

    fn payloads(&self, sql: &str) -> ScheduleResult<Vec<(String, String)>> {
        let mut stmt = self.conn.prepare(sql)?;
        let rows = stmt
            .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    // ── Schedule runs ──────────────────────────────────────────

    /// Persist every cell of `week` under a new run. Returns the run id.
    pub fn save_week(&mut self, week: &WeekSchedule) -> ScheduleResult<RunId> {
        let run_id = new_run_id();
        let tx = self.conn.transaction()?;
        tx.execute(
            "INSERT INTO schedule_run (run_id, week_start, created_at) VALUES (?1, ?2, ?3)",
            params![
                run_id,
                week.week_start.format(DAY_FORMAT).to_string(),
                chrono::Utc::now().to_rfc3339(),
            ],
        )?;
        for (key, outcome) in week.cells() {
            let day = key.date.format(DAY_FORMAT).to_string();
            match outcome {
                DayOutcome::Built(entries) => {
                    for (position, entry) in entries.iter().enumerate() {
                        tx.execute(
                            "INSERT INTO schedule_entry (run_id, staff_id, day, position, payload)
                             VALUES (?1, ?2, ?3, ?4, ?5)",
                            params![
                                run_id,
                                key.staff_id,
                                day,
                                position as i64,
                                serde_json::to_string(entry)?,
                            ],
                        )?;
                    }
                }
                DayOutcome::Failed { reason } => {
                    tx.execute(
                        "INSERT INTO schedule_failure (run_id, staff_id, day, reason)
                         VALUES (?1, ?2, ?3, ?4)",
                        params![run_id, key.staff_id, day, reason],
                    )?;
                }
            }
        }
        tx.commit()?;
        log::debug!("store: saved week {} as {run_id} ({} cells)", week.week_start, week.len());
        Ok(run_id)
    }

    /// Entries of one saved cell, in list order.
    pub fn entries_for(
        &self,
        run_id: &str,
        staff_id: &str,
        date: NaiveDate,
    ) -> ScheduleResult<Vec<ScheduleEntry>> {
        let mut stmt = self.conn.prepare(
            "SELECT payload FROM schedule_entry
             WHERE run_id = ?1 AND staff_id = ?2 AND day = ?3
             ORDER BY position ASC",
        )?;
        let payloads = stmt
            .query_map(
                params![run_id, staff_id, date.format(DAY_FORMAT).to_string()],
                |row| row.get::<_, String>(0),
            )?
            .collect::<Result<Vec<_>, _>>()?;
        payloads
            .iter()
            .map(|p| serde_json::from_str(p).map_err(ScheduleError::from))
            .collect()
    }

    /// Rebuild a saved week, failed cells included.
    pub fn load_week(&self, run_id: &str) -> ScheduleResult<Option<WeekSchedule>> {
        let week_start: Option<String> = self
            .conn
            .query_row(
                "SELECT week_start FROM schedule_run WHERE run_id = ?1",
                params![run_id],
                |row| row.get(0),
            )
            .optional()?;
        let Some(week_start) = week_start else {
            return Ok(None);
        };
        let mut week = WeekSchedule::new(parse_day(&week_start)?);

        let mut built: BTreeMap<ScheduleKey, Vec<ScheduleEntry>> = BTreeMap::new();
        {
            let mut stmt = self.conn.prepare(
                "SELECT staff_id, day, payload FROM schedule_entry
                 WHERE run_id = ?1 ORDER BY staff_id, day, position ASC",
            )?;
            let rows = stmt
                .query_map(params![run_id], |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, String>(2)?,
                    ))
                })?
                .collect::<Result<Vec<_>, _>>()?;
            for (staff_id, day, payload) in rows {
                let key = ScheduleKey::new(staff_id, parse_day(&day)?);
                built.entry(key).or_default().push(serde_json::from_str(&payload)?);
            }
        }
        for (key, entries) in built {
            week.insert(key, DayOutcome::Built(entries));
        }

        let mut stmt = self.conn.prepare(
            "SELECT staff_id, day, reason FROM schedule_failure WHERE run_id = ?1",
        )?;
        let failures = stmt
            .query_map(params![run_id], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                ))
            })?
            .collect::<Result<Vec<_>, _>>()?;
        for (staff_id, day, reason) in failures {
            week.insert(
                ScheduleKey::new(staff_id, parse_day(&day)?),
                DayOutcome::Failed { reason },
            );
        }
        Ok(Some(week))
    }
}
