//! schedule-runner: headless week planner for field crews.
//!
//! Usage:
//!   schedule-runner --week 2024-03-04 --staff data/staff.json --jobs data/jobs.json
//!   schedule-runner --week 2024-03-04 --db directory.db --save
//!   schedule-runner --week 2024-03-04 --db directory.db --export-csv s1 --out s1.csv

use anyhow::{Context, Result};
use chrono::NaiveDate;
use crewplan_core::{
    model::{documents_from_json, EntryType, Job, StaffMember},
    store::ScheduleStore,
    ScheduleConfig, WeekPlanner, WeekSchedule,
};
use std::env;
use std::path::Path;

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let week = match flag_value(&args, "--week") {
        Some(raw) => NaiveDate::parse_from_str(raw, "%Y-%m-%d")
            .with_context(|| format!("--week expects YYYY-MM-DD, got {raw:?}"))?,
        None => chrono::Utc::now().date_naive(),
    };
    let data_dir = flag_value(&args, "--data-dir").unwrap_or("./data");
    let db = flag_value(&args, "--db");
    let staff_path = flag_value(&args, "--staff");
    let jobs_path = flag_value(&args, "--jobs");
    let export_staff = flag_value(&args, "--export-csv");
    let out = flag_value(&args, "--out");
    let save = args.iter().any(|a| a == "--save");

    let config = load_config(data_dir)?;

    let mut staff: Vec<StaffMember> = match staff_path {
        Some(path) => read_documents(path, "staff")?,
        None => Vec::new(),
    };
    let mut jobs: Vec<Job> = match jobs_path {
        Some(path) => read_documents(path, "job")?,
        None => Vec::new(),
    };

    let mut store = match db {
        Some(path) => {
            let store = ScheduleStore::open(path)?;
            store.migrate()?;
            // Files given alongside a database are imported first.
            for member in &staff {
                if let Err(e) = store.upsert_staff(member) {
                    log::warn!("not importing staff {:?}: {e}", member.display_name());
                }
            }
            for job in &jobs {
                if let Err(e) = store.upsert_job(job) {
                    log::warn!("not importing job {:?}: {e}", job.id);
                }
            }
            staff = store.load_staff()?;
            jobs = store.load_jobs()?;
            Some(store)
        }
        None => None,
    };

    if staff.is_empty() {
        anyhow::bail!("no staff loaded: pass --staff <file.json> or --db <directory.db>");
    }

    let mut planner = WeekPlanner::new(config);
    let schedule = planner.build_week(&staff, &jobs, week);

    if let Some(staff_id) = export_staff {
        let csv = planner.export_csv(staff_id, &schedule);
        match out {
            Some(path) => {
                std::fs::write(path, &csv).with_context(|| format!("Cannot write {path}"))?;
                eprintln!("wrote {path}");
            }
            None => println!("{csv}"),
        }
    } else {
        print_summary(&planner, &staff, &schedule);
    }

    if save {
        match store.as_mut() {
            Some(store) => {
                let run_id = store.save_week(&schedule)?;
                eprintln!("saved as {run_id}");
            }
            None => log::warn!("--save ignored: no --db given"),
        }
    }

    Ok(())
}

fn load_config(data_dir: &str) -> Result<ScheduleConfig> {
    let path = Path::new(data_dir).join("schedule_config.json");
    if path.exists() {
        ScheduleConfig::load(data_dir)
    } else {
        log::info!("{} not found, using built-in defaults", path.display());
        Ok(ScheduleConfig::default())
    }
}

fn read_documents<T: serde::de::DeserializeOwned>(path: &str, kind: &str) -> Result<Vec<T>> {
    let content = std::fs::read_to_string(path).with_context(|| format!("Cannot read {path}"))?;
    documents_from_json(&content, kind).with_context(|| format!("Cannot parse {path}"))
}

fn print_summary(planner: &WeekPlanner, staff: &[StaffMember], schedule: &WeekSchedule) {
    let days = schedule.days();
    println!("crewplan — schedule-runner");
    println!("  week of:   {}", schedule.week_start);
    println!("  locator:   {}", planner.locator_name());
    println!("  cells:     {}", schedule.len());
    println!();

    for member in staff.iter().filter(|s| s.is_schedulable()) {
        let Some(id) = member.id.as_deref() else { continue };
        println!("=== {} ({id}) ===", member.display_name());
        for &date in &days {
            match schedule.outcome(id, date) {
                Some(outcome) if outcome.is_built() => {
                    let entries = outcome.entries();
                    let jobs = entries.iter().filter(|e| e.kind == EntryType::Job).count();
                    let end = entries
                        .last()
                        .map(|e| e.time.to_string())
                        .unwrap_or_default();
                    println!("  {} {}  jobs: {jobs:>2}  ends: {end}", date, date.format("%a"));
                }
                Some(_) | None => {
                    println!("  {} {}  (no schedule)", date, date.format("%a"));
                }
            }
        }
    }

    let failures: Vec<_> = schedule.failures().collect();
    if !failures.is_empty() {
        println!();
        println!("=== FAILED CELLS ===");
        for (key, reason) in failures {
            println!("  {key}: {reason}");
        }
    }
}

fn flag_value<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.windows(2)
        .find(|w| w[0] == flag)
        .map(|w| w[1].as_str())
}
