use crate::{
    geo::{City, Coordinates},
    time::ClockTime,
    types::Minutes,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Service minutes per job category.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DurationConfig {
    pub by_category: HashMap<String, Minutes>,
    /// Used for unknown and missing categories.
    pub default_minutes: Minutes,
}

impl Default for DurationConfig {
    fn default() -> Self {
        Self {
            by_category: [
                ("Geyser Replacement".into(), 180),
                ("Geyser Assessment".into(), 60),
                ("Leak Detection".into(), 120),
                ("Drain Blockage".into(), 90),
                ("Camera Inspection".into(), 75),
                ("Toilet/Shower".into(), 90),
            ]
            .into(),
            default_minutes: 60,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BaseLocation {
    pub address:     String,
    pub coordinates: Coordinates,
}

/// The depot table. Exactly two entries exist; anything that is not
/// Cape Town resolves to Johannesburg.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BaseLocations {
    #[serde(rename = "Johannesburg")]
    pub johannesburg: BaseLocation,
    #[serde(rename = "Cape Town")]
    pub cape_town:    BaseLocation,
}

impl BaseLocations {
    pub fn for_city(&self, city: City) -> &BaseLocation {
        match city {
            City::Johannesburg => &self.johannesburg,
            City::CapeTown     => &self.cape_town,
        }
    }
}

impl Default for BaseLocations {
    fn default() -> Self {
        Self {
            johannesburg: BaseLocation {
                address:     "123 Main Street, Johannesburg, 2001".into(),
                coordinates: Coordinates { lat: -26.2041, lng: 28.0473 },
            },
            cape_town: BaseLocation {
                address:     "456 Long Street, Cape Town, 8001".into(),
                coordinates: Coordinates { lat: -33.9249, lng: 18.4241 },
            },
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TravelConfig {
    /// Minutes per degree of raw lat/lng distance.
    pub minutes_per_degree: f64,
    pub min_minutes:        Minutes,
    pub max_minutes:        Minutes,
}

impl TravelConfig {
    /// `(lower, upper)`, ordered even when the file has them swapped.
    pub fn bounds(&self) -> (Minutes, Minutes) {
        if self.min_minutes <= self.max_minutes {
            (self.min_minutes, self.max_minutes)
        } else {
            (self.max_minutes, self.min_minutes)
        }
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.min_minutes > self.max_minutes {
            anyhow::bail!(
                "travel.min_minutes ({}) exceeds travel.max_minutes ({})",
                self.min_minutes,
                self.max_minutes
            );
        }
        Ok(())
    }
}

impl Default for TravelConfig {
    fn default() -> Self {
        Self {
            minutes_per_degree: 3000.0,
            min_minutes:        15,
            max_minutes:        60,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShiftConfig {
    /// Time of the base entry. Staff `shiftStartTime` is not consulted.
    pub day_start:        ClockTime,
    pub normal_end:       ClockTime,
    pub late_end:         ClockTime,
    /// Week 0 of the alternating late-shift rotation starts here.
    pub rotation_anchor:  NaiveDate,
    /// Slot for jobs whose due date carries no time of day.
    pub default_job_time: ClockTime,
}

impl Default for ShiftConfig {
    fn default() -> Self {
        Self {
            day_start:        ClockTime::from_hm(5, 0).unwrap_or_default(),
            normal_end:       ClockTime::from_hm(17, 0).unwrap_or_default(),
            late_end:         ClockTime::from_hm(19, 0).unwrap_or_default(),
            rotation_anchor:  NaiveDate::from_ymd_opt(2024, 1, 1).unwrap_or_default(),
            default_job_time: ClockTime::from_hm(8, 0).unwrap_or_default(),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum LocatorMode {
    /// Pseudo-geocode from a hash of the job address. Idempotent.
    Address,
    /// Legacy jitter, drawn from a seeded stream.
    Random,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocatorConfig {
    pub mode:         LocatorMode,
    pub seed:         u64,
    pub center:       Coordinates,
    /// Full width of the jitter window on each axis, in degrees.
    pub span_degrees: f64,
}

impl Default for LocatorConfig {
    fn default() -> Self {
        Self {
            mode:         LocatorMode::Address,
            seed:         42,
            center:       Coordinates { lat: -26.2041, lng: 28.0473 },
            span_degrees: 0.1,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ScheduleConfig {
    pub durations: DurationConfig,
    pub bases:     BaseLocations,
    pub travel:    TravelConfig,
    pub shifts:    ShiftConfig,
    pub locator:   LocatorConfig,
}

impl ScheduleConfig {
    /// Load from the data/ directory. Sections missing from the file
    /// keep their defaults. In tests, use ScheduleConfig::default().
    pub fn load(data_dir: &str) -> anyhow::Result<Self> {
        let path = format!("{data_dir}/schedule_config.json");
        let content = std::fs::read_to_string(&path)
            .map_err(|e| anyhow::anyhow!("Cannot read {path}: {e}"))?;
        let config: ScheduleConfig = serde_json::from_str(&content)
            .map_err(|e| anyhow::anyhow!("Cannot parse {path}: {e}"))?;
        config.validate().map_err(|e| anyhow::anyhow!("{path}: {e}"))?;
        Ok(config)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        self.travel.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_file_keeps_defaults() {
        let json = r#"{ "travel": { "minutes_per_degree": 1000.0, "min_minutes": 5, "max_minutes": 30 } }"#;
        let config: ScheduleConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.travel.max_minutes, 30);
        assert_eq!(config.durations.default_minutes, 60);
        assert_eq!(config.shifts.late_end.to_string(), "19:00");
        assert_eq!(config.locator.mode, LocatorMode::Address);
    }

    #[test]
    fn base_table_uses_city_names_as_keys() {
        let json = serde_json::to_value(BaseLocations::default()).unwrap();
        assert!(json.get("Johannesburg").is_some());
        assert!(json.get("Cape Town").is_some());
    }

    #[test]
    fn loads_the_shipped_data_directory() {
        let data_dir = concat!(env!("CARGO_MANIFEST_DIR"), "/../data");
        let config = ScheduleConfig::load(data_dir).unwrap();
        assert_eq!(config.travel.bounds(), (15, 60));
        assert_eq!(config.durations.job_duration(Some("Leak Detection")), 120);
        assert_eq!(config.bases.cape_town.address, "456 Long Street, Cape Town, 8001");
        assert_eq!(config.shifts.rotation_anchor, NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
        assert_eq!(config.locator.mode, LocatorMode::Address);
    }

    #[test]
    fn missing_file_is_reported_with_its_path() {
        let dir = tempfile::tempdir().unwrap();
        let err = ScheduleConfig::load(dir.path().to_str().unwrap()).unwrap_err();
        let msg = err.to_string();
        assert!(msg.starts_with("Cannot read"), "unexpected error: {msg}");
        assert!(msg.contains("schedule_config.json"), "unexpected error: {msg}");
    }

    #[test]
    fn inverted_travel_bounds_are_rejected_on_load() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("schedule_config.json"),
            r#"{ "travel": { "minutes_per_degree": 3000.0, "min_minutes": 60, "max_minutes": 15 } }"#,
        )
        .unwrap();
        let err = ScheduleConfig::load(dir.path().to_str().unwrap()).unwrap_err();
        assert!(err.to_string().contains("travel.min_minutes (60)"), "unexpected error: {err}");
    }

    #[test]
    fn bounds_are_ordered_even_when_swapped() {
        let travel = TravelConfig { min_minutes: 60, max_minutes: 15, ..TravelConfig::default() };
        assert_eq!(travel.bounds(), (15, 60));
        assert!(travel.validate().is_err());
        assert!(TravelConfig::default().validate().is_ok());
    }
}
