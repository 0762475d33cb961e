//! Coordinate locators — where the day builder thinks a job is.
//!
//! RULE: jobs carry no real coordinates. Every locator produces a
//! point inside a small jitter window around a fixed centre; only
//! the choice of point differs.
//!
//! - AddressLocator:      point derived from a hash of the address.
//!                        Idempotent; departure is the job's own point.
//! - RandomJitterLocator: fresh draw per call from a seeded stream,
//!                        departure unrelated to the job. Reproduces
//!                        the legacy random jitter for a given seed.

use crate::{
    config::{LocatorConfig, LocatorMode},
    error::{ScheduleError, ScheduleResult},
    geo::Coordinates,
    model::Job,
    rng::JitterRng,
};

/// The contract the day builder relies on.
pub trait CoordinateLocator {
    /// Stable name for log lines.
    fn name(&self) -> &'static str;

    /// The point travelled to for `job`.
    fn destination(&mut self, job: &Job) -> ScheduleResult<Coordinates>;

    /// The point the next leg starts from after finishing `job`,
    /// which was reached at `arrived`.
    fn departure(&mut self, job: &Job, arrived: Coordinates) -> ScheduleResult<Coordinates>;
}

fn jitter(center: Coordinates, span: f64, rng: &mut JitterRng) -> Coordinates {
    Coordinates {
        lat: center.lat + rng.offset(span),
        lng: center.lng + rng.offset(span),
    }
}

pub struct AddressLocator {
    center: Coordinates,
    span:   f64,
}

impl AddressLocator {
    pub fn new(center: Coordinates, span: f64) -> Self {
        Self { center, span }
    }

    /// The hashed key: the address when present, else the job id.
    fn key(job: &Job) -> ScheduleResult<&str> {
        job.address()
            .filter(|a| !a.trim().is_empty())
            .or(job.id.as_deref())
            .ok_or_else(|| ScheduleError::Locator {
                job_id: String::new(),
                reason: "job has neither an address nor an id".into(),
            })
    }
}

impl CoordinateLocator for AddressLocator {
    fn name(&self) -> &'static str { "address" }

    fn destination(&mut self, job: &Job) -> ScheduleResult<Coordinates> {
        let key = Self::key(job)?;
        let mut rng = JitterRng::for_key(key.trim());
        Ok(jitter(self.center, self.span, &mut rng))
    }

    fn departure(&mut self, _job: &Job, arrived: Coordinates) -> ScheduleResult<Coordinates> {
        Ok(arrived)
    }
}

pub struct RandomJitterLocator {
    center: Coordinates,
    span:   f64,
    rng:    JitterRng,
}

impl RandomJitterLocator {
    pub fn new(center: Coordinates, span: f64, seed: u64) -> Self {
        Self { center, span, rng: JitterRng::new(seed) }
    }
}

impl CoordinateLocator for RandomJitterLocator {
    fn name(&self) -> &'static str { "random" }

    fn destination(&mut self, _job: &Job) -> ScheduleResult<Coordinates> {
        Ok(jitter(self.center, self.span, &mut self.rng))
    }

    fn departure(&mut self, _job: &Job, _arrived: Coordinates) -> ScheduleResult<Coordinates> {
        Ok(jitter(self.center, self.span, &mut self.rng))
    }
}

/// Build the locator selected by configuration.
pub fn from_config(config: &LocatorConfig) -> Box<dyn CoordinateLocator> {
    match config.mode {
        LocatorMode::Address => Box::new(AddressLocator::new(config.center, config.span_degrees)),
        LocatorMode::Random  => Box::new(RandomJitterLocator::new(
            config.center,
            config.span_degrees,
            config.seed,
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn job_at(address: &str) -> Job {
        Job {
            id: Some("j1".into()),
            risk_address: Some(address.into()),
            ..Job::default()
        }
    }

    #[test]
    fn address_locator_is_idempotent_and_inside_window() {
        let config = LocatorConfig::default();
        let mut locator = AddressLocator::new(config.center, config.span_degrees);
        let a = locator.destination(&job_at("12 Oak Ave")).unwrap();
        let b = locator.destination(&job_at("12 Oak Ave")).unwrap();
        assert_eq!(a, b);
        assert!((a.lat - config.center.lat).abs() <= 0.05);
        assert!((a.lng - config.center.lng).abs() <= 0.05);

        let other = locator.destination(&job_at("99 Elm Rd")).unwrap();
        assert_ne!(a, other);
    }

    #[test]
    fn address_locator_falls_back_to_job_id() {
        let config = LocatorConfig::default();
        let mut locator = AddressLocator::new(config.center, config.span_degrees);
        let job = Job { id: Some("j7".into()), ..Job::default() };
        assert!(locator.destination(&job).is_ok());
        assert!(locator.destination(&Job::default()).is_err());
    }

    #[test]
    fn random_locator_reproduces_per_seed() {
        let config = LocatorConfig::default();
        let job = job_at("anywhere");
        let mut a = RandomJitterLocator::new(config.center, config.span_degrees, 9);
        let mut b = RandomJitterLocator::new(config.center, config.span_degrees, 9);
        let first = a.destination(&job).unwrap();
        assert_eq!(first, b.destination(&job).unwrap());
        // A second draw moves on.
        assert_ne!(first, a.destination(&job).unwrap());
    }
}
