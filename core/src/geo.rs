//! Coordinates, depot cities and the synthetic travel-time estimate.
//!
//! The estimate is a placeholder: straight-line distance in raw
//! degree space scaled to minutes and clamped. It is not a geodesic
//! or road-network figure, and exported schedules depend on the
//! exact constants.

use crate::{config::TravelConfig, types::Minutes};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinates {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Euclidean distance in degrees.
    pub fn degree_distance(&self, other: &Coordinates) -> f64 {
        let d_lat = other.lat - self.lat;
        let d_lng = other.lng - self.lng;
        (d_lat * d_lat + d_lng * d_lng).sqrt()
    }
}

/// Cities with a depot.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum City {
    Johannesburg,
    #[serde(rename = "Cape Town")]
    CapeTown,
}

impl City {
    /// Resolve a free-text city. Anything unrecognised, including a
    /// missing value, falls back to Johannesburg.
    pub fn resolve(name: Option<&str>) -> City {
        match name.map(str::trim) {
            Some("Cape Town") => City::CapeTown,
            Some("Johannesburg") | None => City::Johannesburg,
            Some(other) => {
                log::debug!("unknown city {other:?}, using Johannesburg base");
                City::Johannesburg
            }
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            City::Johannesburg => "Johannesburg",
            City::CapeTown     => "Cape Town",
        }
    }
}

/// `clamp(round(distance * minutes_per_degree), min, max)`.
pub fn estimate_travel_time(from: &Coordinates, to: &Coordinates, travel: &TravelConfig) -> Minutes {
    let raw = (from.degree_distance(to) * travel.minutes_per_degree).round();
    // NaN (non-finite input) lands on the lower bound.
    let (lo, hi) = travel.bounds();
    let (min, max) = (f64::from(lo), f64::from(hi));
    let bounded = if raw.is_nan() { min } else { raw.clamp(min, max) };
    bounded as Minutes
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn close_points_hit_the_floor() {
        let travel = TravelConfig::default();
        let a = Coordinates::new(-26.2041, 28.0473);
        assert_eq!(estimate_travel_time(&a, &a, &travel), 15);
    }

    #[test]
    fn mid_range_distance_is_scaled_and_rounded() {
        let travel = TravelConfig::default();
        let a = Coordinates::new(0.0, 0.0);
        // 0.0101 degrees * 3000 = 30.3 -> 30
        let b = Coordinates::new(0.0101, 0.0);
        assert_eq!(estimate_travel_time(&a, &b, &travel), 30);
    }

    #[test]
    fn far_points_hit_the_ceiling() {
        let travel = TravelConfig::default();
        let jhb = Coordinates::new(-26.2041, 28.0473);
        let cpt = Coordinates::new(-33.9249, 18.4241);
        assert_eq!(estimate_travel_time(&jhb, &cpt, &travel), 60);
    }

    #[test]
    fn swapped_bounds_still_bound_the_estimate() {
        let travel = TravelConfig { min_minutes: 60, max_minutes: 15, ..TravelConfig::default() };
        let a = Coordinates::new(0.0, 0.0);
        assert_eq!(estimate_travel_time(&a, &a, &travel), 15);
        assert_eq!(estimate_travel_time(&a, &Coordinates::new(0.0101, 0.0), &travel), 30);
        assert_eq!(estimate_travel_time(&a, &Coordinates::new(1.0, 1.0), &travel), 60);
    }

    #[test]
    fn unknown_city_falls_back_to_johannesburg() {
        assert_eq!(City::resolve(Some("Durban")), City::Johannesburg);
        assert_eq!(City::resolve(None), City::Johannesburg);
        assert_eq!(City::resolve(Some("Cape Town")), City::CapeTown);
    }
}
