//! Synthetic submissions for demos and load checks
//!
//! Generates random submissions uniformly distributed within a circle.
//! Uses the sqrt() correction on radius to ensure uniform distribution.

use crate::constants::geo::METERS_PER_DEGREE_LAT;
use crate::error::{Error, Result};
use crate::geo::Coordinate;
use crate::report::category::available_slots;
use crate::report::{Mode, Submission};
use chrono::{Duration, Utc};
use rand::seq::SliceRandom;
use rand::Rng;
use std::collections::BTreeMap;
use std::f64::consts::PI;

/// Generate a single random point uniformly distributed within a circle
///
/// # Algorithm
/// - r = radius * sqrt(random())  -- sqrt corrects for area distribution
/// - theta = 2 * PI * random()
/// - Convert polar to lat/lng offset
pub fn random_point_in_circle<R: Rng>(
    center: Coordinate,
    radius_meters: f64,
    rng: &mut R,
) -> Coordinate {
    let r = radius_meters * rng.gen::<f64>().sqrt();
    let theta = 2.0 * PI * rng.gen::<f64>();

    // Longitude degrees per meter varies with latitude
    let meters_per_deg_lng = METERS_PER_DEGREE_LAT * (center.lat * PI / 180.0).cos();

    let delta_lat = (r * theta.cos()) / METERS_PER_DEGREE_LAT;
    let delta_lng = (r * theta.sin()) / meters_per_deg_lng;

    Coordinate::new(
        (center.lat + delta_lat).clamp(-90.0, 90.0),
        wrap_longitude(center.lng + delta_lng),
    )
}

/// Fold a longitude back into [-180, 180)
fn wrap_longitude(lng: f64) -> f64 {
    (lng + 180.0).rem_euclid(360.0) - 180.0
}

/// Generate `count` random submissions around `center`
///
/// Each gets a random mode, one to three random slots, and a creation
/// time spread over the last `max_age_days` days.
pub fn generate_submissions<R: Rng>(
    center: Coordinate,
    radius_meters: f64,
    count: usize,
    submitter_id: &str,
    max_age_days: i64,
    rng: &mut R,
) -> Result<Vec<Submission>> {
    center.validate()?;
    if radius_meters <= 0.0 {
        return Err(Error::InvalidRadius("Radius must be positive".to_string()));
    }

    let slots = available_slots();
    let now = Utc::now();
    let mut submissions = Vec::with_capacity(count);

    for _ in 0..count {
        let location = random_point_in_circle(center, radius_meters, rng);
        let mode = if rng.gen_bool(0.5) {
            Mode::Complaint
        } else {
            Mode::Compliment
        };

        let picks = rng.gen_range(1..=3);
        let categories: BTreeMap<String, bool> = slots
            .choose_multiple(rng, picks)
            .map(|slot| (slot.to_string(), true))
            .collect();

        let age_minutes = rng.gen_range(0..=max_age_days.max(0) * 24 * 60);

        submissions.push(Submission::with_id(
            uuid::Uuid::new_v4().to_string(),
            mode,
            location,
            categories,
            "",
            submitter_id,
            now - Duration::minutes(age_minutes),
        )?);
    }

    Ok(submissions)
}
