//! Proximity clustering
//!
//! Groups submissions into clusters with a single greedy pass:
//! - Walk submissions in input order, skipping those already assigned
//! - Each unassigned submission seeds a new cluster
//! - Every later unassigned submission within the threshold of the *seed*
//!   joins that cluster
//!
//! The result depends on input order. With a chain of points each within
//! the threshold of its neighbour but not of the seed, a different order
//! produces different boundaries. O(n²) distance checks per pass; callers
//! bound n (see the viewport result cap).

use crate::error::{Error, Result};
use crate::geo::{distance, Coordinate};
use crate::report::{Category, Mode, Submission};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Count of submissions per mode
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModeTally {
    pub complaint: usize,
    pub compliment: usize,
}

impl ModeTally {
    /// Add one to the counter for `mode`
    pub fn increment(&mut self, mode: Mode) {
        match mode {
            Mode::Complaint => self.complaint += 1,
            Mode::Compliment => self.compliment += 1,
        }
    }

    /// Sum of both counters
    pub fn total(&self) -> usize {
        self.complaint + self.compliment
    }
}

/// An aggregate over nearby submissions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cluster {
    pub id: String,
    /// Unweighted mean of all member locations
    pub center: Coordinate,
    pub count: usize,
    pub modes: ModeTally,
    /// One increment per (member, selected slot) pair
    pub categories: BTreeMap<Category, ModeTally>,
    /// Ids of the member submissions, seed first
    pub members: Vec<String>,
    #[serde(skip)]
    lat_sum: f64,
    #[serde(skip)]
    lng_sum: f64,
}

impl Cluster {
    fn seeded(id: String, seed: &Submission) -> Self {
        let mut cluster = Self {
            id,
            center: seed.location,
            count: 0,
            modes: ModeTally::default(),
            categories: BTreeMap::new(),
            members: Vec::new(),
            lat_sum: 0.0,
            lng_sum: 0.0,
        };
        cluster.absorb(seed);
        cluster
    }

    fn absorb(&mut self, submission: &Submission) {
        self.count += 1;
        self.lat_sum += submission.location.lat;
        self.lng_sum += submission.location.lng;
        self.center = Coordinate::new(
            self.lat_sum / self.count as f64,
            self.lng_sum / self.count as f64,
        );

        self.modes.increment(submission.mode);
        for category in submission.category_hits() {
            self.categories
                .entry(category)
                .or_default()
                .increment(submission.mode);
        }

        self.members.push(submission.id.clone());
    }

    /// Total category increments across all categories
    pub fn category_total(&self) -> usize {
        self.categories.values().map(ModeTally::total).sum()
    }
}

/// Partition submissions into proximity clusters
///
/// # Arguments
/// * `submissions` - Records to cluster, in the order they should be seeded
/// * `threshold_km` - Maximum distance from a cluster's seed to join it
///
/// # Errors
/// Rejects the whole batch if the threshold is negative or any submission
/// carries an invalid location.
pub fn cluster(submissions: &[Submission], threshold_km: f64) -> Result<Vec<Cluster>> {
    if !(threshold_km >= 0.0) {
        return Err(Error::InvalidRadius(format!(
            "Cluster threshold must be non-negative, got {}",
            threshold_km
        )));
    }
    for submission in submissions {
        submission.location.validate().map_err(|e| {
            Error::InvalidCoordinates(format!("submission {}: {}", submission.id, e))
        })?;
    }

    let mut assigned = vec![false; submissions.len()];
    let mut clusters = Vec::new();

    for (i, seed) in submissions.iter().enumerate() {
        if assigned[i] {
            continue;
        }
        assigned[i] = true;

        let mut cluster = Cluster::seeded(format!("cluster-{}", clusters.len()), seed);

        for (j, candidate) in submissions.iter().enumerate().skip(i + 1) {
            if assigned[j] {
                continue;
            }
            if distance(seed.location, candidate.location) <= threshold_km {
                assigned[j] = true;
                cluster.absorb(candidate);
            }
        }

        clusters.push(cluster);
    }

    Ok(clusters)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::slots;
    use approx::assert_relative_eq;
    use chrono::Utc;

    fn submission(id: &str, mode: Mode, lat: f64, lng: f64, selected: &[&str]) -> Submission {
        Submission::with_id(
            id,
            mode,
            Coordinate::new(lat, lng),
            slots(selected.iter().copied()),
            "",
            "tester",
            Utc::now(),
        )
        .unwrap()
    }

    fn complaint(id: &str, lat: f64, lng: f64) -> Submission {
        submission(id, Mode::Complaint, lat, lng, &["potholes"])
    }

    #[test]
    fn test_empty_input() {
        assert!(cluster(&[], 0.05).unwrap().is_empty());
    }

    #[test]
    fn test_two_close_one_far() {
        let records = vec![
            complaint("a", 0.0, 0.0),
            complaint("b", 0.0, 0.0004),
            complaint("c", 10.0, 10.0),
        ];

        let clusters = cluster(&records, 0.05).unwrap();

        assert_eq!(clusters.len(), 2);
        let joint = &clusters[0];
        assert_eq!(joint.count, 2);
        assert_eq!(joint.members, vec!["a", "b"]);
        assert_relative_eq!(joint.center.lat, 0.0);
        assert_relative_eq!(joint.center.lng, 0.0002, epsilon = 1e-12);

        assert_eq!(clusters[1].count, 1);
        assert_eq!(clusters[1].members, vec!["c"]);
    }

    #[test]
    fn test_partition_covers_every_record() {
        let records: Vec<Submission> = (0..40)
            .map(|i| complaint(&format!("r{}", i), (i % 7) as f64 * 0.0003, (i % 5) as f64 * 0.0003))
            .collect();

        let clusters = cluster(&records, 0.05).unwrap();

        let total: usize = clusters.iter().map(|c| c.count).sum();
        assert_eq!(total, records.len());

        let mut seen: Vec<&String> = clusters.iter().flat_map(|c| c.members.iter()).collect();
        seen.sort();
        seen.dedup();
        assert_eq!(seen.len(), records.len());

        for c in &clusters {
            assert_eq!(c.count, c.members.len());
        }
    }

    #[test]
    fn test_zero_threshold_gives_singletons() {
        let records = vec![
            complaint("a", 0.0, 0.0),
            complaint("b", 0.0, 0.0001),
            complaint("c", 0.0, 0.0002),
        ];

        let clusters = cluster(&records, 0.0).unwrap();
        assert_eq!(clusters.len(), 3);
        assert!(clusters.iter().all(|c| c.count == 1));
    }

    #[test]
    fn test_zero_threshold_merges_coincident() {
        let records = vec![complaint("a", 1.0, 1.0), complaint("b", 1.0, 1.0)];
        let clusters = cluster(&records, 0.0).unwrap();
        assert_eq!(clusters.len(), 1);
        assert_eq!(clusters[0].count, 2);
    }

    #[test]
    fn test_distance_measured_from_seed() {
        // b is 33 m from a, c is 33 m from b but 66 m from a
        let records = vec![
            complaint("a", 0.0, 0.0),
            complaint("b", 0.0, 0.0003),
            complaint("c", 0.0, 0.0006),
        ];

        let clusters = cluster(&records, 0.05).unwrap();
        assert_eq!(clusters.len(), 2);
        assert_eq!(clusters[0].members, vec!["a", "b"]);
        assert_eq!(clusters[1].members, vec!["c"]);

        // Seeding from the middle point captures the whole chain
        let reordered = vec![records[1].clone(), records[0].clone(), records[2].clone()];
        let clusters = cluster(&reordered, 0.05).unwrap();
        assert_eq!(clusters.len(), 1);
        assert_eq!(clusters[0].count, 3);
    }

    #[test]
    fn test_center_is_mean_of_all_members() {
        let records = vec![
            complaint("a", 0.0, 0.0),
            complaint("b", 0.0003, 0.0),
            complaint("c", 0.0, 0.0003),
        ];

        let clusters = cluster(&records, 0.05).unwrap();
        assert_eq!(clusters.len(), 1);
        assert_relative_eq!(clusters[0].center.lat, 0.0001, epsilon = 1e-12);
        assert_relative_eq!(clusters[0].center.lng, 0.0001, epsilon = 1e-12);
    }

    #[test]
    fn test_category_tally_counts_slot_hits() {
        let records = vec![
            submission("a", Mode::Complaint, 0.0, 0.0, &["potholes", "road_damage"]),
            submission("b", Mode::Compliment, 0.0, 0.0001, &["smooth_roads", "well_lit"]),
        ];

        let clusters = cluster(&records, 0.05).unwrap();
        let c = &clusters[0];

        assert_eq!(c.count, 2);
        assert_eq!(c.category_total(), 4);
        assert_eq!(
            c.categories[&Category::Roads],
            ModeTally {
                complaint: 2,
                compliment: 1
            }
        );
        assert_eq!(c.categories[&Category::Lighting].compliment, 1);
    }

    #[test]
    fn test_mixed_modes_scenario() {
        // Three reports within 30 m: one garbage complaint, two road compliments
        let records = vec![
            submission("a", Mode::Complaint, 40.0, -73.0, &["garbage"]),
            submission("b", Mode::Compliment, 40.0001, -73.0, &["roads"]),
            submission("c", Mode::Compliment, 40.0, -73.0001, &["roads"]),
        ];

        let clusters = cluster(&records, 0.05).unwrap();

        assert_eq!(clusters.len(), 1);
        let c = &clusters[0];
        assert_eq!(c.count, 3);
        assert_eq!(
            c.modes,
            ModeTally {
                complaint: 1,
                compliment: 2
            }
        );
        assert_eq!(c.categories.len(), 2);
        assert_eq!(
            c.categories[&Category::Garbage],
            ModeTally {
                complaint: 1,
                compliment: 0
            }
        );
        assert_eq!(
            c.categories[&Category::Roads],
            ModeTally {
                complaint: 0,
                compliment: 2
            }
        );
    }

    #[test]
    fn test_invalid_location_rejects_batch() {
        let mut bad = complaint("bad", 0.0, 0.0);
        bad.location = Coordinate::new(f64::NAN, 0.0);
        let records = vec![complaint("a", 0.0, 0.0), bad];

        let err = cluster(&records, 0.05).unwrap_err();
        assert!(err.to_string().contains("bad"));
    }

    #[test]
    fn test_negative_threshold_rejected() {
        assert!(cluster(&[complaint("a", 0.0, 0.0)], -1.0).is_err());
    }

    #[test]
    fn test_cluster_serialization_keys() {
        let clusters = cluster(&[complaint("a", 0.0, 0.0)], 0.05).unwrap();
        let json = serde_json::to_value(&clusters[0]).unwrap();

        assert_eq!(json["count"], 1);
        assert_eq!(json["modes"]["complaint"], 1);
        assert_eq!(json["categories"]["roads"]["complaint"], 1);
        assert!(json.get("lat_sum").is_none());
    }
}
