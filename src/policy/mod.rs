//! Duplicate-submission policy and the intake flow
//!
//! A submitter may not report the same category twice within a short
//! distance. The check reads the submitter's history and then writes, with
//! no transaction around the pair: a concurrent submission from the same
//! submitter can slip between the two. This is a soft anti-abuse rule.

use crate::config::EngineConfig;
use crate::error::Result;
use crate::geo::{is_within, Coordinate};
use crate::report::{Category, NewSubmission, Submission};
use crate::store::SubmissionStore;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tracing::{debug, info};

/// Fixed duplicate radius in kilometers (100 m)
pub const DUPLICATE_RADIUS_KM: f64 = 0.1;

/// The parts of a past submission the policy looks at
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriorSubmission {
    pub categories: BTreeSet<Category>,
    pub location: Coordinate,
}

impl From<&Submission> for PriorSubmission {
    fn from(submission: &Submission) -> Self {
        Self {
            categories: submission.category_set(),
            location: submission.location,
        }
    }
}

/// Categories of a new submission that collide with the submitter's history
///
/// Uses the fixed 100 m radius. An empty result allows the submission.
pub fn duplicate_categories(
    new_categories: &BTreeSet<Category>,
    new_location: Coordinate,
    history: &[PriorSubmission],
) -> BTreeSet<Category> {
    duplicate_categories_within(new_categories, new_location, history, DUPLICATE_RADIUS_KM)
}

/// Same as [`duplicate_categories`] with an explicit radius
pub fn duplicate_categories_within(
    new_categories: &BTreeSet<Category>,
    new_location: Coordinate,
    history: &[PriorSubmission],
    radius_km: f64,
) -> BTreeSet<Category> {
    history
        .iter()
        .filter(|prior| is_within(prior.location, new_location, radius_km))
        .flat_map(|prior| prior.categories.intersection(new_categories).copied())
        .collect()
}

/// Result of a submission attempt
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SubmitOutcome {
    /// Stored
    Accepted { submission: Submission },
    /// Not stored; these categories were already reported nearby
    Rejected { categories: BTreeSet<Category> },
}

impl SubmitOutcome {
    pub fn is_accepted(&self) -> bool {
        matches!(self, Self::Accepted { .. })
    }
}

/// Validate, check for duplicates, and store a new submission
///
/// # Errors
/// Invalid requests and store failures are errors; a duplicate is a
/// normal `Rejected` outcome.
pub async fn submit<S: SubmissionStore>(
    store: &S,
    request: NewSubmission,
    engine: &EngineConfig,
) -> Result<SubmitOutcome> {
    request.validate()?;

    let history: Vec<PriorSubmission> = store
        .history_for(&request.submitter_id)
        .await?
        .iter()
        .map(PriorSubmission::from)
        .collect();
    debug!(
        "Checking {} prior submissions from {}",
        history.len(),
        request.submitter_id
    );

    let collisions = duplicate_categories_within(
        &request.category_set(),
        request.location(),
        &history,
        engine.duplicate_radius_km,
    );

    if !collisions.is_empty() {
        info!(
            "Rejected submission from {}: duplicate categories {:?}",
            request.submitter_id, collisions
        );
        return Ok(SubmitOutcome::Rejected {
            categories: collisions,
        });
    }

    let submission = request.into_submission()?;
    store.insert(submission.clone()).await?;
    info!(
        "Accepted {} {} at {}",
        submission.mode, submission.id, submission.spatial_key
    );

    Ok(SubmitOutcome::Accepted { submission })
}
