//! Reports (submissions) and their categories
//!
//! A submission selects category *slots*. Slots are phrased either as a
//! complaint ("potholes") or a compliment ("smooth_roads"); both phrasings
//! map onto one canonical [`Category`] so complaints and compliments about
//! the same thing aggregate together.

pub mod category;

use crate::constants::key::STORED_PRECISION;
use crate::error::{Error, Result};
use crate::geo::{spatial_key, Coordinate};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

pub use category::{canonical_category, Category};

/// Whether a submission complains about or compliments a place
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    Complaint,
    Compliment,
}

impl std::fmt::Display for Mode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Complaint => write!(f, "complaint"),
            Self::Compliment => write!(f, "compliment"),
        }
    }
}

impl std::str::FromStr for Mode {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "complaint" => Ok(Self::Complaint),
            "compliment" => Ok(Self::Compliment),
            _ => Err(format!("Unknown mode: {}", s)),
        }
    }
}

/// A stored, immutable report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Submission {
    pub id: String,
    pub mode: Mode,
    pub location: Coordinate,
    /// Category slot id -> selected
    pub categories: BTreeMap<String, bool>,
    #[serde(default)]
    pub address: String,
    pub created_at: DateTime<Utc>,
    pub submitter_id: String,
    pub spatial_key: String,
}

impl Submission {
    /// Build a submission with an explicit id and timestamp
    ///
    /// The spatial key is derived from the location.
    pub fn with_id(
        id: impl Into<String>,
        mode: Mode,
        location: Coordinate,
        categories: BTreeMap<String, bool>,
        address: impl Into<String>,
        submitter_id: impl Into<String>,
        created_at: DateTime<Utc>,
    ) -> Result<Self> {
        let spatial_key = spatial_key::encode(location, STORED_PRECISION)?;
        Ok(Self {
            id: id.into(),
            mode,
            location,
            categories,
            address: address.into(),
            created_at,
            submitter_id: submitter_id.into(),
            spatial_key,
        })
    }

    /// Selected slot ids, in slot order
    pub fn selected_slots(&self) -> impl Iterator<Item = &str> {
        self.categories
            .iter()
            .filter(|(_, selected)| **selected)
            .map(|(slot, _)| slot.as_str())
    }

    /// Canonical category for every selected slot
    ///
    /// One entry per slot, so two slots sharing a category yield it twice.
    /// Unknown slots are skipped.
    pub fn category_hits(&self) -> Vec<Category> {
        self.selected_slots().filter_map(canonical_category).collect()
    }

    /// Distinct canonical categories selected by this submission
    pub fn category_set(&self) -> BTreeSet<Category> {
        self.category_hits().into_iter().collect()
    }
}

/// A submission as it arrives from a client, before validation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewSubmission {
    pub mode: Mode,
    pub lat: f64,
    pub lng: f64,
    pub categories: BTreeMap<String, bool>,
    #[serde(default)]
    pub address: String,
    pub submitter_id: String,
}

impl NewSubmission {
    /// Location of the submission
    pub fn location(&self) -> Coordinate {
        Coordinate::new(self.lat, self.lng)
    }

    /// Validate the request
    ///
    /// Requires valid coordinates, a submitter id, and at least one
    /// selected slot. Every selected slot must be known.
    pub fn validate(&self) -> Result<()> {
        self.location().validate()?;

        if self.submitter_id.trim().is_empty() {
            return Err(Error::InvalidSubmission(
                "Submitter id must not be empty".to_string(),
            ));
        }

        let selected: Vec<&String> = self
            .categories
            .iter()
            .filter(|(_, selected)| **selected)
            .map(|(slot, _)| slot)
            .collect();

        if selected.is_empty() {
            return Err(Error::InvalidSubmission(
                "At least one category must be selected".to_string(),
            ));
        }

        if let Some(unknown) = selected.iter().find(|slot| canonical_category(slot).is_none()) {
            return Err(Error::InvalidSubmission(format!(
                "Unknown category slot: {}",
                unknown
            )));
        }

        Ok(())
    }

    /// Distinct canonical categories this request selects
    pub fn category_set(&self) -> BTreeSet<Category> {
        self.categories
            .iter()
            .filter(|(_, selected)| **selected)
            .filter_map(|(slot, _)| canonical_category(slot))
            .collect()
    }

    /// Validate and turn into a stored submission with a fresh id
    pub fn into_submission(self) -> Result<Submission> {
        self.validate()?;
        let location = self.location();
        Submission::with_id(
            uuid::Uuid::new_v4().to_string(),
            self.mode,
            location,
            self.categories,
            self.address,
            self.submitter_id,
            Utc::now(),
        )
    }
}

/// Build a slot map selecting the given slots
pub fn slots<I, S>(selected: I) -> BTreeMap<String, bool>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    selected.into_iter().map(|s| (s.into(), true)).collect()
}
