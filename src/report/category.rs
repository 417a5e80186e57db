//! Canonical categories and the slot catalogue

use serde::{Deserialize, Serialize};

/// A canonical report category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Roads,
    Garbage,
    Lighting,
    Parks,
    Noise,
    Safety,
    Transit,
}

/// (slot id, category) for every phrasing a client may select
const SLOTS: &[(&str, Category)] = &[
    ("potholes", Category::Roads),
    ("road_damage", Category::Roads),
    ("smooth_roads", Category::Roads),
    ("litter", Category::Garbage),
    ("overflowing_bins", Category::Garbage),
    ("clean_streets", Category::Garbage),
    ("broken_lights", Category::Lighting),
    ("well_lit", Category::Lighting),
    ("neglected_park", Category::Parks),
    ("nice_park", Category::Parks),
    ("loud", Category::Noise),
    ("quiet", Category::Noise),
    ("feels_unsafe", Category::Safety),
    ("feels_safe", Category::Safety),
    ("unreliable_transit", Category::Transit),
    ("reliable_transit", Category::Transit),
];

impl Category {
    /// Canonical identifier
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Roads => "roads",
            Self::Garbage => "garbage",
            Self::Lighting => "lighting",
            Self::Parks => "parks",
            Self::Noise => "noise",
            Self::Safety => "safety",
            Self::Transit => "transit",
        }
    }

    /// Slot ids that map onto this category, the canonical id included
    pub fn slots(&self) -> Vec<&'static str> {
        std::iter::once(self.as_str())
            .chain(
                SLOTS
                    .iter()
                    .filter(|(_, category)| category == self)
                    .map(|(slot, _)| *slot),
            )
            .collect()
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        available_categories()
            .into_iter()
            .find(|c| c.as_str() == s.to_lowercase())
            .ok_or_else(|| format!("Unknown category: {}", s))
    }
}

/// Map a slot id to its canonical category
pub fn canonical_category(slot: &str) -> Option<Category> {
    if let Ok(category) = slot.parse::<Category>() {
        return Some(category);
    }
    SLOTS
        .iter()
        .find(|(id, _)| *id == slot)
        .map(|(_, category)| *category)
}

/// List all canonical categories
pub fn available_categories() -> Vec<Category> {
    vec![
        Category::Roads,
        Category::Garbage,
        Category::Lighting,
        Category::Parks,
        Category::Noise,
        Category::Safety,
        Category::Transit,
    ]
}

/// Every known slot id
pub fn available_slots() -> Vec<&'static str> {
    available_categories()
        .iter()
        .flat_map(|c| c.slots())
        .collect()
}
