//! Centralized constants for the civicmap crate
//!
//! Values shared by the geo, store and clustering modules.

/// Geographic constants
pub mod geo {
    /// Mean Earth radius in kilometers
    pub const EARTH_RADIUS_KM: f64 = 6_371.0;

    /// Kilometers per degree, used for rough viewport radius estimates
    pub const KM_PER_DEGREE: f64 = 111.0;

    /// Meters per degree of latitude (approximate, varies slightly with latitude)
    pub const METERS_PER_DEGREE_LAT: f64 = 111_320.0;
}

/// Spatial key constants
pub mod key {
    /// Precision of the key stored on every submission
    pub const STORED_PRECISION: usize = 10;

    /// Appended to a prefix to form the exclusive upper bound of a range.
    /// Sorts after every character of the geohash base32 alphabet.
    pub const RANGE_SENTINEL: char = '~';
}

/// Storage constants
pub mod store {
    /// Application directory name (for XDG paths)
    pub const APP_DIR_NAME: &str = "civicmap";

    /// Default submissions file name inside the data directory
    pub const SUBMISSIONS_FILE_NAME: &str = "submissions.json";
}
