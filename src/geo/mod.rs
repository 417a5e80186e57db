//! Geographic primitives
//!
//! This module handles:
//! - Coordinates and map viewports
//! - Great-circle distance
//! - Spatial keys (geohash) and the key ranges used for store queries

pub mod distance;
pub mod spatial_key;

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

pub use distance::{distance, is_within};

/// A geographic coordinate (latitude, longitude)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinate {
    /// Create new coordinates
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Validate that coordinates are finite and within valid ranges
    ///
    /// Latitude: -90 to 90
    /// Longitude: -180 to 180
    pub fn validate(&self) -> Result<()> {
        if !self.lat.is_finite() || self.lat < -90.0 || self.lat > 90.0 {
            return Err(Error::InvalidCoordinates(format!(
                "Latitude {} is out of range [-90, 90]",
                self.lat
            )));
        }
        if !self.lng.is_finite() || self.lng < -180.0 || self.lng > 180.0 {
            return Err(Error::InvalidCoordinates(format!(
                "Longitude {} is out of range [-180, 180]",
                self.lng
            )));
        }
        Ok(())
    }
}

/// The visible rectangular map region
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub south_west: Coordinate,
    pub north_east: Coordinate,
}

impl Viewport {
    /// Create a viewport from its south-west and north-east corners
    pub fn new(south_west: Coordinate, north_east: Coordinate) -> Self {
        Self {
            south_west,
            north_east,
        }
    }

    /// Create a viewport from south/west/north/east edges
    pub fn from_bounds(south: f64, west: f64, north: f64, east: f64) -> Self {
        Self::new(Coordinate::new(south, west), Coordinate::new(north, east))
    }

    /// Validate both corners and their ordering
    pub fn validate(&self) -> Result<()> {
        self.south_west.validate()?;
        self.north_east.validate()?;
        if self.south_west.lat > self.north_east.lat || self.south_west.lng > self.north_east.lng {
            return Err(Error::InvalidCoordinates(format!(
                "Viewport corners are inverted: south-west ({}, {}) north-east ({}, {})",
                self.south_west.lat, self.south_west.lng, self.north_east.lat, self.north_east.lng
            )));
        }
        Ok(())
    }

    /// Midpoint of the viewport
    pub fn center(&self) -> Coordinate {
        Coordinate::new(
            (self.south_west.lat + self.north_east.lat) / 2.0,
            (self.south_west.lng + self.north_east.lng) / 2.0,
        )
    }

    /// Latitude span in degrees
    pub fn lat_span(&self) -> f64 {
        (self.north_east.lat - self.south_west.lat).abs()
    }

    /// Longitude span in degrees
    pub fn lng_span(&self) -> f64 {
        (self.north_east.lng - self.south_west.lng).abs()
    }

    /// Strict containment: points on the edge are outside
    pub fn contains(&self, point: Coordinate) -> bool {
        point.lat > self.south_west.lat
            && point.lat < self.north_east.lat
            && point.lng > self.south_west.lng
            && point.lng < self.north_east.lng
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_coordinates() {
        assert!(Coordinate::new(40.7128, -74.0060).validate().is_ok());
        assert!(Coordinate::new(90.0, 180.0).validate().is_ok());
        assert!(Coordinate::new(91.0, 0.0).validate().is_err());
        assert!(Coordinate::new(0.0, -180.5).validate().is_err());
        assert!(Coordinate::new(f64::NAN, 0.0).validate().is_err());
    }

    #[test]
    fn test_viewport_contains_is_strict() {
        let viewport = Viewport::from_bounds(0.0, 0.0, 1.0, 1.0);

        assert!(viewport.contains(Coordinate::new(0.5, 0.5)));
        assert!(!viewport.contains(Coordinate::new(0.0, 0.5)));
        assert!(!viewport.contains(Coordinate::new(0.5, 1.0)));
        assert!(!viewport.contains(Coordinate::new(1.5, 0.5)));
    }

    #[test]
    fn test_viewport_center_and_span() {
        let viewport = Viewport::from_bounds(10.0, 20.0, 12.0, 21.0);

        assert_eq!(viewport.center(), Coordinate::new(11.0, 20.5));
        assert_eq!(viewport.lat_span(), 2.0);
        assert_eq!(viewport.lng_span(), 1.0);
    }

    #[test]
    fn test_viewport_inverted_corners() {
        let viewport = Viewport::from_bounds(12.0, 20.0, 10.0, 21.0);
        assert!(viewport.validate().is_err());
    }

    #[test]
    fn test_coordinate_serialization() {
        let coord = Coordinate::new(40.7128, -74.0060);
        let json = serde_json::to_string(&coord).unwrap();
        let parsed: Coordinate = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, coord);
    }
}
