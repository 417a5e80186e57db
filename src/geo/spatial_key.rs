//! Spatial keys
//!
//! Submissions carry a geohash key so a store that only supports ordered
//! range scans can answer "everything near here" queries: all keys sharing
//! a prefix form one contiguous range. Prefix cells over-fetch near their
//! edges; callers filter the results exactly afterwards.

use crate::constants::geo::KM_PER_DEGREE;
use crate::constants::key::RANGE_SENTINEL;
use crate::error::{Error, Result};
use crate::geo::{Coordinate, Viewport};
use serde::{Deserialize, Serialize};

/// Longest key the encoder produces
pub const MAX_PRECISION: usize = 12;

/// Radius thresholds (km) to precision, for proximity lookups
const RADIUS_PRECISION: [(f64, usize); 4] = [(0.02, 8), (0.15, 7), (1.2, 6), (5.0, 5)];
const RADIUS_FALLBACK_PRECISION: usize = 4;

/// Radius thresholds (km) to precision, tuned for map-sized areas
const VIEWPORT_PRECISION: [(f64, usize); 4] = [(1.0, 6), (10.0, 5), (50.0, 4), (100.0, 3)];
const VIEWPORT_FALLBACK_PRECISION: usize = 2;

/// An ordered key range: `min` inclusive, `max` exclusive
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpatialKeyRange {
    pub min: String,
    pub max: String,
}

impl SpatialKeyRange {
    /// Range covering every key that starts with `prefix`
    pub fn for_prefix(prefix: &str) -> Self {
        let mut max = String::with_capacity(prefix.len() + 1);
        max.push_str(prefix);
        max.push(RANGE_SENTINEL);
        Self {
            min: prefix.to_string(),
            max,
        }
    }

    /// Whether `key` falls inside the range
    pub fn contains(&self, key: &str) -> bool {
        key >= self.min.as_str() && key < self.max.as_str()
    }

    /// The shared prefix this range was built from
    pub fn prefix(&self) -> &str {
        &self.min
    }
}

fn check_precision(precision: usize) -> Result<()> {
    if precision == 0 || precision > MAX_PRECISION {
        return Err(Error::SpatialKey(format!(
            "Precision {} is out of range [1, {}]",
            precision, MAX_PRECISION
        )));
    }
    Ok(())
}

/// Distance (degrees) a coordinate on the north or east edge is pulled in
///
/// Well below the 12-character cell size (~1.7e-7° of latitude) and well
/// above the rounding error of the encoder's fixed-point scaling.
const EDGE_MARGIN_DEG: f64 = 1e-9;

/// Encode a coordinate as a geohash of exactly `precision` characters
///
/// Cells are half-open at their north and east edges, so latitude 90 and
/// longitude 180 are pulled inside the northernmost and easternmost cells.
/// Otherwise the encoder wraps them onto the south and west edges.
pub fn encode(coord: Coordinate, precision: usize) -> Result<String> {
    check_precision(precision)?;
    coord.validate()?;
    let key = geohash::encode(
        geohash::Coord {
            x: coord.lng.min(180.0 - EDGE_MARGIN_DEG),
            y: coord.lat.min(90.0 - EDGE_MARGIN_DEG),
        },
        precision,
    )?;
    Ok(key)
}

/// Decode a key to the center of its cell
pub fn decode(key: &str) -> Result<Coordinate> {
    let (center, _lng_err, _lat_err) = geohash::decode(key)?;
    Ok(Coordinate::new(center.y, center.x))
}

/// Bounding cell of a key as a viewport (south-west, north-east)
pub fn cell_bounds(key: &str) -> Result<Viewport> {
    let bbox = geohash::decode_bbox(key)?;
    Ok(Viewport::new(
        Coordinate::new(bbox.min().y, bbox.min().x),
        Coordinate::new(bbox.max().y, bbox.max().x),
    ))
}

fn lookup(table: &[(f64, usize)], fallback: usize, radius_km: f64) -> usize {
    table
        .iter()
        .find(|(limit, _)| radius_km <= *limit)
        .map(|(_, precision)| *precision)
        .unwrap_or(fallback)
}

/// Precision for a proximity lookup of `radius_km`
///
/// Larger radius gives a shorter (coarser) key.
pub fn precision_for_radius(radius_km: f64) -> usize {
    lookup(&RADIUS_PRECISION, RADIUS_FALLBACK_PRECISION, radius_km)
}

/// Precision for a viewport whose approximate radius is `radius_km`
pub fn precision_for_viewport_radius(radius_km: f64) -> usize {
    lookup(&VIEWPORT_PRECISION, VIEWPORT_FALLBACK_PRECISION, radius_km)
}

/// Key range covering the cell around `center` sized for `radius_km`
pub fn range_for_radius(center: Coordinate, radius_km: f64) -> Result<SpatialKeyRange> {
    if !(radius_km >= 0.0) {
        return Err(Error::InvalidRadius(format!(
            "Radius must be non-negative, got {}",
            radius_km
        )));
    }
    let key = encode(center, precision_for_radius(radius_km))?;
    Ok(SpatialKeyRange::for_prefix(&key))
}

/// Approximate radius of a viewport in kilometers
pub fn viewport_radius_km(viewport: &Viewport) -> f64 {
    viewport.lat_span().max(viewport.lng_span()) * KM_PER_DEGREE
}

/// Key ranges to scan for a viewport
///
/// Returns a single range: the cell containing the viewport center at a
/// precision chosen from the viewport size.
pub fn range_for_viewport(viewport: &Viewport) -> Result<Vec<SpatialKeyRange>> {
    viewport.validate()?;
    let precision = precision_for_viewport_radius(viewport_radius_km(viewport));
    let key = encode(viewport.center(), precision)?;
    Ok(vec![SpatialKeyRange::for_prefix(&key)])
}
