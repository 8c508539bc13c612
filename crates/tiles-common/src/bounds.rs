//! Geographic bounding boxes.

use serde::{Deserialize, Serialize};

/// A geographic bounding box in degrees, plate carrée.
///
/// Longitudes are expected in the canonical [-180, 180) domain; latitudes
/// in [-90, 90]. `west < east` and `south < north` for every box the
/// pipeline constructs.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLonBounds {
    pub west: f64,
    pub south: f64,
    pub east: f64,
    pub north: f64,
}

impl LatLonBounds {
    /// Create a new bounding box from edge coordinates.
    pub fn new(west: f64, south: f64, east: f64, north: f64) -> Self {
        Self {
            west,
            south,
            east,
            north,
        }
    }

    /// Width of the box in degrees of longitude.
    pub fn width(&self) -> f64 {
        self.east - self.west
    }

    /// Height of the box in degrees of latitude.
    pub fn height(&self) -> f64 {
        self.north - self.south
    }

    /// Check if this box overlaps another.
    pub fn intersects(&self, other: &LatLonBounds) -> bool {
        self.west < other.east
            && self.east > other.west
            && self.south < other.north
            && self.north > other.south
    }

    /// Compute the overlap of two boxes, or `None` when they are disjoint.
    pub fn intersection(&self, other: &LatLonBounds) -> Option<LatLonBounds> {
        if !self.intersects(other) {
            return None;
        }

        Some(LatLonBounds {
            west: self.west.max(other.west),
            south: self.south.max(other.south),
            east: self.east.min(other.east),
            north: self.north.min(other.north),
        })
    }

    /// Check if a point is contained within this box.
    pub fn contains(&self, lon: f64, lat: f64) -> bool {
        lon >= self.west && lon <= self.east && lat >= self.south && lat <= self.north
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_intersection() {
        let a = LatLonBounds::new(0.0, 0.0, 10.0, 10.0);
        let b = LatLonBounds::new(5.0, 5.0, 15.0, 15.0);
        let c = LatLonBounds::new(20.0, 20.0, 30.0, 30.0);

        assert!(a.intersects(&b));
        assert!(!a.intersects(&c));

        let overlap = a.intersection(&b).unwrap();
        assert_eq!(overlap.west, 5.0);
        assert_eq!(overlap.south, 5.0);
        assert_eq!(overlap.east, 10.0);
        assert_eq!(overlap.north, 10.0);
    }

    #[test]
    fn test_touching_edges_do_not_intersect() {
        let a = LatLonBounds::new(0.0, 0.0, 10.0, 10.0);
        let b = LatLonBounds::new(10.0, 0.0, 20.0, 10.0);
        assert!(!a.intersects(&b));
        assert!(a.intersection(&b).is_none());
    }

    #[test]
    fn test_contains() {
        let b = LatLonBounds::new(-130.0, 20.0, -60.0, 55.0);
        assert!(b.contains(-111.63, 40.57));
        assert!(!b.contains(0.0, 40.0));
    }
}
