//! Geographic coordinates and the flat-earth helpers used to move around them.
//!
//! Degrees of longitude are converted with the same miles-per-degree factor as latitude.
//! This ignores the `cos(latitude)` shrink of longitude lines away from the equator.

use crate::error::WeatherStoreError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Miles covered by one degree of latitude.
pub const MILES_PER_LATITUDE_DEGREE: f64 = 69.0;

/// A point on the globe in decimal degrees.
///
/// Values are validated on construction; use [`GeographicCoordinate::new`].
///
/// # Examples
///
/// ```
/// use meteogrid::GeographicCoordinate;
///
/// let las_vegas = GeographicCoordinate::new(36.17, -115.14).unwrap();
/// assert_eq!(las_vegas.latitude_deg(), 36.17);
/// assert!(GeographicCoordinate::new(f64::NAN, 0.0).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeographicCoordinate {
    latitude_deg: f64,
    longitude_deg: f64,
}

/// Compass direction for [`GeographicCoordinate::in_direction_degrees`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    North,
    South,
    East,
    West,
}

impl GeographicCoordinate {
    /// Creates a coordinate, rejecting NaN, infinite and out-of-range values.
    ///
    /// # Errors
    ///
    /// Returns [`WeatherStoreError::InvalidCoordinate`] when latitude is outside `[-90, 90]`
    /// or longitude is outside `[-180, 180]`.
    pub fn new(latitude_deg: f64, longitude_deg: f64) -> Result<Self, WeatherStoreError> {
        let coordinate = Self {
            latitude_deg,
            longitude_deg,
        };
        coordinate.validate()?;
        Ok(coordinate)
    }

    /// Re-checks the range invariants. Needed for values that came through deserialization.
    pub fn validate(&self) -> Result<(), WeatherStoreError> {
        let lat_ok = self.latitude_deg.is_finite() && self.latitude_deg.abs() <= 90.0;
        let lon_ok = self.longitude_deg.is_finite() && self.longitude_deg.abs() <= 180.0;
        if lat_ok && lon_ok {
            Ok(())
        } else {
            Err(WeatherStoreError::InvalidCoordinate {
                latitude_deg: self.latitude_deg,
                longitude_deg: self.longitude_deg,
            })
        }
    }

    pub fn latitude_deg(&self) -> f64 {
        self.latitude_deg
    }

    pub fn longitude_deg(&self) -> f64 {
        self.longitude_deg
    }

    /// Moves the coordinate `degrees` along one axis.
    pub fn in_direction_degrees(
        &self,
        direction: Direction,
        degrees: f64,
    ) -> Result<Self, WeatherStoreError> {
        let (lat, lon) = match direction {
            Direction::North => (self.latitude_deg + degrees, self.longitude_deg),
            Direction::South => (self.latitude_deg - degrees, self.longitude_deg),
            Direction::East => (self.latitude_deg, self.longitude_deg + degrees),
            Direction::West => (self.latitude_deg, self.longitude_deg - degrees),
        };
        Self::new(lat, lon)
    }

    /// Same as [`Self::in_direction_degrees`] but with a distance in miles.
    pub fn in_direction_miles(
        &self,
        direction: Direction,
        miles: f64,
        miles_per_degree: f64,
    ) -> Result<Self, WeatherStoreError> {
        self.in_direction_degrees(direction, miles / miles_per_degree)
    }

    /// Euclidean distance in degrees, treating both axes alike.
    pub fn flat_distance_deg(&self, other: &GeographicCoordinate) -> f64 {
        let d_lat = self.latitude_deg - other.latitude_deg;
        let d_lon = self.longitude_deg - other.longitude_deg;
        (d_lat * d_lat + d_lon * d_lon).sqrt()
    }

    /// Samples a square grid of points spaced `spacing_miles` apart that fall inside the disc
    /// of `radius_miles` around `self`. Points that would leave the valid coordinate range are
    /// dropped.
    pub fn points_within_radius_grid(
        &self,
        radius_miles: f64,
        spacing_miles: f64,
        miles_per_degree: f64,
    ) -> Vec<GeographicCoordinate> {
        if !(radius_miles >= 0.0) || !(spacing_miles > 0.0) {
            return vec![];
        }
        let radius_deg = radius_miles / miles_per_degree;
        let step_deg = spacing_miles / miles_per_degree;

        let mut points = Vec::new();
        let mut lat_delta = -radius_deg;
        while lat_delta <= radius_deg {
            let half_width = (radius_deg * radius_deg - lat_delta * lat_delta).max(0.0).sqrt();
            let mut lon_delta = -half_width;
            while lon_delta <= half_width {
                if let Ok(point) = Self::new(
                    self.latitude_deg + lat_delta,
                    self.longitude_deg + lon_delta,
                ) {
                    points.push(point);
                }
                lon_delta += step_deg;
            }
            lat_delta += step_deg;
        }
        points
    }
}

impl fmt::Display for GeographicCoordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.4}, {:.4})", self.latitude_deg, self.longitude_deg)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_invalid_values() {
        assert!(GeographicCoordinate::new(f64::NAN, 1.0).is_err());
        assert!(GeographicCoordinate::new(1.0, f64::INFINITY).is_err());
        assert!(GeographicCoordinate::new(90.5, 0.0).is_err());
        assert!(GeographicCoordinate::new(0.0, -180.1).is_err());
        assert!(GeographicCoordinate::new(-90.0, 180.0).is_ok());
    }

    #[test]
    fn test_in_direction_miles() {
        let origin = GeographicCoordinate::new(10.0, 20.0).unwrap();
        let north = origin
            .in_direction_miles(Direction::North, 69.0, MILES_PER_LATITUDE_DEGREE)
            .unwrap();
        assert!((north.latitude_deg() - 11.0).abs() < 1e-12);
        assert_eq!(north.longitude_deg(), 20.0);

        let west = origin.in_direction_degrees(Direction::West, 2.5).unwrap();
        assert_eq!(west.longitude_deg(), 17.5);

        let off_the_map = GeographicCoordinate::new(89.9, 0.0)
            .unwrap()
            .in_direction_degrees(Direction::North, 1.0);
        assert!(off_the_map.is_err());
    }

    #[test]
    fn test_points_within_radius_grid_stay_inside_disc() {
        let center = GeographicCoordinate::new(36.1716, -115.1391).unwrap();
        let points = center.points_within_radius_grid(100.0, 25.0, MILES_PER_LATITUDE_DEGREE);
        assert!(!points.is_empty());
        let radius_deg = 100.0 / MILES_PER_LATITUDE_DEGREE;
        for p in &points {
            assert!(p.flat_distance_deg(&center) <= radius_deg + 1e-9);
        }
        assert!(center
            .points_within_radius_grid(-1.0, 25.0, MILES_PER_LATITUDE_DEGREE)
            .is_empty());
    }
}
