//! Turns a disc around a center point into per-row longitude bounds on the grid.
//!
//! Flat-earth approximation: the circle is drawn in degree space with the same scale on both
//! axes.

use crate::types::coordinate::GeographicCoordinate;
use std::ops::RangeInclusive;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointSelector {
    center: GeographicCoordinate,
    radius_deg: f64,
}

impl PointSelector {
    /// Selector for the disc of `radius_miles` around `center`.
    ///
    /// # Examples
    ///
    /// ```
    /// use meteogrid::{GeographicCoordinate, PointSelector};
    ///
    /// let center = GeographicCoordinate::new(0.0, 0.0).unwrap();
    /// let selector = PointSelector::circle(center, 69.0, 69.0);
    /// assert!(selector.longitude_interval(0.5).is_some());
    /// assert!(selector.longitude_interval(2.0).is_none());
    /// ```
    pub fn circle(center: GeographicCoordinate, radius_miles: f64, miles_per_degree: f64) -> Self {
        Self {
            center,
            radius_deg: radius_miles / miles_per_degree,
        }
    }

    pub fn center(&self) -> &GeographicCoordinate {
        &self.center
    }

    pub fn radius_deg(&self) -> f64 {
        self.radius_deg
    }

    /// `(south, north)` latitude bounds of the disc.
    pub fn latitude_bounds(&self) -> (f64, f64) {
        (
            self.center.latitude_deg() - self.radius_deg,
            self.center.latitude_deg() + self.radius_deg,
        )
    }

    /// `(west, east)` longitude bounds along the latitude line `latitude_deg`, or `None` when
    /// that line misses the disc.
    pub fn longitude_interval(&self, latitude_deg: f64) -> Option<(f64, f64)> {
        if !self.is_valid() {
            return None;
        }
        let d_lat = self.center.latitude_deg() - latitude_deg;
        if !(d_lat.abs() <= self.radius_deg) {
            return None;
        }
        let half_width = (self.radius_deg * self.radius_deg - d_lat * d_lat)
            .max(0.0)
            .sqrt();
        let lon = self.center.longitude_deg();
        Some((lon - half_width, lon + half_width))
    }

    /// Latitude rows (grid `lat_index` values) touched by the disc.
    pub fn row_range(&self, degrees_per_bucket: f64) -> Option<RangeInclusive<i64>> {
        if !self.is_valid() {
            return None;
        }
        let (south, north) = self.latitude_bounds();
        clamped_index_range(south, north, 90.0, degrees_per_bucket)
    }

    /// Longitude bounds within row `lat_index`, measured on the row's latitude closest to the
    /// center, where the disc is widest.
    pub fn row_longitude_interval(
        &self,
        lat_index: i64,
        degrees_per_bucket: f64,
    ) -> Option<(f64, f64)> {
        let row_south = lat_index as f64 * degrees_per_bucket;
        let row_north = row_south + degrees_per_bucket;
        let nearest = self.center.latitude_deg().max(row_south).min(row_north);
        self.longitude_interval(nearest)
    }

    /// `lon_index` values of row `lat_index` that can intersect the disc.
    pub fn lon_index_range(
        &self,
        lat_index: i64,
        degrees_per_bucket: f64,
    ) -> Option<RangeInclusive<i64>> {
        let (west, east) = self.row_longitude_interval(lat_index, degrees_per_bucket)?;
        clamped_index_range(west, east, 180.0, degrees_per_bucket)
    }

    /// Whether `coordinate` lies inside the disc (boundary included).
    pub fn contains(&self, coordinate: &GeographicCoordinate) -> bool {
        self.is_valid() && self.center.flat_distance_deg(coordinate) <= self.radius_deg
    }

    pub fn contains_row(&self, lat_index: i64, degrees_per_bucket: f64) -> bool {
        self.lon_index_range(lat_index, degrees_per_bucket).is_some()
    }

    /// Center coordinate of every grid cell that can intersect the disc, row by row.
    pub fn cell_centers(&self, degrees_per_bucket: f64) -> Vec<GeographicCoordinate> {
        let Some(rows) = self.row_range(degrees_per_bucket) else {
            return vec![];
        };
        let mut centers = Vec::new();
        for lat_index in rows {
            let Some(columns) = self.lon_index_range(lat_index, degrees_per_bucket) else {
                continue;
            };
            let lat = (lat_index as f64 + 0.5) * degrees_per_bucket;
            for lon_index in columns {
                let lon = (lon_index as f64 + 0.5) * degrees_per_bucket;
                if let Ok(center) = GeographicCoordinate::new(lat, lon) {
                    centers.push(center);
                }
            }
        }
        centers
    }

    fn is_valid(&self) -> bool {
        self.radius_deg.is_finite() && self.radius_deg >= 0.0
    }
}

/// Grid indices covering `[low, high]` degrees, cut to the axis range `[-limit, limit]`.
fn clamped_index_range(
    low: f64,
    high: f64,
    limit: f64,
    degrees_per_bucket: f64,
) -> Option<RangeInclusive<i64>> {
    let index = |degrees: f64| (degrees / degrees_per_bucket).floor() as i64;
    let first = index(low.max(-limit));
    let last = index(high.min(limit));
    (first <= last).then_some(first..=last)
}
