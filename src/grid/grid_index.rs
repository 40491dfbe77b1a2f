//! Lazily populated mapping from grid cells to their [`Bucket`]s.
//!
//! Cells are ordered by `(lat_index, lon_index)`, so one latitude row is a contiguous range
//! of the map and can be scanned left to right without materialising it.

use crate::grid::bucket::Bucket;
use crate::types::coordinate::GeographicCoordinate;
use crate::types::time_point::WeatherTimePoint;
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::ops::RangeInclusive;

/// Discretised cell of the grid: `floor(axis_deg / degrees_per_bucket)` on both axes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BucketKey {
    pub lat_index: i64,
    pub lon_index: i64,
}

impl fmt::Display for BucketKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}]", self.lat_index, self.lon_index)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridIndex {
    degrees_per_bucket: f64,
    epsilon_secs: f64,
    buckets: BTreeMap<BucketKey, Bucket>,
}

impl GridIndex {
    pub fn new(degrees_per_bucket: f64, epsilon_secs: f64) -> Self {
        Self {
            degrees_per_bucket,
            epsilon_secs,
            buckets: BTreeMap::new(),
        }
    }

    pub fn degrees_per_bucket(&self) -> f64 {
        self.degrees_per_bucket
    }

    /// Index of the row or column holding `degrees`.
    pub fn axis_index(&self, degrees: f64) -> i64 {
        (degrees / self.degrees_per_bucket).floor() as i64
    }

    pub fn bucket_key(&self, coordinate: &GeographicCoordinate) -> BucketKey {
        BucketKey {
            lat_index: self.axis_index(coordinate.latitude_deg()),
            lon_index: self.axis_index(coordinate.longitude_deg()),
        }
    }

    pub fn get(&self, key: &BucketKey) -> Option<&Bucket> {
        self.buckets.get(key)
    }

    pub fn get_or_create(&mut self, key: BucketKey) -> &mut Bucket {
        let epsilon_secs = self.epsilon_secs;
        self.buckets.entry(key).or_insert_with(|| {
            debug!("Creating bucket {}", key);
            Bucket::new(epsilon_secs)
        })
    }

    /// Buckets of one latitude row, ordered by `lon_index`.
    pub fn buckets_in_row(&self, lat_index: i64) -> impl Iterator<Item = (i64, &Bucket)> {
        self.buckets_in_row_range(lat_index, i64::MIN..=i64::MAX)
    }

    /// Buckets of one latitude row whose `lon_index` falls in `lon_range`.
    pub fn buckets_in_row_range(
        &self,
        lat_index: i64,
        lon_range: RangeInclusive<i64>,
    ) -> impl Iterator<Item = (i64, &Bucket)> {
        let from = BucketKey {
            lat_index,
            lon_index: *lon_range.start(),
        };
        let to = BucketKey {
            lat_index,
            lon_index: *lon_range.end(),
        };
        // BTreeMap::range panics on an inverted range
        (from <= to)
            .then(|| self.buckets.range(from..=to))
            .into_iter()
            .flatten()
            .map(|(key, bucket)| (key.lon_index, bucket))
    }

    /// Distinct populated latitude rows, ascending.
    pub fn rows(&self) -> Vec<i64> {
        let mut rows: Vec<i64> = self.buckets.keys().map(|key| key.lat_index).collect();
        rows.dedup();
        rows
    }

    pub fn iter(&self) -> impl Iterator<Item = (&BucketKey, &Bucket)> {
        self.buckets.iter()
    }

    /// Every stored point, bucket by bucket.
    pub fn points(&self) -> impl Iterator<Item = &WeatherTimePoint> {
        self.buckets.values().flat_map(|bucket| bucket.points().iter())
    }

    /// Number of populated buckets.
    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }
}
