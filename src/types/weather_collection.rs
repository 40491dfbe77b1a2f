use crate::types::time_point::WeatherTimePoint;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Unstructured, insertion-ordered collection of time points.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WeatherCollection {
    points: Vec<WeatherTimePoint>,
}

impl WeatherCollection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, point: WeatherTimePoint) {
        self.points.push(point);
    }

    /// Appends every point of `other`.
    pub fn combine(&mut self, other: &WeatherCollection) {
        self.points.extend(other.points.iter().cloned());
    }

    pub fn iter(&self) -> std::slice::Iter<'_, WeatherTimePoint> {
        self.points.iter()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Earliest and latest point time, `None` when empty.
    pub fn time_bounds(&self) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
        let first = self.points.first()?.time();
        Some(self.points.iter().fold((first, first), |(lo, hi), p| {
            (lo.min(p.time()), hi.max(p.time()))
        }))
    }

    pub fn into_points(self) -> Vec<WeatherTimePoint> {
        self.points
    }
}

impl From<Vec<WeatherTimePoint>> for WeatherCollection {
    fn from(points: Vec<WeatherTimePoint>) -> Self {
        Self { points }
    }
}

impl FromIterator<WeatherTimePoint> for WeatherCollection {
    fn from_iter<I: IntoIterator<Item = WeatherTimePoint>>(iter: I) -> Self {
        Self {
            points: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for WeatherCollection {
    type Item = WeatherTimePoint;
    type IntoIter = std::vec::IntoIter<WeatherTimePoint>;

    fn into_iter(self) -> Self::IntoIter {
        self.points.into_iter()
    }
}

impl<'a> IntoIterator for &'a WeatherCollection {
    type Item = &'a WeatherTimePoint;
    type IntoIter = std::slice::Iter<'a, WeatherTimePoint>;

    fn into_iter(self) -> Self::IntoIter {
        self.points.iter()
    }
}
