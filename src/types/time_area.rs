//! Hour-grouped views over time points: one instant across an area, and a run of those.

use crate::types::coordinate::GeographicCoordinate;
use crate::types::time_point::WeatherTimePoint;
use crate::types::time_span::TimeSpan;
use crate::types::weather_collection::WeatherCollection;
use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

/// Weather at one hour across multiple points.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherTimeArea {
    pub time: DateTime<Utc>,
    pub points: Vec<WeatherTimePoint>,
}

impl WeatherTimeArea {
    pub fn new(time: DateTime<Utc>) -> Self {
        Self {
            time,
            points: Vec::new(),
        }
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
}

/// Weather over a span of time across multiple points, one [`WeatherTimeArea`] per hour,
/// hours ascending.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherTimespanArea {
    pub span: TimeSpan,
    pub areas: Vec<WeatherTimeArea>,
    /// Coordinates whose coverage of `span` was still incomplete when the result was built.
    pub incomplete: Vec<GeographicCoordinate>,
}

impl WeatherTimespanArea {
    /// One empty area for every hour of `span`.
    pub fn empty(span: TimeSpan) -> Self {
        Self {
            span,
            areas: span.hours().map(WeatherTimeArea::new).collect(),
            incomplete: Vec::new(),
        }
    }

    /// Buckets an unstructured collection into hours counted from its earliest point.
    /// Returns `None` for an empty collection.
    pub fn from_collection(collection: &WeatherCollection) -> Option<Self> {
        let (first, last) = collection.time_bounds()?;
        let hour_count = (last - first).num_seconds() / 3600 + 1;
        let end = first.checked_add_signed(TimeDelta::hours(hour_count))?;
        let span = TimeSpan::new(first, end).ok()?;
        let mut area = Self::empty(span);
        for point in collection {
            let index = (point.time() - first).num_seconds() / 3600;
            if let Some(slot) = usize::try_from(index)
                .ok()
                .and_then(|i| area.areas.get_mut(i))
            {
                slot.points.push(point.clone());
            }
        }
        Some(area)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, WeatherTimeArea> {
        self.areas.iter()
    }

    pub fn len(&self) -> usize {
        self.areas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.areas.is_empty()
    }

    /// True when every requested coordinate had full coverage.
    pub fn is_complete(&self) -> bool {
        self.incomplete.is_empty()
    }

    /// All points, hour by hour.
    pub fn points(&self) -> impl Iterator<Item = &WeatherTimePoint> {
        self.areas.iter().flat_map(|area| area.points.iter())
    }

    pub fn point_count(&self) -> usize {
        self.areas.iter().map(WeatherTimeArea::len).sum()
    }
}

impl IntoIterator for WeatherTimespanArea {
    type Item = WeatherTimeArea;
    type IntoIter = std::vec::IntoIter<WeatherTimeArea>;

    fn into_iter(self) -> Self::IntoIter {
        self.areas.into_iter()
    }
}

impl<'a> IntoIterator for &'a WeatherTimespanArea {
    type Item = &'a WeatherTimeArea;
    type IntoIter = std::slice::Iter<'a, WeatherTimeArea>;

    fn into_iter(self) -> Self::IntoIter {
        self.areas.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn point(hour: u32, minute: u32, lat: f64) -> WeatherTimePoint {
        WeatherTimePoint::new(
            Utc.with_ymd_and_hms(2021, 1, 1, hour, minute, 0).unwrap(),
            GeographicCoordinate::new(lat, 0.0).unwrap(),
            vec![],
        )
    }

    #[test]
    fn test_from_collection_groups_by_hour() {
        let collection: WeatherCollection = vec![
            point(2, 0, 1.0),
            point(0, 0, 1.0),
            point(0, 0, 2.0),
            point(2, 30, 2.0),
        ]
        .into();
        let area = WeatherTimespanArea::from_collection(&collection).unwrap();
        assert_eq!(area.len(), 3);
        assert_eq!(area.areas[0].len(), 2);
        assert!(area.areas[1].is_empty());
        assert_eq!(area.areas[2].len(), 2);
        assert_eq!(area.point_count(), 4);
    }

    #[test]
    fn test_from_empty_collection() {
        assert!(WeatherTimespanArea::from_collection(&WeatherCollection::new()).is_none());
    }
}
