//! The record type stored by the grid: every measured quantity at one place and instant.

use crate::error::WeatherStoreError;
use crate::types::coordinate::GeographicCoordinate;
use crate::types::into_instant_trait::IntoInstant;
use crate::types::weather_quantity::{WeatherEntry, WeatherQuantity};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Weather data at a certain time and location.
///
/// Immutable once built. [`WeatherTimePoint::combine`] yields a new point instead of mutating.
///
/// # Examples
///
/// ```
/// use meteogrid::{GeographicCoordinate, WeatherEntry, WeatherQuantity, WeatherTimePoint};
///
/// let point = WeatherTimePoint::parse(
///     "2021-01-01T00:00:00Z",
///     GeographicCoordinate::new(36.17, -115.14).unwrap(),
///     vec![WeatherEntry::new(WeatherQuantity::new("TMAX"), 12.5)],
/// )
/// .unwrap();
/// assert_eq!(point.value_of(&WeatherQuantity::new("TMAX")), Some(12.5));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherTimePoint {
    time: DateTime<Utc>,
    coordinate: GeographicCoordinate,
    entries: Vec<WeatherEntry>,
}

impl WeatherTimePoint {
    pub fn new(
        time: DateTime<Utc>,
        coordinate: GeographicCoordinate,
        entries: Vec<WeatherEntry>,
    ) -> Self {
        Self {
            time,
            coordinate,
            entries,
        }
    }

    /// Like [`Self::new`] but accepts any timestamp form; naive timestamps are rejected.
    pub fn parse(
        time: impl IntoInstant,
        coordinate: GeographicCoordinate,
        entries: Vec<WeatherEntry>,
    ) -> Result<Self, WeatherStoreError> {
        Ok(Self::new(time.into_instant()?, coordinate, entries))
    }

    pub fn time(&self) -> DateTime<Utc> {
        self.time
    }

    pub fn coordinate(&self) -> &GeographicCoordinate {
        &self.coordinate
    }

    pub fn entries(&self) -> &[WeatherEntry] {
        &self.entries
    }

    /// First value recorded for `quantity`, if any.
    pub fn value_of(&self, quantity: &WeatherQuantity) -> Option<f64> {
        self.entries
            .iter()
            .find(|entry| &entry.quantity == quantity)
            .map(|entry| entry.value)
    }

    /// New point with `other`'s entries appended. Time and coordinate are taken from `self`.
    pub fn combine(&self, other: &WeatherTimePoint) -> WeatherTimePoint {
        let mut entries = self.entries.clone();
        entries.extend(other.entries.iter().cloned());
        Self {
            time: self.time,
            coordinate: self.coordinate,
            entries,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn point(time: &str, entries: Vec<(&str, f64)>) -> WeatherTimePoint {
        WeatherTimePoint::parse(
            time,
            GeographicCoordinate::new(1.0, 2.0).unwrap(),
            entries
                .into_iter()
                .map(|(id, v)| WeatherEntry::new(WeatherQuantity::new(id), v))
                .collect(),
        )
        .unwrap()
    }

    #[test]
    fn test_combine_concatenates_entries() {
        let a = point("2021-01-01T00:00:00Z", vec![("TMAX", 10.0)]);
        let b = point("2021-01-01T00:00:00Z", vec![("TMIN", 2.0), ("PRCP", 0.3)]);
        let combined = a.combine(&b);
        assert_eq!(combined.entries().len(), 3);
        assert_eq!(combined.entries()[0].quantity.identifier(), "TMAX");
        assert_eq!(combined.value_of(&WeatherQuantity::new("PRCP")), Some(0.3));
        // originals untouched
        assert_eq!(a.entries().len(), 1);
    }

    #[test]
    fn test_parse_rejects_naive_time() {
        let result = WeatherTimePoint::parse(
            "2021-01-01T00:00:00",
            GeographicCoordinate::new(1.0, 2.0).unwrap(),
            vec![],
        );
        assert!(matches!(result, Err(WeatherStoreError::NaiveTimestamp(_))));
    }
}
