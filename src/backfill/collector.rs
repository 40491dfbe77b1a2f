//! The external data source consulted when the grid has gaps.

use crate::backfill::error::CollectorError;
use crate::types::coordinate::GeographicCoordinate;
use crate::types::time_point::WeatherTimePoint;
use crate::types::time_span::TimeSpan;
use crate::types::weather_collection::WeatherCollection;
use crate::types::weather_quantity::{WeatherEntry, WeatherQuantity};
use futures_util::future::BoxFuture;
use futures_util::FutureExt;

/// What a collector is asked for during backfill.
#[derive(Debug, Clone, PartialEq)]
pub struct CollectRequest {
    pub coordinates: Vec<GeographicCoordinate>,
    pub span: TimeSpan,
    pub quantities: Vec<WeatherQuantity>,
}

/// Source of weather time points for coordinates the store does not cover yet.
///
/// Implementations decide how data is obtained (HTTP API, file, fixture). Each returned
/// point must carry the coordinate it was requested for.
pub trait WeatherCollector: Send + Sync {
    fn fetch<'a>(
        &'a self,
        request: &'a CollectRequest,
    ) -> BoxFuture<'a, Result<Vec<WeatherTimePoint>, CollectorError>>;
}

/// Serves requests from an in-memory [`WeatherCollection`], e.g. one loaded from disk.
///
/// Points are returned when their coordinate equals a requested one and their time falls in
/// the requested span. Entries are narrowed to the requested quantities unless none were
/// requested.
#[derive(Debug, Clone, Default)]
pub struct CollectionCollector {
    collection: WeatherCollection,
}

impl CollectionCollector {
    pub fn new(collection: WeatherCollection) -> Self {
        Self { collection }
    }

    pub fn collection(&self) -> &WeatherCollection {
        &self.collection
    }

    fn select(&self, request: &CollectRequest) -> Vec<WeatherTimePoint> {
        self.collection
            .iter()
            .filter(|p| request.span.contains(p.time()))
            .filter(|p| request.coordinates.contains(p.coordinate()))
            .map(|p| {
                if request.quantities.is_empty() {
                    return p.clone();
                }
                let entries: Vec<WeatherEntry> = p
                    .entries()
                    .iter()
                    .filter(|e| request.quantities.contains(&e.quantity))
                    .cloned()
                    .collect();
                WeatherTimePoint::new(p.time(), *p.coordinate(), entries)
            })
            .collect()
    }
}

impl WeatherCollector for CollectionCollector {
    fn fetch<'a>(
        &'a self,
        request: &'a CollectRequest,
    ) -> BoxFuture<'a, Result<Vec<WeatherTimePoint>, CollectorError>> {
        async move { Ok(self.select(request)) }.boxed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn point(hour: u32, lat: f64) -> WeatherTimePoint {
        WeatherTimePoint::new(
            Utc.with_ymd_and_hms(2021, 1, 1, hour, 0, 0).unwrap(),
            GeographicCoordinate::new(lat, 0.0).unwrap(),
            vec![
                WeatherEntry::new(WeatherQuantity::new("TMAX"), 10.0),
                WeatherEntry::new(WeatherQuantity::new("PRCP"), 0.5),
            ],
        )
    }

    #[tokio::test]
    async fn test_collection_collector_filters() {
        let collector = CollectionCollector::new(
            vec![point(0, 1.0), point(1, 1.0), point(2, 1.0), point(1, 2.0)].into(),
        );
        let request = CollectRequest {
            coordinates: vec![GeographicCoordinate::new(1.0, 0.0).unwrap()],
            span: TimeSpan::new("2021-01-01T01:00:00Z", "2021-01-01T03:00:00Z").unwrap(),
            quantities: vec![WeatherQuantity::new("PRCP")],
        };
        let points = collector.fetch(&request).await.unwrap();
        assert_eq!(points.len(), 2);
        assert!(points.iter().all(|p| p.entries().len() == 1));
        assert_eq!(points[0].value_of(&WeatherQuantity::new("PRCP")), Some(0.5));
    }

    #[tokio::test]
    async fn test_collection_collector_keeps_all_entries_without_filter() {
        let collector = CollectionCollector::new(vec![point(0, 1.0)].into());
        let request = CollectRequest {
            coordinates: vec![GeographicCoordinate::new(1.0, 0.0).unwrap()],
            span: TimeSpan::new("2021-01-01T00:00:00Z", "2021-01-01T01:00:00Z").unwrap(),
            quantities: vec![],
        };
        let points = collector.fetch(&request).await.unwrap();
        assert_eq!(points[0].entries().len(), 2);
    }
}
