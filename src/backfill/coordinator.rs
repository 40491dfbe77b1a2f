use crate::backfill::collector::{CollectRequest, WeatherCollector};
use crate::backfill::error::CollectorError;
use crate::grid::grid_index::{BucketKey, GridIndex};
use crate::types::coordinate::GeographicCoordinate;
use crate::types::time_point::WeatherTimePoint;
use crate::types::time_span::TimeSpan;
use crate::types::weather_quantity::WeatherQuantity;
use log::{debug, info, warn};
use std::collections::HashSet;

/// Requested coordinates split by whether their bucket already covers the span.
/// Both lists keep the caller's order and hold each coordinate once.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BackfillPlan {
    pub satisfied: Vec<GeographicCoordinate>,
    pub missing: Vec<GeographicCoordinate>,
}

impl BackfillPlan {
    pub fn is_complete(&self) -> bool {
        self.missing.is_empty()
    }
}

/// Finds coverage gaps and fetches what is needed to close them.
#[derive(Debug, Clone)]
pub struct BackfillCoordinator {
    quantities: Vec<WeatherQuantity>,
}

impl BackfillCoordinator {
    pub fn new(quantities: Vec<WeatherQuantity>) -> Self {
        Self { quantities }
    }

    pub fn quantities(&self) -> &[WeatherQuantity] {
        &self.quantities
    }

    pub fn plan(
        &self,
        grid: &GridIndex,
        coordinates: &[GeographicCoordinate],
        span: &TimeSpan,
    ) -> BackfillPlan {
        let mut plan = BackfillPlan::default();
        for coordinate in coordinates {
            if plan.satisfied.contains(coordinate) || plan.missing.contains(coordinate) {
                continue;
            }
            let covered = grid
                .get(&grid.bucket_key(coordinate))
                .is_some_and(|bucket| bucket.coverage().covers(span));
            if covered {
                plan.satisfied.push(*coordinate);
            } else {
                plan.missing.push(*coordinate);
            }
        }
        debug!(
            "Coverage plan for {}: {} satisfied, {} missing",
            span,
            plan.satisfied.len(),
            plan.missing.len()
        );
        plan
    }

    /// Asks `collector` for `missing` over `span` and checks every returned point before
    /// handing them back. Nothing is registered here, so a failure leaves the grid untouched.
    pub async fn fetch(
        &self,
        collector: &dyn WeatherCollector,
        grid: &GridIndex,
        missing: &[GeographicCoordinate],
        span: &TimeSpan,
    ) -> Result<Vec<WeatherTimePoint>, CollectorError> {
        if missing.is_empty() {
            return Ok(vec![]);
        }
        let request = CollectRequest {
            coordinates: missing.to_vec(),
            span: *span,
            quantities: self.quantities.clone(),
        };

        let points = collector.fetch(&request).await.inspect_err(|e| {
            warn!(
                "Collector failed for {} coordinates over {}: {}",
                missing.len(),
                span,
                e
            )
        })?;

        let requested: HashSet<BucketKey> = missing.iter().map(|c| grid.bucket_key(c)).collect();
        for point in &points {
            let coordinate = point.coordinate();
            if coordinate.validate().is_err() {
                return Err(CollectorError::MalformedPoint {
                    latitude_deg: coordinate.latitude_deg(),
                    longitude_deg: coordinate.longitude_deg(),
                    reason: "coordinate out of range".to_string(),
                });
            }
            if !requested.contains(&grid.bucket_key(coordinate)) {
                return Err(CollectorError::UnrequestedCoordinate {
                    latitude_deg: coordinate.latitude_deg(),
                    longitude_deg: coordinate.longitude_deg(),
                });
            }
        }

        info!(
            "Collector returned {} points for {} coordinates over {}",
            points.len(),
            missing.len(),
            span
        );
        Ok(points)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::weather_quantity::WeatherEntry;
    use chrono::{TimeZone, Utc};
    use futures_util::future::BoxFuture;
    use futures_util::FutureExt;

    struct FixedCollector(Vec<WeatherTimePoint>);

    impl WeatherCollector for FixedCollector {
        fn fetch<'a>(
            &'a self,
            _request: &'a CollectRequest,
        ) -> BoxFuture<'a, Result<Vec<WeatherTimePoint>, CollectorError>> {
            async move { Ok(self.0.clone()) }.boxed()
        }
    }

    fn coord(lat: f64, lon: f64) -> GeographicCoordinate {
        GeographicCoordinate::new(lat, lon).unwrap()
    }

    fn span() -> TimeSpan {
        TimeSpan::new("2021-01-01T00:00:00Z", "2021-01-01T02:00:00Z").unwrap()
    }

    fn point_at(c: GeographicCoordinate, hour: u32) -> WeatherTimePoint {
        WeatherTimePoint::new(
            Utc.with_ymd_and_hms(2021, 1, 1, hour, 0, 0).unwrap(),
            c,
            vec![WeatherEntry::new(WeatherQuantity::new("TMAX"), 1.0)],
        )
    }

    #[test]
    fn test_plan_partitions_and_dedups() {
        let mut grid = GridIndex::new(1.0, 1.0);
        let covered = coord(0.5, 0.5);
        let partial = coord(5.5, 5.5);
        let key = grid.bucket_key(&covered);
        grid.get_or_create(key).insert(point_at(covered, 0), true);
        grid.get_or_create(key).insert(point_at(covered, 1), true);
        let key = grid.bucket_key(&partial);
        grid.get_or_create(key).insert(point_at(partial, 0), true);

        let absent = coord(10.5, 10.5);
        let coordinator = BackfillCoordinator::new(vec![]);
        let plan = coordinator.plan(&grid, &[absent, covered, partial, absent], &span());
        assert_eq!(plan.satisfied, vec![covered]);
        assert_eq!(plan.missing, vec![absent, partial]);
        assert!(!plan.is_complete());
    }

    #[tokio::test]
    async fn test_fetch_rejects_points_outside_requested_cells() {
        let grid = GridIndex::new(1.0, 1.0);
        let wanted = coord(0.5, 0.5);
        let stray = coord(3.5, 3.5);
        let collector = FixedCollector(vec![point_at(wanted, 0), point_at(stray, 0)]);
        let coordinator = BackfillCoordinator::new(vec![]);
        let result = coordinator.fetch(&collector, &grid, &[wanted], &span()).await;
        assert!(matches!(
            result,
            Err(CollectorError::UnrequestedCoordinate { .. })
        ));
    }

    #[tokio::test]
    async fn test_fetch_skips_collector_when_nothing_missing() {
        let grid = GridIndex::new(1.0, 1.0);
        let collector = FixedCollector(vec![point_at(coord(50.5, 50.5), 0)]);
        let coordinator = BackfillCoordinator::new(vec![]);
        let points = coordinator.fetch(&collector, &grid, &[], &span()).await.unwrap();
        assert!(points.is_empty());
    }
}
