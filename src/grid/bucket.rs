use crate::grid::coverage_set::CoverageSet;
use crate::types::coordinate::GeographicCoordinate;
use crate::types::store_config::epsilon_delta;
use crate::types::time_point::WeatherTimePoint;
use crate::types::time_span::TimeSpan;
use chrono::TimeDelta;
use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};

/// Storage for one grid cell: points sorted ascending by time plus the hours they cover.
///
/// Points with equal times keep their insertion order. A point whose coordinate and time
/// (within epsilon) match an existing one replaces it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bucket {
    points: Vec<WeatherTimePoint>,
    coverage: CoverageSet,
    epsilon_secs: f64,
}

impl Bucket {
    pub fn new(epsilon_secs: f64) -> Self {
        Self {
            points: Vec::new(),
            coverage: CoverageSet::new(epsilon_secs),
            epsilon_secs,
        }
    }

    /// Stores `point` and marks its hour as covered.
    ///
    /// With `overwrite` unset the call is a no-op when the hour is already covered, and
    /// `false` is returned.
    pub fn insert(&mut self, point: WeatherTimePoint, overwrite: bool) -> bool {
        let time = point.time();
        if !overwrite && self.coverage.contains(&time) {
            return false;
        }

        let eps = self.epsilon();
        let lo = self.points.partition_point(|p| p.time() < time - eps);
        let hi = self.points.partition_point(|p| p.time() <= time + eps);
        if let Some(offset) = self.points[lo..hi]
            .iter()
            .position(|p| p.coordinate() == point.coordinate())
        {
            self.points.remove(lo + offset);
        }

        let at = self.points.partition_point(|p| p.time() <= time);
        self.points.insert(at, point);
        self.coverage.mark(&time);
        true
    }

    /// The point inside `window` closest to `near`. Among equally close points the most
    /// recently inserted wins.
    pub fn record_at(
        &self,
        window: &TimeSpan,
        near: &GeographicCoordinate,
    ) -> Option<&WeatherTimePoint> {
        self.window(*window)
            .iter()
            .rev()
            .min_by_key(|p| OrderedFloat(p.coordinate().flat_distance_deg(near)))
    }

    /// Points whose time falls in `span`, ascending.
    pub fn records_in(&self, span: &TimeSpan) -> &[WeatherTimePoint] {
        self.window(*span)
    }

    pub fn points(&self) -> &[WeatherTimePoint] {
        &self.points
    }

    pub fn coverage(&self) -> &CoverageSet {
        &self.coverage
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    fn epsilon(&self) -> TimeDelta {
        epsilon_delta(self.epsilon_secs)
    }

    fn window(&self, span: TimeSpan) -> &[WeatherTimePoint] {
        let eps = self.epsilon();
        let lo = self.points.partition_point(|p| p.time() < span.start() - eps);
        let hi = self.points.partition_point(|p| p.time() < span.end() - eps);
        &self.points[lo..hi.max(lo)]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::weather_quantity::{WeatherEntry, WeatherQuantity};
    use chrono::{DateTime, TimeZone, Utc};

    fn hour(h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2021, 1, 1, h, 0, 0).unwrap()
    }

    fn hour_span(h: u32) -> TimeSpan {
        TimeSpan::hour_at(hour(h)).unwrap()
    }

    fn point(h: u32, lat: f64, value: f64) -> WeatherTimePoint {
        WeatherTimePoint::new(
            hour(h),
            GeographicCoordinate::new(lat, 0.0).unwrap(),
            vec![WeatherEntry::new(WeatherQuantity::new("TMAX"), value)],
        )
    }

    #[test]
    fn test_points_stay_sorted() {
        let mut bucket = Bucket::new(1.0);
        for h in [4, 1, 3, 0, 2] {
            assert!(bucket.insert(point(h, 0.01, h as f64), true));
        }
        let times: Vec<_> = bucket.points().iter().map(|p| p.time()).collect();
        assert_eq!(times, (0..5).map(hour).collect::<Vec<_>>());
        assert!(bucket
            .coverage()
            .covers(&TimeSpan::new(hour(0), hour(5)).unwrap()));
    }

    #[test]
    fn test_overwrite_replaces_same_coordinate() {
        let mut bucket = Bucket::new(1.0);
        bucket.insert(point(1, 0.01, 1.0), true);
        bucket.insert(point(1, 0.01, 2.0), true);
        assert_eq!(bucket.len(), 1);
        let near = GeographicCoordinate::new(0.01, 0.0).unwrap();
        let stored = bucket.record_at(&hour_span(1), &near).unwrap();
        assert_eq!(stored.value_of(&WeatherQuantity::new("TMAX")), Some(2.0));
    }

    #[test]
    fn test_no_overwrite_keeps_first_write() {
        let mut bucket = Bucket::new(1.0);
        assert!(bucket.insert(point(1, 0.01, 1.0), false));
        assert!(!bucket.insert(point(1, 0.01, 2.0), false));
        // covered hour also blocks a different coordinate in the same cell
        assert!(!bucket.insert(point(1, 0.02, 3.0), false));
        assert_eq!(bucket.len(), 1);
        assert_eq!(bucket.points()[0].value_of(&WeatherQuantity::new("TMAX")), Some(1.0));
    }

    #[test]
    fn test_record_at_prefers_nearest_coordinate() {
        let mut bucket = Bucket::new(1.0);
        bucket.insert(point(2, 0.01, 1.0), true);
        bucket.insert(point(2, 0.05, 5.0), true);
        let near = GeographicCoordinate::new(0.049, 0.0).unwrap();
        let found = bucket.record_at(&hour_span(2), &near).unwrap();
        assert_eq!(found.value_of(&WeatherQuantity::new("TMAX")), Some(5.0));
        assert!(bucket.record_at(&hour_span(3), &near).is_none());
    }

    #[test]
    fn test_record_at_respects_window_end() {
        let mut bucket = Bucket::new(1.0);
        bucket.insert(point(1, 0.01, 1.0), true);
        let near = GeographicCoordinate::new(0.01, 0.0).unwrap();
        let half_hour = TimeSpan::new(hour(0) + TimeDelta::minutes(30), hour(1)).unwrap();
        assert!(bucket.record_at(&half_hour, &near).is_none());
        let wider = TimeSpan::new(hour(0) + TimeDelta::minutes(30), hour(2)).unwrap();
        assert!(bucket.record_at(&wider, &near).is_some());
    }

    #[test]
    fn test_records_in_span() {
        let mut bucket = Bucket::new(1.0);
        for h in 0..6 {
            bucket.insert(point(h, 0.01, h as f64), true);
        }
        let span = TimeSpan::new(hour(2), hour(4)).unwrap();
        let selected: Vec<_> = bucket.records_in(&span).iter().map(|p| p.time()).collect();
        assert_eq!(selected, vec![hour(2), hour(3)]);
    }
}
