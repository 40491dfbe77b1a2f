//! Union of disjoint half-open time intervals marking which hours already hold data.
//!
//! Times are kept as fractional seconds since the epoch. Every comparison is widened by the
//! set's epsilon so that float rounding of timestamps does not open artificial gaps.

use crate::types::time_span::TimeSpan;
use chrono::{DateTime, Utc};
use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

const SECONDS_PER_HOUR: f64 = 3600.0;

pub(crate) fn epoch_seconds(time: &DateTime<Utc>) -> f64 {
    time.timestamp() as f64 + f64::from(time.timestamp_subsec_nanos()) * 1e-9
}

fn from_epoch_seconds(seconds: f64) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp_micros((seconds * 1_000_000.0).round() as i64)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoverageSet {
    /// start -> end, disjoint and never within `epsilon` of each other.
    intervals: BTreeMap<OrderedFloat<f64>, f64>,
    epsilon: f64,
}

impl CoverageSet {
    pub fn new(epsilon_secs: f64) -> Self {
        Self {
            intervals: BTreeMap::new(),
            epsilon: epsilon_secs,
        }
    }

    /// Marks `[time, time + 1h)` as covered.
    pub fn mark(&mut self, time: &DateTime<Utc>) {
        let start = epoch_seconds(time);
        self.insert_interval(start, start + SECONDS_PER_HOUR);
    }

    /// Whether `time` falls inside a covered interval. The end is pulled in by epsilon so an
    /// instant sitting on the boundary belongs to the next, uncovered hour.
    pub fn contains(&self, time: &DateTime<Utc>) -> bool {
        let t = epoch_seconds(time);
        self.interval_holding(t)
            .is_some_and(|(_, end)| t < end - self.epsilon)
    }

    /// Whether the whole of `span` lies inside a single covered interval.
    pub fn covers(&self, span: &TimeSpan) -> bool {
        let start = epoch_seconds(&span.start());
        let end = epoch_seconds(&span.end());
        self.interval_holding(start)
            .is_some_and(|(_, covered_end)| end <= covered_end + self.epsilon)
    }

    /// Merges every interval of `other` into `self`.
    pub fn union(&mut self, other: &CoverageSet) {
        for (start, end) in &other.intervals {
            self.insert_interval(start.into_inner(), *end);
        }
    }

    /// Sub-ranges of `span` that are not covered, in ascending order.
    pub fn gaps(&self, span: &TimeSpan) -> Vec<(DateTime<Utc>, DateTime<Utc>)> {
        let span_start = epoch_seconds(&span.start());
        let span_end = epoch_seconds(&span.end());

        let mut raw = Vec::new();
        let mut cursor = span_start;
        let lower = self
            .interval_holding(span_start)
            .map(|(start, _)| start)
            .unwrap_or(span_start);
        for (start, end) in self.intervals.range(OrderedFloat(lower)..) {
            let start = start.into_inner();
            if start - self.epsilon >= span_end {
                break;
            }
            if start - self.epsilon > cursor {
                raw.push((cursor, start));
            }
            cursor = cursor.max(*end);
        }
        if cursor + self.epsilon < span_end {
            raw.push((cursor, span_end));
        }

        raw.into_iter()
            .filter_map(|(s, e)| Some((from_epoch_seconds(s)?, from_epoch_seconds(e)?)))
            .collect()
    }

    /// Covered intervals as `(start, end)` pairs, ascending.
    pub fn intervals(&self) -> impl Iterator<Item = (DateTime<Utc>, DateTime<Utc>)> + '_ {
        self.intervals.iter().filter_map(|(start, end)| {
            Some((
                from_epoch_seconds(start.into_inner())?,
                from_epoch_seconds(*end)?,
            ))
        })
    }

    pub fn len(&self) -> usize {
        self.intervals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.intervals.is_empty()
    }

    /// Last interval starting at or before `t + epsilon`.
    fn interval_holding(&self, t: f64) -> Option<(f64, f64)> {
        self.intervals
            .range(..=OrderedFloat(t + self.epsilon))
            .next_back()
            .map(|(start, end)| (start.into_inner(), *end))
    }

    fn insert_interval(&mut self, mut start: f64, mut end: f64) {
        if let Some((prev_start, prev_end)) = self.interval_holding(start) {
            if prev_end + self.epsilon >= start {
                self.intervals.remove(&OrderedFloat(prev_start));
                start = start.min(prev_start);
                end = end.max(prev_end);
            }
        }

        let absorbed: Vec<OrderedFloat<f64>> = self
            .intervals
            .range(OrderedFloat(start)..=OrderedFloat(end + self.epsilon))
            .map(|(key, _)| *key)
            .collect();
        for key in absorbed {
            if let Some(next_end) = self.intervals.remove(&key) {
                end = end.max(next_end);
            }
        }

        self.intervals.insert(OrderedFloat(start), end);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn hour(h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2021, 1, 1, h, 0, 0).unwrap()
    }

    fn span(from: u32, to: u32) -> TimeSpan {
        TimeSpan::new(hour(from), hour(to)).unwrap()
    }

    #[test]
    fn test_adjacent_hours_merge() {
        let mut set = CoverageSet::new(1.0);
        set.mark(&hour(0));
        set.mark(&hour(2));
        assert_eq!(set.len(), 2);
        set.mark(&hour(1));
        assert_eq!(set.len(), 1);
        assert!(set.covers(&span(0, 3)));
        assert!(!set.covers(&span(0, 4)));
    }

    #[test]
    fn test_out_of_order_marks_and_duplicates() {
        let mut set = CoverageSet::new(1.0);
        for h in [5, 3, 4, 3, 5, 1] {
            set.mark(&hour(h));
        }
        let intervals: Vec<_> = set.intervals().collect();
        assert_eq!(intervals, vec![(hour(1), hour(2)), (hour(3), hour(6))]);
        assert!(set.contains(&hour(1)));
        assert!(!set.contains(&hour(2)));
        assert!(set.contains(&(hour(5) + chrono::TimeDelta::minutes(59))));
    }

    #[test]
    fn test_epsilon_absorbs_rounding() {
        let mut set = CoverageSet::new(1.0);
        set.mark(&hour(0));
        // a timestamp that lands a fraction of a second past the hour
        set.mark(&(hour(1) + chrono::TimeDelta::milliseconds(300)));
        assert_eq!(set.len(), 1);
        assert!(set.covers(&span(0, 2)));
    }

    #[test]
    fn test_covers_requires_single_interval() {
        let mut set = CoverageSet::new(1.0);
        set.mark(&hour(0));
        set.mark(&hour(2));
        assert!(!set.covers(&span(0, 3)));
        assert!(set.covers(&span(2, 3)));
        assert!(!CoverageSet::new(1.0).covers(&span(0, 1)));
    }

    #[test]
    fn test_union() {
        let mut a = CoverageSet::new(1.0);
        a.mark(&hour(0));
        let mut b = CoverageSet::new(1.0);
        b.mark(&hour(1));
        b.mark(&hour(4));
        a.union(&b);
        assert_eq!(a.len(), 2);
        assert!(a.covers(&span(0, 2)));
        assert!(a.contains(&hour(4)));
    }

    #[test]
    fn test_gaps() {
        let mut set = CoverageSet::new(1.0);
        set.mark(&hour(1));
        set.mark(&hour(3));
        let gaps = set.gaps(&span(0, 5));
        assert_eq!(
            gaps,
            vec![(hour(0), hour(1)), (hour(2), hour(3)), (hour(4), hour(5))]
        );
        assert!(set.gaps(&span(1, 2)).is_empty());
        assert_eq!(CoverageSet::new(1.0).gaps(&span(0, 1)), vec![(hour(0), hour(1))]);
    }
}
