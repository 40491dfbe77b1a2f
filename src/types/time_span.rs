use crate::error::WeatherStoreError;
use crate::types::into_instant_trait::IntoInstant;
use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A half-open time range `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TimeSpan {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

impl TimeSpan {
    /// Builds a span from anything convertible to an instant.
    ///
    /// # Errors
    ///
    /// Returns [`WeatherStoreError::NaiveTimestamp`] for timestamps without an offset and
    /// [`WeatherStoreError::InvalidTimeSpan`] when `start` is not before `end`.
    ///
    /// # Examples
    ///
    /// ```
    /// use meteogrid::TimeSpan;
    ///
    /// let span = TimeSpan::new("2021-01-01T02:00:00Z", "2021-01-01T04:00:00Z").unwrap();
    /// assert_eq!(span.hours().count(), 2);
    /// assert!(TimeSpan::new("2021-01-01T02:00:00", "2021-01-01T04:00:00Z").is_err());
    /// ```
    pub fn new(start: impl IntoInstant, end: impl IntoInstant) -> Result<Self, WeatherStoreError> {
        let start = start.into_instant()?;
        let end = end.into_instant()?;
        if start >= end {
            return Err(WeatherStoreError::InvalidTimeSpan { start, end });
        }
        Ok(Self { start, end })
    }

    /// Span of the single hour starting at `start`, or `None` past the representable range.
    pub fn hour_at(start: DateTime<Utc>) -> Option<Self> {
        let end = start.checked_add_signed(TimeDelta::hours(1))?;
        Some(Self { start, end })
    }

    /// The hour starting at `start`, cut off at this span's end. `None` unless `start` lies
    /// inside the span.
    pub fn hour_within(&self, start: DateTime<Utc>) -> Option<Self> {
        if !self.contains(start) {
            return None;
        }
        let end = start
            .checked_add_signed(TimeDelta::hours(1))
            .map_or(self.end, |end| end.min(self.end));
        Some(Self { start, end })
    }

    pub fn start(&self) -> DateTime<Utc> {
        self.start
    }

    pub fn end(&self) -> DateTime<Utc> {
        self.end
    }

    pub fn contains(&self, time: DateTime<Utc>) -> bool {
        self.start <= time && time < self.end
    }

    /// Hour starts `start, start + 1h, ...` strictly before `end`.
    pub fn hours(&self) -> impl Iterator<Item = DateTime<Utc>> {
        let end = self.end;
        std::iter::successors(Some(self.start), |t| t.checked_add_signed(TimeDelta::hours(1)))
            .take_while(move |t| *t < end)
    }
}

impl fmt::Display for TimeSpan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {})", self.start.to_rfc3339(), self.end.to_rfc3339())
    }
}
