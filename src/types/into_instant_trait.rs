use crate::error::WeatherStoreError;
use chrono::{DateTime, FixedOffset, Local, NaiveDate, NaiveDateTime, Utc};

/// Converts a timestamp into an unambiguous UTC instant.
///
/// Anything that carries a timezone or offset converts; naive values are rejected with
/// [`WeatherStoreError::NaiveTimestamp`].
pub trait IntoInstant {
    fn into_instant(self) -> Result<DateTime<Utc>, WeatherStoreError>;
}

impl IntoInstant for DateTime<Utc> {
    fn into_instant(self) -> Result<DateTime<Utc>, WeatherStoreError> {
        Ok(self)
    }
}

impl IntoInstant for DateTime<FixedOffset> {
    fn into_instant(self) -> Result<DateTime<Utc>, WeatherStoreError> {
        Ok(self.with_timezone(&Utc))
    }
}

impl IntoInstant for DateTime<Local> {
    fn into_instant(self) -> Result<DateTime<Utc>, WeatherStoreError> {
        Ok(self.with_timezone(&Utc))
    }
}

impl IntoInstant for NaiveDateTime {
    fn into_instant(self) -> Result<DateTime<Utc>, WeatherStoreError> {
        Err(WeatherStoreError::NaiveTimestamp(self.to_string()))
    }
}

impl IntoInstant for &str {
    fn into_instant(self) -> Result<DateTime<Utc>, WeatherStoreError> {
        if let Ok(dt) = DateTime::parse_from_rfc3339(self) {
            return dt.into_instant();
        }
        if let Ok(dt) = DateTime::parse_from_str(self, "%Y-%m-%d %H:%M:%S%z") {
            return dt.into_instant();
        }
        let looks_naive = NaiveDateTime::parse_from_str(self, "%Y-%m-%dT%H:%M:%S").is_ok()
            || NaiveDateTime::parse_from_str(self, "%Y-%m-%dT%H:%M").is_ok()
            || NaiveDateTime::parse_from_str(self, "%Y-%m-%d %H:%M:%S").is_ok()
            || NaiveDate::parse_from_str(self, "%Y-%m-%d").is_ok();
        if looks_naive {
            Err(WeatherStoreError::NaiveTimestamp(self.to_string()))
        } else {
            Err(WeatherStoreError::UnparseableTimestamp(self.to_string()))
        }
    }
}

impl IntoInstant for String {
    fn into_instant(self) -> Result<DateTime<Utc>, WeatherStoreError> {
        self.as_str().into_instant()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_offset_values_convert_to_utc() {
        let expected = Utc.with_ymd_and_hms(2021, 1, 1, 2, 0, 0).unwrap();
        assert_eq!("2021-01-01T02:00:00Z".into_instant().unwrap(), expected);
        assert_eq!(
            "2021-01-01T04:00:00+02:00".into_instant().unwrap(),
            expected
        );
        let fixed = FixedOffset::west_opt(3600)
            .unwrap()
            .with_ymd_and_hms(2021, 1, 1, 1, 0, 0)
            .unwrap();
        assert_eq!(fixed.into_instant().unwrap(), expected);
    }

    #[test]
    fn test_naive_values_are_rejected() {
        assert!(matches!(
            "2021-01-01T02:00:00".into_instant(),
            Err(WeatherStoreError::NaiveTimestamp(_))
        ));
        assert!(matches!(
            String::from("2021-01-01").into_instant(),
            Err(WeatherStoreError::NaiveTimestamp(_))
        ));
        let naive = NaiveDate::from_ymd_opt(2021, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        assert!(matches!(
            naive.into_instant(),
            Err(WeatherStoreError::NaiveTimestamp(_))
        ));
    }

    #[test]
    fn test_garbage_is_unparseable() {
        assert!(matches!(
            "yesterday".into_instant(),
            Err(WeatherStoreError::UnparseableTimestamp(_))
        ));
    }
}
