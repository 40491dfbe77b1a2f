use crate::error::WeatherStoreError;
use crate::types::coordinate::MILES_PER_LATITUDE_DEGREE;
use crate::types::weather_quantity::WeatherQuantity;
use bon::Builder;
use chrono::TimeDelta;
use serde::{Deserialize, Serialize};

/// Default edge length of a grid cell, in miles.
pub const DEFAULT_BUCKET_SIZE_MILES: f64 = 5.0;

/// Default slack applied to time comparisons, in seconds.
pub const DEFAULT_TIME_EPSILON_SECS: f64 = 1.0;

pub(crate) fn epsilon_delta(epsilon_secs: f64) -> TimeDelta {
    TimeDelta::microseconds((epsilon_secs * 1_000_000.0) as i64)
}

/// Tunables of a [`crate::WeatherStore`]. Stores with different configurations can coexist.
///
/// Built through [`StoreConfig::builder`], whose `build` rejects values that would break the
/// grid: sizes must be finite and positive, the time epsilon finite and non-negative.
///
/// # Examples
///
/// ```
/// use meteogrid::StoreConfig;
///
/// let config = StoreConfig::builder().bucket_size_miles(10.0).build().unwrap();
/// assert_eq!(config.miles_per_degree(), 69.0);
/// assert!((config.degrees_per_bucket() - 10.0 / 69.0).abs() < 1e-12);
///
/// assert!(StoreConfig::builder().bucket_size_miles(0.0).build().is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Builder)]
#[builder(finish_fn(vis = "", name = build_unchecked))]
pub struct StoreConfig {
    /// Miles per degree, used for both latitude and longitude.
    #[builder(default = MILES_PER_LATITUDE_DEGREE)]
    miles_per_degree: f64,
    #[builder(default = DEFAULT_BUCKET_SIZE_MILES)]
    bucket_size_miles: f64,
    #[builder(default = DEFAULT_TIME_EPSILON_SECS)]
    time_epsilon_secs: f64,
    /// Quantities asked of the collector during backfill.
    #[builder(default = WeatherQuantity::default_hourly())]
    quantities: Vec<WeatherQuantity>,
}

impl<S: store_config_builder::IsComplete> StoreConfigBuilder<S> {
    /// Finishes the builder.
    ///
    /// # Errors
    ///
    /// Returns [`WeatherStoreError::InvalidConfig`] for a non-positive or non-finite
    /// `miles_per_degree` or `bucket_size_miles`, and for a negative or non-finite
    /// `time_epsilon_secs`.
    pub fn build(self) -> Result<StoreConfig, WeatherStoreError> {
        let config = self.build_unchecked();
        config.validate()?;
        Ok(config)
    }
}

impl StoreConfig {
    /// Re-checks the value ranges. Needed for configurations that came through
    /// deserialization.
    pub fn validate(&self) -> Result<(), WeatherStoreError> {
        let positive = |field: &'static str, value: f64| {
            if value.is_finite() && value > 0.0 {
                Ok(())
            } else {
                Err(WeatherStoreError::InvalidConfig { field, value })
            }
        };
        positive("miles_per_degree", self.miles_per_degree)?;
        positive("bucket_size_miles", self.bucket_size_miles)?;
        if !(self.time_epsilon_secs.is_finite() && self.time_epsilon_secs >= 0.0) {
            return Err(WeatherStoreError::InvalidConfig {
                field: "time_epsilon_secs",
                value: self.time_epsilon_secs,
            });
        }
        Ok(())
    }

    pub fn miles_per_degree(&self) -> f64 {
        self.miles_per_degree
    }

    pub fn bucket_size_miles(&self) -> f64 {
        self.bucket_size_miles
    }

    pub fn time_epsilon_secs(&self) -> f64 {
        self.time_epsilon_secs
    }

    pub fn quantities(&self) -> &[WeatherQuantity] {
        &self.quantities
    }

    pub fn degrees_per_bucket(&self) -> f64 {
        self.bucket_size_miles / self.miles_per_degree
    }

    pub fn time_epsilon(&self) -> TimeDelta {
        epsilon_delta(self.time_epsilon_secs)
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            miles_per_degree: MILES_PER_LATITUDE_DEGREE,
            bucket_size_miles: DEFAULT_BUCKET_SIZE_MILES,
            time_epsilon_secs: DEFAULT_TIME_EPSILON_SECS,
            quantities: WeatherQuantity::default_hourly(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rejected_field(result: Result<StoreConfig, WeatherStoreError>) -> Option<&'static str> {
        match result {
            Err(WeatherStoreError::InvalidConfig { field, .. }) => Some(field),
            _ => None,
        }
    }

    #[test]
    fn test_default_matches_builder() {
        assert_eq!(StoreConfig::builder().build().unwrap(), StoreConfig::default());
        assert_eq!(StoreConfig::default().time_epsilon(), TimeDelta::seconds(1));
    }

    #[test]
    fn test_rejects_bad_bucket_size() {
        for size in [0.0, -5.0, f64::NAN, f64::INFINITY] {
            let result = StoreConfig::builder().bucket_size_miles(size).build();
            assert_eq!(rejected_field(result), Some("bucket_size_miles"));
        }
    }

    #[test]
    fn test_rejects_bad_miles_per_degree() {
        for mpd in [0.0, -69.0, f64::NAN] {
            let result = StoreConfig::builder().miles_per_degree(mpd).build();
            assert_eq!(rejected_field(result), Some("miles_per_degree"));
        }
    }

    #[test]
    fn test_time_epsilon_may_be_zero_but_not_negative() {
        assert!(StoreConfig::builder().time_epsilon_secs(0.0).build().is_ok());
        for eps in [-1.0, f64::NAN] {
            let result = StoreConfig::builder().time_epsilon_secs(eps).build();
            assert_eq!(rejected_field(result), Some("time_epsilon_secs"));
        }
    }
}
