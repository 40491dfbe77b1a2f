//! Measured variables and their values.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

/// Hourly variables requested from a collector when the store config does not override them.
pub const DEFAULT_HOURLY_QUANTITIES: &[&str] = &[
    "temperature_2m",
    "relative_humidity_2m",
    "dew_point_2m",
    "apparent_temperature",
    "precipitation",
    "rain",
    "snowfall",
    "snow_depth",
    "weather_code",
    "pressure_msl",
    "surface_pressure",
    "cloud_cover",
    "cloud_cover_low",
    "cloud_cover_mid",
    "cloud_cover_high",
    "et0_fao_evapotranspiration",
    "vapour_pressure_deficit",
    "wind_speed_10m",
    "wind_speed_100m",
    "wind_direction_10m",
    "wind_direction_100m",
    "wind_gusts_10m",
    "soil_temperature_0_to_7cm",
    "soil_temperature_7_to_28cm",
    "soil_temperature_28_to_100cm",
    "soil_temperature_100_to_255cm",
    "soil_moisture_0_to_7cm",
    "soil_moisture_7_to_28cm",
    "soil_moisture_28_to_100cm",
    "soil_moisture_100_to_255cm",
    "boundary_layer_height",
    "wet_bulb_temperature_2m",
    "total_column_integrated_water_vapour",
    "is_day",
    "sunshine_duration",
    "albedo",
    "snow_depth_water_equivalent",
    "shortwave_radiation_instant",
    "direct_radiation_instant",
    "diffuse_radiation_instant",
    "direct_normal_irradiance_instant",
    "global_tilted_irradiance_instant",
    "terrestrial_radiation_instant",
];

/// Identifies a measured variable such as `"TMAX"` or `"temperature_2m"`.
///
/// Equality, ordering and hashing only look at `identifier`; `name` is descriptive metadata.
///
/// # Examples
///
/// ```
/// use meteogrid::WeatherQuantity;
///
/// let a = WeatherQuantity::new("TMAX");
/// let b = WeatherQuantity::with_name("TMAX", "Maximum temperature");
/// assert_eq!(a, b);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeatherQuantity {
    identifier: String,
    name: Option<String>,
}

impl WeatherQuantity {
    pub fn new(identifier: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            name: None,
        }
    }

    pub fn with_name(identifier: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            name: Some(name.into()),
        }
    }

    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// The [`DEFAULT_HOURLY_QUANTITIES`] as owned values.
    pub fn default_hourly() -> Vec<WeatherQuantity> {
        DEFAULT_HOURLY_QUANTITIES
            .iter()
            .map(|id| WeatherQuantity::new(*id))
            .collect()
    }
}

impl PartialEq for WeatherQuantity {
    fn eq(&self, other: &Self) -> bool {
        self.identifier == other.identifier
    }
}
impl Eq for WeatherQuantity {}

impl Hash for WeatherQuantity {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.identifier.hash(state);
    }
}

impl PartialOrd for WeatherQuantity {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
impl Ord for WeatherQuantity {
    fn cmp(&self, other: &Self) -> Ordering {
        self.identifier.cmp(&other.identifier)
    }
}

impl fmt::Display for WeatherQuantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.identifier)
    }
}

/// One measured value of a [`WeatherQuantity`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherEntry {
    pub quantity: WeatherQuantity,
    pub value: f64,
}

impl WeatherEntry {
    pub fn new(quantity: WeatherQuantity, value: f64) -> Self {
        Self { quantity, value }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_identity_ignores_name() {
        let plain = WeatherQuantity::new("PRCP");
        let named = WeatherQuantity::with_name("PRCP", "Precipitation");
        assert_eq!(plain, named);

        let mut set = HashSet::new();
        set.insert(plain);
        assert!(!set.insert(named));
    }

    #[test]
    fn test_ordering_by_identifier() {
        let mut quantities = vec![
            WeatherQuantity::with_name("TMIN", "z"),
            WeatherQuantity::with_name("PRCP", "y"),
            WeatherQuantity::with_name("TMAX", "a"),
        ];
        quantities.sort();
        let ids: Vec<_> = quantities.iter().map(|q| q.identifier()).collect();
        assert_eq!(ids, vec!["PRCP", "TMAX", "TMIN"]);
    }

    #[test]
    fn test_default_hourly() {
        let defaults = WeatherQuantity::default_hourly();
        assert_eq!(defaults.len(), DEFAULT_HOURLY_QUANTITIES.len());
        assert_eq!(defaults[0].identifier(), "temperature_2m");
    }
}
