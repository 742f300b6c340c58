//! Environment context: where the vehicle is, the weather there, and when.
//!
//! Each lookup is a separate capability so a failing provider only blanks
//! its own slice of the snapshot.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ProviderError;

/// Placeholder used whenever a lookup produced nothing.
pub const UNKNOWN: &str = "Unknown";

/// A latitude/longitude pair in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }
}

impl std::fmt::Display for Coordinates {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{},{}", self.latitude, self.longitude)
    }
}

/// Address components returned by reverse geocoding.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddressFields {
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub town: Option<String>,
    #[serde(default)]
    pub village: Option<String>,
    #[serde(default)]
    pub suburb: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
}

/// Current weather conditions (metric units).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherSnapshot {
    /// Degrees Celsius
    pub temperature: f64,
    /// Relative humidity in percent
    pub humidity: f64,
    pub description: String,
    /// Metres per second
    pub wind_speed: f64,
}

impl WeatherSnapshot {
    /// Zeroed values used when no weather is available.
    pub fn unknown() -> Self {
        Self {
            temperature: 0.0,
            humidity: 0.0,
            description: UNKNOWN.into(),
            wind_speed: 0.0,
        }
    }
}

impl Default for WeatherSnapshot {
    fn default() -> Self {
        Self::unknown()
    }
}

/// Resolved position of the vehicle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coordinates: Option<Coordinates>,
    pub city: String,
}

impl LocationInfo {
    pub fn unknown() -> Self {
        Self {
            coordinates: None,
            city: UNKNOWN.into(),
        }
    }
}

/// Everything around the vehicle that goes into the system prompt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnvironmentSnapshot {
    pub location: LocationInfo,
    pub weather: WeatherSnapshot,
    pub timestamp: DateTime<Utc>,
}

impl EnvironmentSnapshot {
    /// Snapshot with every lookup missing.
    pub fn unknown(timestamp: DateTime<Utc>) -> Self {
        Self {
            location: LocationInfo::unknown(),
            weather: WeatherSnapshot::unknown(),
            timestamp,
        }
    }
}

/// Current-weather lookup by city name.
#[async_trait]
pub trait WeatherProvider: Send + Sync {
    fn name(&self) -> &str;

    /// `Ok(None)` when the provider has no data for `city`.
    async fn get_weather(&self, city: &str) -> Result<Option<WeatherSnapshot>, ProviderError>;
}

/// Source of the vehicle's current position.
#[async_trait]
pub trait GeoLocator: Send + Sync {
    fn name(&self) -> &str;

    async fn current_location(&self) -> Result<Option<Coordinates>, ProviderError>;
}

/// Coordinates → address components.
#[async_trait]
pub trait ReverseGeocoder: Send + Sync {
    fn name(&self) -> &str;

    async fn address_for(
        &self,
        coordinates: Coordinates,
    ) -> Result<Option<AddressFields>, ProviderError>;
}
