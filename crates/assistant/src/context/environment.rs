//! Gathers location and weather for the system prompt.
//!
//! Lookups run in order: position, then address, then weather for the
//! resolved city. A failed or empty lookup never aborts the chain; it
//! degrades to the placeholder values of [`EnvironmentSnapshot::unknown`].

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, warn};
use veloce_core::environment::{
    Coordinates, EnvironmentSnapshot, GeoLocator, LocationInfo, ReverseGeocoder, UNKNOWN,
    WeatherProvider, WeatherSnapshot,
};

use super::assembler::resolve_city_name;

pub struct EnvironmentGatherer {
    locator: Arc<dyn GeoLocator>,
    geocoder: Arc<dyn ReverseGeocoder>,
    weather: Option<Arc<dyn WeatherProvider>>,
}

impl EnvironmentGatherer {
    pub fn new(locator: Arc<dyn GeoLocator>, geocoder: Arc<dyn ReverseGeocoder>) -> Self {
        Self {
            locator,
            geocoder,
            weather: None,
        }
    }

    pub fn with_weather(mut self, weather: Option<Arc<dyn WeatherProvider>>) -> Self {
        self.weather = weather;
        self
    }

    /// Current position, or `None` when the locator has nothing.
    pub async fn coordinates(&self) -> Option<Coordinates> {
        match self.locator.current_location().await {
            Ok(Some(coordinates)) => Some(coordinates),
            Ok(None) => {
                warn!(locator = self.locator.name(), "Location unavailable");
                None
            }
            Err(e) => {
                warn!(locator = self.locator.name(), error = %e, "Location lookup failed");
                None
            }
        }
    }

    /// Position plus resolved city name.
    pub async fn locate(&self) -> LocationInfo {
        let Some(coordinates) = self.coordinates().await else {
            return LocationInfo::unknown();
        };

        let city = match self.geocoder.address_for(coordinates).await {
            Ok(Some(address)) => resolve_city_name(&address),
            Ok(None) => {
                warn!(%coordinates, "No address for coordinates");
                UNKNOWN.to_string()
            }
            Err(e) => {
                warn!(geocoder = self.geocoder.name(), error = %e, "Reverse geocoding failed");
                UNKNOWN.to_string()
            }
        };

        LocationInfo {
            coordinates: Some(coordinates),
            city,
        }
    }

    /// Weather for `city`; zeroed when unknown or unavailable.
    pub async fn weather_for(&self, city: &str) -> WeatherSnapshot {
        let Some(provider) = &self.weather else {
            debug!("No weather provider configured");
            return WeatherSnapshot::unknown();
        };
        if city == UNKNOWN {
            debug!("City unknown, skipping weather lookup");
            return WeatherSnapshot::unknown();
        }

        match provider.get_weather(city).await {
            Ok(Some(weather)) => weather,
            Ok(None) => {
                warn!(city, "No weather data for city");
                WeatherSnapshot::unknown()
            }
            Err(e) => {
                warn!(provider = provider.name(), city, error = %e, "Weather lookup failed");
                WeatherSnapshot::unknown()
            }
        }
    }

    /// Full environment at `now`. Never fails.
    pub async fn gather(&self, now: DateTime<Utc>) -> EnvironmentSnapshot {
        let location = self.locate().await;
        let weather = self.weather_for(&location.city).await;
        debug!(city = %location.city, weather = %weather.description, "Environment gathered");

        EnvironmentSnapshot {
            location,
            weather,
            timestamp: now,
        }
    }
}
