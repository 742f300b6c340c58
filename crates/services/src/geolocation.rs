//! Vehicle position: IP geolocation, a fixed position, and Nominatim
//! reverse geocoding.

use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;
use veloce_core::environment::{AddressFields, Coordinates, GeoLocator, ReverseGeocoder};
use veloce_core::error::ProviderError;
use veloce_providers::http;

// ── IP geolocation ─────────────────────────────────────────────────────────

/// Approximate position from the public IP address (ip-api.com).
pub struct IpApiLocator {
    api_url: String,
    client: reqwest::Client,
}

impl IpApiLocator {
    pub fn new(api_url: impl Into<String>, timeout_secs: u64) -> Self {
        Self {
            api_url: api_url.into(),
            client: http::client(timeout_secs),
        }
    }
}

#[async_trait]
impl GeoLocator for IpApiLocator {
    fn name(&self) -> &str {
        "ip-api"
    }

    async fn current_location(&self) -> Result<Option<Coordinates>, ProviderError> {
        let response = self
            .client
            .get(&self.api_url)
            .send()
            .await
            .map_err(http::transport_error)?;

        let response = http::check_status(self.name(), response).await?;
        let body: IpApiResponse = http::json_body(response).await?;

        if body.status != "success" {
            debug!(status = %body.status, "IP geolocation returned no position");
            return Ok(None);
        }

        Ok(body.lat.zip(body.lon).map(|(lat, lon)| Coordinates::new(lat, lon)))
    }
}

#[derive(Debug, Deserialize)]
struct IpApiResponse {
    #[serde(default)]
    status: String,
    #[serde(default)]
    lat: Option<f64>,
    #[serde(default)]
    lon: Option<f64>,
}

// ── Fixed position ─────────────────────────────────────────────────────────

/// Always reports the same position.
pub struct FixedLocator {
    coordinates: Coordinates,
}

impl FixedLocator {
    pub fn new(coordinates: Coordinates) -> Self {
        Self { coordinates }
    }
}

#[async_trait]
impl GeoLocator for FixedLocator {
    fn name(&self) -> &str {
        "fixed"
    }

    async fn current_location(&self) -> Result<Option<Coordinates>, ProviderError> {
        Ok(Some(self.coordinates))
    }
}

// ── Reverse geocoding ──────────────────────────────────────────────────────

/// OpenStreetMap Nominatim reverse geocoder.
pub struct NominatimGeocoder {
    api_url: String,
    user_agent: String,
    client: reqwest::Client,
}

impl NominatimGeocoder {
    pub fn new(api_url: impl Into<String>, user_agent: impl Into<String>, timeout_secs: u64) -> Self {
        Self {
            api_url: api_url.into(),
            user_agent: user_agent.into(),
            client: http::client(timeout_secs),
        }
    }
}

#[async_trait]
impl ReverseGeocoder for NominatimGeocoder {
    fn name(&self) -> &str {
        "nominatim"
    }

    async fn address_for(
        &self,
        coordinates: Coordinates,
    ) -> Result<Option<AddressFields>, ProviderError> {
        let lat = coordinates.latitude.to_string();
        let lon = coordinates.longitude.to_string();

        let response = self
            .client
            .get(&self.api_url)
            .header("User-Agent", &self.user_agent)
            .query(&[("lat", lat.as_str()), ("lon", lon.as_str()), ("format", "json")])
            .send()
            .await
            .map_err(http::transport_error)?;

        let response = http::check_status(self.name(), response).await?;
        let body: NominatimResponse = http::json_body(response).await?;
        Ok(body.address)
    }
}

#[derive(Debug, Deserialize)]
struct NominatimResponse {
    #[serde(default)]
    address: Option<AddressFields>,
}
