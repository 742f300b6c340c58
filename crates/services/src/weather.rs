//! OpenWeatherMap current-weather lookup (metric units).

use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;
use veloce_core::environment::{WeatherProvider, WeatherSnapshot};
use veloce_core::error::ProviderError;
use veloce_providers::http;

pub struct OpenWeatherMap {
    api_url: String,
    api_key: String,
    client: reqwest::Client,
}

impl OpenWeatherMap {
    pub fn new(api_url: impl Into<String>, api_key: impl Into<String>, timeout_secs: u64) -> Self {
        Self {
            api_url: api_url.into(),
            api_key: api_key.into(),
            client: http::client(timeout_secs),
        }
    }
}

#[async_trait]
impl WeatherProvider for OpenWeatherMap {
    fn name(&self) -> &str {
        "openweathermap"
    }

    async fn get_weather(&self, city: &str) -> Result<Option<WeatherSnapshot>, ProviderError> {
        debug!(city, "Fetching weather");

        let response = self
            .client
            .get(&self.api_url)
            .query(&[
                ("q", city),
                ("appid", self.api_key.as_str()),
                ("units", "metric"),
            ])
            .send()
            .await
            .map_err(http::transport_error)?;

        // Unknown city
        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }

        let response = http::check_status(self.name(), response).await?;
        let body: OwmResponse = http::json_body(response).await?;

        let description = body
            .weather
            .into_iter()
            .next()
            .map(|w| w.description)
            .unwrap_or_default();

        Ok(Some(WeatherSnapshot {
            temperature: body.main.temp,
            humidity: body.main.humidity,
            description,
            wind_speed: body.wind.map(|w| w.speed).unwrap_or_default(),
        }))
    }
}

#[derive(Debug, Deserialize)]
struct OwmResponse {
    main: OwmMain,
    #[serde(default)]
    weather: Vec<OwmCondition>,
    #[serde(default)]
    wind: Option<OwmWind>,
}

#[derive(Debug, Deserialize)]
struct OwmMain {
    temp: f64,
    humidity: f64,
}

#[derive(Debug, Deserialize)]
struct OwmCondition {
    description: String,
}

#[derive(Debug, Deserialize)]
struct OwmWind {
    speed: f64,
}
