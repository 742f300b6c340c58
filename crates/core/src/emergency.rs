//! SOS domain: emergency contacts, police stations and the notifier trait.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::environment::Coordinates;
use crate::error::ProviderError;

/// Mean Earth radius used for great-circle distances.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Situation text used when the driver gives none.
pub const DEFAULT_SITUATION: &str = "Emergency! Need immediate assistance!";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmergencyContact {
    pub id: i64,
    pub name: String,
    pub phone_number: String,
    #[serde(default)]
    pub relationship: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PoliceStation {
    pub id: i64,
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default)]
    pub phone_number: String,
}

impl PoliceStation {
    pub fn coordinates(&self) -> Coordinates {
        Coordinates::new(self.latitude, self.longitude)
    }
}

/// Sends SOS alerts and finds help nearby.
#[async_trait]
pub trait EmergencyNotifier: Send + Sync {
    fn name(&self) -> &str;

    /// Alert every emergency contact. Returns how many alerts went out.
    async fn send_alert(&self, location: &str, situation: &str) -> Result<usize, ProviderError>;

    async fn nearest_station(
        &self,
        from: Coordinates,
    ) -> Result<Option<PoliceStation>, ProviderError>;
}

/// SMS text for an SOS alert. `location` is a `lat,long` pair.
pub fn sos_message(location: &str, situation: &str) -> String {
    format!(
        "EMERGENCY SOS ALERT!\nSituation: {situation}\nLocation: {location}\n\
         Google Maps Link: https://www.google.com/maps?q={location}"
    )
}

/// Great-circle distance between two points, in kilometres.
pub fn haversine_km(a: Coordinates, b: Coordinates) -> f64 {
    let lat1 = a.latitude.to_radians();
    let lat2 = b.latitude.to_radians();
    let dlat = (b.latitude - a.latitude).to_radians();
    let dlon = (b.longitude - a.longitude).to_radians();

    let h = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);
    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());
    EARTH_RADIUS_KM * c
}

/// The station closest to `from`, if any.
pub fn nearest_of(stations: &[PoliceStation], from: Coordinates) -> Option<&PoliceStation> {
    stations.iter().min_by(|x, y| {
        haversine_km(from, x.coordinates()).total_cmp(&haversine_km(from, y.coordinates()))
    })
}
