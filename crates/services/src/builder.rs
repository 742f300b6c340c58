//! Build service adapters from configuration.
//!
//! Services whose credentials are missing come back as `None`; the
//! assistant degrades around them.

use std::sync::Arc;

use tracing::warn;
use veloce_config::AppConfig;
use veloce_core::emergency::EmergencyNotifier;
use veloce_core::environment::{Coordinates, GeoLocator, ReverseGeocoder, WeatherProvider};
use veloce_core::music::MusicProvider;
use veloce_core::speech::TextToSpeech;
use veloce_core::vehicle::VehicleStore;

use crate::geolocation::{FixedLocator, IpApiLocator, NominatimGeocoder};
use crate::music::YouTubeMusic;
use crate::sms::{TwilioCredentials, TwilioNotifier};
use crate::tts::{CommandSpeaker, NoopSpeaker};
use crate::weather::OpenWeatherMap;

pub fn build_weather(config: &AppConfig) -> Option<Arc<dyn WeatherProvider>> {
    let Some(api_key) = config.weather.api_key.clone() else {
        warn!("No weather API key configured (OPENWEATHERMAP_API_KEY); weather disabled");
        return None;
    };
    Some(Arc::new(OpenWeatherMap::new(
        &config.weather.api_url,
        api_key,
        config.weather.timeout_secs,
    )))
}

pub fn build_locator(config: &AppConfig) -> Arc<dyn GeoLocator> {
    let location = &config.location;
    if location.provider == "fixed" {
        if let (Some(lat), Some(lon)) = (location.latitude, location.longitude) {
            return Arc::new(FixedLocator::new(Coordinates::new(lat, lon)));
        }
    }
    Arc::new(IpApiLocator::new(&location.ip_api_url, location.timeout_secs))
}

pub fn build_geocoder(config: &AppConfig) -> Arc<dyn ReverseGeocoder> {
    Arc::new(NominatimGeocoder::new(
        &config.location.geocoder_url,
        &config.location.user_agent,
        config.location.timeout_secs,
    ))
}

pub fn build_music(config: &AppConfig) -> Option<Arc<dyn MusicProvider>> {
    let Some(api_key) = config.music.api_key.clone() else {
        warn!("No music API key configured (YOUTUBE_API_KEY); music commands disabled");
        return None;
    };
    Some(Arc::new(YouTubeMusic::new(
        &config.music.search_url,
        api_key,
        &config.music.player_command,
    )))
}

pub fn build_notifier(
    config: &AppConfig,
    store: Arc<dyn VehicleStore>,
) -> Option<Arc<dyn EmergencyNotifier>> {
    let sos = &config.sos;
    if !sos.enabled {
        return None;
    }

    match (&sos.account_sid, &sos.auth_token, &sos.from_number) {
        (Some(account_sid), Some(auth_token), Some(from_number)) => {
            let credentials = TwilioCredentials {
                account_sid: account_sid.clone(),
                auth_token: auth_token.clone(),
                from_number: from_number.clone(),
            };
            Some(Arc::new(TwilioNotifier::new(&sos.api_url, credentials, store)))
        }
        _ => {
            warn!("Twilio credentials incomplete; SOS alerts disabled");
            None
        }
    }
}

pub fn build_speaker(config: &AppConfig) -> Arc<dyn TextToSpeech> {
    if config.speech.speak_replies {
        Arc::new(CommandSpeaker::new(&config.speech.tts_command))
    } else {
        Arc::new(NoopSpeaker)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use veloce_storage::InMemoryVehicleStore;

    #[test]
    fn missing_keys_disable_services() {
        let config = AppConfig::default();
        assert!(build_weather(&config).is_none());
        assert!(build_music(&config).is_none());
        assert!(build_notifier(&config, Arc::new(InMemoryVehicleStore::seeded())).is_none());
        assert_eq!(build_speaker(&config).name(), "noop");
    }

    #[test]
    fn fixed_locator_selected() {
        let mut config = AppConfig::default();
        config.location.provider = "fixed".into();
        config.location.latitude = Some(52.42);
        config.location.longitude = Some(10.78);
        assert_eq!(build_locator(&config).name(), "fixed");
        assert_eq!(build_locator(&AppConfig::default()).name(), "ip-api");
    }

    #[test]
    fn complete_twilio_credentials_enable_sos() {
        let mut config = AppConfig::default();
        config.sos.account_sid = Some("AC1".into());
        config.sos.auth_token = Some("t".into());
        config.sos.from_number = Some("+1555".into());
        let notifier = build_notifier(&config, Arc::new(InMemoryVehicleStore::seeded()));
        assert_eq!(notifier.map(|n| n.name().to_string()).as_deref(), Some("twilio"));

        config.sos.enabled = false;
        assert!(build_notifier(&config, Arc::new(InMemoryVehicleStore::seeded())).is_none());
    }
}
