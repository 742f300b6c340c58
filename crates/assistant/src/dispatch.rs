//! Executes routed commands and produces the assistant reply for them.
//!
//! A dispatched command never reaches the language model. Capability
//! failures are turned into reply text; dispatch itself cannot fail.

use std::sync::Arc;

use tracing::{info, warn};
use veloce_core::emergency::{DEFAULT_SITUATION, EmergencyNotifier};
use veloce_core::environment::{GeoLocator, UNKNOWN};
use veloce_core::music::MusicProvider;

use crate::router::RouteDecision;
use crate::vehicle_control::VehicleController;

pub struct CommandDispatcher {
    music: Option<Arc<dyn MusicProvider>>,
    notifier: Option<Arc<dyn EmergencyNotifier>>,
    locator: Arc<dyn GeoLocator>,
    controller: VehicleController,
}

impl CommandDispatcher {
    pub fn new(locator: Arc<dyn GeoLocator>) -> Self {
        Self {
            music: None,
            notifier: None,
            locator,
            controller: VehicleController::new(),
        }
    }

    pub fn with_music(mut self, music: Option<Arc<dyn MusicProvider>>) -> Self {
        self.music = music;
        self
    }

    pub fn with_notifier(mut self, notifier: Option<Arc<dyn EmergencyNotifier>>) -> Self {
        self.notifier = notifier;
        self
    }

    pub fn controller(&self) -> &VehicleController {
        &self.controller
    }

    /// Reply for a command, or `None` when the decision is `Forward`.
    pub async fn dispatch(&mut self, decision: &RouteDecision) -> Option<String> {
        let reply = match decision {
            RouteDecision::Forward => return None,
            RouteDecision::MusicCommand { query } => self.play_music(query).await,
            RouteDecision::VehicleCommand { subsystem, action } => {
                let outcome = self.controller.apply(*subsystem, action);
                info!(%subsystem, ?outcome, "Vehicle command handled");
                outcome.message().to_string()
            }
            RouteDecision::SosCommand => self.raise_sos().await,
        };
        Some(reply)
    }

    async fn play_music(&self, query: &str) -> String {
        let Some(music) = &self.music else {
            return "🎵 Music playback is not configured.".into();
        };
        if query.is_empty() {
            return "🎵 What would you like me to play?".into();
        }

        match music.search(query).await {
            Ok(Some(item)) => match music.play(&item).await {
                Ok(true) => {
                    info!(query, url = %item.url, "Playing music");
                    format!("🎵 Now playing: {query}")
                }
                Ok(false) => format!("🎵 Found {query}, but couldn't start playback."),
                Err(e) => {
                    warn!(error = %e, "Music playback failed");
                    format!("🎵 Error playing music: {e}")
                }
            },
            Ok(None) => format!("🎵 Sorry, I couldn't find any music matching \"{query}\"."),
            Err(e) => {
                warn!(provider = music.name(), error = %e, "Music search failed");
                format!("🎵 Error searching for music: {e}")
            }
        }
    }

    async fn raise_sos(&self) -> String {
        let Some(notifier) = &self.notifier else {
            warn!("SOS requested but no notifier is configured");
            return "🚨 SOS alerts are not configured. Please call emergency services directly."
                .into();
        };

        let coordinates = match self.locator.current_location().await {
            Ok(found) => found,
            Err(e) => {
                warn!(error = %e, "Location lookup failed during SOS");
                None
            }
        };
        let location = coordinates.map_or_else(|| UNKNOWN.to_string(), |c| c.to_string());

        let sent = match notifier.send_alert(&location, DEFAULT_SITUATION).await {
            Ok(sent) => sent,
            Err(e) => {
                warn!(notifier = notifier.name(), error = %e, "SOS alert failed");
                return format!(
                    "🚨 SOS alert failed: {e}. Please call emergency services directly."
                );
            }
        };
        info!(sent, %location, "SOS alert sent");

        let mut reply = format!(
            "🚨 SOS alert sent to {sent} emergency contact(s). Location: {location}."
        );
        if let Some(from) = coordinates {
            match notifier.nearest_station(from).await {
                Ok(Some(station)) => reply.push_str(&format!(
                    " Nearest police station: {} ({}).",
                    station.name, station.phone_number
                )),
                Ok(None) => {}
                Err(e) => warn!(error = %e, "Nearest police station lookup failed"),
            }
        }
        reply
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::router::{CommandRouter, Subsystem};
    use crate::test_helpers::{MockLocator, MockMusic, MockNotifier};
    use veloce_core::emergency::PoliceStation;
    use veloce_core::environment::Coordinates;
    use veloce_core::error::ProviderError;
    use veloce_core::music::PlayableRef;

    fn wolfsburg() -> Coordinates {
        Coordinates::new(52.42, 10.78)
    }

    fn dispatcher() -> CommandDispatcher {
        CommandDispatcher::new(Arc::new(MockLocator::at(wolfsburg())))
    }

    fn music(query: &str) -> RouteDecision {
        RouteDecision::MusicCommand { query: query.into() }
    }

    #[tokio::test]
    async fn forward_is_not_dispatched() {
        assert_eq!(dispatcher().dispatch(&RouteDecision::Forward).await, None);
    }

    #[tokio::test]
    async fn music_found_and_played() {
        let provider = Arc::new(MockMusic::found(PlayableRef::new("https://www.youtube.com/watch?v=1")));
        let mut d = dispatcher().with_music(Some(provider.clone()));

        let reply = d.dispatch(&music("Bohemian Rhapsody")).await;
        assert_eq!(reply.as_deref(), Some("🎵 Now playing: Bohemian Rhapsody"));
        assert_eq!(provider.queries(), vec!["Bohemian Rhapsody".to_string()]);
        assert_eq!(provider.played(), 1);
    }

    #[tokio::test]
    async fn music_not_found() {
        let mut d = dispatcher().with_music(Some(Arc::new(MockMusic::nothing())));
        let reply = d.dispatch(&music("zzzz")).await.unwrap();
        assert!(reply.contains("couldn't find"));
    }

    #[tokio::test]
    async fn music_error_becomes_reply() {
        let mut d = dispatcher().with_music(Some(Arc::new(MockMusic::failing(
            ProviderError::AuthenticationFailed("bad key".into()),
        ))));
        let reply = d.dispatch(&music("jazz")).await.unwrap();
        assert!(reply.starts_with("🎵 Error searching for music"));
    }

    #[tokio::test]
    async fn music_unconfigured_or_empty_query() {
        let mut d = dispatcher();
        assert!(d.dispatch(&music("jazz")).await.unwrap().contains("not configured"));

        let mut d = dispatcher().with_music(Some(Arc::new(MockMusic::nothing())));
        assert_eq!(
            d.dispatch(&music("")).await.as_deref(),
            Some("🎵 What would you like me to play?")
        );
    }

    #[tokio::test]
    async fn vehicle_commands_share_state() {
        let router = CommandRouter::new();
        let mut d = dispatcher();

        let start = d.dispatch(&router.route("start the engine")).await;
        assert_eq!(start.as_deref(), Some("Please lock the doors before starting the engine"));

        d.dispatch(&router.route("lock the doors")).await;
        let start = d.dispatch(&router.route("start the engine")).await;
        assert_eq!(start.as_deref(), Some("Engine has been started"));
        assert!(d.controller().engine_on());

        let lights = d
            .dispatch(&RouteDecision::VehicleCommand {
                subsystem: Subsystem::Lights,
                action: "flash".into(),
            })
            .await;
        assert_eq!(lights.as_deref(), Some("Invalid lights command"));
    }

    #[tokio::test]
    async fn sos_alerts_contacts_and_reports_station() {
        let station = PoliceStation {
            id: 1,
            name: "Polizei Wolfsburg".into(),
            latitude: 52.43,
            longitude: 10.79,
            phone_number: "+49 5361 46460".into(),
        };
        let notifier = Arc::new(MockNotifier::new(Ok(2), Some(station)));
        let mut d = dispatcher().with_notifier(Some(notifier.clone()));

        let reply = d.dispatch(&RouteDecision::SosCommand).await.unwrap();
        assert_eq!(
            reply,
            "🚨 SOS alert sent to 2 emergency contact(s). Location: 52.42,10.78. \
             Nearest police station: Polizei Wolfsburg (+49 5361 46460)."
        );
        assert_eq!(
            notifier.alerts(),
            vec![("52.42,10.78".to_string(), DEFAULT_SITUATION.to_string())]
        );
    }

    #[tokio::test]
    async fn sos_without_location_still_alerts() {
        let notifier = Arc::new(MockNotifier::new(Ok(1), None));
        let mut d = CommandDispatcher::new(Arc::new(MockLocator::nowhere()))
            .with_notifier(Some(notifier.clone()));

        let reply = d.dispatch(&RouteDecision::SosCommand).await.unwrap();
        assert_eq!(reply, "🚨 SOS alert sent to 1 emergency contact(s). Location: Unknown.");
        assert_eq!(notifier.alerts()[0].0, "Unknown");
    }

    #[tokio::test]
    async fn sos_failure_and_unconfigured() {
        let notifier = Arc::new(MockNotifier::new(
            Err(ProviderError::Network("offline".into())),
            None,
        ));
        let mut d = dispatcher().with_notifier(Some(notifier));
        let reply = d.dispatch(&RouteDecision::SosCommand).await.unwrap();
        assert!(reply.starts_with("🚨 SOS alert failed"));

        let reply = dispatcher().dispatch(&RouteDecision::SosCommand).await.unwrap();
        assert!(reply.contains("not configured"));
    }
}
