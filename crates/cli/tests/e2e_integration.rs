//! End-to-end integration tests for the Veloce conversation core.
//!
//! These tests drive a full `Session` from user input to assistant reply:
//! vehicle selection, context assembly, command interception, image
//! handling and model invocation, against a real SQLite store.

use std::sync::{Arc, Mutex};

use veloce_assistant::{
    CommandDispatcher, ContextAssembler, EnvironmentGatherer, ResponsePipeline, Session,
    SessionError, TurnOutcome,
};
use veloce_core::emergency::{EmergencyContact, EmergencyNotifier, PoliceStation};
use veloce_core::environment::{
    AddressFields, Coordinates, ReverseGeocoder, WeatherProvider, WeatherSnapshot,
};
use veloce_core::error::ProviderError;
use veloce_core::message::{Content, ImageAttachment, Role};
use veloce_core::provider::{ChatModel, CompletionRequest};
use veloce_core::vehicle::VehicleStore;
use veloce_services::{FixedLocator, NoopSpeaker};
use veloce_storage::SqliteVehicleStore;

// ── Mock Chat Model ──────────────────────────────────────────────────────

/// A chat model that returns scripted replies in sequence and records
/// every request together with the entry point used.
struct ScriptedModel {
    replies: Mutex<Vec<Result<String, ProviderError>>>,
    requests: Mutex<Vec<(&'static str, CompletionRequest)>>,
}

impl ScriptedModel {
    fn new(replies: Vec<Result<String, ProviderError>>) -> Self {
        Self {
            replies: Mutex::new(replies),
            requests: Mutex::new(Vec::new()),
        }
    }

    fn text(replies: &[&str]) -> Self {
        Self::new(replies.iter().map(|r| Ok(r.to_string())).collect())
    }

    fn requests(&self) -> Vec<(&'static str, CompletionRequest)> {
        self.requests.lock().unwrap().clone()
    }

    fn next(&self, mode: &'static str, request: CompletionRequest) -> Result<String, ProviderError> {
        let mut requests = self.requests.lock().unwrap();
        let replies = self.replies.lock().unwrap();
        if requests.len() >= replies.len() {
            panic!(
                "ScriptedModel exhausted: call #{}, have {}",
                requests.len(),
                replies.len()
            );
        }
        let reply = replies[requests.len()].clone();
        requests.push((mode, request));
        reply
    }
}

#[async_trait::async_trait]
impl ChatModel for ScriptedModel {
    fn name(&self) -> &str {
        "e2e_mock"
    }

    async fn complete_text(&self, request: CompletionRequest) -> Result<String, ProviderError> {
        self.next("text", request)
    }

    async fn complete_multimodal(
        &self,
        request: CompletionRequest,
    ) -> Result<String, ProviderError> {
        self.next("multimodal", request)
    }
}

// ── Mock Services ────────────────────────────────────────────────────────

struct StaticGeocoder;

#[async_trait::async_trait]
impl ReverseGeocoder for StaticGeocoder {
    fn name(&self) -> &str {
        "static"
    }

    async fn address_for(
        &self,
        _coordinates: Coordinates,
    ) -> Result<Option<AddressFields>, ProviderError> {
        Ok(Some(AddressFields {
            town: Some("Wolfsburg, Lower Saxony".into()),
            ..Default::default()
        }))
    }
}

struct OfflineWeather;

#[async_trait::async_trait]
impl WeatherProvider for OfflineWeather {
    fn name(&self) -> &str {
        "offline"
    }

    async fn get_weather(&self, _city: &str) -> Result<Option<WeatherSnapshot>, ProviderError> {
        Err(ProviderError::Timeout("weather".into()))
    }
}

/// Notifier that alerts every contact in the store.
struct StoreNotifier {
    store: Arc<dyn VehicleStore>,
    sent: Mutex<Vec<String>>,
}

#[async_trait::async_trait]
impl EmergencyNotifier for StoreNotifier {
    fn name(&self) -> &str {
        "store"
    }

    async fn send_alert(&self, location: &str, situation: &str) -> Result<usize, ProviderError> {
        let contacts = self
            .store
            .emergency_contacts()
            .await
            .map_err(|e| ProviderError::Dependency(e.to_string()))?;
        let mut sent = self.sent.lock().unwrap();
        for c in &contacts {
            sent.push(format!("{} <- {situation} @ {location}", c.phone_number));
        }
        Ok(contacts.len())
    }

    async fn nearest_station(
        &self,
        from: Coordinates,
    ) -> Result<Option<PoliceStation>, ProviderError> {
        let stations = self
            .store
            .police_stations()
            .await
            .map_err(|e| ProviderError::Dependency(e.to_string()))?;
        Ok(veloce_core::emergency::nearest_of(&stations, from).cloned())
    }
}

// ── Harness ──────────────────────────────────────────────────────────────

const WOLFSBURG: Coordinates = Coordinates {
    latitude: 52.42,
    longitude: 10.78,
};

async fn sqlite_store(dir: &tempfile::TempDir) -> Arc<SqliteVehicleStore> {
    Arc::new(
        SqliteVehicleStore::open(&dir.path().join("veloce.db"))
            .await
            .unwrap(),
    )
}

fn session(
    store: Arc<dyn VehicleStore>,
    model: Arc<ScriptedModel>,
    notifier: Option<Arc<dyn EmergencyNotifier>>,
) -> Session {
    let locator = Arc::new(FixedLocator::new(WOLFSBURG));
    let environment = EnvironmentGatherer::new(locator.clone(), Arc::new(StaticGeocoder))
        .with_weather(Some(Arc::new(OfflineWeather)));
    let dispatcher = CommandDispatcher::new(locator).with_notifier(notifier);

    Session::new(store, ResponsePipeline::new(model), environment, dispatcher)
        .with_assembler(ContextAssembler::new())
        .with_speaker(Some(Arc::new(NoopSpeaker)))
}

fn system_prompt(session: &Session) -> String {
    session
        .state()
        .system_prompt()
        .map(|m| m.content.text_parts())
        .unwrap_or_default()
}

// ── E2E: Context Assembly ────────────────────────────────────────────────

#[tokio::test]
async fn e2e_prompt_reflects_selected_vehicle_and_degraded_weather() {
    let dir = tempfile::tempdir().unwrap();
    let store = sqlite_store(&dir).await;
    let model = Arc::new(ScriptedModel::text(&["Your ID.4 is at 85.5% charge."]));
    let mut s = session(store, model.clone(), None);

    s.select_vehicle(1).await.unwrap();
    let outcome = s.submit_text("How is my battery?").await.unwrap();
    assert_eq!(outcome.text(), Some("Your ID.4 is at 85.5% charge."));

    let requests = model.requests();
    assert_eq!(requests.len(), 1);
    let (mode, request) = &requests[0];
    assert_eq!(*mode, "text");
    assert_eq!(request.temperature, 0.7);
    assert_eq!(request.max_tokens, 1024);

    let system = request.messages[0].content.text_parts();
    assert_eq!(request.messages[0].role, Role::System);
    assert!(system.contains("85.5"));
    assert!(system.contains("FL 32, FR 32, RL 32, RR 32"));
    assert!(system.contains("Wolfsburg (52.42,10.78)"));
    assert!(system.contains("Unknown, 0°C, humidity 0%, wind 0 m/s"));
}

#[tokio::test]
async fn e2e_switching_vehicle_never_leaves_stale_prompt() {
    let dir = tempfile::tempdir().unwrap();
    let store = sqlite_store(&dir).await;
    let model = Arc::new(ScriptedModel::text(&["ok", "ok"]));
    let mut s = session(store, model.clone(), None);

    s.select_vehicle(1).await.unwrap();
    s.submit_text("hi").await.unwrap();
    s.select_vehicle(2).await.unwrap();
    s.submit_text("and now?").await.unwrap();

    let prompt = system_prompt(&s);
    assert!(prompt.contains("2023 Golf GTI"));
    assert!(prompt.contains("N/A (not an electric vehicle)"));
    assert!(!prompt.contains("ID.4"));

    let systems = s
        .state()
        .messages()
        .iter()
        .filter(|m| m.role == Role::System)
        .count();
    assert_eq!(systems, 1);
    assert_eq!(s.state().messages()[0].role, Role::System);
}

#[tokio::test]
async fn e2e_telemetry_updates_reach_next_turn() {
    let dir = tempfile::tempdir().unwrap();
    let store = sqlite_store(&dir).await;
    let model = Arc::new(ScriptedModel::text(&["ok", "ok"]));
    let mut s = session(store.clone(), model.clone(), None);

    s.select_vehicle(1).await.unwrap();
    s.submit_text("battery?").await.unwrap();

    let mut id4 = store.get_vehicle(1).await.unwrap();
    id4.battery_level = Some(42.0);
    store.save_vehicle(&id4).await.unwrap();

    s.submit_text("battery now?").await.unwrap();
    let second = &model.requests()[1].1;
    assert!(second.messages[0].content.text_parts().contains("Battery level: 42%"));
}

// ── E2E: Command Interception ────────────────────────────────────────────

#[tokio::test]
async fn e2e_vehicle_commands_bypass_model() {
    let dir = tempfile::tempdir().unwrap();
    let store = sqlite_store(&dir).await;
    let model = Arc::new(ScriptedModel::text(&[]));
    let mut s = session(store, model.clone(), None);

    let replies = [
        ("Start the engine", "Please lock the doors before starting the engine"),
        ("Lock the doors", "All doors have been locked"),
        ("Start the engine", "Engine has been started"),
        ("Turn on the lights", "Vehicle lights have been turned on"),
        ("Lights on please", "Vehicle lights are already on"),
        ("Engine off", "Engine has been stopped"),
    ];
    for (utterance, expected) in replies {
        let outcome = s.submit_text(utterance).await.unwrap();
        assert_eq!(
            outcome,
            TurnOutcome::Command {
                reply: expected.into()
            },
            "{utterance}"
        );
    }

    assert!(model.requests().is_empty());
    assert_eq!(s.state().len(), replies.len() * 2);
}

#[tokio::test]
async fn e2e_music_keyword_wins_over_doors() {
    let dir = tempfile::tempdir().unwrap();
    let store = sqlite_store(&dir).await;
    let mut s = session(store, Arc::new(ScriptedModel::text(&[])), None);

    let outcome = s.submit_text("play some music and lock the doors").await.unwrap();
    assert!(matches!(outcome, TurnOutcome::Command { ref reply } if reply.starts_with("🎵")));
    assert!(!s.controller().doors_locked());
}

#[tokio::test]
async fn e2e_sos_alerts_stored_contacts() {
    let dir = tempfile::tempdir().unwrap();
    let store = sqlite_store(&dir).await;
    store
        .add_emergency_contact(&EmergencyContact {
            id: 0,
            name: "Alex".into(),
            phone_number: "+4915112345678".into(),
            relationship: "Partner".into(),
        })
        .await
        .unwrap();
    store
        .add_police_station(&PoliceStation {
            id: 0,
            name: "Polizeikommissariat Wolfsburg".into(),
            latitude: 52.423,
            longitude: 10.787,
            phone_number: "+4953614646".into(),
        })
        .await
        .unwrap();

    let notifier = Arc::new(StoreNotifier {
        store: store.clone(),
        sent: Mutex::new(Vec::new()),
    });
    let mut s = session(store, Arc::new(ScriptedModel::text(&[])), Some(notifier.clone()));

    let outcome = s.submit_text("SOS").await.unwrap();
    let reply = outcome.text().unwrap();
    assert!(reply.contains("sent to 1 emergency contact(s)"));
    assert!(reply.contains("Polizeikommissariat Wolfsburg"));
    assert_eq!(
        notifier.sent.lock().unwrap().as_slice(),
        ["+4915112345678 <- Emergency! Need immediate assistance! @ 52.42,10.78"]
    );
}

// ── E2E: Images ──────────────────────────────────────────────────────────

#[tokio::test]
async fn e2e_image_lifecycle() {
    let dir = tempfile::tempdir().unwrap();
    let store = sqlite_store(&dir).await;
    let model = Arc::new(ScriptedModel::text(&[
        "That is the tire pressure warning.",
        "This one is the oil lamp.",
        "You're welcome.",
    ]));
    let mut s = session(store, model.clone(), None);
    s.select_vehicle(1).await.unwrap();

    let first = ImageAttachment::from_bytes(b"first-photo", "image/jpeg");
    let second = ImageAttachment::from_bytes(b"second-photo", "image/jpeg");

    s.attach_image(first.clone());
    s.submit_text("What does this symbol mean?").await.unwrap();
    s.attach_image(second.clone());
    s.submit_text("And this one?").await.unwrap();

    let requests = model.requests();
    let (mode, request) = &requests[1];
    assert_eq!(*mode, "multimodal");
    assert!(request.messages.iter().all(|m| m.role != Role::System));
    let refs: Vec<String> = request
        .messages
        .iter()
        .flat_map(|m| m.content.image_refs())
        .map(|r| r.as_str().to_string())
        .collect();
    assert_eq!(refs, vec![second.reference().as_str().to_string()]);
    // the stale turn keeps its text
    assert_eq!(
        request.messages[0].content,
        Content::Parts(vec![veloce_core::message::ContentPart::Text(
            "What does this symbol mean?".into()
        )])
    );

    s.clear_image();
    s.clear_image();
    assert_eq!(s.state().image_ref_count(), 0);

    s.submit_text("Thanks!").await.unwrap();
    let (mode, request) = &model.requests()[2];
    assert_eq!(*mode, "text");
    assert!(request.messages.iter().all(|m| !m.content.is_parts()));
}

// ── E2E: Failures ────────────────────────────────────────────────────────

#[tokio::test]
async fn e2e_model_failure_is_recoverable() {
    let dir = tempfile::tempdir().unwrap();
    let store = sqlite_store(&dir).await;
    let model = Arc::new(ScriptedModel::new(vec![
        Err(ProviderError::ApiError {
            status_code: 503,
            message: "overloaded".into(),
        }),
        Ok("Back online.".into()),
    ]));
    let mut s = session(store, model.clone(), None);
    s.select_vehicle(2).await.unwrap();

    let err = s.submit_text("When is my next oil change?").await.unwrap_err();
    assert!(matches!(err, SessionError::ModelInvocation(_)));
    assert!(err.to_string().contains("503"));

    let outcome = s.submit_text("Try again?").await.unwrap();
    assert_eq!(outcome.text(), Some("Back online."));

    let roles: Vec<Role> = s.state().messages().iter().map(|m| m.role).collect();
    assert_eq!(
        roles,
        vec![Role::System, Role::User, Role::User, Role::Assistant]
    );
}

#[tokio::test]
async fn e2e_unknown_vehicle_and_no_selection() {
    let dir = tempfile::tempdir().unwrap();
    let store = sqlite_store(&dir).await;
    let mut s = session(store, Arc::new(ScriptedModel::text(&[])), None);

    assert!(matches!(
        s.submit_text("What's my mileage?").await,
        Err(SessionError::NoVehicleSelected)
    ));
    assert!(matches!(
        s.select_vehicle(404).await,
        Err(SessionError::Store(_))
    ));
    assert!(s.state().is_empty());
}
