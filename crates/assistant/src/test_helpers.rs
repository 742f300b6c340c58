//! Scripted capability mocks shared by the assistant tests.

use std::sync::Mutex;

use async_trait::async_trait;
use veloce_core::emergency::{EmergencyNotifier, PoliceStation};
use veloce_core::environment::{
    AddressFields, Coordinates, GeoLocator, ReverseGeocoder, WeatherProvider, WeatherSnapshot,
};
use veloce_core::error::ProviderError;
use veloce_core::music::{MusicProvider, PlayableRef};
use veloce_core::provider::{ChatModel, CompletionRequest};
use veloce_core::speech::{AudioClip, SpeechToText, TextToSpeech};

use crate::pipeline::InvocationMode;

// ── Chat model ────────────────────────────────────────────────────────────

/// One recorded model call.
#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub mode: InvocationMode,
    pub request: CompletionRequest,
}

/// A chat model that returns a sequence of scripted results.
///
/// Each call returns the next result in the queue, whichever entry point
/// is used. Panics if more calls are made than results provided.
pub struct SequentialMockChatModel {
    results: Mutex<Vec<Result<String, ProviderError>>>,
    calls: Mutex<Vec<RecordedCall>>,
}

impl SequentialMockChatModel {
    pub fn new(results: Vec<Result<String, ProviderError>>) -> Self {
        Self {
            results: Mutex::new(results),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Only successful replies.
    pub fn replies(texts: &[&str]) -> Self {
        Self::new(texts.iter().map(|t| Ok(t.to_string())).collect())
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    fn next(
        &self,
        mode: InvocationMode,
        request: CompletionRequest,
    ) -> Result<String, ProviderError> {
        let mut calls = self.calls.lock().unwrap();
        let results = self.results.lock().unwrap();

        if calls.len() >= results.len() {
            panic!(
                "SequentialMockChatModel: no more results (call #{}, have {})",
                calls.len(),
                results.len()
            );
        }

        let result = results[calls.len()].clone();
        calls.push(RecordedCall { mode, request });
        result
    }
}

#[async_trait]
impl ChatModel for SequentialMockChatModel {
    fn name(&self) -> &str {
        "sequential_mock"
    }

    async fn complete_text(&self, request: CompletionRequest) -> Result<String, ProviderError> {
        self.next(InvocationMode::TextOnly, request)
    }

    async fn complete_multimodal(
        &self,
        request: CompletionRequest,
    ) -> Result<String, ProviderError> {
        self.next(InvocationMode::Multimodal, request)
    }
}

// ── Environment ───────────────────────────────────────────────────────────

pub struct MockLocator {
    position: Option<Coordinates>,
}

impl MockLocator {
    pub fn at(position: Coordinates) -> Self {
        Self {
            position: Some(position),
        }
    }

    pub fn nowhere() -> Self {
        Self { position: None }
    }
}

#[async_trait]
impl GeoLocator for MockLocator {
    fn name(&self) -> &str {
        "mock_locator"
    }

    async fn current_location(&self) -> Result<Option<Coordinates>, ProviderError> {
        Ok(self.position)
    }
}

pub struct MockGeocoder {
    result: Result<Option<AddressFields>, ProviderError>,
}

impl MockGeocoder {
    pub fn returning(result: Result<Option<AddressFields>, ProviderError>) -> Self {
        Self { result }
    }
}

#[async_trait]
impl ReverseGeocoder for MockGeocoder {
    fn name(&self) -> &str {
        "mock_geocoder"
    }

    async fn address_for(
        &self,
        _coordinates: Coordinates,
    ) -> Result<Option<AddressFields>, ProviderError> {
        self.result.clone()
    }
}

/// Returns the same result for every city and records the cities asked for.
pub struct MockWeather {
    result: Result<Option<WeatherSnapshot>, ProviderError>,
    cities: Mutex<Vec<String>>,
}

impl MockWeather {
    pub fn returning(result: Result<Option<WeatherSnapshot>, ProviderError>) -> Self {
        Self {
            result,
            cities: Mutex::new(Vec::new()),
        }
    }

    pub fn cities(&self) -> Vec<String> {
        self.cities.lock().unwrap().clone()
    }
}

#[async_trait]
impl WeatherProvider for MockWeather {
    fn name(&self) -> &str {
        "mock_weather"
    }

    async fn get_weather(&self, city: &str) -> Result<Option<WeatherSnapshot>, ProviderError> {
        self.cities.lock().unwrap().push(city.to_string());
        self.result.clone()
    }
}

// ── Commands ──────────────────────────────────────────────────────────────

pub struct MockMusic {
    search: Result<Option<PlayableRef>, ProviderError>,
    queries: Mutex<Vec<String>>,
    played: Mutex<usize>,
}

impl MockMusic {
    fn with(search: Result<Option<PlayableRef>, ProviderError>) -> Self {
        Self {
            search,
            queries: Mutex::new(Vec::new()),
            played: Mutex::new(0),
        }
    }

    pub fn found(item: PlayableRef) -> Self {
        Self::with(Ok(Some(item)))
    }

    pub fn nothing() -> Self {
        Self::with(Ok(None))
    }

    pub fn failing(error: ProviderError) -> Self {
        Self::with(Err(error))
    }

    pub fn queries(&self) -> Vec<String> {
        self.queries.lock().unwrap().clone()
    }

    pub fn played(&self) -> usize {
        *self.played.lock().unwrap()
    }
}

#[async_trait]
impl MusicProvider for MockMusic {
    fn name(&self) -> &str {
        "mock_music"
    }

    async fn search(&self, query: &str) -> Result<Option<PlayableRef>, ProviderError> {
        self.queries.lock().unwrap().push(query.to_string());
        self.search.clone()
    }

    async fn play(&self, _item: &PlayableRef) -> Result<bool, ProviderError> {
        *self.played.lock().unwrap() += 1;
        Ok(true)
    }
}

pub struct MockNotifier {
    send: Result<usize, ProviderError>,
    station: Option<PoliceStation>,
    alerts: Mutex<Vec<(String, String)>>,
}

impl MockNotifier {
    pub fn new(send: Result<usize, ProviderError>, station: Option<PoliceStation>) -> Self {
        Self {
            send,
            station,
            alerts: Mutex::new(Vec::new()),
        }
    }

    /// `(location, situation)` of every alert sent.
    pub fn alerts(&self) -> Vec<(String, String)> {
        self.alerts.lock().unwrap().clone()
    }
}

#[async_trait]
impl EmergencyNotifier for MockNotifier {
    fn name(&self) -> &str {
        "mock_notifier"
    }

    async fn send_alert(&self, location: &str, situation: &str) -> Result<usize, ProviderError> {
        self.alerts
            .lock()
            .unwrap()
            .push((location.to_string(), situation.to_string()));
        self.send.clone()
    }

    async fn nearest_station(
        &self,
        _from: Coordinates,
    ) -> Result<Option<PoliceStation>, ProviderError> {
        Ok(self.station.clone())
    }
}

// ── Speech ────────────────────────────────────────────────────────────────

/// Returns scripted transcripts in order. Panics when exhausted.
pub struct MockTranscriber {
    results: Mutex<Vec<Result<Option<String>, ProviderError>>>,
}

impl MockTranscriber {
    pub fn new(mut results: Vec<Result<Option<String>, ProviderError>>) -> Self {
        results.reverse();
        Self {
            results: Mutex::new(results),
        }
    }
}

#[async_trait]
impl SpeechToText for MockTranscriber {
    fn name(&self) -> &str {
        "mock_transcriber"
    }

    async fn transcribe(&self, _clip: &AudioClip) -> Result<Option<String>, ProviderError> {
        self.results
            .lock()
            .unwrap()
            .pop()
            .expect("MockTranscriber: no more transcripts")
    }
}

pub struct MockSpeaker {
    fail: bool,
    spoken: Mutex<Vec<String>>,
}

impl MockSpeaker {
    pub fn new() -> Self {
        Self {
            fail: false,
            spoken: Mutex::new(Vec::new()),
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            spoken: Mutex::new(Vec::new()),
        }
    }

    pub fn spoken(&self) -> Vec<String> {
        self.spoken.lock().unwrap().clone()
    }
}

#[async_trait]
impl TextToSpeech for MockSpeaker {
    fn name(&self) -> &str {
        "mock_speaker"
    }

    async fn speak(&self, text: &str) -> Result<(), ProviderError> {
        if self.fail {
            return Err(ProviderError::Dependency("speaker exited with status 1".into()));
        }
        self.spoken.lock().unwrap().push(text.to_string());
        Ok(())
    }
}
